use thiserror::Error;

pub type NavResult<T> = Result<T, NavError>;

/// Failure of a single request/response exchange with the backend.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("channel closed before `{uri}` completed")]
    Disconnected { uri: String },
    #[error("backend rejected `{uri}`: {message}")]
    Backend { uri: String, message: String },
    #[error("malformed payload for `{uri}`: {message}")]
    Malformed { uri: String, message: String },
    #[error("no operation is mapped to `{uri}`")]
    UnknownUri { uri: String },
}

impl TransportError {
    pub fn malformed(uri: &str, err: impl std::fmt::Display) -> Self {
        TransportError::Malformed {
            uri: uri.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum NavError {
    #[error("unimplemented behaviour for element type `{kind}` (entry `{name}`)")]
    UnknownEntryType { name: String, kind: String },
    #[error("selection {index} is out of range for {len} entries")]
    OutOfRangeSelection { index: usize, len: usize },
    #[error("no directory has been loaded yet")]
    NotLoaded,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
