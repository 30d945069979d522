use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a directory entry as reported by the backend.
///
/// `Unknown` keeps whatever tag arrived over the wire so that newer backends
/// can add kinds without breaking deserialization of a whole listing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryKind {
    Directory,
    File,
    Unknown(String),
}

impl EntryKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Directory => "Directory",
            EntryKind::File => "File",
            EntryKind::Unknown(tag) => tag,
        }
    }
}

impl From<String> for EntryKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Directory" => EntryKind::Directory,
            "File" => EntryKind::File,
            _ => EntryKind::Unknown(tag),
        }
    }
}

impl From<EntryKind> for String {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Unknown(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a directory listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl ElementDescriptor {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::Directory)
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, EntryKind::File)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn get_icon(&self) -> &str {
        match self.kind {
            EntryKind::Directory => "\u{f07b}",
            EntryKind::File => "\u{f15b}",
            EntryKind::Unknown(_) => "\u{f128}",
        }
    }

    pub fn display_name(&self) -> String {
        if self.is_dir() {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }
}
