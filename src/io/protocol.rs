// Wire types exchanged with the directory/file backend

use crate::entry::{ElementDescriptor, EntryKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Target name understood by backends as "the parent of the current directory".
pub const PARENT_DIR: &str = "..";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    InitDirectory,
    NavigateToDirectory,
    GetElementInfo,
    OpenFile,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::InitDirectory,
        Operation::NavigateToDirectory,
        Operation::GetElementInfo,
        Operation::OpenFile,
    ];

    pub fn method(self) -> Method {
        match self {
            Operation::GetElementInfo => Method::Get,
            _ => Method::Post,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoToDirRequest {
    pub current_dir: String,
    pub dir_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfoRequest {
    pub current_dir: String,
    pub element_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenFileRequest {
    pub current_dir: String,
    pub file_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    InitDirectory,
    NavigateToDirectory(GoToDirRequest),
    GetElementInfo(ElementInfoRequest),
    OpenFile(OpenFileRequest),
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Request::InitDirectory => Operation::InitDirectory,
            Request::NavigateToDirectory(_) => Operation::NavigateToDirectory,
            Request::GetElementInfo(_) => Operation::GetElementInfo,
            Request::OpenFile(_) => Operation::OpenFile,
        }
    }

    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Request::InitDirectory => Ok(Value::Object(Default::default())),
            Request::NavigateToDirectory(body) => serde_json::to_value(body),
            Request::GetElementInfo(body) => serde_json::to_value(body),
            Request::OpenFile(body) => serde_json::to_value(body),
        }
    }

    /// Rebuild a request from its operation and payload (backend side).
    pub fn decode(operation: Operation, payload: Value) -> Result<Self, serde_json::Error> {
        Ok(match operation {
            Operation::InitDirectory => Request::InitDirectory,
            Operation::NavigateToDirectory => {
                Request::NavigateToDirectory(serde_json::from_value(payload)?)
            }
            Operation::GetElementInfo => Request::GetElementInfo(serde_json::from_value(payload)?),
            Operation::OpenFile => Request::OpenFile(serde_json::from_value(payload)?),
        })
    }
}

/// Response to `InitDirectory` and `NavigateToDirectory`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirContent {
    pub current_dir: String,
    pub elements_list: Vec<ElementDescriptor>,
    /// Entry to pre-select, usually the directory we just came up from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_dir: Option<String>,
}

/// Response to `GetElementInfo`, also the preview shown for the selected entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content")]
pub enum ElementContent {
    Directory {
        #[serde(rename = "elementsList", default)]
        elements_list: Vec<ElementDescriptor>,
    },
    File {
        #[serde(default)]
        data: String,
    },
}

impl ElementContent {
    /// Preview shown when nothing is selected.
    pub fn empty_file() -> Self {
        ElementContent::File {
            data: String::new(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            ElementContent::Directory { .. } => EntryKind::Directory,
            ElementContent::File { .. } => EntryKind::File,
        }
    }
}

impl Default for ElementContent {
    fn default() -> Self {
        ElementContent::Directory {
            elements_list: Vec::new(),
        }
    }
}
