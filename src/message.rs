use crate::error::TransportError;
use crate::state::{LoadKind, PreviewToken};
use serde_json::Value;

/// Actions the view layer can dispatch to the navigator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SelectRow(usize),
    MoveSelection(i32), // +1/-1 for j/k
    ActivateRow(usize),
    ActivateSelected,
    NavigateUp,
    SetFilterText(String),
}

/// State a request was issued under; checked again when it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestTag {
    Listing { epoch: u64, kind: LoadKind },
    Preview(PreviewToken),
    Open { file_name: String },
}

/// Messages fed back into the navigator from callbacks.
#[derive(Debug)]
pub(crate) enum Event {
    Completed {
        tag: RequestTag,
        uri: String,
        result: Result<Value, TransportError>,
    },
    Filtered {
        listing: u64,
        directory_id: String,
        prefix: String,
        matches: Vec<usize>,
    },
}
