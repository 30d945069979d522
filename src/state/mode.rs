use crate::error::TransportError;
use crate::io::protocol::Operation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadKind {
    Initial,
    Navigate,
}

/// The request that put the controller into [`ControllerState::Failed`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub operation: Operation,
    pub error: TransportError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Uninitialized,
    Loading(LoadKind),
    Ready,
    Failed(Failure),
}

impl ControllerState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ControllerState::Loading(_))
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            ControllerState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}
