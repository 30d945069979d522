//! Client-side navigation controller for an embedded directory browser.
//!
//! [`Navigator`] owns the browsing session: it turns view [`Action`]s into
//! backend requests over a [`RequestChannel`], applies the responses, keeps
//! the preview of the selected entry current and routes filter input through
//! a per-directory [`FilterSlot`].

pub mod app;
pub mod config;
pub mod entry;
pub mod error;
pub mod io;
pub mod logging;
pub mod message;
pub mod state;

#[cfg(test)]
mod test_support;

pub use app::{Navigator, NavigatorView};
pub use config::Config;
pub use entry::{ElementDescriptor, EntryKind};
pub use error::{ConfigError, NavError, NavResult, TransportError};
pub use io::{ElementContent, RequestChannel};
pub use message::Action;
pub use state::{ControllerState, FilterSlot};
