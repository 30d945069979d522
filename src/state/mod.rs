pub mod filter;
pub mod mode;
pub mod preview;
pub mod session;

pub use filter::{prefix_matches, FilterHandler, FilterSlot, FilterState};
pub use mode::{ControllerState, Failure, LoadKind};
pub use preview::{PreviewResolver, PreviewToken, Resolution};
pub use session::{DirectoryListing, SessionState};
