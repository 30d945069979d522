pub mod backend;
pub mod channel;
pub mod directory;
pub mod protocol;
pub mod worker;

pub use backend::LocalBackend;
pub use channel::{Completion, RequestChannel};
pub use protocol::{DirContent, ElementContent, Method, Operation, Request};
pub use worker::{spawn_worker, WorkerChannel};
