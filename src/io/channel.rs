// Host transport abstraction

use super::protocol::Method;
use crate::error::TransportError;
use serde_json::Value;

/// Callback invoked with the outcome of one request.
pub type Completion = Box<dyn FnOnce(Result<Value, TransportError>) + Send + 'static>;

/// Asynchronous request/response channel to the backend.
///
/// Implementations call `on_complete` at most once per request. Completions
/// may arrive in any order relative to other in-flight requests, may run on
/// any thread, and may even run before `send_request` returns. A request that
/// never completes simply drops its callback.
pub trait RequestChannel {
    fn send_request(&self, uri: &str, method: Method, payload: Value, on_complete: Completion);
}

impl<C: RequestChannel + ?Sized> RequestChannel for Box<C> {
    fn send_request(&self, uri: &str, method: Method, payload: Value, on_complete: Completion) {
        (**self).send_request(uri, method, payload, on_complete)
    }
}
