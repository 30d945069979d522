// In-memory channel whose requests are completed by the test, in any order.

use crate::error::TransportError;
use crate::io::channel::{Completion, RequestChannel};
use crate::io::protocol::Method;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

struct SentRequest {
    uri: String,
    method: Method,
    payload: Value,
    completion: Option<Completion>,
}

#[derive(Clone, Default)]
pub struct ScriptedChannel {
    sent: Rc<RefCell<Vec<SentRequest>>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sent.borrow().len()
    }

    /// `(uri, payload)` of the request sent at `index`.
    pub fn request(&self, index: usize) -> (String, Value) {
        let sent = self.sent.borrow();
        let req = &sent[index];
        (req.uri.clone(), req.payload.clone())
    }

    pub fn method(&self, index: usize) -> Method {
        self.sent.borrow()[index].method
    }

    pub fn count(&self, uri: &str) -> usize {
        self.sent.borrow().iter().filter(|r| r.uri == uri).count()
    }

    pub fn complete(&self, index: usize, result: Result<Value, TransportError>) {
        let completion = self.sent.borrow_mut()[index]
            .completion
            .take()
            .expect("request already completed");
        completion(result);
    }

    pub fn reply(&self, index: usize, value: Value) {
        self.complete(index, Ok(value));
    }
}

impl RequestChannel for ScriptedChannel {
    fn send_request(&self, uri: &str, method: Method, payload: Value, on_complete: Completion) {
        self.sent.borrow_mut().push(SentRequest {
            uri: uri.to_string(),
            method,
            payload,
            completion: Some(on_complete),
        });
    }
}

/// A directory listing response; entries are `(name, type)` pairs.
pub fn dir_content(dir: &str, entries: &[(&str, &str)], prev_dir: Option<&str>) -> Value {
    let list: Vec<Value> = entries
        .iter()
        .map(|(name, kind)| json!({"name": name, "type": kind}))
        .collect();
    let mut value = json!({"currentDir": dir, "elementsList": list});
    if let Some(prev) = prev_dir {
        value["prevDir"] = json!(prev);
    }
    value
}

pub fn file_content(data: &str) -> Value {
    json!({"type": "File", "content": {"data": data}})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_can_run_out_of_order() {
        let channel = ScriptedChannel::new();
        let (tx, rx) = std::sync::mpsc::channel();
        for uri in ["first", "second"] {
            let tx = tx.clone();
            channel.send_request(
                uri,
                Method::Get,
                Value::Null,
                Box::new(move |_| {
                    let _ = tx.send(uri);
                }),
            );
        }
        channel.reply(1, Value::Null);
        channel.reply(0, Value::Null);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec!["second", "first"]);
        assert_eq!(channel.method(0), Method::Get);
    }
}
