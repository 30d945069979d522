use super::backend::LocalBackend;
use super::channel::{Completion, RequestChannel};
use super::protocol::{Method, Operation, Request};
use crate::config::ProtocolConfig;
use crate::error::TransportError;
use serde_json::Value;
use std::sync::mpsc::{channel, Sender};
use std::thread;
use tracing::{debug, warn};

struct IoCommand {
    uri: String,
    operation: Operation,
    payload: Value,
    on_complete: Completion,
}

/// Channel that serves requests on a background thread against a
/// [`LocalBackend`], completing each callback from that thread.
pub struct WorkerChannel {
    command_tx: Sender<IoCommand>,
    protocol: ProtocolConfig,
}

pub fn spawn_worker(backend: LocalBackend, protocol: ProtocolConfig) -> WorkerChannel {
    let (command_tx, command_rx) = channel::<IoCommand>();

    thread::spawn(move || {
        while let Ok(cmd) = command_rx.recv() {
            let result = Request::decode(cmd.operation, cmd.payload)
                .map_err(|e| TransportError::malformed(&cmd.uri, e))
                .and_then(|request| {
                    backend.handle(request).map_err(|message| TransportError::Backend {
                        uri: cmd.uri.clone(),
                        message,
                    })
                });
            (cmd.on_complete)(result);
        }
        debug!("io worker stopped");
    });

    WorkerChannel {
        command_tx,
        protocol,
    }
}

impl RequestChannel for WorkerChannel {
    fn send_request(&self, uri: &str, method: Method, payload: Value, on_complete: Completion) {
        let Some(operation) = self.protocol.operation(uri) else {
            on_complete(Err(TransportError::UnknownUri {
                uri: uri.to_string(),
            }));
            return;
        };
        if operation.method() != method {
            warn!(uri, ?method, "unexpected method for operation");
        }
        let cmd = IoCommand {
            uri: uri.to_string(),
            operation,
            payload,
            on_complete,
        };
        if let Err(err) = self.command_tx.send(cmd) {
            (err.0.on_complete)(Err(TransportError::Disconnected {
                uri: uri.to_string(),
            }));
        }
    }
}
