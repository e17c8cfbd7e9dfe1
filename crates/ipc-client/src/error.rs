use std::{path::PathBuf, time::Duration};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IpcError {
    /// A required connector parameter is missing.
    #[error("Invalid IPC configuration: {0}")]
    Configuration(String),

    /// The socket path never appeared within the polling budget.
    #[error("IPC socket {path} did not appear after {attempts} attempts")]
    ConnectionSetup { path: PathBuf, attempts: u32 },

    /// A single response read step exceeded the read timeout.
    #[error("Timed out after {0:?} waiting for a response chunk")]
    ResponseTimeout(Duration),

    #[error("Connection closed before a complete response was received ({received} bytes read)")]
    ConnectionClosed { received: usize },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("IPC io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),
}
