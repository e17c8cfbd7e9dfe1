use std::path::PathBuf;

use ipc_client::IpcError;
use serde_json::Value;

use crate::utils::diff::describe_mismatch;

/// Error type based off <https://github.com/paradigmxyz/reth/blob/main/testing/ef-tests/src/result.rs>
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The RPC round trip itself failed
    #[error(transparent)]
    Ipc(#[from] IpcError),
    /// The server answered with an error where a result was expected, or the reverse
    #[error("Unexpected response to {method}: {response}")]
    Protocol { method: String, response: String },
    /// A normalized fixture value differs from the live RPC value
    #[error("{context}: {}", describe_mismatch(.expected, .actual))]
    Mismatch {
        context: String,
        expected: Value,
        actual: Value,
    },
    /// The fixture itself is inconsistent
    #[error("Invalid fixture data: {0}")]
    FixtureData(String),
    /// A block selector is neither a block hash, a number nor a known tag
    #[error("Unrecognized block selector: {0}")]
    InvalidBlockSelector(String),
    /// An IO error occurred
    #[error("An error occurred interacting with the file system at {path}: {error}")]
    Io {
        /// The path to the file or directory
        path: PathBuf,
        /// The specific error
        error: String,
    },
    /// The fixture file could not be deserialized
    #[error("An error occurred deserializing the test at {path}: {error}")]
    CouldNotDeserialize {
        /// The path to the file
        path: PathBuf,
        /// The specific error
        error: String,
    },
    /// Other
    #[error("{0}")]
    Other(String),
}

impl RunnerError {
    pub fn mismatch(context: impl Into<String>, expected: Value, actual: Value) -> Self {
        Self::Mismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    pub fn protocol(method: &str, response: impl ToString) -> Self {
        Self::Protocol {
            method: method.to_string(),
            response: response.to_string(),
        }
    }
}

impl From<eyre::Error> for RunnerError {
    fn from(err: eyre::Error) -> Self {
        Self::Other(err.to_string())
    }
}
