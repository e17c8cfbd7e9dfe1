use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::error::IpcError;

/// Interval between two checks for the socket path.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Number of checks for the socket path before giving up (~1s in total).
pub const DEFAULT_POLL_ATTEMPTS: u32 = 100;
/// Upper bound on a single response read step.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Every request carries the same id, responses are matched by connection.
pub const DEFAULT_REQUEST_ID: u64 = 3;

/// Connection parameters for the JSON-RPC server, built once at startup.
#[derive(Debug, Clone)]
pub struct IpcConfig {
    socket_path: PathBuf,
    poll_interval: Duration,
    poll_attempts: u32,
    read_timeout: Duration,
    request_id: u64,
}

impl IpcConfig {
    pub fn builder() -> IpcConfigBuilder {
        IpcConfigBuilder::default()
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub const fn poll_attempts(&self) -> u32 {
        self.poll_attempts
    }

    pub const fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub const fn request_id(&self) -> u64 {
        self.request_id
    }
}

#[derive(Debug, Default)]
pub struct IpcConfigBuilder {
    socket_path: Option<PathBuf>,
    poll_interval: Option<Duration>,
    poll_attempts: Option<u32>,
    read_timeout: Option<Duration>,
    request_id: Option<u64>,
}

impl IpcConfigBuilder {
    pub fn socket_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.socket_path = Some(path.into());
        self
    }

    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub const fn poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = Some(attempts);
        self
    }

    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub const fn request_id(mut self, id: u64) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn build(self) -> Result<IpcConfig, IpcError> {
        let socket_path = self
            .socket_path
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or_else(|| {
                IpcError::Configuration("JSON RPC IPC socket path is not specified".into())
            })?;
        let poll_attempts = self.poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS);
        if poll_attempts == 0 {
            return Err(IpcError::Configuration(
                "poll attempts must be at least 1".into(),
            ));
        }

        Ok(IpcConfig {
            socket_path,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_attempts,
            read_timeout: self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT),
            request_id: self.request_id.unwrap_or(DEFAULT_REQUEST_ID),
        })
    }
}
