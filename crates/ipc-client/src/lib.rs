//! JSON-RPC 2.0 over a local Unix domain socket.
//!
//! One connection per request: the socket path is polled until the server
//! creates it, the request is written, the response is read until it parses as
//! a complete JSON document and the connection is closed.
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod types;

pub use client::{IpcClient, JsonRpcClient};
pub use config::{IpcConfig, IpcConfigBuilder};
pub use error::IpcError;
pub use types::{RpcErrorObject, RpcRequest, RpcResponse};
