use async_trait::async_trait;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, trace};

use crate::{
    config::IpcConfig,
    connection::Connection,
    error::IpcError,
    types::{RpcRequest, RpcResponse},
};

/// Issues JSON-RPC requests and decodes the response envelope.
#[async_trait]
pub trait JsonRpcClient: Send + Sync {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<RpcResponse, IpcError>;
}

/// JSON-RPC client over a Unix domain socket. Every call opens a fresh
/// connection and closes it once the response is read.
#[derive(Debug, Clone)]
pub struct IpcClient {
    config: IpcConfig,
}

impl IpcClient {
    /// Creates a client bound to the current Tokio runtime. Connections are
    /// driven by that runtime, so creating the client anywhere else is a
    /// configuration error.
    pub fn new(config: IpcConfig) -> Result<Self, IpcError> {
        Handle::try_current().map_err(|_| {
            IpcError::Configuration("no Tokio runtime available to drive the client".into())
        })?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &IpcConfig {
        &self.config
    }

    /// Sends `method` with `params` and returns the raw response document.
    pub async fn call(&self, method: &str, params: &[Value]) -> Result<Value, IpcError> {
        let request = RpcRequest::new(self.config.request_id(), method, params);
        let payload = serde_json::to_vec(&request)?;
        debug!(method, bytes = payload.len(), "sending request");

        let mut connection = Connection::open(&self.config).await?;
        connection.send(&payload).await?;
        let response = connection.read_response(self.config.read_timeout()).await?;
        connection.close().await?;

        trace!(method, %response, "received response");
        Ok(response)
    }
}

#[async_trait]
impl JsonRpcClient for IpcClient {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<RpcResponse, IpcError> {
        let response = self.call(method, &params).await?;
        RpcResponse::from_value(response)
            .map_err(|err| IpcError::MalformedResponse(format!("{method}: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::UnixListener,
    };

    fn config(path: std::path::PathBuf) -> IpcConfig {
        IpcConfig::builder()
            .socket_path(path)
            .read_timeout(Duration::from_millis(200))
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_outside_runtime_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = IpcClient::new(config(dir.path().join("jsonrpc.ipc"))).unwrap_err();

        assert!(matches!(err, IpcError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_new_inside_runtime() {
        let dir = tempfile::tempdir().unwrap();
        assert!(IpcClient::new(config(dir.path().join("jsonrpc.ipc"))).is_ok());
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        // Given
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsonrpc.ipc");
        let listener = UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            loop {
                let n = stream.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if serde_json::from_slice::<Value>(&request).is_ok() {
                    break;
                }
            }
            stream
                .write_all(br#"{"jsonrpc":"2.0","id":3,"result":"0xa"}"#)
                .await
                .unwrap();
            serde_json::from_slice::<Value>(&request).unwrap()
        });
        let client = IpcClient::new(config(path)).unwrap();

        // When
        let response = client
            .request("eth_getBalance", vec![json!("0xaa"), json!("latest")])
            .await
            .unwrap();

        // Then
        assert_eq!(response, RpcResponse::Success(json!("0xa")));
        let request = server.await.unwrap();
        assert_eq!(
            request,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "eth_getBalance",
                "params": ["0xaa", "latest"],
            })
        );
    }

    #[tokio::test]
    async fn test_call_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsonrpc.ipc");
        let listener = UnixListener::bind(&path).unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream
                .write_all(br#"{"id":3,"error":{"code":-32601,"message":"Method not found"}}"#)
                .await
                .unwrap();
        });
        let client = IpcClient::new(config(path)).unwrap();

        let response = client.request("eth_unknown", vec![]).await.unwrap();

        assert!(response.is_error());
    }

    #[tokio::test]
    async fn test_call_times_out_on_unterminated_response() {
        // Given
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jsonrpc.ipc");
        let listener = UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(br#"{"result":"0x"#).await.unwrap();
            // Hold the stream until the client gives up.
            let mut sink = Vec::new();
            let _ = stream.read_to_end(&mut sink).await;
        });
        let client = IpcClient::new(config(path)).unwrap();

        // When
        let err = client.call("eth_getCode", &[]).await.unwrap_err();

        // Then
        assert!(matches!(err, IpcError::ResponseTimeout(_)));
        server.await.unwrap();
    }
}
