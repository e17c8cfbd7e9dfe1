//! Unix socket JSON-RPC server answering from a `MockClient`.
#![allow(dead_code)]

use std::{path::PathBuf, time::Duration};

use ef_rpc_testing::test_utils::MockClient;
use ipc_client::{IpcClient, IpcConfig, JsonRpcClient, RpcResponse};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{UnixListener, UnixStream},
    task::JoinHandle,
};

pub struct MockServer {
    /// Temporary directory containing the socket
    _temp_dir: TempDir,
    socket_path: PathBuf,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Binds a socket in a fresh directory and serves every connection with
    /// the handlers of `mock`. Requests are recorded by `mock`.
    pub fn start(mock: MockClient) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let socket_path = temp_dir.path().join("ef-rpc.ipc");
        let listener = UnixListener::bind(&socket_path).expect("Failed to bind socket");

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let mock = mock.clone();
                tokio::spawn(async move {
                    let _ = serve(stream, &mock).await;
                });
            }
        });

        Self {
            _temp_dir: temp_dir,
            socket_path,
            handle,
        }
    }

    pub fn client(&self) -> IpcClient {
        let config = IpcConfig::builder()
            .socket_path(&self.socket_path)
            .read_timeout(Duration::from_secs(2))
            .build()
            .expect("Failed to build config");
        IpcClient::new(config).expect("Failed to create client")
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve(mut stream: UnixStream, mock: &MockClient) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    let request = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..n]);
        match serde_json::from_slice::<Value>(&buffer) {
            Ok(request) => break request,
            Err(err) if err.is_eof() => continue,
            Err(err) => return Err(err.into()),
        }
    };

    let method = request["method"].as_str().unwrap_or_default();
    let params = request["params"].as_array().cloned().unwrap_or_default();
    let response = match mock.request(method, params).await.expect("mock never fails") {
        RpcResponse::Success(result) => json!({"jsonrpc": "2.0", "id": request["id"], "result": result}),
        RpcResponse::Failure(error) => json!({"jsonrpc": "2.0", "id": request["id"], "error": error}),
    };

    stream.write_all(response.to_string().as_bytes()).await?;
    stream.shutdown().await
}
