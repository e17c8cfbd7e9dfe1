use std::{path::Path, time::Duration};

use serde_json::Value;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{
        unix::{OwnedReadHalf, OwnedWriteHalf},
        UnixStream,
    },
    time::{sleep, timeout},
};
use tracing::{debug, trace};

use crate::{config::IpcConfig, error::IpcError};

/// A single-use connection to the JSON-RPC server.
///
/// The connection is owned by one request/response exchange. Dropping it
/// closes the socket, so every error path releases it as well.
#[derive(Debug)]
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    /// Waits for the socket path to be created by the server, then connects.
    pub async fn open(config: &IpcConfig) -> Result<Self, IpcError> {
        let path = config.socket_path();
        if !wait_for(path, config.poll_interval(), config.poll_attempts()).await {
            return Err(IpcError::ConnectionSetup {
                path: path.to_path_buf(),
                attempts: config.poll_attempts(),
            });
        }

        let stream = UnixStream::connect(path).await?;
        debug!(path = %path.display(), "connected to IPC socket");
        let (reader, writer) = stream.into_split();

        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Writes the full payload and flushes it.
    pub async fn send(&mut self, payload: &[u8]) -> Result<(), IpcError> {
        self.writer.write_all(payload).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn read_response(&mut self, read_timeout: Duration) -> Result<Value, IpcError> {
        read_json_document(&mut self.reader, read_timeout).await
    }

    /// Shuts down the write half and drops the socket.
    pub async fn close(mut self) -> Result<(), IpcError> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

/// Polls for `path` every `interval`, at most `attempts` times.
pub async fn wait_for(path: &Path, interval: Duration, attempts: u32) -> bool {
    for _ in 0..attempts {
        if path.exists() {
            return true;
        }
        sleep(interval).await;
    }
    false
}

/// Reads the stream up to each `}` and stops as soon as the accumulated bytes
/// form a complete JSON document.
///
/// Responses are neither length-prefixed nor newline-terminated, so a `}` is
/// the only place a document can end. This holds for a single top-level object
/// per response and breaks for peers that pipeline several values.
pub async fn read_json_document<R>(reader: &mut R, read_timeout: Duration) -> Result<Value, IpcError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buffer = Vec::new();
    loop {
        let read = timeout(read_timeout, reader.read_until(b'}', &mut buffer))
            .await
            .map_err(|_| IpcError::ResponseTimeout(read_timeout))??;
        if read == 0 {
            return Err(IpcError::ConnectionClosed {
                received: buffer.len(),
            });
        }

        match serde_json::from_slice::<Value>(&buffer) {
            Ok(document) => {
                trace!(bytes = buffer.len(), "received complete response");
                return Ok(document);
            }
            // The document is still open, keep reading.
            Err(err) if err.is_eof() => continue,
            Err(err) => {
                return Err(IpcError::MalformedResponse(format!(
                    "{}: {}",
                    err,
                    String::from_utf8_lossy(&buffer)
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;
    use std::time::Instant;
    use tokio::io::{duplex, AsyncWriteExt};

    #[tokio::test]
    async fn test_read_json_document_across_chunks() {
        // Given
        let (client, mut server) = duplex(64);
        let mut reader = BufReader::new(client);
        let writer = tokio::spawn(async move {
            for chunk in [&b"{\"resu"[..], b"lt\":tr", b"ue}"] {
                server.write_all(chunk).await.unwrap();
                server.flush().await.unwrap();
                sleep(Duration::from_millis(5)).await;
            }
            // Keep the stream open: any further read would block until timeout.
            server
        });

        // When
        let document = read_json_document(&mut reader, Duration::from_secs(2))
            .await
            .unwrap();

        // Then
        assert_eq!(document, json!({"result": true}));
        drop(writer.await.unwrap());
    }

    #[rstest]
    #[case::flat(br#"{"jsonrpc":"2.0","id":3,"result":"0xa"}"#, json!({"jsonrpc": "2.0", "id": 3, "result": "0xa"}))]
    #[case::nested_object(
        br#"{"result":{"miner":"0x01","uncles":[]},"id":3}"#,
        json!({"result": {"miner": "0x01", "uncles": []}, "id": 3})
    )]
    #[case::brace_inside_string(
        br#"{"error":{"code":1,"message":"bad }"}}"#,
        json!({"error": {"code": 1, "message": "bad }"}})
    )]
    #[case::string_error(br#"{"id":3,"error":"invalid block"}"#, json!({"id": 3, "error": "invalid block"}))]
    #[tokio::test]
    async fn test_read_json_document_framing(#[case] payload: &[u8], #[case] expected: Value) {
        // Given
        let (client, mut server) = duplex(256);
        let mut reader = BufReader::new(client);
        server.write_all(payload).await.unwrap();

        // When
        let document = read_json_document(&mut reader, Duration::from_secs(1))
            .await
            .unwrap();

        // Then
        assert_eq!(document, expected);
    }

    #[tokio::test]
    async fn test_read_json_document_times_out() {
        // Given
        let (client, mut server) = duplex(64);
        let mut reader = BufReader::new(client);
        server.write_all(b"{\"result\":\"0x").await.unwrap();
        let read_timeout = Duration::from_millis(50);

        // When
        let start = Instant::now();
        let err = read_json_document(&mut reader, read_timeout)
            .await
            .unwrap_err();

        // Then
        assert!(matches!(err, IpcError::ResponseTimeout(t) if t == read_timeout));
        assert!(start.elapsed() >= read_timeout);
        assert!(start.elapsed() < Duration::from_secs(5));
        drop(server);
    }

    #[tokio::test]
    async fn test_read_json_document_connection_closed() {
        let (client, mut server) = duplex(64);
        let mut reader = BufReader::new(client);
        server.write_all(b"{\"result\":").await.unwrap();
        drop(server);

        let err = read_json_document(&mut reader, Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, IpcError::ConnectionClosed { received: 10 }));
    }

    #[tokio::test]
    async fn test_read_json_document_syntax_error_fails_fast() {
        let (client, mut server) = duplex(64);
        let mut reader = BufReader::new(client);
        server.write_all(b"{\"result\" true}").await.unwrap();

        let err = read_json_document(&mut reader, Duration::from_secs(30))
            .await
            .unwrap_err();

        assert!(matches!(err, IpcError::MalformedResponse(_)));
        drop(server);
    }

    #[tokio::test]
    async fn test_wait_for_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.ipc");

        assert!(!wait_for(&path, Duration::from_millis(1), 3).await);
    }

    #[tokio::test]
    async fn test_open_fails_when_socket_never_appears() {
        // Given
        let dir = tempfile::tempdir().unwrap();
        let config = IpcConfig::builder()
            .socket_path(dir.path().join("jsonrpc.ipc"))
            .poll_interval(Duration::from_millis(1))
            .poll_attempts(5)
            .build()
            .unwrap();

        // When
        let err = Connection::open(&config).await.unwrap_err();

        // Then
        assert!(matches!(err, IpcError::ConnectionSetup { attempts: 5, .. }));
    }
}
