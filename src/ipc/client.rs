use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use super::protocol::{IpcRequest, IpcResponse};

/// Control client used by the `termclip` subcommands
#[derive(Debug)]
pub struct IpcClient {
    reader: BufReader<UnixStream>,
}

impl IpcClient {
    pub async fn connect(socket_path: impl AsRef<Path>) -> io::Result<Self> {
        let stream = UnixStream::connect(socket_path).await?;
        Ok(Self {
            reader: BufReader::new(stream),
        })
    }

    pub async fn send_request(&mut self, request: &IpcRequest) -> io::Result<()> {
        let mut json = serde_json::to_string(request)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        json.push('\n');

        let stream = self.reader.get_mut();
        stream.write_all(json.as_bytes()).await?;
        stream.flush().await?;
        Ok(())
    }

    pub async fn recv_response(&mut self) -> io::Result<IpcResponse> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "daemon closed connection",
            ));
        }

        serde_json::from_str(&line).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub async fn call(&mut self, request: &IpcRequest) -> io::Result<IpcResponse> {
        self.send_request(request).await?;
        self.recv_response().await
    }
}

/// Whether a daemon answers a ping on `socket_path` within `timeout`.
/// The socket file is removed only when connecting is refused; a slow
/// daemon keeps its socket.
pub async fn is_daemon_running(socket_path: &Path, timeout: Duration) -> bool {
    if !socket_path.exists() {
        return false;
    }

    let ping = async {
        let mut client = IpcClient::connect(socket_path).await?;
        client.call(&IpcRequest::new("ping")).await
    };

    match tokio::time::timeout(timeout, ping).await {
        Ok(Ok(response)) => response.success,
        Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
            log::debug!("Removing stale socket {:?}", socket_path);
            let _ = std::fs::remove_file(socket_path);
            false
        }
        Ok(Err(e)) => {
            log::debug!("Ping on {:?} failed: {}", socket_path, e);
            false
        }
        Err(_) => {
            log::warn!("Daemon on {:?} did not answer within {:?}", socket_path, timeout);
            false
        }
    }
}
