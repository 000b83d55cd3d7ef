//! Discord local IPC transport
//!
//! Each frame is a little-endian `u32` opcode, a little-endian `u32` payload
//! length, then that many bytes of JSON.

use crate::error::{GuildLoggerError, Result};
use serde::Serialize;
use serde_json::{Value, json};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const HEADER_LEN: usize = 8;
const MAX_PAYLOAD_LEN: u32 = 64 * 1024;
const IPC_VERSION: u32 = 1;
const PIPE_SLOTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Handshake,
    Frame,
    Close,
    Ping,
    Pong,
}

impl Opcode {
    pub fn code(self) -> u32 {
        match self {
            Self::Handshake => 0,
            Self::Frame => 1,
            Self::Close => 2,
            Self::Ping => 3,
            Self::Pong => 4,
        }
    }

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            0 => Ok(Self::Handshake),
            1 => Ok(Self::Frame),
            2 => Ok(Self::Close),
            3 => Ok(Self::Ping),
            4 => Ok(Self::Pong),
            other => Err(GuildLoggerError::Ipc(format!("unknown opcode {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub opcode: Opcode,
    pub payload: Value,
}

pub fn encode_frame(opcode: Opcode, payload: &impl Serialize) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(payload)?;
    let len = u32::try_from(body.len())
        .map_err(|_| GuildLoggerError::Ipc("payload too large".to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(&opcode.code().to_le_bytes());
    bytes.extend_from_slice(&len.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Any duplex byte stream the client can run over
pub trait IpcStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> IpcStream for T {}

/// Who the local client says is logged in
#[derive(Debug, Clone)]
pub struct ReadyInfo {
    pub username: Option<String>,
}

pub struct IpcClient<S> {
    stream: S,
}

impl<S: IpcStream> IpcClient<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    pub async fn write_frame(&mut self, opcode: Opcode, payload: &impl Serialize) -> Result<()> {
        let bytes = encode_frame(opcode, payload)?;
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        Ok(())
    }

    pub async fn read_frame(&mut self) -> Result<Frame> {
        let mut header = [0u8; HEADER_LEN];
        self.stream.read_exact(&mut header).await?;

        let opcode = Opcode::from_code(u32::from_le_bytes([
            header[0], header[1], header[2], header[3],
        ]))?;
        let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if len > MAX_PAYLOAD_LEN {
            return Err(GuildLoggerError::Ipc(format!("frame of {len} bytes rejected")));
        }

        let mut body = vec![0u8; len as usize];
        self.stream.read_exact(&mut body).await?;
        let payload = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)?
        };
        Ok(Frame { opcode, payload })
    }

    /// Identify as `client_id` and wait for the READY dispatch.
    pub async fn handshake(&mut self, client_id: &str) -> Result<ReadyInfo> {
        self.write_frame(
            Opcode::Handshake,
            &json!({ "v": IPC_VERSION, "client_id": client_id }),
        )
        .await?;

        let frame = self.read_frame().await?;
        match frame.opcode {
            Opcode::Frame if frame.payload["evt"] == "READY" => Ok(ReadyInfo {
                username: frame.payload["data"]["user"]["username"]
                    .as_str()
                    .map(str::to_string),
            }),
            Opcode::Close => Err(GuildLoggerError::Ipc(close_reason(&frame.payload))),
            _ => Err(GuildLoggerError::Ipc(format!(
                "unexpected handshake reply: {}",
                frame.payload
            ))),
        }
    }

    /// Send one RPC command and wait for the reply carrying the same nonce.
    pub async fn command(&mut self, cmd: &str, args: Value) -> Result<Value> {
        let nonce = uuid::Uuid::new_v4().to_string();
        self.write_frame(
            Opcode::Frame,
            &json!({ "cmd": cmd, "args": args, "nonce": nonce }),
        )
        .await?;

        loop {
            let frame = self.read_frame().await?;
            match frame.opcode {
                Opcode::Ping => self.write_frame(Opcode::Pong, &frame.payload).await?,
                Opcode::Close => return Err(GuildLoggerError::Ipc(close_reason(&frame.payload))),
                Opcode::Frame if frame.payload["nonce"] == nonce.as_str() => {
                    if frame.payload["evt"] == "ERROR" {
                        return Err(GuildLoggerError::Ipc(format!(
                            "{cmd} rejected: {}",
                            frame.payload["data"]["message"]
                                .as_str()
                                .unwrap_or("unknown error")
                        )));
                    }
                    return Ok(frame.payload["data"].clone());
                }
                _ => tracing::debug!(opcode = ?frame.opcode, "Ignoring unrelated IPC frame"),
            }
        }
    }

    /// Answer pings until the peer closes the connection.
    pub async fn keep_alive(&mut self) -> Result<()> {
        loop {
            let frame = match self.read_frame().await {
                Ok(frame) => frame,
                Err(GuildLoggerError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                    return Ok(());
                }
                Err(e) => return Err(e),
            };
            match frame.opcode {
                Opcode::Ping => self.write_frame(Opcode::Pong, &frame.payload).await?,
                Opcode::Close => {
                    tracing::info!(reason = %close_reason(&frame.payload), "IPC peer closed");
                    return Ok(());
                }
                _ => tracing::trace!(payload = %frame.payload, "IPC frame"),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.write_frame(Opcode::Close, &json!({})).await?;
        self.stream.shutdown().await?;
        Ok(())
    }
}

fn close_reason(payload: &Value) -> String {
    format!(
        "closed by client ({}): {}",
        payload["code"],
        payload["message"].as_str().unwrap_or("no reason")
    )
}

/// Candidate endpoints, in the order the desktop client allocates them
pub fn endpoint_candidates() -> Vec<String> {
    #[cfg(unix)]
    {
        let dir = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "/tmp".to_string());
        let dir = dir.trim_end_matches('/').to_string();
        (0..PIPE_SLOTS)
            .map(|i| format!("{dir}/discord-ipc-{i}"))
            .collect()
    }

    #[cfg(windows)]
    {
        (0..PIPE_SLOTS)
            .map(|i| format!(r"\\.\pipe\discord-ipc-{i}"))
            .collect()
    }
}

/// Connect to the first endpoint that accepts
pub async fn connect() -> Result<IpcClient<Box<dyn IpcStream>>> {
    for endpoint in endpoint_candidates() {
        match open(&endpoint).await {
            Ok(stream) => {
                tracing::info!(endpoint = %endpoint, "Connected to local Discord client");
                return Ok(IpcClient::new(stream));
            }
            Err(e) => tracing::trace!(endpoint = %endpoint, error = %e, "Endpoint unavailable"),
        }
    }
    Err(GuildLoggerError::Ipc(
        "no running Discord client found".to_string(),
    ))
}

#[cfg(unix)]
async fn open(endpoint: &str) -> std::io::Result<Box<dyn IpcStream>> {
    let stream = tokio::net::UnixStream::connect(endpoint).await?;
    Ok(Box::new(stream))
}

#[cfg(windows)]
async fn open(endpoint: &str) -> std::io::Result<Box<dyn IpcStream>> {
    let pipe = tokio::net::windows::named_pipe::ClientOptions::new().open(endpoint)?;
    Ok(Box::new(pipe))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn ready_frame() -> Vec<u8> {
        encode_frame(
            Opcode::Frame,
            &json!({
                "cmd": "DISPATCH",
                "evt": "READY",
                "data": { "v": 1, "user": { "username": "makima" } },
                "nonce": null
            }),
        )
        .unwrap()
    }

    #[test]
    fn test_encode_frame_header() {
        let bytes = encode_frame(Opcode::Ping, &json!({})).unwrap();
        assert_eq!(&bytes[..4], &3u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[8..], b"{}");
    }

    #[test]
    fn test_unknown_opcode_rejected() {
        assert!(Opcode::from_code(9).is_err());
        assert_eq!(Opcode::from_code(4).unwrap(), Opcode::Pong);
    }

    #[tokio::test]
    async fn test_handshake_reads_ready() {
        let handshake = encode_frame(
            Opcode::Handshake,
            &json!({ "v": 1, "client_id": "123" }),
        )
        .unwrap();
        let mock = tokio_test::io::Builder::new()
            .write(&handshake)
            .read(&ready_frame())
            .build();

        let mut client = IpcClient::new(mock);
        let ready = client.handshake("123").await.unwrap();
        assert_eq!(ready.username.as_deref(), Some("makima"));
    }

    #[tokio::test]
    async fn test_handshake_close_is_error() {
        let handshake = encode_frame(
            Opcode::Handshake,
            &json!({ "v": 1, "client_id": "123" }),
        )
        .unwrap();
        let close = encode_frame(
            Opcode::Close,
            &json!({ "code": 4000, "message": "Invalid Client ID" }),
        )
        .unwrap();
        let mock = tokio_test::io::Builder::new()
            .write(&handshake)
            .read(&close)
            .build();

        let err = IpcClient::new(mock).handshake("123").await.unwrap_err();
        assert!(err.to_string().contains("Invalid Client ID"));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let mut header = Vec::new();
        header.extend_from_slice(&1u32.to_le_bytes());
        header.extend_from_slice(&(MAX_PAYLOAD_LEN + 1).to_le_bytes());
        let mock = tokio_test::io::Builder::new().read(&header).build();

        let err = IpcClient::new(mock).read_frame().await.unwrap_err();
        assert!(matches!(err, GuildLoggerError::Ipc(_)));
    }

    #[tokio::test]
    async fn test_command_matches_nonce_and_answers_ping() {
        let (client_side, server_side) = duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = IpcClient::new(server_side);
            let request = server.read_frame().await.unwrap();
            assert_eq!(request.opcode, Opcode::Frame);
            assert_eq!(request.payload["cmd"], "SET_ACTIVITY");
            let nonce = request.payload["nonce"].clone();

            server
                .write_frame(Opcode::Ping, &json!({ "n": 1 }))
                .await
                .unwrap();
            let pong = server.read_frame().await.unwrap();
            assert_eq!(pong.opcode, Opcode::Pong);

            server
                .write_frame(
                    Opcode::Frame,
                    &json!({ "cmd": "SET_ACTIVITY", "evt": null, "nonce": nonce, "data": { "ok": true } }),
                )
                .await
                .unwrap();
        });

        let mut client = IpcClient::new(client_side);
        let data = client
            .command("SET_ACTIVITY", json!({ "pid": 1 }))
            .await
            .unwrap();
        assert_eq!(data["ok"], true);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_command_error_event() {
        let (client_side, server_side) = duplex(4096);
        let server = tokio::spawn(async move {
            let mut server = IpcClient::new(server_side);
            let request = server.read_frame().await.unwrap();
            server
                .write_frame(
                    Opcode::Frame,
                    &json!({
                        "cmd": "SET_ACTIVITY",
                        "evt": "ERROR",
                        "nonce": request.payload["nonce"],
                        "data": { "code": 4000, "message": "bad activity" }
                    }),
                )
                .await
                .unwrap();
        });

        let err = IpcClient::new(client_side)
            .command("SET_ACTIVITY", json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bad activity"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_keep_alive_ends_on_eof() {
        let (client_side, server_side) = duplex(1024);
        drop(server_side);
        IpcClient::new(client_side).keep_alive().await.unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_endpoint_candidates() {
        let candidates = endpoint_candidates();
        assert_eq!(candidates.len(), PIPE_SLOTS as usize);
        assert!(candidates[0].ends_with("/discord-ipc-0"));
        assert!(candidates[9].ends_with("/discord-ipc-9"));
    }
}
