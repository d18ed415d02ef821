//! Default TCP collaborator: length-prefixed JSON header + raw body frames.
//!
//! One frame is a 4-byte big-endian header length, the JSON header, a
//! 4-byte big-endian body length and the raw body. Requests carry the
//! operation name and paths in the header and file payloads in the body;
//! responses carry the status record in the header and file payloads in
//! the body. Any other transport can replace this by implementing
//! [`FileClient`].

use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use rfsh_core::client::{EntryInfo, EntryKind, FileClient, FileContent};
use rfsh_core::constants::MAX_FRAME_SIZE;
use rfsh_core::error::{Error, Result};

#[derive(Debug, Serialize)]
struct Request<'a> {
    op: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dest: Option<&'a str>,
}

impl<'a> Request<'a> {
    fn op(op: &'a str) -> Self {
        Self {
            op,
            path: None,
            dest: None,
        }
    }

    fn path(op: &'a str, path: &'a str) -> Self {
        Self {
            op,
            path: Some(path),
            dest: None,
        }
    }

    fn transfer(op: &'a str, src: &'a str, dst: &'a str) -> Self {
        Self {
            op,
            path: Some(src),
            dest: Some(dst),
        }
    }
}

/// Status record of every response. Non-zero `code` carries the server's
/// message, surfaced to the user verbatim.
#[derive(Debug, Deserialize)]
struct Response {
    code: u32,
    #[serde(default)]
    message: String,
    #[serde(default)]
    kind: Option<EntryKind>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default)]
    entries: Option<Vec<String>>,
}

/// `FileClient` over a plain TCP stream.
#[derive(Debug)]
pub struct TcpFileClient {
    stream: TcpStream,
}

impl TcpFileClient {
    /// Connect to the server. Failure here is a startup failure.
    pub async fn connect(server: &str, port: u16) -> Result<Self> {
        let stream = TcpStream::connect((server, port)).await.map_err(|e| {
            Error::transport(format!("cannot connect to {server}:{port}: {e}"))
        })?;
        let _ = stream.set_nodelay(true);
        debug!(server, port, "connected");
        Ok(Self { stream })
    }

    async fn exchange(&mut self, req: &Request<'_>, body: &[u8]) -> Result<(Response, Vec<u8>)> {
        trace!(op = req.op, path = ?req.path, "round-trip");
        let header = serde_json::to_vec(req)
            .map_err(|e| Error::transport(format!("cannot encode request: {e}")))?;

        let mut frame = BytesMut::with_capacity(8 + header.len() + body.len());
        frame.put_u32(chunk_len(header.len())?);
        frame.put_slice(&header);
        frame.put_u32(chunk_len(body.len())?);
        frame.put_slice(body);
        self.stream.write_all(&frame).await.map_err(broken)?;

        let header = self.read_chunk().await?;
        let response: Response = serde_json::from_slice(&header)
            .map_err(|e| Error::transport(format!("malformed response header: {e}")))?;
        let body = self.read_chunk().await?;

        if response.code != 0 {
            return Err(Error::remote(response.code, response.message));
        }
        Ok((response, body))
    }

    async fn read_chunk(&mut self) -> Result<Vec<u8>> {
        let len = self.stream.read_u32().await.map_err(broken)? as usize;
        if len > MAX_FRAME_SIZE {
            return Err(Error::transport(format!(
                "frame of {len} bytes exceeds the {MAX_FRAME_SIZE} byte limit"
            )));
        }
        let mut data = vec![0u8; len];
        self.stream.read_exact(&mut data).await.map_err(broken)?;
        Ok(data)
    }

    async fn simple(&mut self, req: Request<'_>) -> Result<()> {
        let _ = self.exchange(&req, &[]).await?;
        Ok(())
    }
}

/// The outbound mirror of the receive-path limit: a chunk the peer would
/// refuse (or whose length would wrap the u32 prefix) is rejected before a
/// single byte hits the stream.
fn chunk_len(len: usize) -> Result<u32> {
    if len > MAX_FRAME_SIZE {
        return Err(Error::transport(format!(
            "frame of {len} bytes exceeds the {MAX_FRAME_SIZE} byte limit"
        )));
    }
    Ok(len as u32)
}

fn broken(e: std::io::Error) -> Error {
    Error::transport(format!("connection lost: {e}"))
}

#[async_trait]
impl FileClient for TcpFileClient {
    async fn ping(&mut self) -> Result<()> {
        self.simple(Request::op("ping")).await
    }

    async fn info(&mut self, path: &str) -> Result<EntryInfo> {
        let (response, _) = self.exchange(&Request::path("info", path), &[]).await?;
        let kind = response
            .kind
            .ok_or_else(|| Error::transport("info response without a kind".to_string()))?;
        Ok(EntryInfo {
            path: path.to_string(),
            kind,
            size: response.size,
            mime: response.mime,
        })
    }

    async fn read_dir(&mut self, path: &str) -> Result<Vec<String>> {
        let (response, _) = self
            .exchange(&Request::path("read-directory", path), &[])
            .await?;
        Ok(response.entries.unwrap_or_default())
    }

    async fn read_file(&mut self, path: &str) -> Result<FileContent> {
        let (response, body) = self.exchange(&Request::path("read-file", path), &[]).await?;
        Ok(FileContent {
            mime: response
                .mime
                .unwrap_or_else(|| "application/octet-stream".to_string()),
            data: body,
        })
    }

    async fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let _ = self.exchange(&Request::path("write-file", path), data).await?;
        Ok(())
    }

    async fn create_file(&mut self, path: &str) -> Result<()> {
        self.simple(Request::path("create-file", path)).await
    }

    async fn delete_file(&mut self, path: &str) -> Result<()> {
        self.simple(Request::path("delete-file", path)).await
    }

    async fn delete_dir(&mut self, path: &str) -> Result<()> {
        self.simple(Request::path("delete-directory", path)).await
    }

    async fn copy_file(&mut self, src: &str, dst: &str) -> Result<()> {
        self.simple(Request::transfer("copy-file", src, dst)).await
    }

    async fn copy_dir(&mut self, src: &str, dst: &str) -> Result<()> {
        self.simple(Request::transfer("copy-directory", src, dst))
            .await
    }

    async fn move_file(&mut self, src: &str, dst: &str) -> Result<()> {
        self.simple(Request::transfer("move-file", src, dst)).await
    }

    async fn move_dir(&mut self, src: &str, dst: &str) -> Result<()> {
        self.simple(Request::transfer("move-directory", src, dst))
            .await
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.simple(Request::op("disconnect")).await
    }
}
