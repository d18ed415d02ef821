//! The collaborator seam: remote file-access operations.
//!
//! `FileClient` abstracts the request/response protocol client. The session
//! layer is generic over it; the shipped TCP implementation lives in the
//! client crate and tests substitute a scripted in-memory one.
//!
//! Every method is one protocol round-trip. A non-success status from the
//! remote surfaces as [`Error::Remote`](crate::Error::Remote) with the
//! server's message carried verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Kind of a remote filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// Metadata for a single remote entry, as reported by stat/info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    /// Absolute remote path this record describes.
    pub path: String,
    pub kind: EntryKind,
    /// Size in bytes; servers may omit it for directories.
    pub size: Option<u64>,
    /// MIME-like type string, e.g. `text/plain`; files only.
    pub mime: Option<String>,
}

impl EntryInfo {
    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Payload of a file read: the reported content type plus the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub mime: String,
    pub data: Vec<u8>,
}

impl FileContent {
    /// Whether the content is presentable as text on a terminal.
    pub fn is_text(&self) -> bool {
        self.mime.starts_with("text/")
    }
}

/// Remote file-access operations.
///
/// All paths are canonical absolute remote paths; resolution against the
/// current directory happens before any of these is called.
#[async_trait]
pub trait FileClient: Send {
    /// Liveness probe.
    async fn ping(&mut self) -> Result<()>;

    /// Stat a path.
    async fn info(&mut self, path: &str) -> Result<EntryInfo>;

    /// List a directory; entry names in server order.
    async fn read_dir(&mut self, path: &str) -> Result<Vec<String>>;

    /// Read a whole file.
    async fn read_file(&mut self, path: &str) -> Result<FileContent>;

    /// Overwrite (or create) a file with the given bytes.
    async fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()>;

    /// Create an empty file.
    async fn create_file(&mut self, path: &str) -> Result<()>;

    async fn delete_file(&mut self, path: &str) -> Result<()>;

    async fn delete_dir(&mut self, path: &str) -> Result<()>;

    async fn copy_file(&mut self, src: &str, dst: &str) -> Result<()>;

    async fn copy_dir(&mut self, src: &str, dst: &str) -> Result<()>;

    async fn move_file(&mut self, src: &str, dst: &str) -> Result<()>;

    async fn move_dir(&mut self, src: &str, dst: &str) -> Result<()>;

    /// Announce disconnection. Best-effort; failures are not surfaced to
    /// the user.
    async fn disconnect(&mut self) -> Result<()>;
}
