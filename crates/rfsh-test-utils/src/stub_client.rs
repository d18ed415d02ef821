//! Scripted in-memory collaborator for testing without a server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use rfsh_core::client::{EntryInfo, EntryKind, FileClient, FileContent};
use rfsh_core::error::{Error, Result};
use rfsh_core::path::parent_dir;

/// One entry of the scripted remote tree.
#[derive(Debug, Clone)]
pub enum StubEntry {
    /// Directory with entry names in listing order.
    Dir(Vec<String>),
    File { mime: String, data: Vec<u8> },
}

/// One recorded operation with its enter/exit instants.
#[derive(Debug, Clone)]
pub struct OpRecord {
    pub op: &'static str,
    pub path: Option<String>,
    pub started: Instant,
    pub finished: Instant,
}

/// Shared log of every operation the stub served.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    records: Arc<Mutex<Vec<OpRecord>>>,
}

impl Journal {
    pub fn records(&self) -> Vec<OpRecord> {
        self.lock().clone()
    }

    /// Number of recorded operations with the given name.
    pub fn count(&self, op: &str) -> usize {
        self.lock().iter().filter(|r| r.op == op).count()
    }

    /// First pair of operations whose time windows overlap, if any.
    /// The guard's serializability property holds iff this is `None`.
    pub fn overlapping(&self) -> Option<(OpRecord, OpRecord)> {
        let mut records = self.lock().clone();
        records.sort_by_key(|r| r.started);
        records
            .windows(2)
            .find(|w| w[0].finished > w[1].started)
            .map(|w| (w[0].clone(), w[1].clone()))
    }

    fn push(&self, record: OpRecord) {
        self.lock().push(record);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<OpRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-memory `FileClient` over a scripted path map.
#[derive(Debug)]
pub struct StubClient {
    entries: HashMap<String, StubEntry>,
    failures: HashMap<String, (u32, String)>,
    ping_failure: Option<(u32, String)>,
    journal: Journal,
    op_delay: Duration,
}

impl Default for StubClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StubClient {
    /// Empty tree containing only the root directory.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert("/".to_string(), StubEntry::Dir(Vec::new()));
        Self {
            entries,
            failures: HashMap::new(),
            ping_failure: None,
            journal: Journal::default(),
            op_delay: Duration::ZERO,
        }
    }

    /// Script a directory with the given entry names.
    pub fn with_dir(mut self, path: &str, names: &[&str]) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        self.entries.insert(path.to_string(), StubEntry::Dir(names));
        self
    }

    /// Script a file with the given content type and bytes.
    pub fn with_file(mut self, path: &str, mime: &str, data: &[u8]) -> Self {
        self.entries.insert(
            path.to_string(),
            StubEntry::File {
                mime: mime.to_string(),
                data: data.to_vec(),
            },
        );
        self
    }

    /// Make every operation touching `path` fail with the given status.
    pub fn with_failure(mut self, path: &str, code: u32, message: &str) -> Self {
        self.failures
            .insert(path.to_string(), (code, message.to_string()));
        self
    }

    /// Make liveness probes fail with the given status.
    pub fn with_ping_failure(mut self, code: u32, message: &str) -> Self {
        self.ping_failure = Some((code, message.to_string()));
        self
    }

    /// Hold each operation open for `delay`, making overlap observable.
    pub fn with_op_delay(mut self, delay: Duration) -> Self {
        self.op_delay = delay;
        self
    }

    /// Handle to the shared operation journal.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    async fn run<T>(
        &mut self,
        op: &'static str,
        path: Option<&str>,
        f: impl FnOnce(&mut HashMap<String, StubEntry>) -> Result<T>,
    ) -> Result<T> {
        let started = Instant::now();
        if self.op_delay > Duration::ZERO {
            tokio::time::sleep(self.op_delay).await;
        }
        let out = match path.and_then(|p| self.failures.get(p)) {
            Some((code, message)) => Err(Error::remote(*code, message.clone())),
            None => f(&mut self.entries),
        };
        self.journal.push(OpRecord {
            op,
            path: path.map(str::to_string),
            started,
            finished: Instant::now(),
        });
        out
    }
}

fn missing(path: &str) -> Error {
    Error::remote(2, format!("no such file or directory: {path}"))
}

fn basename(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

fn add_to_parent(entries: &mut HashMap<String, StubEntry>, path: &str) {
    let name = basename(path);
    if let Some(StubEntry::Dir(names)) = entries.get_mut(&parent_dir(path)) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
}

fn remove_from_parent(entries: &mut HashMap<String, StubEntry>, path: &str) {
    let name = basename(path);
    if let Some(StubEntry::Dir(names)) = entries.get_mut(&parent_dir(path)) {
        names.retain(|n| *n != name);
    }
}

#[async_trait]
impl FileClient for StubClient {
    async fn ping(&mut self) -> Result<()> {
        let failure = self.ping_failure.clone();
        self.run("ping", None, move |_| match failure {
            Some((code, message)) => Err(Error::remote(code, message)),
            None => Ok(()),
        })
        .await
    }

    async fn info(&mut self, path: &str) -> Result<EntryInfo> {
        let owned = path.to_string();
        self.run("info", Some(path), move |entries| {
            match entries.get(&owned) {
                Some(StubEntry::Dir(_)) => Ok(EntryInfo {
                    path: owned,
                    kind: EntryKind::Directory,
                    size: None,
                    mime: None,
                }),
                Some(StubEntry::File { mime, data }) => Ok(EntryInfo {
                    kind: EntryKind::File,
                    size: Some(data.len() as u64),
                    mime: Some(mime.clone()),
                    path: owned,
                }),
                None => Err(missing(&owned)),
            }
        })
        .await
    }

    async fn read_dir(&mut self, path: &str) -> Result<Vec<String>> {
        let owned = path.to_string();
        self.run("read_dir", Some(path), move |entries| {
            match entries.get(&owned) {
                Some(StubEntry::Dir(names)) => Ok(names.clone()),
                Some(StubEntry::File { .. }) => {
                    Err(Error::remote(3, format!("not a directory: {owned}")))
                }
                None => Err(missing(&owned)),
            }
        })
        .await
    }

    async fn read_file(&mut self, path: &str) -> Result<FileContent> {
        let owned = path.to_string();
        self.run("read_file", Some(path), move |entries| {
            match entries.get(&owned) {
                Some(StubEntry::File { mime, data }) => Ok(FileContent {
                    mime: mime.clone(),
                    data: data.clone(),
                }),
                Some(StubEntry::Dir(_)) => {
                    Err(Error::remote(4, format!("is a directory: {owned}")))
                }
                None => Err(missing(&owned)),
            }
        })
        .await
    }

    async fn write_file(&mut self, path: &str, data: &[u8]) -> Result<()> {
        let owned = path.to_string();
        let data = data.to_vec();
        self.run("write_file", Some(path), move |entries| {
            if let Some(StubEntry::Dir(_)) = entries.get(&owned) {
                return Err(Error::remote(4, format!("is a directory: {owned}")));
            }
            entries.insert(
                owned.clone(),
                StubEntry::File {
                    mime: "text/plain".to_string(),
                    data,
                },
            );
            add_to_parent(entries, &owned);
            Ok(())
        })
        .await
    }

    async fn create_file(&mut self, path: &str) -> Result<()> {
        let owned = path.to_string();
        self.run("create_file", Some(path), move |entries| {
            if entries.contains_key(&owned) {
                return Err(Error::remote(5, format!("already exists: {owned}")));
            }
            entries.insert(
                owned.clone(),
                StubEntry::File {
                    mime: "text/plain".to_string(),
                    data: Vec::new(),
                },
            );
            add_to_parent(entries, &owned);
            Ok(())
        })
        .await
    }

    async fn delete_file(&mut self, path: &str) -> Result<()> {
        let owned = path.to_string();
        self.run("delete_file", Some(path), move |entries| {
            match entries.get(&owned) {
                Some(StubEntry::File { .. }) => {
                    entries.remove(&owned);
                    remove_from_parent(entries, &owned);
                    Ok(())
                }
                Some(StubEntry::Dir(_)) => {
                    Err(Error::remote(4, format!("is a directory: {owned}")))
                }
                None => Err(missing(&owned)),
            }
        })
        .await
    }

    async fn delete_dir(&mut self, path: &str) -> Result<()> {
        let owned = path.to_string();
        self.run("delete_dir", Some(path), move |entries| {
            match entries.get(&owned) {
                Some(StubEntry::Dir(_)) => {
                    entries.remove(&owned);
                    remove_from_parent(entries, &owned);
                    Ok(())
                }
                Some(StubEntry::File { .. }) => {
                    Err(Error::remote(3, format!("not a directory: {owned}")))
                }
                None => Err(missing(&owned)),
            }
        })
        .await
    }

    async fn copy_file(&mut self, src: &str, dst: &str) -> Result<()> {
        let src_owned = src.to_string();
        let dst_owned = dst.to_string();
        self.run("copy_file", Some(src), move |entries| {
            let Some(StubEntry::File { mime, data }) = entries.get(&src_owned) else {
                return Err(missing(&src_owned));
            };
            let copied = StubEntry::File {
                mime: mime.clone(),
                data: data.clone(),
            };
            entries.insert(dst_owned.clone(), copied);
            add_to_parent(entries, &dst_owned);
            Ok(())
        })
        .await
    }

    async fn copy_dir(&mut self, src: &str, dst: &str) -> Result<()> {
        let src_owned = src.to_string();
        let dst_owned = dst.to_string();
        self.run("copy_dir", Some(src), move |entries| {
            let Some(StubEntry::Dir(names)) = entries.get(&src_owned) else {
                return Err(missing(&src_owned));
            };
            let copied = StubEntry::Dir(names.clone());
            entries.insert(dst_owned.clone(), copied);
            add_to_parent(entries, &dst_owned);
            Ok(())
        })
        .await
    }

    async fn move_file(&mut self, src: &str, dst: &str) -> Result<()> {
        let src_owned = src.to_string();
        let dst_owned = dst.to_string();
        self.run("move_file", Some(src), move |entries| {
            match entries.remove(&src_owned) {
                Some(entry @ StubEntry::File { .. }) => {
                    remove_from_parent(entries, &src_owned);
                    entries.insert(dst_owned.clone(), entry);
                    add_to_parent(entries, &dst_owned);
                    Ok(())
                }
                Some(dir) => {
                    entries.insert(src_owned.clone(), dir);
                    Err(Error::remote(4, format!("is a directory: {src_owned}")))
                }
                None => Err(missing(&src_owned)),
            }
        })
        .await
    }

    async fn move_dir(&mut self, src: &str, dst: &str) -> Result<()> {
        let src_owned = src.to_string();
        let dst_owned = dst.to_string();
        self.run("move_dir", Some(src), move |entries| {
            match entries.remove(&src_owned) {
                Some(entry @ StubEntry::Dir(_)) => {
                    remove_from_parent(entries, &src_owned);
                    entries.insert(dst_owned.clone(), entry);
                    add_to_parent(entries, &dst_owned);
                    Ok(())
                }
                Some(file) => {
                    entries.insert(src_owned.clone(), file);
                    Err(Error::remote(3, format!("not a directory: {src_owned}")))
                }
                None => Err(missing(&src_owned)),
            }
        })
        .await
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.run("disconnect", None, |_| Ok(())).await
    }
}
