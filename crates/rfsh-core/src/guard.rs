//! Mutual-exclusion wrapper around the single shared connection.
//!
//! The connection handle is shared between the foreground command path and
//! the background keep-alive task. All round-trips go through this guard:
//! the lock is held for exactly one round-trip, released on every exit path
//! by scope, and never held across user input or a second round-trip. On a
//! successful round-trip the keep-alive countdown is reset, since the
//! exchange itself proved liveness.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use crate::client::{EntryInfo, FileClient, FileContent};
use crate::error::Result;
use crate::keepalive::KeepaliveTimer;

/// The shared connection handle. Cheap to clone; all clones serialize
/// through the same lock. The raw client is never exposed.
#[derive(Debug)]
pub struct SharedConnection<C> {
    conn: Arc<Mutex<C>>,
    timer: KeepaliveTimer,
}

impl<C> Clone for SharedConnection<C> {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            timer: self.timer.clone(),
        }
    }
}

impl<C: FileClient> SharedConnection<C> {
    pub fn new(conn: C, timer: KeepaliveTimer) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            timer,
        }
    }

    /// The keep-alive countdown this guard resets on successful use.
    pub fn timer(&self) -> &KeepaliveTimer {
        &self.timer
    }

    /// Run one round-trip against the locked connection.
    ///
    /// `op` must perform at most one protocol exchange; the lock is
    /// released when the returned future completes, success or not.
    pub async fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        F: for<'a> FnOnce(&'a mut C) -> BoxFuture<'a, Result<T>> + Send,
    {
        let mut conn = self.conn.lock().await;
        let out = op(&mut conn).await;
        self.note(&out);
        out
    }

    pub async fn ping(&self) -> Result<()> {
        self.with_connection(|c| c.ping()).await
    }

    pub async fn info(&self, path: &str) -> Result<EntryInfo> {
        let mut conn = self.conn.lock().await;
        let out = conn.info(path).await;
        self.note(&out);
        out
    }

    pub async fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.lock().await;
        let out = conn.read_dir(path).await;
        self.note(&out);
        out
    }

    pub async fn read_file(&self, path: &str) -> Result<FileContent> {
        let mut conn = self.conn.lock().await;
        let out = conn.read_file(path).await;
        self.note(&out);
        out
    }

    pub async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.write_file(path, data).await;
        self.note(&out);
        out
    }

    pub async fn create_file(&self, path: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.create_file(path).await;
        self.note(&out);
        out
    }

    pub async fn delete_file(&self, path: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.delete_file(path).await;
        self.note(&out);
        out
    }

    pub async fn delete_dir(&self, path: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.delete_dir(path).await;
        self.note(&out);
        out
    }

    pub async fn copy_file(&self, src: &str, dst: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.copy_file(src, dst).await;
        self.note(&out);
        out
    }

    pub async fn copy_dir(&self, src: &str, dst: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.copy_dir(src, dst).await;
        self.note(&out);
        out
    }

    pub async fn move_file(&self, src: &str, dst: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.move_file(src, dst).await;
        self.note(&out);
        out
    }

    pub async fn move_dir(&self, src: &str, dst: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let out = conn.move_dir(src, dst).await;
        self.note(&out);
        out
    }

    /// Best-effort disconnect notice; the timer is not reset since the
    /// connection is going away.
    pub async fn disconnect(&self) -> Result<()> {
        let mut conn = self.conn.lock().await;
        conn.disconnect().await
    }

    fn note<T>(&self, out: &Result<T>) {
        if out.is_ok() {
            self.timer.reset();
        }
    }
}
