//! rfsh-core: session and concurrency layer for the rfsh remote file shell.
//!
//! This crate provides:
//! - The `FileClient` trait, the seam to the remote file-access protocol
//! - Path expression resolution against a tracked current directory
//! - The shared-connection guard serializing all round-trips
//! - The keep-alive scheduler probing the connection during idle periods
//! - Settings, error types and logging bootstrap

pub mod client;
pub mod constants;
pub mod error;
pub mod guard;
pub mod keepalive;
pub mod logging;
pub mod path;
pub mod settings;

pub use client::{EntryInfo, EntryKind, FileClient, FileContent};
pub use error::{Error, Result};
pub use guard::SharedConnection;
pub use keepalive::{Keepalive, KeepaliveConfig, KeepaliveTimer};
pub use logging::init_logging;
pub use settings::Settings;
