//! Shared helpers for rfsh-client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use rfsh_client::session::{Prompter, Session};
use rfsh_core::error::Result;
use rfsh_core::guard::SharedConnection;
use rfsh_core::keepalive::{KeepaliveConfig, KeepaliveTimer};
use rfsh_core::settings::Settings;
use rfsh_test_utils::{Journal, StubClient};

/// Prompter fed from a fixed script; records notices instead of printing.
pub struct ScriptedPrompter {
    lines: VecDeque<String>,
    pub notices: Vec<String>,
}

impl ScriptedPrompter {
    pub fn empty() -> Self {
        Self::with_lines(&[])
    }

    pub fn with_lines(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            notices: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

/// Session, guard and journal over a scripted client, default intervals.
pub fn harness(
    stub: StubClient,
    settings: Settings,
) -> (Session, SharedConnection<StubClient>, Journal) {
    let journal = stub.journal();
    let timer = KeepaliveTimer::new(KeepaliveConfig::default());
    (
        Session::new(settings),
        SharedConnection::new(stub, timer),
        journal,
    )
}

/// A stub tree with `/docs` holding a text file and a subdirectory.
pub fn docs_tree() -> StubClient {
    StubClient::new()
        .with_dir("/", &["docs", "notes.txt"])
        .with_dir("/docs", &["a.txt", "sub"])
        .with_dir("/docs/sub", &[])
        .with_file("/docs/a.txt", "text/plain", b"alpha\n")
        .with_file("/notes.txt", "text/plain", b"some notes\n")
}
