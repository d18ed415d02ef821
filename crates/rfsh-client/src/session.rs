//! Session controller: owns session state and drives the read-eval loop.
//!
//! Exactly two units of execution share the connection for the lifetime of
//! a session: this loop and the keep-alive task. Shutdown stops the
//! keep-alive task and waits for it to exit before the disconnect notice is
//! sent, so a probe can never race the teardown.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

use rfsh_core::client::FileClient;
use rfsh_core::constants::ROOT;
use rfsh_core::error::{Error, Result};
use rfsh_core::guard::SharedConnection;
use rfsh_core::keepalive::{Keepalive, KeepaliveConfig, KeepaliveTimer};
use rfsh_core::settings::Settings;

use crate::dispatch::{self, CommandOutput};
use crate::render::{color, render, render_error};

/// Nested user input during a command (edit lines, overwrite confirmation).
/// Never invoked while the connection lock is held.
pub trait Prompter {
    /// Read one line; `None` means the user aborted (Ctrl-C/Ctrl-D).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Informational line preceding a prompt sequence.
    fn notice(&mut self, message: &str) {
        println!("{message}");
    }

    /// Yes/no question, defaulting to no.
    fn confirm(&mut self, question: &str) -> Result<bool> {
        match self.read_line(&format!(
            "{}{question} [y/n]? {}",
            color::YELLOW,
            color::RESET
        ))? {
            Some(answer) => Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes" | "YES")),
            None => Ok(false),
        }
    }
}

/// Foreground-only session state. The keep-alive task never touches it.
#[derive(Debug, Clone)]
pub struct Session {
    /// Current remote directory: always absolute and canonical; only `cd`
    /// assigns it, and only from resolver output.
    pub cwd: String,
    pub settings: Settings,
}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            cwd: ROOT.to_string(),
            settings,
        }
    }
}

/// What the loop should do after one input line.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Output(CommandOutput),
    Exit,
}

/// Drives connect, keep-alive, the REPL and orderly shutdown.
pub struct SessionController<C: FileClient> {
    session: Session,
    conn: SharedConnection<C>,
    keepalive: Option<Keepalive>,
    closed: bool,
}

impl<C: FileClient + 'static> SessionController<C> {
    pub fn new(client: C, settings: Settings, keepalive_config: KeepaliveConfig) -> Self {
        let timer = KeepaliveTimer::new(keepalive_config);
        Self {
            session: Session::new(settings),
            conn: SharedConnection::new(client, timer),
            keepalive: None,
            closed: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn connection(&self) -> &SharedConnection<C> {
        &self.conn
    }

    /// Verify the connection with an initial probe and start the
    /// keep-alive task. Failure here is a startup failure.
    pub async fn start(&mut self) -> Result<()> {
        self.conn.ping().await?;
        self.keepalive = Some(Keepalive::spawn(self.conn.clone()));
        info!("session started");
        Ok(())
    }

    /// Process one input line: no-op on empty input, `Exit` on an exit
    /// alias, otherwise dispatch.
    pub async fn handle_line(
        &mut self,
        line: &str,
        prompter: &mut dyn Prompter,
    ) -> Result<Step> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(Step::Output(CommandOutput::None));
        };
        if dispatch::is_exit(word) {
            return Ok(Step::Exit);
        }
        let args: Vec<&str> = parts.collect();
        dispatch::dispatch(word, &args, &mut self.session, &self.conn, prompter)
            .await
            .map(Step::Output)
    }

    /// Stop the keep-alive task, wait for it to exit, then send the
    /// disconnect notice. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        if let Some(keepalive) = self.keepalive.take() {
            keepalive.stop().await;
        }
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.conn.disconnect().await {
            // Best-effort by contract.
            warn!(error = %e, "disconnect notice failed");
        }
        info!("session closed");
    }

    /// The interactive read-eval loop. Returns the process exit code.
    ///
    /// An interrupt at the prompt breaks the loop; shutdown still runs.
    pub async fn run(&mut self) -> Result<i32> {
        let mut rl = DefaultEditor::new()
            .map_err(|e| Error::transport(format!("failed to create readline: {e}")))?;

        loop {
            let prompt = format!(
                "{}rfsh {}{}{} > ",
                color::CYAN,
                color::BLUE,
                self.session.cwd,
                color::RESET
            );
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);
                    let mut prompter = ReplPrompter { rl: &mut rl };
                    match self.handle_line(&line, &mut prompter).await {
                        Ok(Step::Exit) => break,
                        Ok(Step::Output(output)) => {
                            if let Some(text) = render(&output) {
                                print!("{text}");
                            }
                        }
                        Err(e) => {
                            print!("{}", render_error(&e));
                            // Transport-class failures mean the connection
                            // is gone; there is nothing to re-prompt for.
                            if !e.is_recoverable() {
                                self.shutdown().await;
                                return Ok(1);
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("exit");
                    break;
                }
                Err(e) => {
                    warn!(error = %e, "readline failed");
                    self.shutdown().await;
                    return Ok(1);
                }
            }
        }

        println!(
            "{}Disconnecting, please wait...{}",
            color::YELLOW,
            color::RESET
        );
        self.shutdown().await;
        println!("{}done.{}", color::GREEN, color::RESET);
        Ok(0)
    }
}

/// Rustyline-backed prompter for nested input.
struct ReplPrompter<'a> {
    rl: &'a mut DefaultEditor,
}

impl Prompter for ReplPrompter<'_> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.rl.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(Error::transport(format!("readline failed: {e}"))),
        }
    }
}
