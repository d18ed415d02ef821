//! rfsh client: interactive shell for remote file-access sessions.
//!
//! The binary lives in `main.rs`; this library exposes the pieces so
//! integration tests can drive a session against a scripted collaborator.

pub mod cli;
pub mod dispatch;
pub mod render;
pub mod session;
pub mod wire;

pub use cli::Cli;
pub use dispatch::{dispatch, is_exit, CommandOutput};
pub use session::{Prompter, Session, SessionController, Step};
pub use wire::TcpFileClient;
