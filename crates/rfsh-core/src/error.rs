//! Error types for rfsh.

use thiserror::Error;

/// Main error type for rfsh operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error touching the local filesystem (save/upload paths).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote server reported a non-success status.
    /// The message is surfaced verbatim.
    #[error("{message}")]
    Remote { code: u32, message: String },

    /// A required command argument was not supplied.
    #[error("you need to provide {0}")]
    MissingArgument(&'static str),

    /// The command word did not match any known command or alias.
    #[error("{0}: unknown command, type 'help' for help")]
    UnknownCommand(String),

    /// Tried to change into a path that exists but is not a directory.
    #[error("cannot cd to '{path}': not a directory")]
    NotADirectory { path: String },

    /// A runtime setting change was rejected: unknown key, bad value, or
    /// a key that is fixed for the process lifetime.
    #[error("{0}")]
    InvalidSetting(String),

    /// Transport-level failure (connect, framing, connection lost).
    #[error("transport error: {message}")]
    Transport { message: String },

    /// Configuration could not be loaded at startup.
    #[error("config error: {message}")]
    Config { message: String },
}

impl Error {
    /// Build a `Remote` error from a status record.
    pub fn remote(code: u32, message: impl Into<String>) -> Self {
        Error::Remote {
            code,
            message: message.into(),
        }
    }

    /// Build a `Transport` error.
    pub fn transport(message: impl Into<String>) -> Self {
        Error::Transport {
            message: message.into(),
        }
    }

    /// Returns true if the command loop should keep running after
    /// reporting this error to the user.
    ///
    /// Only startup-class failures (transport, configuration) terminate
    /// the process; everything a handler can produce is reported and the
    /// loop re-prompts.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Transport { .. } | Error::Config { .. })
    }
}

/// Convenience result type for rfsh operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_is_verbatim() {
        let err = Error::remote(3, "no such file or directory");
        assert_eq!(err.to_string(), "no such file or directory");
    }

    #[test]
    fn unknown_command_names_the_word() {
        let err = Error::UnknownCommand("froznicate".into());
        assert_eq!(
            err.to_string(),
            "froznicate: unknown command, type 'help' for help"
        );
    }

    #[test]
    fn missing_argument_display() {
        let err = Error::MissingArgument("a source and a destination");
        assert_eq!(
            err.to_string(),
            "you need to provide a source and a destination"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn recoverable_classification() {
        assert!(Error::remote(1, "boom").is_recoverable());
        assert!(Error::MissingArgument("an argument").is_recoverable());
        assert!(Error::UnknownCommand("x".into()).is_recoverable());
        assert!(Error::NotADirectory { path: "/a".into() }.is_recoverable());
        assert!(Error::InvalidSetting("unrecognized setting 'volume'".into()).is_recoverable());
        assert!(Error::Io(std::io::Error::other("x")).is_recoverable());

        assert!(!Error::transport("connection refused").is_recoverable());
        assert!(!Error::Config {
            message: "bad port".into()
        }
        .is_recoverable());
    }
}
