//! Command-line argument parsing using clap.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use rfsh_core::Settings;

/// Interactive shell for remote file-access sessions.
#[derive(Debug, Parser)]
#[command(
    name = "rfsh",
    version,
    about = "Interactive shell for remote file-access sessions"
)]
pub struct Cli {
    /// Server address to connect to
    #[arg(short = 's', long = "server-address", value_name = "HOST")]
    pub server: Option<String>,

    /// Server port
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Colorize directory listings
    #[arg(short = 'c', long = "colored-ls")]
    pub colored_ls: bool,

    /// Enable the diagnostic `debug` command
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Config file (default: $RFSH_CONFIG or ~/.config/rfsh/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, ...)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to a file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Overlay the flags onto settings loaded from the config file.
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(server) = &self.server {
            settings.server = server.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if self.colored_ls {
            settings.colored_ls = true;
        }
        if self.debug {
            settings.debug = true;
        }
    }
}
