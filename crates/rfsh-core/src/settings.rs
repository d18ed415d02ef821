//! Session settings.
//!
//! An explicit structure enumerating the recognized options; unrecognized
//! keys are rejected both in the config file (serde) and at runtime
//! (`set`), never silently merged.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{DEFAULT_PORT, DEFAULT_SERVER};
use crate::error::{Error, Result};

/// Recognized session settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Settings {
    /// Server address to connect to.
    pub server: String,
    /// Server port.
    pub port: u16,
    /// Colorize directory listings (directories first, in blue).
    pub colored_ls: bool,
    /// Enable the diagnostic `debug` command.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            port: DEFAULT_PORT,
            colored_ls: false,
            debug: false,
        }
    }
}

impl Settings {
    /// Load settings from the config file, if one exists.
    ///
    /// Lookup order: `explicit` (from the CLI), then `RFSH_CONFIG`, then
    /// `config.toml` under the user config dir (`~/.config/rfsh` on Linux,
    /// honoring `XDG_CONFIG_HOME`). A missing file yields the defaults; an
    /// unreadable or malformed file is a startup failure.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let Some(path) = explicit.map(Path::to_path_buf).or_else(config_file) else {
            return Ok(Self::default());
        };
        if !path.exists() {
            // Only an explicitly named file is required to exist.
            if explicit.is_some() {
                return Err(Error::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            return Ok(Self::default());
        }
        tracing::debug!(path = %path.display(), "loading config file");
        let raw = std::fs::read_to_string(&path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config {
            message: format!("cannot parse {}: {}", path.display(), e),
        })
    }

    /// Update one setting from its string form, as typed at the `cfg`
    /// prompt. Only `colored-ls` and `debug` may change at runtime; the
    /// connection endpoint is fixed for the process lifetime.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "colored-ls" | "colored_ls" => {
                self.colored_ls = parse_bool(value)?;
                Ok(())
            }
            "debug" => {
                self.debug = parse_bool(value)?;
                Ok(())
            }
            "server" | "port" => Err(Error::InvalidSetting(format!(
                "'{key}' cannot be changed while connected"
            ))),
            other => Err(Error::InvalidSetting(format!(
                "unrecognized setting '{other}'"
            ))),
        }
    }

    /// Key/value view for display (`cfg` without arguments, diagnostics).
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("server", self.server.clone()),
            ("port", self.port.to_string()),
            ("colored-ls", self.colored_ls.to_string()),
            ("debug", self.debug.to_string()),
        ]
    }
}

/// Default config file location, if a config dir is known.
pub fn config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("RFSH_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("rfsh").join("config.toml"))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value {
        "true" | "yes" | "on" | "enable" => Ok(true),
        "false" | "no" | "off" | "disable" => Ok(false),
        other => Err(Error::InvalidSetting(format!(
            "expected a boolean, got '{other}'"
        ))),
    }
}
