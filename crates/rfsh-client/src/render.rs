//! Terminal rendering for command results.
//!
//! Emits raw SGR escapes; listing colorization is opt-in via settings,
//! status and error lines are always styled.

use rfsh_core::client::EntryInfo;
use rfsh_core::error::Error;

use crate::dispatch::CommandOutput;

pub mod color {
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const REVERSE: &str = "\x1b[7m";
    pub const RESET: &str = "\x1b[0m";
}

/// Render a command result to the text that goes to stdout verbatim.
/// Returns `None` when there is nothing to print.
pub fn render(output: &CommandOutput) -> Option<String> {
    match output {
        CommandOutput::None => None,
        CommandOutput::Line(line) => Some(format!("{line}\n")),
        CommandOutput::Success(line) => {
            Some(format!("{}{line}{}\n", color::GREEN, color::RESET))
        }
        CommandOutput::Lines(lines) => {
            let mut out = String::new();
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
            Some(out)
        }
        CommandOutput::Listing(names) => {
            let mut out = String::new();
            for name in names {
                out.push_str(name);
                out.push('\n');
            }
            Some(out)
        }
        CommandOutput::ColorListing { dirs, files } => {
            let mut out = String::new();
            for dir in dirs {
                out.push_str(&format!("{}{dir}/{}\n", color::BLUE, color::RESET));
            }
            for file in files {
                out.push_str(file);
                out.push('\n');
            }
            Some(out)
        }
        CommandOutput::Text(content) => {
            if content.ends_with('\n') || content.is_empty() {
                Some(content.clone())
            } else {
                // Missing trailing newline is marked with a reverse-video
                // percent sign, the way pagers do.
                Some(format!(
                    "{content}{}%{}\n",
                    color::REVERSE,
                    color::RESET
                ))
            }
        }
        CommandOutput::BinaryNotice { path, mime } => Some(format!(
            "{}{path}: binary file ({mime}), not shown.{}\n",
            color::MAGENTA,
            color::RESET
        )),
        CommandOutput::Info(info) => Some(render_info(info)),
        CommandOutput::ClearScreen => Some("\x1b[2J\x1b[1;1H".to_string()),
    }
}

fn render_info(info: &EntryInfo) -> String {
    let mut out = format!("path: {}\ntype: {}\n", info.path, info.kind);
    if let Some(size) = info.size {
        out.push_str(&format!("size: {size}\n"));
    }
    if let Some(mime) = &info.mime {
        out.push_str(&format!("mime: {mime}\n"));
    }
    out
}

/// Render a handler failure for the user. The loop keeps running.
pub fn render_error(error: &Error) -> String {
    format!("{}Error: {error}.{}\n", color::RED, color::RESET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfsh_core::client::EntryKind;

    #[test]
    fn plain_listing_is_one_name_per_line() {
        let out = render(&CommandOutput::Listing(vec![
            "a.txt".to_string(),
            "sub".to_string(),
        ]));
        assert_eq!(out.as_deref(), Some("a.txt\nsub\n"));
    }

    #[test]
    fn color_listing_puts_directories_first() {
        let out = render(&CommandOutput::ColorListing {
            dirs: vec!["sub".to_string()],
            files: vec!["a.txt".to_string()],
        })
        .unwrap();
        let dir_pos = out.find("sub/").unwrap();
        let file_pos = out.find("a.txt").unwrap();
        assert!(dir_pos < file_pos);
        assert!(out.contains(color::BLUE));
    }

    #[test]
    fn terminated_text_is_verbatim() {
        let out = render(&CommandOutput::Text("hello\n".to_string()));
        assert_eq!(out.as_deref(), Some("hello\n"));
    }

    #[test]
    fn unterminated_text_gets_a_percent_mark() {
        let out = render(&CommandOutput::Text("hello".to_string())).unwrap();
        assert!(out.starts_with("hello"));
        assert!(out.contains('%'));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn info_includes_kind_and_size() {
        let out = render(&CommandOutput::Info(EntryInfo {
            path: "/docs/a.txt".to_string(),
            kind: EntryKind::File,
            size: Some(12),
            mime: Some("text/plain".to_string()),
        }))
        .unwrap();
        assert!(out.contains("path: /docs/a.txt"));
        assert!(out.contains("type: file"));
        assert!(out.contains("size: 12"));
        assert!(out.contains("mime: text/plain"));
    }

    #[test]
    fn none_renders_nothing() {
        assert_eq!(render(&CommandOutput::None), None);
    }

    #[test]
    fn errors_are_red_with_a_period() {
        let out = render_error(&Error::MissingArgument("a file to read"));
        assert!(out.contains("Error: you need to provide a file to read."));
        assert!(out.starts_with(color::RED));
    }
}
