//! Command dispatch: alias table and per-command handlers.
//!
//! Each handler resolves its path arguments against the session's current
//! directory, performs its round-trips through the shared-connection guard
//! and returns a `CommandOutput` for rendering. Missing arguments are
//! rejected before any network access.

use std::collections::HashMap;
use std::sync::OnceLock;

use rfsh_core::client::{EntryInfo, FileClient};
use rfsh_core::error::{Error, Result};
use rfsh_core::guard::SharedConnection;
use rfsh_core::path::resolve;

use crate::session::{Prompter, Session};

/// Canonical command identifiers; aliases collapse onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Cat,
    Cd,
    Cfg,
    Clear,
    Copy,
    CopyDir,
    Debug,
    Edit,
    Help,
    Info,
    List,
    Move,
    MoveDir,
    Ping,
    Pwd,
    Remove,
    RemoveDir,
    Save,
    Touch,
    Upload,
}

/// Rendered result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Nothing to print.
    None,
    /// A plain line (pwd, cd target).
    Line(String),
    /// A status line rendered as a success.
    Success(String),
    /// Multiple plain lines (help, cfg, debug dump).
    Lines(Vec<String>),
    /// Directory listing in server order.
    Listing(Vec<String>),
    /// Directory listing split for colored mode: directories first.
    ColorListing {
        dirs: Vec<String>,
        files: Vec<String>,
    },
    /// Text file content, written verbatim.
    Text(String),
    /// A binary file that is reported rather than dumped.
    BinaryNotice { path: String, mime: String },
    /// Stat output.
    Info(EntryInfo),
    /// Clear the terminal.
    ClearScreen,
}

const EXIT_ALIASES: [&str; 4] = ["exit", "quit", "disconnect", ":q"];

/// Whether the word is an exit alias, handled by the session controller
/// instead of a handler.
pub fn is_exit(word: &str) -> bool {
    EXIT_ALIASES.contains(&word)
}

fn alias_table() -> &'static HashMap<&'static str, Command> {
    static TABLE: OnceLock<HashMap<&'static str, Command>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        let entries: [(&[&str], Command); 20] = [
            (&["cat", "read", "print"], Command::Cat),
            (&["cd"], Command::Cd),
            (&["cfg", "config", "set"], Command::Cfg),
            (&["clear", "cls"], Command::Clear),
            (&["cp", "copy"], Command::Copy),
            (&["cpdir", "copydir"], Command::CopyDir),
            (&["debug"], Command::Debug),
            (&["edit", "write"], Command::Edit),
            (&["help", "?"], Command::Help),
            (&["info", "stat"], Command::Info),
            (&["ls", "list", "dir"], Command::List),
            (&["mv", "move", "rename"], Command::Move),
            (&["mvdir", "movedir"], Command::MoveDir),
            (&["ping"], Command::Ping),
            (&["pwd"], Command::Pwd),
            (&["rm", "remove", "del", "delete"], Command::Remove),
            (&["rmdir", "deldir"], Command::RemoveDir),
            (&["save", "download", "dl"], Command::Save),
            (&["touch", "create"], Command::Touch),
            (&["upload"], Command::Upload),
        ];
        for (aliases, command) in entries {
            for alias in aliases {
                table.insert(*alias, command);
            }
        }
        table
    })
}

/// Look up a command word in the alias table.
pub fn lookup(word: &str) -> Option<Command> {
    alias_table().get(word).copied()
}

/// Dispatch one parsed input line to its handler.
pub async fn dispatch<C: FileClient>(
    word: &str,
    args: &[&str],
    session: &mut Session,
    conn: &SharedConnection<C>,
    prompter: &mut dyn Prompter,
) -> Result<CommandOutput> {
    let Some(command) = lookup(word) else {
        return Err(Error::UnknownCommand(word.to_string()));
    };
    tracing::debug!(command = ?command, ?args, "dispatching");

    match command {
        Command::Cat => cat(args, session, conn).await,
        Command::Cd => cd(args, session, conn).await,
        Command::Cfg => cfg(args, session),
        Command::Clear => Ok(CommandOutput::ClearScreen),
        Command::Copy => {
            let (src, dst) = two_paths(args, session)?;
            conn.copy_file(&src, &dst).await?;
            Ok(CommandOutput::Success(format!(
                "'{}' copied to '{}'.",
                args[0], args[1]
            )))
        }
        Command::CopyDir => {
            let (src, dst) = two_paths(args, session)?;
            conn.copy_dir(&src, &dst).await?;
            Ok(CommandOutput::Success(format!(
                "'{}' copied to '{}'.",
                args[0], args[1]
            )))
        }
        Command::Debug => debug_dump(session, conn),
        Command::Edit => edit(args, session, conn, prompter).await,
        Command::Help => Ok(CommandOutput::Lines(help_lines())),
        Command::Info => {
            let target = optional_path(args, session);
            let info = conn.info(&target).await?;
            Ok(CommandOutput::Info(info))
        }
        Command::List => list(args, session, conn).await,
        Command::Move => {
            let (src, dst) = two_paths(args, session)?;
            conn.move_file(&src, &dst).await?;
            Ok(CommandOutput::Success(format!(
                "'{}' moved to '{}'.",
                args[0], args[1]
            )))
        }
        Command::MoveDir => {
            let (src, dst) = two_paths(args, session)?;
            conn.move_dir(&src, &dst).await?;
            Ok(CommandOutput::Success(format!(
                "'{}' moved to '{}'.",
                args[0], args[1]
            )))
        }
        Command::Ping => {
            conn.ping().await?;
            Ok(CommandOutput::Success("sent ping".to_string()))
        }
        Command::Pwd => Ok(CommandOutput::Line(session.cwd.clone())),
        Command::Remove => {
            let target = required_path(args, session, "a file to delete")?;
            conn.delete_file(&target).await?;
            Ok(CommandOutput::Success(format!("Deleted '{target}'.")))
        }
        Command::RemoveDir => {
            let target = required_path(args, session, "a directory to delete")?;
            conn.delete_dir(&target).await?;
            Ok(CommandOutput::Success(format!("Deleted '{target}'.")))
        }
        Command::Save => save(args, session, conn, prompter).await,
        Command::Touch => {
            let target = required_path(args, session, "a file to create")?;
            conn.create_file(&target).await?;
            Ok(CommandOutput::Success(format!("Created '{target}'.")))
        }
        Command::Upload => upload(args, session, conn).await,
    }
}

/// First argument resolved against the current directory, required.
fn required_path(args: &[&str], session: &Session, what: &'static str) -> Result<String> {
    match args.first() {
        Some(arg) => Ok(resolve(arg, &session.cwd)),
        None => Err(Error::MissingArgument(what)),
    }
}

/// First argument resolved against the current directory, defaulting to it.
fn optional_path(args: &[&str], session: &Session) -> String {
    match args.first() {
        Some(arg) => resolve(arg, &session.cwd),
        None => session.cwd.clone(),
    }
}

/// Two resolved path arguments, both required.
fn two_paths(args: &[&str], session: &Session) -> Result<(String, String)> {
    match args {
        [src, dst, ..] => Ok((resolve(src, &session.cwd), resolve(dst, &session.cwd))),
        _ => Err(Error::MissingArgument("a source and a destination")),
    }
}

async fn cat<C: FileClient>(
    args: &[&str],
    session: &Session,
    conn: &SharedConnection<C>,
) -> Result<CommandOutput> {
    let target = required_path(args, session, "a file to read")?;
    let content = conn.read_file(&target).await?;
    if !content.is_text() {
        return Ok(CommandOutput::BinaryNotice {
            path: target,
            mime: content.mime,
        });
    }
    Ok(CommandOutput::Text(
        String::from_utf8_lossy(&content.data).into_owned(),
    ))
}

async fn cd<C: FileClient>(
    args: &[&str],
    session: &mut Session,
    conn: &SharedConnection<C>,
) -> Result<CommandOutput> {
    let target = match args.first() {
        Some(arg) => resolve(arg, &session.cwd),
        None => "/".to_string(),
    };
    if target == session.cwd {
        return Ok(CommandOutput::Line(session.cwd.clone()));
    }
    let info = conn.info(&target).await?;
    if !info.is_directory() {
        return Err(Error::NotADirectory { path: target });
    }
    // Only a confirmed directory updates the current directory.
    session.cwd = target.clone();
    Ok(CommandOutput::Line(target))
}

fn cfg(args: &[&str], session: &mut Session) -> Result<CommandOutput> {
    match args {
        [] => Ok(CommandOutput::Lines(
            session
                .settings
                .entries()
                .into_iter()
                .map(|(key, value)| format!("{key} = {value}"))
                .collect(),
        )),
        [key, value, ..] => {
            session.settings.set(key, value)?;
            Ok(CommandOutput::Success(format!("{key} = {value}")))
        }
        _ => Err(Error::MissingArgument("a key and a value")),
    }
}

fn debug_dump<C: FileClient>(
    session: &Session,
    conn: &SharedConnection<C>,
) -> Result<CommandOutput> {
    if !session.settings.debug {
        return Err(Error::InvalidSetting(
            "'debug' is only available in debug mode (-d)".to_string(),
        ));
    }
    let mut lines = vec![format!("cwd = {}", session.cwd)];
    for (key, value) in session.settings.entries() {
        lines.push(format!("{key} = {value}"));
    }
    lines.push(format!(
        "keepalive time-left = {}s",
        conn.timer().time_left().as_secs()
    ));
    Ok(CommandOutput::Lines(lines))
}

async fn edit<C: FileClient>(
    args: &[&str],
    session: &Session,
    conn: &SharedConnection<C>,
    prompter: &mut dyn Prompter,
) -> Result<CommandOutput> {
    let target = required_path(args, session, "a file to edit")?;
    let mut lines = Vec::new();
    // All input is collected before the single write round-trip; the
    // connection lock is never held while prompting.
    prompter.notice("Enter the file content. Type '*EOF' when done, '*EXIT' to abort.");
    loop {
        match prompter.read_line("| ")? {
            None => return Ok(CommandOutput::Line("writing to file aborted".to_string())),
            Some(line) if line == "*EXIT" => {
                return Ok(CommandOutput::Line("writing to file aborted".to_string()))
            }
            Some(line) if line == "*EOF" => break,
            Some(line) => lines.push(line),
        }
    }
    let data = lines.join("\n");
    conn.write_file(&target, data.as_bytes()).await?;
    Ok(CommandOutput::Success(format!("'{target}' updated.")))
}

async fn list<C: FileClient>(
    args: &[&str],
    session: &Session,
    conn: &SharedConnection<C>,
) -> Result<CommandOutput> {
    let target = optional_path(args, session);
    let names = conn.read_dir(&target).await?;
    if !session.settings.colored_ls {
        return Ok(CommandOutput::Listing(names));
    }
    // Colored mode stats each entry to sort directories first. One
    // round-trip per entry, each under its own lock acquisition.
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for name in names {
        let full = join_entry(&target, &name);
        match conn.info(&full).await {
            Ok(info) if info.is_directory() => dirs.push(name),
            Ok(_) => files.push(name),
            Err(e) => {
                tracing::debug!(entry = %full, error = %e, "stat failed, listing as a file");
                files.push(name);
            }
        }
    }
    Ok(CommandOutput::ColorListing { dirs, files })
}

async fn save<C: FileClient>(
    args: &[&str],
    session: &Session,
    conn: &SharedConnection<C>,
    prompter: &mut dyn Prompter,
) -> Result<CommandOutput> {
    let [remote, local, ..] = args else {
        return Err(Error::MissingArgument(
            "a remote source and a local destination",
        ));
    };
    let remote = resolve(remote, &session.cwd);
    let content = conn.read_file(&remote).await?;
    if std::path::Path::new(local).exists()
        && !prompter.confirm(&format!("Warning: '{local}' already exists. Overwrite"))?
    {
        return Ok(CommandOutput::None);
    }
    std::fs::write(local, &content.data)?;
    Ok(CommandOutput::Success(format!(
        "Saved '{remote}' to '{local}'."
    )))
}

async fn upload<C: FileClient>(
    args: &[&str],
    session: &Session,
    conn: &SharedConnection<C>,
) -> Result<CommandOutput> {
    let [local, remote, ..] = args else {
        return Err(Error::MissingArgument(
            "a local source and a remote destination",
        ));
    };
    let remote = resolve(remote, &session.cwd);
    let data = std::fs::read(local)?;
    conn.write_file(&remote, &data).await?;
    Ok(CommandOutput::Success(format!(
        "Uploaded '{local}' to '{remote}'."
    )))
}

fn join_entry(dir: &str, name: &str) -> String {
    if dir == "/" {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

fn help_lines() -> Vec<String> {
    [
        "cat FILE              print a text file (aliases: read, print)",
        "cd [DIR]              change the remote working directory",
        "cfg [KEY VALUE]       show or change settings (aliases: config, set)",
        "clear                 clear the screen (alias: cls)",
        "cp SRC DST            copy a file (alias: copy)",
        "cpdir SRC DST         copy a directory (alias: copydir)",
        "edit FILE             write a file line by line (alias: write)",
        "info [PATH]           show entry metadata (alias: stat)",
        "ls [DIR]              list a directory (aliases: list, dir)",
        "mv SRC DST            move a file (aliases: move, rename)",
        "mvdir SRC DST         move a directory (alias: movedir)",
        "ping                  probe the connection",
        "pwd                   print the remote working directory",
        "rm FILE               delete a file (aliases: remove, del, delete)",
        "rmdir DIR             delete a directory (alias: deldir)",
        "save REMOTE LOCAL     download a file (aliases: download, dl)",
        "touch FILE            create an empty file (alias: create)",
        "upload LOCAL REMOTE   upload a file",
        "exit                  disconnect and quit (aliases: quit, :q)",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_collapse_to_one_command() {
        assert_eq!(lookup("cat"), Some(Command::Cat));
        assert_eq!(lookup("read"), Some(Command::Cat));
        assert_eq!(lookup("print"), Some(Command::Cat));
        assert_eq!(lookup("ls"), Some(Command::List));
        assert_eq!(lookup("dir"), Some(Command::List));
        assert_eq!(lookup("rename"), Some(Command::Move));
    }

    #[test]
    fn unknown_words_miss_the_table() {
        assert_eq!(lookup("frobnicate"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn exit_aliases_are_not_commands() {
        for word in ["exit", "quit", "disconnect", ":q"] {
            assert!(is_exit(word));
            assert_eq!(lookup(word), None);
        }
        assert!(!is_exit("ls"));
    }
}
