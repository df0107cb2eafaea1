// src/proc/mod.rs

//! Process supervision layer.
//!
//! Each runnable menu item owns its own [`ProcessTable`], while the actual
//! spawning of child processes goes through the [`Spawner`] trait so tests
//! can substitute a fake that never touches the OS.
//!
//! - [`table`] holds the per-item bookkeeping for running children.
//! - [`spawner`] provides the `Spawner` trait and the production
//!   `TokioSpawner` built on `tokio::process::Command`.

pub mod spawner;
pub mod table;

pub use spawner::{Spawner, TokioSpawner};
pub use table::{ProcessTable, RunningProcess};

use crate::errors::{CleaverError, Result};

/// Identifier for a spawned child process.
///
/// Unique while the process is alive; the OS reuses identifiers afterwards,
/// which is fine because a pid is only ever looked up in the table of the
/// single item that spawned it, and is removed exactly once on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub u32);

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Normal exit with the given status code.
    Exited(i32),
    /// Terminated by the given signal.
    Signaled(i32),
}

impl ExitKind {
    pub fn from_status(status: std::process::ExitStatus) -> Self {
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitKind::Signaled(signal);
            }
        }
        ExitKind::Exited(status.code().unwrap_or(-1))
    }
}

/// Tokenize a command line with shell-style rules (quoting, escaping)
/// into an argument vector. The command is later executed directly, not
/// through a shell.
pub fn split_command_line(command_line: &str) -> Result<Vec<String>> {
    let argv = shell_words::split(command_line).map_err(|source| {
        CleaverError::InvalidCommandLine {
            command_line: command_line.to_string(),
            source,
        }
    })?;
    if argv.is_empty() {
        return Err(CleaverError::EmptyCommandLine {
            command_line: command_line.to_string(),
        });
    }
    Ok(argv)
}
