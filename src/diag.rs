// src/diag.rs

//! Config-driven diagnostics: a leveled log sink plus an optional
//! user-visible notification sink, independently thresholded.
//!
//! The `loglevel` / `notificationlevel` settings from the config decide
//! which item-level messages are emitted. Instead of mutable globals, a
//! `Diagnostics` value is built once per `enable()` from the validated
//! settings and handed by `Arc` to every component that reports on menu
//! items. Messages that pass the log threshold are forwarded to `tracing`
//! at the corresponding level; messages that pass the notification
//! threshold additionally go to the [`Notifier`] sink.
//!
//! Internal plumbing (runtime loop, watcher, executor) logs through
//! `tracing` directly and is governed by the subscriber filter only.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

/// Severity for item-level diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            other => Err(format!(
                "invalid level: {other} (expected debug, info, warning or error)"
            )),
        }
    }
}

/// User-visible notification sink.
///
/// The menu surface proper is out of scope; production uses a plain
/// stderr notifier, tests record what would have been shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, summary: &str, body: &str);
}

/// Default notifier: prints to stderr, one line per notification.
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, summary: &str, body: &str) {
        if body.is_empty() {
            eprintln!("{summary}");
        } else {
            eprintln!("{summary}: {body}");
        }
    }
}

/// Leveled diagnostics built from validated config settings.
pub struct Diagnostics {
    log_threshold: Level,
    /// `None` means notifications are disabled.
    notify_threshold: Option<Level>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("log_threshold", &self.log_threshold)
            .field("notify_threshold", &self.notify_threshold)
            .finish_non_exhaustive()
    }
}

impl Diagnostics {
    pub fn new(
        log_threshold: Level,
        notify_threshold: Option<Level>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            log_threshold,
            notify_threshold,
            notifier,
        }
    }

    /// Diagnostics used before any config has been parsed: the config
    /// defaults (log at warning, notifications off).
    pub fn bootstrap(notifier: Arc<dyn Notifier>) -> Self {
        Self::new(Level::Warning, None, notifier)
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.emit(Level::Debug, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref());
    }

    pub fn warning(&self, message: impl AsRef<str>) {
        self.emit(Level::Warning, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref());
    }

    fn emit(&self, level: Level, message: &str) {
        if self.log_threshold <= level {
            match level {
                Level::Debug => debug!("{message}"),
                Level::Info => info!("{message}"),
                Level::Warning => warn!("{message}"),
                Level::Error => error!("{message}"),
            }
        }
        if let Some(threshold) = self.notify_threshold {
            if threshold <= level {
                self.notifier
                    .notify(&format!("[cleaver {level}]"), message);
            }
        }
    }
}
