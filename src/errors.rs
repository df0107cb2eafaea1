// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleaverError {
    #[error("Configuration error: {0}")]
    ConfigLoad(String),

    #[error("Invalid menu item: {0}")]
    InvalidMenuItem(String),

    #[error("Invalid command line {command_line:?}: {source}")]
    InvalidCommandLine {
        command_line: String,
        source: shell_words::ParseError,
    },

    #[error("Invalid command line {command_line:?}: no command given")]
    EmptyCommandLine { command_line: String },

    #[error("Spawning {command_line:?} failed: {source}")]
    SpawnFailed {
        command_line: String,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CleaverError>;
