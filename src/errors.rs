//! Error types for Curly

use thiserror::Error;

pub use crate::options::ValidationError;

/// Message shown whenever a command needs an active module and none is set
pub const NO_MODULE_SELECTED: &str = "You have to activate a module with the 'use' command.";

/// Main error type for Curly
///
/// Every variant except the I/O-level ones is recoverable: the interpreter
/// renders it as an error line and keeps reading commands.
#[derive(Error, Debug)]
pub enum CurlyError {
    /// Bad option input; the option is left unchanged
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Unknown command, module path or option name
    #[error("{0}")]
    Resolution(String),

    /// The command requires an active module
    #[error("{}", NO_MODULE_SELECTED)]
    NoModuleSelected,

    /// The module's own action failed
    #[error("{0}")]
    Action(String),

    /// Wrong or missing command arguments
    #[error("{0}")]
    Argument(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl CurlyError {
    /// Render an action failure with its full cause chain
    pub fn action(err: &anyhow::Error) -> Self {
        CurlyError::Action(format!("{:?}", err))
    }
}

pub type Result<T> = std::result::Result<T, CurlyError>;
