//! Typed module options
//!
//! Every configurable field of a module is an [`Opt`]: a named slot with a
//! [`OptionKind`] that validates raw user input before anything is stored.
//! A rejected assignment never touches the current value.

pub mod kind;
pub mod opt;

pub use kind::{OptionKind, OptionValue};
pub use opt::{Opt, OptionSpec};

use thiserror::Error;

/// Bad option input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        ValidationError(msg.into())
    }
}
