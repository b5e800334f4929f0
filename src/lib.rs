//! Curly library interface
//!
//! An interactive console for composing, saving and replaying
//! parameterized HTTP requests.
//!
//! # Module Organization
//!
//! - [`options`] - Typed, validated option values (Opt, OptionSpec)
//! - [`modules`] - Module schemas, the module registry and request modules
//! - [`interpreter`] - Command loop, command table and tab completion
//! - [`templates`] - JSON template store
//! - [`output`] - Background printer, tables and colors
//! - [`errors`] - Error types (CurlyError, Result)
//! - [`core`] - Main execution logic

pub mod cli;
pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod interpreter;
pub mod logging;
pub mod modules;
pub mod options;
pub mod output;
pub mod status;
pub mod templates;
