//! Environment struct (TTY state, prompt overrides, config dir)

use std::path::PathBuf;

use crate::config::CONFIG_DIR_ENV;

/// Environment variable overriding the idle prompt template
pub const RAW_PROMPT_ENV: &str = "CURLY_RAW_PROMPT";

/// Environment variable overriding the module prompt template
pub const MODULE_PROMPT_ENV: &str = "CURLY_MODULE_PROMPT";

/// Execution environment
#[derive(Debug, Clone)]
pub struct Environment {
    pub stdin_isatty: bool,
    pub stdout_isatty: bool,
    pub program_name: String,
    /// Config dir override
    pub config_dir: Option<PathBuf>,
    pub raw_prompt: Option<String>,
    pub module_prompt: Option<String>,
}

impl Environment {
    /// Read the process environment
    pub fn init() -> Self {
        Self::default()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            stdin_isatty: atty::is(atty::Stream::Stdin),
            stdout_isatty: atty::is(atty::Stream::Stdout),
            program_name: "curly".to_string(),
            config_dir: std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from),
            raw_prompt: std::env::var(RAW_PROMPT_ENV).ok(),
            module_prompt: std::env::var(MODULE_PROMPT_ENV).ok(),
        }
    }
}
