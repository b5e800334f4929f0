//! Config file handling

use std::path::{Path, PathBuf};

use crate::context::Environment;
use crate::errors::CurlyError;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "CURLY_CONFIG_DIR";

/// Default number of history entries kept on disk
pub const DEFAULT_HISTORY_LENGTH: usize = 100;

/// Curly configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub config_dir: PathBuf,
    /// Where saved templates live
    pub templates_dir: PathBuf,
    pub history_length: usize,
    /// Host label shown in the prompt
    pub prompt_host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_dir(Self::default_config_dir())
    }
}

impl Config {
    /// Defaults rooted at `config_dir`
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self {
            templates_dir: config_dir.join("templates"),
            config_dir,
            history_length: DEFAULT_HISTORY_LENGTH,
            prompt_host: "curly".to_string(),
        }
    }

    /// Load configuration from the config file (TOML format)
    ///
    /// A missing file yields the defaults.
    pub fn load(env: &Environment) -> Result<Self, CurlyError> {
        let config_dir = env
            .config_dir
            .clone()
            .unwrap_or_else(Self::default_config_dir);
        Self::load_from(&config_dir)
    }

    pub fn load_from(config_dir: &Path) -> Result<Self, CurlyError> {
        let mut config = Self::with_dir(config_dir.to_path_buf());
        let config_file = config_dir.join("config.toml");

        if !config_file.exists() {
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_file)
            .map_err(|e| CurlyError::Config(format!("Failed to read config: {}", e)))?;

        let toml_value: toml::Value = toml::from_str(&content)
            .map_err(|e| CurlyError::Config(format!("Invalid config TOML: {}", e)))?;

        if let Some(length) = toml_value.get("history_length").and_then(|v| v.as_integer()) {
            config.history_length = usize::try_from(length)
                .map_err(|_| CurlyError::Config(format!("Invalid history_length: {}", length)))?;
        }

        if let Some(dir) = toml_value.get("templates_dir").and_then(|v| v.as_str()) {
            let dir = PathBuf::from(dir);
            // Relative paths are resolved against the config dir
            config.templates_dir = if dir.is_absolute() {
                dir
            } else {
                config_dir.join(dir)
            };
        }

        if let Some(host) = toml_value.get("prompt_host").and_then(|v| v.as_str()) {
            config.prompt_host = host.to_string();
        }

        Ok(config)
    }

    /// Get the default config directory
    fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("curly"))
            .unwrap_or_else(|| PathBuf::from(".curly"))
    }

    /// Readline history file
    pub fn history_file(&self) -> PathBuf {
        self.config_dir.join("history")
    }

    /// Log file written by the tracing subscriber
    pub fn log_file(&self) -> PathBuf {
        self.config_dir.join("curly.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config, Config::with_dir(dir.path().to_path_buf()));
        assert_eq!(config.templates_dir, dir.path().join("templates"));
        assert_eq!(config.history_length, DEFAULT_HISTORY_LENGTH);
    }

    #[test]
    fn test_values_from_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "history_length = 5\ntemplates_dir = \"saved\"\nprompt_host = \"lab\"\n",
        )
        .unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.history_length, 5);
        assert_eq!(config.templates_dir, dir.path().join("saved"));
        assert_eq!(config.prompt_host, "lab");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "history_length = [").unwrap();
        assert!(matches!(Config::load_from(dir.path()), Err(CurlyError::Config(_))));
    }

    #[test]
    fn test_negative_history_length_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "history_length = -1").unwrap();
        assert!(Config::load_from(dir.path()).is_err());
    }
}
