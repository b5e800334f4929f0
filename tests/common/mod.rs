//! Common test utilities for curly integration tests
//!
//! This module provides shared test infrastructure including:
//! - CLI invocation helpers running the built binary
//! - In-process interpreters with captured output
//! - Output assertion helpers

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

use curly::config::Config;
use curly::context::Environment;
use curly::interpreter::Interpreter;
use curly::modules::ModuleRegistry;
use curly::output::{Capture, Printer};

/// Exit status codes matching the Rust application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
}

impl From<i32> for ExitStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => ExitStatus::Success,
            _ => ExitStatus::Error,
        }
    }
}

/// Result of running the curly binary
#[derive(Debug)]
pub struct CliResponse {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: ExitStatus,
    pub exit_code: i32,
}

impl CliResponse {
    /// Check if stdout (colors stripped) contains a substring
    pub fn contains(&self, needle: &str) -> bool {
        strip_colors(&self.stdout).contains(needle)
    }

    /// Count occurrences of a substring in stdout
    pub fn count(&self, needle: &str) -> usize {
        strip_colors(&self.stdout).matches(needle).count()
    }
}

impl std::fmt::Display for CliResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.stdout)
    }
}

/// Mock environment for testing
pub struct MockEnvironment {
    /// Temporary config directory
    pub config_dir: TempDir,
    /// Environment variables to set
    pub env_vars: HashMap<String, String>,
    /// Standard input content
    pub stdin: Option<Vec<u8>>,
}

impl Default for MockEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEnvironment {
    pub fn new() -> Self {
        let config_dir = TempDir::new().expect("Failed to create temp config dir");
        Self {
            config_dir,
            env_vars: HashMap::new(),
            stdin: None,
        }
    }

    pub fn set_env(&mut self, key: &str, value: &str) -> &mut Self {
        self.env_vars.insert(key.to_string(), value.to_string());
        self
    }

    /// Lines fed to the shell in batch mode
    pub fn set_stdin(&mut self, content: &str) -> &mut Self {
        self.stdin = Some(content.as_bytes().to_vec());
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.path().to_path_buf()
    }

    /// Config rooted in this environment's temp dir
    pub fn config(&self) -> Config {
        Config::with_dir(self.config_path())
    }
}

/// Run curly with the given arguments
pub fn curly(args: &[&str]) -> CliResponse {
    curly_with_env(args, &MockEnvironment::new())
}

/// Run curly with the given arguments and environment
pub fn curly_with_env(args: &[&str], env: &MockEnvironment) -> CliResponse {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_curly"));
    cmd.args(args);

    cmd.env("CURLY_CONFIG_DIR", env.config_path());
    cmd.env_remove("CURLY_LOG");
    for (key, value) in &env.env_vars {
        cmd.env(key, value);
    }

    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    if let Some(ref stdin_data) = env.stdin {
        cmd.stdin(Stdio::piped());
        let mut child = cmd.spawn().expect("Failed to spawn command");
        {
            let stdin = child.stdin.as_mut().expect("Failed to open stdin");
            stdin.write_all(stdin_data).expect("Failed to write to stdin");
        }
        let output = child.wait_with_output().expect("Failed to wait for command");
        parse_output(output)
    } else {
        cmd.stdin(Stdio::null());
        let output = cmd.output().expect("Failed to execute command");
        parse_output(output)
    }
}

fn parse_output(output: Output) -> CliResponse {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(1);

    CliResponse {
        stdout,
        stderr,
        exit_status: ExitStatus::from(exit_code),
        exit_code,
    }
}

/// Environment as the interpreter sees it, without reading the process env
pub fn quiet_environment() -> Environment {
    Environment {
        stdin_isatty: false,
        stdout_isatty: false,
        program_name: "curly".to_string(),
        config_dir: None,
        raw_prompt: None,
        module_prompt: None,
    }
}

/// In-process interpreter writing to memory
pub struct Shell {
    pub interpreter: Interpreter,
    pub capture: Capture,
    pub env: MockEnvironment,
}

impl Shell {
    pub fn new() -> Self {
        Self::with_registry(ModuleRegistry::builtin())
    }

    pub fn with_registry(registry: ModuleRegistry) -> Self {
        let env = MockEnvironment::new();
        let (printer, capture) = Printer::capture();
        let interpreter =
            Interpreter::with_registry(env.config(), &quiet_environment(), printer, registry)
                .expect("Failed to build interpreter");
        Self {
            interpreter,
            capture,
            env,
        }
    }

    /// Execute lines and wait for their output
    pub fn run(&mut self, lines: &[&str]) -> &mut Self {
        for line in lines {
            self.interpreter.execute_line(line);
        }
        self.interpreter.printer().wait_drained();
        self
    }

    /// Output since the last clear, colors stripped
    pub fn output(&self) -> String {
        strip_colors(&self.capture.text())
    }

    pub fn clear(&self) {
        self.capture.clear();
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip ANSI color codes from a string
pub fn strip_colors(s: &str) -> String {
    let re = regex::Regex::new(r"\x1b\[[\d;]*m").unwrap();
    re.replace_all(s, "").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_colors() {
        let colored = "\x1b[1;38;5;71m[+]\x1b[0m ok";
        assert_eq!(strip_colors(colored), "[+] ok");
    }

    #[test]
    fn test_exit_status_from_i32() {
        assert_eq!(ExitStatus::from(0), ExitStatus::Success);
        assert_eq!(ExitStatus::from(1), ExitStatus::Error);
    }
}
