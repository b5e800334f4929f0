//! CLI argument definitions using clap

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::CONFIG_DIR_ENV;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "curly", version, about, long_about = None)]
#[command(disable_help_flag = true)] // -h prints the short usage line
pub struct Args {
    /// Print usage
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,

    // =========================================================================
    // NON-INTERACTIVE MODE
    // =========================================================================

    /// Module to run without starting the shell (e.g. request/get)
    #[arg(short = 'm', long = "module", value_name = "MODULE")]
    pub module: Option<String>,

    /// Option assignment applied before running, as "<option> <value>"
    #[arg(short = 's', long = "set", value_name = "OPTION VALUE", action = ArgAction::Append)]
    pub set: Vec<String>,

    // =========================================================================
    // AMBIENT
    // =========================================================================

    /// Log filter written to the log file (overridden by CURLY_LOG)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Directory holding config.toml, history, logs and templates
    #[arg(long = "config-dir", value_name = "DIR", env = CONFIG_DIR_ENV)]
    pub config_dir: Option<PathBuf>,
}

impl Args {
    /// One-line usage shown for -h and for unusable arguments
    pub fn usage(program: &str) -> String {
        format!("{} -m <module> -s \"<option> <value>\"", program)
    }
}
