//! Program entry logic
//!
//! Parses arguments, loads config, installs logging and then either runs a
//! single module non-interactively or hands control to the shell.

use clap::Parser;
use std::io;

use crate::cli::Args;
use crate::config::Config;
use crate::context::Environment;
use crate::errors::CurlyError;
use crate::interpreter::Interpreter;
use crate::logging;
use crate::output::Printer;
use crate::status::ExitStatus;

pub fn run(args: Vec<String>, mut env: Environment) -> ExitStatus {
    if let Some(name) = args.first() {
        if let Some(basename) = std::path::Path::new(name).file_stem() {
            env.program_name = basename.to_string_lossy().to_string();
        }
    }

    let parsed = match Args::try_parse_from(&args) {
        Ok(parsed) => parsed,
        Err(_) => {
            // Unusable arguments are not an error: show how to call us
            println!("{}", Args::usage(&env.program_name));
            return ExitStatus::Success;
        }
    };

    if parsed.help {
        println!("{}", Args::usage(&env.program_name));
        return ExitStatus::Success;
    }

    if parsed.module.is_none() && !parsed.set.is_empty() {
        eprintln!("A module is required when running non-interactively");
        println!("{}", Args::usage(&env.program_name));
        return ExitStatus::Success;
    }

    if let Some(dir) = &parsed.config_dir {
        env.config_dir = Some(dir.clone());
    }

    let config = match Config::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            env.config_dir.clone().map(Config::with_dir).unwrap_or_default()
        }
    };

    logging::init(&config.log_file(), parsed.log_level.as_deref());
    tracing::info!(config_dir = %config.config_dir.display(), "starting");

    let printer = Printer::spawn();
    let mut interpreter = match Interpreter::new(config, &env, printer.clone()) {
        Ok(interpreter) => interpreter,
        Err(e) => return handle_error(e),
    };

    let result = match &parsed.module {
        Some(module) => Ok(run_module(&mut interpreter, module, &parsed.set)),
        None if env.stdin_isatty => interpreter.start().map(|()| ExitStatus::Success),
        None => interpreter
            .run_batch(io::stdin().lock())
            .map(|()| ExitStatus::Success),
    };
    printer.wait_drained();

    match result {
        Ok(status) => status,
        Err(e) => handle_error(e),
    }
}

/// `use`, every `set`, `run`, in that order
fn run_module(interpreter: &mut Interpreter, module: &str, sets: &[String]) -> ExitStatus {
    interpreter.execute_line(&format!("use {}", module));
    if interpreter.session().active.is_none() {
        interpreter.printer().wait_drained();
        return ExitStatus::Error;
    }
    for assignment in sets {
        interpreter.execute_line(&format!("set {}", assignment));
    }
    interpreter.execute_line("run");
    interpreter.printer().wait_drained();
    ExitStatus::Success
}

fn handle_error(error: CurlyError) -> ExitStatus {
    tracing::error!(error = %error, "fatal");
    eprintln!("Error: {}", error);
    ExitStatus::Error
}
