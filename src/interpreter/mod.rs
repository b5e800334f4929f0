//! The interactive command loop
//!
//! [`Interpreter`] owns the session, the printer handle and the tokio
//! runtime module actions are driven on. Every line goes through
//! [`Interpreter::execute_line`]; errors are caught there and rendered as a
//! single error line, so the loop itself never fails on a bad command.

pub mod commands;
pub mod completion;
pub mod parser;
pub mod session;
mod show;

pub use completion::{complete, CompletionState, ShellHelper};
pub use parser::{parse_line, ParsedLine};
pub use session::{GlobalOptions, Session};

use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use std::io::BufRead;
use std::sync::{Arc, RwLock};
use tokio::sync::Notify;

use crate::config::Config;
use crate::context::Environment;
use crate::errors::Result;
use crate::modules::{ActiveModule, ModuleRegistry};
use crate::output::terminal::{colorize, colors, RESET, UNDERLINE};
use crate::output::Printer;
use crate::templates::TemplateStore;

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Prompt templates with their `{host}` / `{module}` placeholders
#[derive(Debug, Clone)]
pub struct Prompts {
    host: String,
    raw: String,
    module: String,
}

impl Prompts {
    pub fn new(host: &str, env: &Environment) -> Self {
        let raw_default = format!("{}{{host}}{} > ", UNDERLINE, RESET);
        let module_default = format!(
            "{}{{host}}{} ({}) > ",
            UNDERLINE,
            RESET,
            colorize("{module}", colors::RED)
        );
        Self {
            host: host.to_string(),
            raw: Self::pick(env.raw_prompt.as_deref(), &["{host}"], raw_default),
            module: Self::pick(
                env.module_prompt.as_deref(),
                &["{host}", "{module}"],
                module_default,
            ),
        }
    }

    /// Use the override only when it carries every placeholder
    fn pick(candidate: Option<&str>, required: &[&str], default: String) -> String {
        match candidate {
            Some(template) if required.iter().all(|p| template.contains(p)) => {
                template.replace("\\033", "\x1b").replace("\\x1b", "\x1b")
            }
            Some(template) => {
                tracing::warn!(template, "prompt override lacks placeholders, ignoring");
                default
            }
            None => default,
        }
    }

    pub fn render(&self, active: Option<&ActiveModule>) -> String {
        match active {
            Some(module) => self
                .module
                .replace("{host}", &self.host)
                .replace("{module}", module.label()),
            None => self.raw.replace("{host}", &self.host),
        }
    }
}

pub struct Interpreter {
    session: Session,
    printer: Printer,
    runtime: tokio::runtime::Runtime,
    /// Cancels the running action, next to Ctrl-C
    interrupt: Arc<Notify>,
    prompts: Prompts,
    config: Config,
}

impl Interpreter {
    pub fn new(config: Config, env: &Environment, printer: Printer) -> Result<Self> {
        Self::with_registry(config, env, printer, ModuleRegistry::builtin())
    }

    pub fn with_registry(
        config: Config,
        env: &Environment,
        printer: Printer,
        registry: ModuleRegistry,
    ) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let templates = TemplateStore::new(config.templates_dir.clone());
        let session = Session::new(Arc::new(registry), templates);
        let prompts = Prompts::new(&config.prompt_host, env);
        Ok(Self {
            session,
            printer,
            runtime,
            interrupt: Arc::new(Notify::new()),
            prompts,
            config,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn printer(&self) -> &Printer {
        &self.printer
    }

    /// Handle that cancels the action started by `run`
    ///
    /// A notification sent while nothing runs cancels the next `run`.
    pub fn interrupt_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.interrupt)
    }

    pub fn prompt(&self) -> String {
        self.prompts.render(self.session.active.as_ref())
    }

    pub fn banner(&self) -> String {
        let art = r"
  ____           _
 / ___|   _ _ __| |_   _
| |  | | | | '__| | | | |
| |__| |_| | |  | | |_| |
 \____\__,_|_|  |_|\__, |
                   |___/
";
        format!(
            "{}\n  {} {}\n\n  Modules: {}  Saved templates: {}\n",
            art,
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            self.session.registry.len(),
            self.session.template_index.len()
        )
    }

    /// Parse and run one line; errors become one rendered error line
    pub fn execute_line(&mut self, line: &str) -> Flow {
        let parsed = parse_line(line);
        if parsed.command.is_empty() {
            return Flow::Continue;
        }
        self.session.history.push(line.trim().to_string());

        match commands::dispatch(self, &parsed) {
            Ok(flow) => flow,
            Err(err) => {
                tracing::debug!(command = %parsed.command, error = %err, "command failed");
                self.printer.error(&err);
                Flow::Continue
            }
        }
    }

    /// Run the interactive shell until `exit`, Ctrl-D or end of input
    pub fn start(&mut self) -> Result<()> {
        self.printer.info(self.banner());

        let completion = Arc::new(RwLock::new(CompletionState::from_session(&self.session)));
        let editor_config = rustyline::Config::builder()
            .max_history_size(self.config.history_length)?
            .completion_type(CompletionType::List)
            .build();
        let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::with_config(editor_config)?;
        editor.set_helper(Some(ShellHelper::new(Arc::clone(&completion))));

        let history_file = self.config.history_file();
        if let Err(e) = editor.load_history(&history_file) {
            tracing::debug!(path = %history_file.display(), error = %e, "no history loaded");
        }

        let outcome = loop {
            self.printer.wait_drained();
            ShellHelper::refresh(&completion, &self.session);

            match editor.readline(&self.prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    if self.execute_line(&line) == Flow::Exit {
                        break Ok(());
                    }
                }
                // Ctrl-C at the prompt drops the current line
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break Ok(()),
                Err(e) => break Err(e.into()),
            }
        };

        self.save_history(&mut editor);
        self.stop();
        outcome
    }

    /// Execute lines from a non-interactive source
    pub fn run_batch<R: BufRead>(&mut self, input: R) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            let flow = self.execute_line(&line);
            self.printer.wait_drained();
            if flow == Flow::Exit {
                break;
            }
        }
        self.stop();
        Ok(())
    }

    fn save_history(&self, editor: &mut Editor<ShellHelper, DefaultHistory>) {
        let history_file = self.config.history_file();
        if let Some(parent) = history_file.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = editor.save_history(&history_file) {
            tracing::warn!(path = %history_file.display(), error = %e, "failed to save history");
        }
    }

    fn stop(&self) {
        self.printer.blank();
        self.printer.error("Curly stopped");
        self.printer.wait_drained();
    }
}
