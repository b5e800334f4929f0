//! Command table and handlers
//!
//! Every command is one [`CommandSpec`] in [`COMMANDS`]: its handler, its
//! completer and the state it needs. The module requirement is checked once
//! in [`dispatch`], before any handler runs.

use std::sync::Arc;

use super::completion::{self, CompletionState};
use super::parser::ParsedLine;
use super::show;
use super::{Flow, Interpreter};
use crate::errors::{CurlyError, Result};
use crate::modules::{HookContext, RunContext};

pub type Handler = fn(&mut Interpreter, &ParsedLine) -> Result<Flow>;
pub type Completer = fn(&CompletionState, &str) -> Vec<String>;

/// When a command is available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Idle or module-active
    Global,
    /// Needs an active module
    Module,
    /// Needs an active module, suggested only while globals are set
    Globals,
}

pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub scope: Scope,
    /// Suggested with a trailing space
    pub takes_args: bool,
    pub execute: Handler,
    pub complete: Option<Completer>,
    /// Stop completing once the line holds this many spaces
    pub stop_after: Option<usize>,
}

impl CommandSpec {
    pub fn requires_module(&self) -> bool {
        self.scope != Scope::Global
    }

    /// Name as offered by command completion
    pub fn suggestion(&self) -> String {
        if self.takes_args {
            format!("{} ", self.name)
        } else {
            self.name.to_string()
        }
    }
}

pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "use",
        usage: "use <module>",
        help: "Select a module",
        scope: Scope::Global,
        takes_args: true,
        execute: cmd_use,
        complete: Some(completion::complete_use),
        stop_after: Some(2),
    },
    CommandSpec {
        name: "show",
        usage: "show <info|options|advanced|all|modules|templates|globals>",
        help: "Print information, options, modules or templates",
        scope: Scope::Global,
        takes_args: true,
        execute: show::cmd_show,
        complete: Some(completion::complete_show),
        stop_after: Some(2),
    },
    CommandSpec {
        name: "search",
        usage: "search <terms> [type=<family>]",
        help: "Search modules by keyword",
        scope: Scope::Global,
        takes_args: true,
        execute: cmd_search,
        complete: Some(completion::complete_search),
        stop_after: None,
    },
    CommandSpec {
        name: "history",
        usage: "history",
        help: "Print the commands entered this session",
        scope: Scope::Global,
        takes_args: false,
        execute: cmd_history,
        complete: None,
        stop_after: None,
    },
    CommandSpec {
        name: "help",
        usage: "help",
        help: "Print this help menu",
        scope: Scope::Global,
        takes_args: false,
        execute: cmd_help,
        complete: None,
        stop_after: None,
    },
    CommandSpec {
        name: "exit",
        usage: "exit",
        help: "Exit Curly",
        scope: Scope::Global,
        takes_args: false,
        execute: cmd_exit,
        complete: None,
        stop_after: None,
    },
    CommandSpec {
        name: "run",
        usage: "run",
        help: "Run the selected module with its current options",
        scope: Scope::Module,
        takes_args: false,
        execute: cmd_run,
        complete: None,
        stop_after: None,
    },
    CommandSpec {
        name: "execute",
        usage: "execute",
        help: "Same as run",
        scope: Scope::Module,
        takes_args: false,
        execute: cmd_run,
        complete: None,
        stop_after: None,
    },
    CommandSpec {
        name: "back",
        usage: "back",
        help: "De-select the current module",
        scope: Scope::Module,
        takes_args: false,
        execute: cmd_back,
        complete: None,
        stop_after: None,
    },
    CommandSpec {
        name: "set",
        usage: "set <option name> <option value>",
        help: "Set an option for the selected module",
        scope: Scope::Module,
        takes_args: true,
        execute: cmd_set,
        complete: Some(completion::complete_option),
        stop_after: Some(2),
    },
    CommandSpec {
        name: "setg",
        usage: "setg <option name> <option value>",
        help: "Set an option for every module activated from now on",
        scope: Scope::Module,
        takes_args: true,
        execute: cmd_setg,
        complete: Some(completion::complete_option),
        stop_after: Some(2),
    },
    CommandSpec {
        name: "unsetg",
        usage: "unsetg <option name>",
        help: "Unset an option that was set globally",
        scope: Scope::Globals,
        takes_args: true,
        execute: cmd_unsetg,
        complete: Some(completion::complete_global),
        stop_after: Some(2),
    },
    CommandSpec {
        name: "add",
        usage: "add <option name> <key> <value>",
        help: "Add an entry to a list option (value=<v> also accepted)",
        scope: Scope::Module,
        takes_args: true,
        execute: cmd_add,
        complete: Some(completion::complete_list_option),
        stop_after: Some(2),
    },
    CommandSpec {
        name: "delete",
        usage: "delete <option name> <key>",
        help: "Remove an entry from a list option",
        scope: Scope::Module,
        takes_args: true,
        execute: cmd_delete,
        complete: Some(completion::complete_list_option),
        stop_after: Some(2),
    },
    CommandSpec {
        name: "save",
        usage: "save <name>",
        help: "Save the current options as a template",
        scope: Scope::Module,
        takes_args: true,
        execute: cmd_save,
        complete: None,
        stop_after: None,
    },
    CommandSpec {
        name: "load",
        usage: "load <name>",
        help: "Load a saved template into the selected module",
        scope: Scope::Module,
        takes_args: true,
        execute: cmd_load,
        complete: Some(completion::complete_template),
        stop_after: Some(2),
    },
];

pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

pub fn dispatch(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let spec = find(&line.command)
        .ok_or_else(|| CurlyError::Resolution(format!("Unknown command: {}", line.command)))?;
    if spec.requires_module() && interp.session.active.is_none() {
        return Err(CurlyError::NoModuleSelected);
    }
    tracing::debug!(command = spec.name, args = %line.args, "dispatching");
    (spec.execute)(interp, line)
}

/// `<name> <value>` with the value kept verbatim
fn split_name_value(raw: &str) -> (&str, &str) {
    match raw.split_once(char::is_whitespace) {
        Some((name, value)) => (name, value.trim()),
        None => (raw, ""),
    }
}

fn cmd_use(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let path = line
        .first_arg()
        .ok_or_else(|| CurlyError::Argument("Usage: use <module>".to_string()))?;
    let rejected = interp.session.activate(path)?;
    for (name, err) in rejected {
        interp
            .printer
            .error(format!("Global option {} not applied: {}", name, err));
    }
    Ok(Flow::Continue)
}

fn cmd_back(interp: &mut Interpreter, _line: &ParsedLine) -> Result<Flow> {
    interp.session.deactivate();
    Ok(Flow::Continue)
}

/// Shared by `set` and `setg`; returns the assigned name and value
fn assign(interp: &mut Interpreter, line: &ParsedLine) -> Result<(String, String)> {
    let (name, value) = split_name_value(&line.raw_args);
    if name.is_empty() {
        return Err(CurlyError::Argument(
            "Usage: set <option name> <option value>".to_string(),
        ));
    }
    let active = interp.session.require_module()?;
    active.options.set(name, value)?;
    tracing::info!(module = active.path(), option = name, "option set");
    interp.printer.success(format!("{} => {}", name, value));
    Ok((name.to_string(), value.to_string()))
}

fn cmd_set(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    assign(interp, line)?;
    Ok(Flow::Continue)
}

fn cmd_setg(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let (name, value) = assign(interp, line)?;
    interp.session.globals.set(&name, &value);
    tracing::info!(option = %name, "global option set");
    Ok(Flow::Continue)
}

fn cmd_unsetg(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let name = line.first_arg().unwrap_or("");
    let value = interp.session.globals.unset(name)?;
    tracing::info!(option = name, "global option unset");
    interp
        .printer
        .success(format!("{} => {} (global removed)", name, value));
    Ok(Flow::Continue)
}

/// `add <name> <key> <value...>` or `add <name> <key> value=<value...>`
///
/// The value is taken verbatim, so `=` inside it survives.
fn cmd_add(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let (name, rest) = split_name_value(&line.raw_args);
    let (key, value) = split_name_value(rest);
    if name.is_empty() || key.is_empty() {
        return Err(CurlyError::Argument(
            "Usage: add <option name> <key> <value>".to_string(),
        ));
    }
    let value = value.strip_prefix("value=").unwrap_or(value);
    let active = interp.session.require_module()?;
    active.options.add(name, key, value)?;
    tracing::info!(module = active.path(), option = name, key, "entry added");
    interp
        .printer
        .success(format!("{} => {}: {}", name, key, value));
    Ok(Flow::Continue)
}

fn cmd_delete(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let mut words = line.raw_args.split_whitespace();
    let (Some(name), Some(key)) = (words.next(), words.next()) else {
        return Err(CurlyError::Argument(
            "Usage: delete <option name> <key>".to_string(),
        ));
    };
    let active = interp.session.require_module()?;
    active.options.delete(name, key)?;
    tracing::info!(module = active.path(), option = name, key, "entry deleted");
    interp
        .printer
        .success(format!("{} => {} removed", name, key));
    Ok(Flow::Continue)
}

fn cmd_run(interp: &mut Interpreter, _line: &ParsedLine) -> Result<Flow> {
    let Interpreter {
        session,
        printer,
        runtime,
        interrupt,
        ..
    } = interp;
    let active = session.require_module()?;
    printer.status(format!("Running module {}...", active));

    let module = Arc::clone(active.definition().module());
    let ctx = RunContext {
        path: active.to_string(),
        options: &active.options,
        printer,
    };
    let outcome = runtime.block_on(async {
        tokio::select! {
            result = module.run(ctx) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
            _ = interrupt.notified() => None,
        }
    });

    match outcome {
        Some(Ok(())) => {
            tracing::info!(module = active.path(), "module run finished");
            Ok(Flow::Continue)
        }
        Some(Err(err)) => {
            tracing::warn!(module = active.path(), error = %err, "module run failed");
            Err(CurlyError::action(&err))
        }
        None => {
            tracing::info!(module = active.path(), "module run cancelled");
            printer.blank();
            printer.error("Operation cancelled by user");
            Ok(Flow::Continue)
        }
    }
}

fn template_name(line: &ParsedLine) -> Result<&str> {
    line.first_arg()
        .ok_or_else(|| CurlyError::Argument("Template name must be specified".to_string()))
}

fn cmd_save(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let name = template_name(line)?;
    let Interpreter {
        session, printer, ..
    } = interp;
    let active = session.active.as_ref().ok_or(CurlyError::NoModuleSelected)?;
    let ctx = HookContext {
        path: active.path(),
        store: &session.templates,
        printer,
    };
    active
        .definition()
        .module()
        .save(&ctx, &active.options, name)?;
    session.refresh_templates();
    Ok(Flow::Continue)
}

fn cmd_load(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let name = template_name(line)?;
    let Interpreter {
        session, printer, ..
    } = interp;
    let active = session.active.as_mut().ok_or(CurlyError::NoModuleSelected)?;
    let module = Arc::clone(active.definition().module());
    let path = active.path().to_string();
    let ctx = HookContext {
        path: &path,
        store: &session.templates,
        printer,
    };
    module.load(&ctx, &mut active.options, name)?;
    Ok(Flow::Continue)
}

fn cmd_search(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let keywords: Vec<String> = line
        .words()
        .iter()
        .map(|w| w.trim_matches(|c| c == '\'' || c == '"').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();
    if keywords.is_empty() && line.kwargs.is_empty() {
        return Err(CurlyError::Argument(
            "Please specify at least one search keyword, eg 'search post type=request'"
                .to_string(),
        ));
    }

    let mut family = None;
    for (key, value) in &line.kwargs {
        match key.as_str() {
            "type" => {
                if !interp.session.registry.families().contains(value) {
                    return Err(CurlyError::Argument(format!(
                        "Unknown module type '{}'. Available: {:?}",
                        value,
                        interp.session.registry.families()
                    )));
                }
                family = Some(value.as_str());
            }
            other => {
                return Err(CurlyError::Argument(format!(
                    "Unknown search option '{}'",
                    other
                )))
            }
        }
    }

    let words: Vec<&str> = keywords.iter().map(String::as_str).collect();
    let found = interp.session.registry.search(&words, family);
    if found.is_empty() {
        interp.printer.status("No modules found");
    }
    for path in found {
        let shown = words
            .iter()
            .fold(path, |acc, word| crate::output::terminal::highlight(&acc, word));
        interp.printer.info(shown);
    }
    Ok(Flow::Continue)
}

pub fn help_text(module_active: bool) -> String {
    let render = |scope: fn(Scope) -> bool| -> String {
        COMMANDS
            .iter()
            .filter(|spec| scope(spec.scope))
            .map(|spec| format!("    {:<62} {}", spec.usage, spec.help))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let mut text = format!(
        "Global commands:\n{}",
        render(|scope| scope == Scope::Global)
    );
    if module_active {
        text.push_str("\n\nModule commands:\n");
        text.push_str(&render(|scope| scope != Scope::Global));
    }
    text
}

fn cmd_help(interp: &mut Interpreter, _line: &ParsedLine) -> Result<Flow> {
    interp
        .printer
        .info(help_text(interp.session.active.is_some()));
    Ok(Flow::Continue)
}

fn cmd_history(interp: &mut Interpreter, _line: &ParsedLine) -> Result<Flow> {
    for (index, entry) in interp.session.history.iter().enumerate() {
        interp.printer.info(format!("{:>4}  {}", index + 1, entry));
    }
    Ok(Flow::Continue)
}

fn cmd_exit(_interp: &mut Interpreter, _line: &ParsedLine) -> Result<Flow> {
    Ok(Flow::Exit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names_are_unique() {
        let mut names: Vec<&str> = COMMANDS.iter().map(|spec| spec.name).collect();
        names.sort();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn test_module_commands_require_module() {
        for name in ["run", "execute", "back", "set", "setg", "unsetg", "add", "delete", "save", "load"] {
            assert!(find(name).unwrap().requires_module(), "{}", name);
        }
        for name in ["use", "show", "search", "help", "history", "exit"] {
            assert!(!find(name).unwrap().requires_module(), "{}", name);
        }
    }

    #[test]
    fn test_split_name_value_keeps_value() {
        assert_eq!(split_name_value("payload a=b  c"), ("payload", "a=b  c"));
        assert_eq!(split_name_value("host"), ("host", ""));
    }

    #[test]
    fn test_help_lists_module_commands_only_when_active() {
        assert!(!help_text(false).contains("Module commands"));
        let active = help_text(true);
        assert!(active.contains("Module commands"));
        assert!(active.contains("setg <option name> <option value>"));
    }
}
