//! Tab completion
//!
//! [`complete`] is a pure function of a [`CompletionState`] snapshot, the
//! line and the cursor. [`ShellHelper`] bridges it to rustyline; the loop
//! refreshes the shared snapshot before every prompt.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::sync::{Arc, RwLock};

use super::commands::{self, Scope, COMMANDS};
use super::session::Session;
use super::show::SHOW_SUB_COMMANDS;
use crate::modules::ModuleRegistry;

pub const SEARCH_SUB_COMMANDS: &[&str] = &["type="];

/// What completion needs to know about the session
#[derive(Debug, Clone, Default)]
pub struct CompletionState {
    pub module_active: bool,
    pub options: Vec<String>,
    pub list_options: Vec<String>,
    pub globals: Vec<String>,
    /// Saved template names of the active module
    pub templates: Vec<String>,
    pub registry: Arc<ModuleRegistry>,
}

impl CompletionState {
    pub fn from_session(session: &Session) -> Self {
        let mut state = Self {
            globals: session.globals.names(),
            registry: Arc::clone(&session.registry),
            ..Self::default()
        };
        if let Some(active) = &session.active {
            let prefix = format!("{}.", active.path());
            state.module_active = true;
            state.options = active.options.names();
            state.list_options = active
                .options
                .iter()
                .filter(|opt| opt.kind().is_list())
                .map(|opt| opt.label().to_string())
                .collect();
            state.templates = session
                .template_index
                .iter()
                .filter_map(|t| t.strip_prefix(&prefix))
                .filter(|name| !name.contains('.'))
                .map(String::from)
                .collect();
        }
        state
    }
}

/// Commands offered for the first word, sorted
pub fn suggested_commands(state: &CompletionState) -> Vec<String> {
    let mut suggestions: Vec<String> = COMMANDS
        .iter()
        .filter(|spec| match spec.scope {
            Scope::Global => true,
            Scope::Module => state.module_active,
            Scope::Globals => state.module_active && !state.globals.is_empty(),
        })
        .map(|spec| spec.suggestion())
        .collect();
    suggestions.sort();
    suggestions
}

fn starting_with(items: impl IntoIterator<Item = String>, text: &str) -> Vec<String> {
    items.into_iter().filter(|item| item.starts_with(text)).collect()
}

/// Candidates for the word ending at `pos`, and where that word starts
pub fn complete(state: &CompletionState, line: &str, pos: usize) -> (usize, Vec<String>) {
    let head = line.get(..pos).unwrap_or(line);
    let stripped = head.trim_start();
    let offset = head.len() - stripped.len();
    let word_start = stripped
        .rfind(char::is_whitespace)
        .map(|i| i + 1)
        .unwrap_or(0);
    let text = &stripped[word_start..];
    let start = offset + word_start;

    if word_start == 0 {
        return (start, starting_with(suggested_commands(state), text));
    }

    let command = stripped.split_whitespace().next().unwrap_or("");
    let Some(spec) = commands::find(command) else {
        return (start, Vec::new());
    };
    let Some(completer) = spec.complete else {
        return (start, Vec::new());
    };
    if spec
        .stop_after
        .is_some_and(|limit| stripped.matches(' ').count() >= limit)
    {
        return (start, Vec::new());
    }
    (start, completer(state, text))
}

pub fn complete_use(state: &CompletionState, text: &str) -> Vec<String> {
    if text.is_empty() {
        state
            .registry
            .families()
            .into_iter()
            .map(|family| format!("{}/", family))
            .collect()
    } else {
        state.registry.complete_path(text)
    }
}

pub fn complete_option(state: &CompletionState, text: &str) -> Vec<String> {
    starting_with(state.options.iter().map(|o| format!("{} ", o)), text)
}

pub fn complete_list_option(state: &CompletionState, text: &str) -> Vec<String> {
    starting_with(state.list_options.iter().map(|o| format!("{} ", o)), text)
}

pub fn complete_global(state: &CompletionState, text: &str) -> Vec<String> {
    starting_with(state.globals.iter().cloned(), text)
}

pub fn complete_show(_state: &CompletionState, text: &str) -> Vec<String> {
    starting_with(SHOW_SUB_COMMANDS.iter().map(|s| s.to_string()), text)
}

pub fn complete_search(_state: &CompletionState, text: &str) -> Vec<String> {
    starting_with(SEARCH_SUB_COMMANDS.iter().map(|s| s.to_string()), text)
}

pub fn complete_template(state: &CompletionState, text: &str) -> Vec<String> {
    starting_with(state.templates.iter().cloned(), text)
}

/// rustyline helper backed by a shared [`CompletionState`]
pub struct ShellHelper {
    state: Arc<RwLock<CompletionState>>,
}

impl ShellHelper {
    pub fn new(state: Arc<RwLock<CompletionState>>) -> Self {
        Self { state }
    }

    /// Replace the snapshot with the session's current state
    pub fn refresh(state: &RwLock<CompletionState>, session: &Session) {
        let fresh = CompletionState::from_session(session);
        *state.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = fresh;
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let state = self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        let (start, candidates) = complete(&state, line, pos);
        let pairs = candidates
            .into_iter()
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate,
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
