//! Tab completion against live sessions
mod common;

use curly::interpreter::{complete, CompletionState};

use common::Shell;

fn candidates(shell: &Shell, line: &str) -> Vec<String> {
    let state = CompletionState::from_session(shell.interpreter.session());
    complete(&state, line, line.len()).1
}

// ============================================================================
// Command words
// ============================================================================

#[test]
fn test_idle_offers_global_commands_only() {
    let shell = Shell::new();
    let found = candidates(&shell, "");
    assert_eq!(found, ["exit", "help", "history", "search ", "show ", "use "]);
}

#[test]
fn test_active_offers_module_commands() {
    let mut shell = Shell::new();
    shell.run(&["use request/get"]);
    let found = candidates(&shell, "");
    for command in ["run", "execute", "back", "set ", "setg ", "add ", "delete ", "save ", "load "] {
        assert!(found.contains(&command.to_string()), "{} missing", command);
    }
    assert!(!found.contains(&"unsetg ".to_string()));
}

#[test]
fn test_unsetg_offered_once_globals_exist() {
    let mut shell = Shell::new();
    shell.run(&["use request/get", "setg host g.example"]);
    assert_eq!(candidates(&shell, "uns"), ["unsetg "]);
    assert_eq!(candidates(&shell, "unsetg "), ["host"]);
}

// ============================================================================
// Arguments
// ============================================================================

#[test]
fn test_use_walks_module_tree() {
    let shell = Shell::new();
    assert_eq!(candidates(&shell, "use "), ["legacy/", "request/"]);
    assert_eq!(candidates(&shell, "use req"), ["request/"]);
    assert_eq!(
        candidates(&shell, "use request/"),
        ["request/delete", "request/get", "request/post", "request/put"]
    );
    assert_eq!(candidates(&shell, "use request.g"), ["request/get"]);
}

#[test]
fn test_set_offers_option_names() {
    let mut shell = Shell::new();
    shell.run(&["use request/get"]);
    assert_eq!(candidates(&shell, "set pa"), ["path ", "path_params "]);
    assert!(candidates(&shell, "set path /x").is_empty());
    assert!(!candidates(&shell, "set ").contains(&"payload ".to_string()));
}

#[test]
fn test_load_offers_saved_templates() {
    let mut shell = Shell::new();
    shell.run(&["use request/get", "save first", "save second", "use request/post", "save other", "use request/get"]);
    assert_eq!(candidates(&shell, "load "), ["first", "second"]);
}

#[test]
fn test_leading_whitespace_and_unknown_command() {
    let shell = Shell::new();
    let state = CompletionState::from_session(shell.interpreter.session());
    let (start, found) = complete(&state, "  show mod", 10);
    assert_eq!(start, 7);
    assert_eq!(found, ["modules"]);
    assert!(candidates(&shell, "bogus thing").is_empty());
}
