//! `show` sub-commands

use super::parser::ParsedLine;
use super::{Flow, Interpreter};
use crate::errors::{CurlyError, Result};
use crate::modules::{humanize_path, pythonize_path};

pub const SHOW_SUB_COMMANDS: &[&str] = &[
    "info",
    "options",
    "advanced",
    "all",
    "modules",
    "templates",
    "globals",
];

pub(crate) fn cmd_show(interp: &mut Interpreter, line: &ParsedLine) -> Result<Flow> {
    let words = line.words();
    let sub = words.first().copied().unwrap_or("");
    let rest = words.get(1).copied();
    match sub {
        "info" => show_info(interp)?,
        "options" => show_options(interp)?,
        "advanced" => show_advanced(interp)?,
        "all" => show_modules(interp, None),
        "modules" => show_modules(interp, rest),
        "templates" => show_templates(interp, line)?,
        "globals" => show_globals(interp),
        other => {
            return Err(CurlyError::Argument(format!(
                "Unknown 'show' subcommand '{}'. Possible choices: {:?}",
                other, SHOW_SUB_COMMANDS
            )))
        }
    }
    Ok(Flow::Continue)
}

fn show_info(interp: &mut Interpreter) -> Result<()> {
    let active = interp.session.active.as_ref().ok_or(CurlyError::NoModuleSelected)?;
    let info = active.info();
    let printer = &interp.printer;

    let section = |title: &str, body: Vec<String>| {
        if body.is_empty() {
            return;
        }
        printer.info(format!("\n{}", title));
        for line in body {
            printer.info(line);
        }
    };
    section("Name", info.name.iter().cloned().collect());
    section("Description", info.description.iter().cloned().collect());
    section("Authors", info.authors.iter().map(|a| format!("- {}", a)).collect());
    section("References", info.references.iter().map(|r| format!("- {}", r)).collect());
    printer.blank();
    Ok(())
}

fn show_options(interp: &mut Interpreter) -> Result<()> {
    let active = interp.session.active.as_ref().ok_or(CurlyError::NoModuleSelected)?;
    let rows: Vec<Vec<String>> = active
        .options
        .iter()
        .filter(|opt| !opt.is_advanced())
        .map(|opt| vec![opt.label().to_string(), opt.display().to_string()])
        .collect();
    interp.printer.info("\nModule options:");
    interp.printer.table(&["Name", "Current settings"], &rows);
    interp.printer.blank();
    Ok(())
}

fn show_advanced(interp: &mut Interpreter) -> Result<()> {
    let active = interp.session.active.as_ref().ok_or(CurlyError::NoModuleSelected)?;
    let rows: Vec<Vec<String>> = active
        .options
        .iter()
        .filter(|opt| opt.is_advanced())
        .map(|opt| {
            vec![
                opt.label().to_string(),
                opt.display().to_string(),
                opt.description().to_string(),
            ]
        })
        .collect();
    if rows.is_empty() {
        interp.printer.status("Module has no advanced options");
        return Ok(());
    }
    interp.printer.info("\nAdvanced options:");
    interp
        .printer
        .table(&["Name", "Current settings", "Description"], &rows);
    interp.printer.blank();
    Ok(())
}

fn show_modules(interp: &mut Interpreter, root: Option<&str>) {
    let root = root.map(pythonize_path).unwrap_or_default();
    for path in interp.session.registry.paths().filter(|p| p.starts_with(&root)) {
        interp.printer.info(humanize_path(path));
    }
}

fn show_templates(interp: &mut Interpreter, line: &ParsedLine) -> Result<()> {
    let module = match (line.kwargs.get("module"), interp.session.active.as_ref()) {
        (Some(module), _) => pythonize_path(module),
        (None, Some(active)) => active.path().to_string(),
        (None, None) => {
            let available: Vec<String> = interp.session.registry.paths().map(humanize_path).collect();
            return Err(CurlyError::Argument(format!(
                "You must specify for which module (module=<path>). Available: {:?}",
                available
            )));
        }
    };

    interp.session.refresh_templates();
    let prefix = format!("{}.", module);
    let found: Vec<&String> = interp
        .session
        .template_index
        .iter()
        .filter(|t| t.starts_with(&prefix))
        .collect();
    if found.is_empty() {
        interp
            .printer
            .status(format!("No templates saved for {}", humanize_path(&module)));
    }
    for template in found {
        interp.printer.info(humanize_path(template));
    }
    Ok(())
}

fn show_globals(interp: &mut Interpreter) {
    if interp.session.globals.is_empty() {
        interp.printer.status("No global options set");
        return;
    }
    let rows: Vec<Vec<String>> = interp
        .session
        .globals
        .iter()
        .map(|(name, value)| vec![name.clone(), value.clone()])
        .collect();
    interp.printer.table(&["Name", "Value"], &rows);
}
