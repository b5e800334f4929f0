//! Command line parsing
//!
//! A line splits into the command (first word), keyword arguments (every
//! `key=value` word, keys lower-cased) and the remaining positional
//! argument string with whitespace normalized.

use indexmap::IndexMap;

/// One parsed input line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLine {
    pub command: String,
    /// Positional arguments, keyword words removed
    pub args: String,
    pub kwargs: IndexMap<String, String>,
    /// Everything after the command, untouched
    pub raw_args: String,
}

impl ParsedLine {
    /// First positional word, if any
    pub fn first_arg(&self) -> Option<&str> {
        self.args.split_whitespace().next()
    }

    /// Positional words
    pub fn words(&self) -> Vec<&str> {
        self.args.split_whitespace().collect()
    }
}

pub fn parse_line(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    let (command, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (trimmed, ""),
    };

    let mut kwargs = IndexMap::new();
    let mut positional = Vec::new();
    for word in rest.split_whitespace() {
        match word.split_once('=') {
            Some((key, value)) => {
                kwargs.insert(key.to_lowercase(), value.to_string());
            }
            None => positional.push(word),
        }
    }

    ParsedLine {
        command: command.to_string(),
        args: positional.join(" "),
        kwargs,
        raw_args: rest.to_string(),
    }
}
