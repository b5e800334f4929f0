//! Option kinds and their validation rules

use indexmap::IndexMap;
use std::fmt;

use super::ValidationError;

/// Highest valid TCP/UDP port
pub const MAX_PORT: i64 = 65535;

/// The type of an option, which decides how raw input is validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    String,
    Bool,
    Integer,
    Float,
    Port,
    /// Key/value mapping, only mutated through `add` / `delete`
    List,
}

impl OptionKind {
    /// Validate a raw literal, returning the typed value and its display form
    ///
    /// List options cannot be assigned as a whole; they reject every scalar.
    pub fn parse(self, raw: &str) -> Result<(OptionValue, String), ValidationError> {
        match self {
            OptionKind::String => Ok((OptionValue::String(raw.to_string()), raw.to_string())),
            OptionKind::Bool => match raw {
                "true" => Ok((OptionValue::Bool(true), raw.to_string())),
                "false" => Ok((OptionValue::Bool(false), raw.to_string())),
                _ => Err(ValidationError::new("Invalid value. It should be true or false.")),
            },
            OptionKind::Integer => {
                let value = parse_integer(raw).ok_or_else(|| {
                    ValidationError::new(format!("Invalid option. Cannot cast '{}' to integer.", raw))
                })?;
                Ok((OptionValue::Integer(value), raw.trim().to_string()))
            }
            OptionKind::Float => {
                let value: f64 = raw.trim().parse().map_err(|_| {
                    ValidationError::new(format!("Invalid option. Cannot cast '{}' to float.", raw))
                })?;
                Ok((OptionValue::Float(value), raw.trim().to_string()))
            }
            OptionKind::Port => {
                let value: i64 = raw.trim().parse().map_err(|_| {
                    ValidationError::new(format!("Invalid option. Cannot cast '{}' to integer.", raw))
                })?;
                if value <= 0 || value > MAX_PORT {
                    return Err(ValidationError::new(format!(
                        "Invalid option. Port value should be between 1 and {}.",
                        MAX_PORT
                    )));
                }
                let port = u16::try_from(value)
                    .map_err(|_| ValidationError::new(format!("Invalid port '{}'", raw)))?;
                Ok((OptionValue::Port(port), port.to_string()))
            }
            OptionKind::List => Err(ValidationError::new(
                "List options cannot be assigned directly, use the add command instead",
            )),
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, OptionKind::List)
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::String => "string",
            OptionKind::Bool => "bool",
            OptionKind::Integer => "integer",
            OptionKind::Float => "float",
            OptionKind::Port => "port",
            OptionKind::List => "list",
        };
        f.write_str(name)
    }
}

/// Decimal first, then hexadecimal with a mandatory `0x` prefix
fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }

    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let value = i64::from_str_radix(digits, 16).ok()?;
    Some(if negative { -value } else { value })
}

/// A validated option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    Port(u16),
    List(IndexMap<String, String>),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::String(_) => OptionKind::String,
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Integer(_) => OptionKind::Integer,
            OptionValue::Float(_) => OptionKind::Float,
            OptionValue::Port(_) => OptionKind::Port,
            OptionValue::List(_) => OptionKind::List,
        }
    }
}

/// Render a list option as `key: value, key2: value2`
pub fn display_map(map: &IndexMap<String, String>) -> String {
    map.iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
