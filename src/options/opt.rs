//! Option descriptors and live option slots

use indexmap::IndexMap;

use super::kind::{display_map, OptionKind, OptionValue};
use super::ValidationError;

/// Declaration of an option inside a module schema
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub kind: OptionKind,
    pub default: OptionValue,
    pub advanced: bool,
    pub description: String,
}

impl OptionSpec {
    fn with_default(default: OptionValue) -> Self {
        Self {
            kind: default.kind(),
            default,
            advanced: false,
            description: String::new(),
        }
    }

    pub fn string(default: &str) -> Self {
        Self::with_default(OptionValue::String(default.to_string()))
    }

    pub fn bool(default: bool) -> Self {
        Self::with_default(OptionValue::Bool(default))
    }

    pub fn integer(default: i64) -> Self {
        Self::with_default(OptionValue::Integer(default))
    }

    pub fn float(default: f64) -> Self {
        Self::with_default(OptionValue::Float(default))
    }

    pub fn port(default: u16) -> Self {
        Self::with_default(OptionValue::Port(default))
    }

    pub fn list() -> Self {
        Self::with_default(OptionValue::List(IndexMap::new()))
    }

    /// Hide the option from `show options`
    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Display form of the default value
    pub fn default_display(&self) -> String {
        render(&self.default)
    }
}

fn render(value: &OptionValue) -> String {
    match value {
        OptionValue::String(s) => s.clone(),
        OptionValue::Bool(b) => b.to_string(),
        OptionValue::Integer(i) => i.to_string(),
        OptionValue::Float(f) => f.to_string(),
        OptionValue::Port(p) => p.to_string(),
        OptionValue::List(map) => display_map(map),
    }
}

/// A live, validated option bound to a module instance
#[derive(Debug, Clone, PartialEq)]
pub struct Opt {
    label: String,
    kind: OptionKind,
    value: OptionValue,
    display: String,
    advanced: bool,
    description: String,
}

impl Opt {
    /// Bind a declaration to its attribute name
    pub fn from_spec(label: &str, spec: &OptionSpec) -> Self {
        Self {
            label: label.to_string(),
            kind: spec.kind,
            value: spec.default.clone(),
            display: spec.default_display(),
            advanced: spec.advanced,
            description: spec.description.clone(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn is_advanced(&self) -> bool {
        self.advanced
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Validate and assign a raw literal
    ///
    /// On error nothing changes.
    pub fn set(&mut self, raw: &str) -> Result<(), ValidationError> {
        if self.kind.is_list() {
            return Err(ValidationError::new(format!(
                "Cannot set value for field {}, use add command instead",
                self.label
            )));
        }
        let (value, display) = self.kind.parse(raw)?;
        self.value = value;
        self.display = display;
        Ok(())
    }

    /// Insert or replace one entry of a list option
    pub fn add(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let OptionValue::List(map) = &mut self.value else {
            return Err(ValidationError::new(format!(
                "Cannot add entries to {}, only list options accept entries",
                self.label
            )));
        };
        map.insert(key.to_string(), value.to_string());
        self.display = display_map(map);
        Ok(())
    }

    /// Remove one entry of a list option
    pub fn delete(&mut self, key: &str) -> Result<(), ValidationError> {
        let OptionValue::List(map) = &mut self.value else {
            return Err(ValidationError::new(format!(
                "Cannot delete attribute {}, only list entries can be deleted, overwrite it instead",
                self.label
            )));
        };
        if map.shift_remove(key).is_none() {
            return Err(ValidationError::new(format!(
                "No entry '{}' in {}. Existing keys: {:?}",
                key,
                self.label,
                map.keys().collect::<Vec<_>>()
            )));
        }
        self.display = display_map(map);
        Ok(())
    }

    /// Replace the whole mapping of a list option
    pub fn replace_entries(&mut self, entries: IndexMap<String, String>) -> Result<(), ValidationError> {
        if !self.kind.is_list() {
            return Err(ValidationError::new(format!("{} is not a list option", self.label)));
        }
        self.display = display_map(&entries);
        self.value = OptionValue::List(entries);
        Ok(())
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            OptionValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self.value {
            OptionValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.value {
            OptionValue::Float(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_port(&self) -> Option<u16> {
        match self.value {
            OptionValue::Port(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match &self.value {
            OptionValue::List(map) => Some(map),
            _ => None,
        }
    }
}
