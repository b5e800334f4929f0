//! Per-module option schemas
//!
//! A [`ModuleSchema`] is built once per module type and shared by every
//! instance through an `Arc`. Inheritance is an explicit merge: a builder
//! starts from zero or more parent schemas (in order), later declarations
//! override earlier ones by name, and [`SchemaBuilder::shadow`] drops an
//! inherited option the child re-declares as something other than an option.

use indexmap::IndexMap;
use std::sync::Arc;

use crate::options::{Opt, OptionSpec};

/// Free-form module metadata, kept apart from the options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleInfo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub authors: Vec<String>,
    pub references: Vec<String>,
}

impl ModuleInfo {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.authors.push(author.to_string());
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.references.push(reference.to_string());
        self
    }
}

/// Immutable, ordered option registry of a module type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleSchema {
    info: ModuleInfo,
    options: IndexMap<String, OptionSpec>,
}

impl ModuleSchema {
    pub fn info(&self) -> &ModuleInfo {
        &self.info
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.options.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// `name -> (default display, advanced)` in declaration order
    pub fn registry(&self) -> Vec<(String, String, bool)> {
        self.options
            .iter()
            .map(|(name, spec)| (name.clone(), spec.default_display(), spec.advanced))
            .collect()
    }

    /// Fresh option slots for a new instance
    pub fn instantiate(&self) -> IndexMap<String, Opt> {
        self.options
            .iter()
            .map(|(name, spec)| (name.clone(), Opt::from_spec(name, spec)))
            .collect()
    }
}

/// Builder producing a [`ModuleSchema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    info: ModuleInfo,
    options: IndexMap<String, OptionSpec>,
}

impl SchemaBuilder {
    pub fn new(info: ModuleInfo) -> Self {
        Self {
            info,
            options: IndexMap::new(),
        }
    }

    /// Merge a parent's options; same-named entries from later parents win
    pub fn extends(mut self, parent: &ModuleSchema) -> Self {
        for (name, spec) in &parent.options {
            self.options.insert(name.clone(), spec.clone());
        }
        self
    }

    /// Declare (or override) an option
    pub fn option(mut self, name: &str, spec: OptionSpec) -> Self {
        self.options.insert(name.to_string(), spec);
        self
    }

    /// Drop an inherited option
    pub fn shadow(mut self, name: &str) -> Self {
        self.options.shift_remove(name);
        self
    }

    pub fn build(self) -> Arc<ModuleSchema> {
        Arc::new(ModuleSchema {
            info: self.info,
            options: self.options,
        })
    }
}
