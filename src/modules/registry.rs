//! Index of available module types
//!
//! Paths are stored dotted (`request.post`) and shown with slashes
//! (`request/post`); users may type either form.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::{request, ModuleDefinition};
use crate::errors::CurlyError;

/// `request/post` -> `request.post`
pub fn pythonize_path(path: &str) -> String {
    path.trim().trim_matches('/').replace('/', ".")
}

/// `request.post` -> `request/post`
pub fn humanize_path(path: &str) -> String {
    path.replace('.', "/")
}

/// Registered module types, in registration order
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: IndexMap<String, Arc<ModuleDefinition>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled request modules
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        request::register(&mut registry);
        registry
    }

    /// Add a module type; a later registration under the same path replaces it
    pub fn register(&mut self, definition: ModuleDefinition) {
        self.modules
            .insert(definition.path().to_string(), Arc::new(definition));
    }

    /// Look up a module type by its dotted or slashed path
    pub fn resolve(&self, path: &str) -> Result<Arc<ModuleDefinition>, CurlyError> {
        let dotted = pythonize_path(path);
        self.modules.get(&dotted).cloned().ok_or_else(|| {
            CurlyError::Resolution(format!(
                "Error during loading '{}'\n\n\
                 Error: No module named '{}'\n\n\
                 It should be a valid path to the module. \
                 Use <tab> key multiple times for completion.",
                humanize_path(&dotted),
                dotted
            ))
        })
    }

    /// Dotted paths of every module
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// First path segments, sorted
    pub fn families(&self) -> Vec<String> {
        self.modules
            .keys()
            .filter_map(|p| p.split('.').next())
            .map(String::from)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Complete a partial path by exactly one segment
    ///
    /// Candidates get a trailing `/` when deeper modules exist below them.
    pub fn complete_path(&self, text: &str) -> Vec<String> {
        let prefix = text.replace('/', ".");
        let mut matches = BTreeSet::new();
        for path in self.modules.keys().filter(|p| p.starts_with(&prefix)) {
            let rest = &path[prefix.len()..];
            let (head, tail) = match rest.split_once('.') {
                Some((head, tail)) => (head, tail),
                None => (rest, ""),
            };
            let sep = if tail.is_empty() { "" } else { "." };
            matches.insert(format!("{}{}{}", prefix, head, sep));
        }
        matches.into_iter().map(|m| humanize_path(&m)).collect()
    }

    /// Modules matching every keyword, optionally within one family
    pub fn search(&self, keywords: &[&str], family: Option<&str>) -> Vec<String> {
        self.modules
            .keys()
            .filter(|path| family.is_none_or(|f| path.split('.').next() == Some(f)))
            .filter(|path| keywords.iter().all(|word| path.contains(word)))
            .map(|path| humanize_path(path))
            .collect()
    }
}
