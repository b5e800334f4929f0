//! Interpreter session state

use indexmap::IndexMap;
use std::sync::Arc;

use crate::errors::{CurlyError, Result};
use crate::modules::{ActiveModule, ModuleRegistry};
use crate::options::ValidationError;
use crate::templates::TemplateStore;

/// Option values set with `setg`, applied by name to modules activated later
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    values: IndexMap<String, String>,
}

impl GlobalOptions {
    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    /// Remove a global, listing the current ones when it is not set
    pub fn unset(&mut self, name: &str) -> Result<String> {
        self.values.shift_remove(name).ok_or_else(|| {
            CurlyError::Resolution(format!(
                "Cannot unset global option '{}'.\nAvailable global options: {:?}",
                name,
                self.names()
            ))
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Everything the command loop mutates
#[derive(Debug)]
pub struct Session {
    pub active: Option<ActiveModule>,
    pub globals: GlobalOptions,
    pub registry: Arc<ModuleRegistry>,
    pub templates: TemplateStore,
    /// Dotted `module.path.name` of every saved template
    pub template_index: Vec<String>,
    pub history: Vec<String>,
}

impl Session {
    pub fn new(registry: Arc<ModuleRegistry>, templates: TemplateStore) -> Self {
        let template_index = templates.index();
        Self {
            active: None,
            globals: GlobalOptions::default(),
            registry,
            templates,
            template_index,
            history: Vec::new(),
        }
    }

    /// The active module, or the uniform precondition error
    pub fn require_module(&mut self) -> Result<&mut ActiveModule> {
        self.active.as_mut().ok_or(CurlyError::NoModuleSelected)
    }

    /// Resolve and activate a module, applying matching globals
    ///
    /// On failure the previous state is kept. Returns the globals that were
    /// rejected by the new module's validation.
    pub fn activate(&mut self, path: &str) -> Result<Vec<(String, ValidationError)>> {
        let definition = self.registry.resolve(path)?;
        let mut instance = definition.instantiate();
        let rejected = instance
            .options
            .apply_overrides(self.globals.iter())
            .into_iter()
            .filter_map(|(name, outcome)| outcome.err().map(|e| (name, e)))
            .collect();
        tracing::info!(module = definition.path(), globals = self.globals.len(), "module activated");
        self.active = Some(instance);
        Ok(rejected)
    }

    pub fn deactivate(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(module = active.path(), "module deactivated");
        }
    }

    pub fn refresh_templates(&mut self) {
        self.template_index = self.templates.index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(dir: &TempDir) -> Session {
        Session::new(Arc::new(ModuleRegistry::builtin()), TemplateStore::new(dir.path()))
    }

    #[test]
    fn test_require_module_when_idle() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        assert!(matches!(session.require_module(), Err(CurlyError::NoModuleSelected)));
    }

    #[test]
    fn test_activate_unknown_keeps_state() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.activate("request/get").unwrap();
        assert!(session.activate("request/nope").is_err());
        assert_eq!(session.active.as_ref().unwrap().path(), "request.get");
    }

    #[test]
    fn test_globals_applied_on_activation_by_name() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.globals.set("host", "global.example");
        session.globals.set("ssl", "true");
        session.activate("request/get").unwrap();
        let active = session.active.as_ref().unwrap();
        assert_eq!(active.options.str("host"), "global.example");
        assert!(!active.options.contains("ssl"));

        session.activate("legacy/post").unwrap();
        let active = session.active.as_ref().unwrap();
        assert_eq!(active.options.get("ssl").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_invalid_global_is_reported_not_applied() {
        let dir = TempDir::new().unwrap();
        let mut session = session(&dir);
        session.globals.set("follow_redirects", "yes");
        let rejected = session.activate("request/get").unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, "follow_redirects");
        let active = session.active.as_ref().unwrap();
        assert_eq!(active.options.get("follow_redirects").unwrap().as_bool(), Some(true));
    }

    #[test]
    fn test_unset_missing_lists_globals() {
        let mut globals = GlobalOptions::default();
        globals.set("host", "a");
        let err = globals.unset("port").unwrap_err();
        assert!(err.to_string().contains("host"));
        assert_eq!(globals.unset("host").unwrap(), "a");
        assert!(globals.is_empty());
    }
}
