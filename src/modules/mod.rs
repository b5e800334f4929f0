//! Runnable modules
//!
//! A module type is a [`ModuleDefinition`]: a dotted path, an immutable
//! [`ModuleSchema`] and the [`Module`] implementation holding the action.
//! Activating a module creates an [`ActiveModule`] with its own
//! [`ModuleOptions`]; instances never share option state.

pub mod registry;
pub mod request;
pub mod schema;

pub use registry::{humanize_path, pythonize_path, ModuleRegistry};
pub use schema::{ModuleInfo, ModuleSchema, SchemaBuilder};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::{CurlyError, Result};
use crate::options::{Opt, ValidationError};
use crate::output::Printer;
use crate::templates::{Template, TemplateStore, TemplateValue};

/// Label used in the prompt when a module declares no name
pub const UNNAMED_MODULE: &str = "UnnamedModule";

/// What an action sees while running
pub struct RunContext<'a> {
    /// Humanized module path
    pub path: String,
    pub options: &'a ModuleOptions,
    pub printer: &'a Printer,
}

/// What the persistence hooks see
pub struct HookContext<'a> {
    /// Dotted module path, used as the template namespace
    pub path: &'a str,
    pub store: &'a TemplateStore,
    pub printer: &'a Printer,
}

/// Behavior of a module type
///
/// `run` is the module's action. It may block on the network and may fail;
/// the interpreter catches both. `save` and `load` default to the JSON
/// template store.
pub trait Module: Send + Sync {
    fn run<'a>(&'a self, ctx: RunContext<'a>) -> BoxFuture<'a, anyhow::Result<()>>;

    fn save(&self, ctx: &HookContext<'_>, options: &ModuleOptions, name: &str) -> Result<()> {
        ctx.printer.status("Saving template as json...");
        let path = ctx.store.save(ctx.path, name, &options.snapshot())?;
        tracing::info!(module = ctx.path, template = name, path = %path.display(), "template saved");
        ctx.printer.success(format!("Template {} saved", name));
        Ok(())
    }

    fn load(&self, ctx: &HookContext<'_>, options: &mut ModuleOptions, name: &str) -> Result<()> {
        ctx.printer.status(format!("Loading template {}", name));
        let template = ctx.store.load(ctx.path, name)?;
        let applied = options.apply_template(&template)?;
        tracing::info!(module = ctx.path, template = name, applied, "template loaded");
        ctx.printer.success(format!("Template {} loaded successfully", name));
        Ok(())
    }
}

/// A registered module type
pub struct ModuleDefinition {
    path: String,
    schema: Arc<ModuleSchema>,
    module: Arc<dyn Module>,
}

impl ModuleDefinition {
    /// `path` may use `/` or `.` separators; it is stored dotted
    pub fn new(path: &str, schema: Arc<ModuleSchema>, module: Arc<dyn Module>) -> Self {
        Self {
            path: pythonize_path(path),
            schema,
            module,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn schema(&self) -> &Arc<ModuleSchema> {
        &self.schema
    }

    pub fn info(&self) -> &ModuleInfo {
        self.schema.info()
    }

    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }

    /// Create a fresh instance
    pub fn instantiate(self: &Arc<Self>) -> ActiveModule {
        ActiveModule {
            definition: Arc::clone(self),
            options: ModuleOptions::new(Arc::clone(&self.schema)),
        }
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("path", &self.path)
            .field("schema", &self.schema)
            .finish()
    }
}

/// Concrete option values of one module instance
#[derive(Debug, Clone)]
pub struct ModuleOptions {
    schema: Arc<ModuleSchema>,
    values: IndexMap<String, Opt>,
}

impl ModuleOptions {
    pub fn new(schema: Arc<ModuleSchema>) -> Self {
        let values = schema.instantiate();
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<ModuleSchema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Opt> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opt> {
        self.values.values()
    }

    /// `(name, display value, advanced)` rows in declaration order
    pub fn registry(&self) -> Vec<(String, String, bool)> {
        self.values
            .iter()
            .map(|(name, opt)| (name.clone(), opt.display().to_string(), opt.is_advanced()))
            .collect()
    }

    fn lookup_mut(&mut self, name: &str) -> Result<&mut Opt> {
        if !self.values.contains_key(name) {
            return Err(CurlyError::Resolution(format!(
                "You can't set option: '{}'.\nAvailable options: {:?}",
                name,
                self.names()
            )));
        }
        self.values
            .get_mut(name)
            .ok_or_else(|| CurlyError::Resolution(format!("Unknown option: {}", name)))
    }

    /// Validate and assign a scalar option
    pub fn set(&mut self, name: &str, raw: &str) -> Result<()> {
        self.lookup_mut(name)?.set(raw)?;
        Ok(())
    }

    /// Insert an entry into a list option
    pub fn add(&mut self, name: &str, key: &str, value: &str) -> Result<()> {
        self.lookup_mut(name)?.add(key, value)?;
        Ok(())
    }

    /// Remove an entry from a list option
    pub fn delete(&mut self, name: &str, key: &str) -> Result<()> {
        self.lookup_mut(name)?.delete(key)?;
        Ok(())
    }

    /// String value of an option, empty when absent or not a string
    pub fn str(&self, name: &str) -> &str {
        self.get(name).and_then(Opt::as_str).unwrap_or("")
    }

    /// Entries of a list option, empty when absent
    pub fn entries(&self, name: &str) -> IndexMap<String, String> {
        self.get(name)
            .and_then(Opt::as_map)
            .cloned()
            .unwrap_or_default()
    }

    /// Current display values, as persisted in templates
    pub fn snapshot(&self) -> Template {
        self.values
            .iter()
            .map(|(name, opt)| {
                let value = match opt.as_map() {
                    Some(map) => TemplateValue::Entries(map.clone()),
                    None => TemplateValue::Text(opt.display().to_string()),
                };
                (name.clone(), value)
            })
            .collect()
    }

    /// Overwrite options present in both the template and this module
    ///
    /// Every value is validated before any is committed. Unknown keys are
    /// ignored and options missing from the template keep their values.
    /// Returns the number of options written.
    pub fn apply_template(&mut self, template: &Template) -> Result<usize> {
        let mut staged = Vec::new();
        for (name, value) in template {
            let Some(current) = self.values.get(name) else {
                tracing::debug!(option = %name, "ignoring unknown template key");
                continue;
            };
            let mut next = current.clone();
            let outcome = match value {
                TemplateValue::Text(raw) => next.set(raw),
                TemplateValue::Entries(map) => next.replace_entries(map.clone()),
                TemplateValue::Other(
                    literal @ (serde_json::Value::Number(_) | serde_json::Value::Bool(_)),
                ) => next.set(&literal.to_string()),
                TemplateValue::Other(other) => Err(ValidationError::new(format!(
                    "unsupported template value {}",
                    other
                ))),
            };
            outcome.map_err(|e| ValidationError::new(format!("{}: {}", name, e)))?;
            staged.push((name.clone(), next));
        }

        let count = staged.len();
        for (name, opt) in staged {
            self.values.insert(name, opt);
        }
        Ok(count)
    }

    /// Apply global overrides whose names exist in this module
    ///
    /// Names unknown to this module are skipped. Each applied name is
    /// returned with its validation outcome.
    pub fn apply_overrides<'a>(
        &mut self,
        overrides: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Vec<(String, std::result::Result<(), ValidationError>)> {
        overrides
            .into_iter()
            .filter_map(|(name, raw)| {
                self.values
                    .get_mut(name)
                    .map(|opt| (name.clone(), opt.set(raw)))
            })
            .collect()
    }
}

/// The module currently selected in the interpreter
#[derive(Debug)]
pub struct ActiveModule {
    definition: Arc<ModuleDefinition>,
    pub options: ModuleOptions,
}

impl ActiveModule {
    pub fn definition(&self) -> &Arc<ModuleDefinition> {
        &self.definition
    }

    /// Dotted module path
    pub fn path(&self) -> &str {
        self.definition.path()
    }

    pub fn info(&self) -> &ModuleInfo {
        self.definition.info()
    }

    /// Display name for the prompt
    pub fn label(&self) -> &str {
        self.info().name.as_deref().unwrap_or(UNNAMED_MODULE)
    }
}

impl fmt::Display for ActiveModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&humanize_path(self.path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionSpec;

    fn schema() -> Arc<ModuleSchema> {
        SchemaBuilder::new(ModuleInfo::named("test"))
            .option("host", OptionSpec::string(""))
            .option("port", OptionSpec::port(80))
            .option("headers", OptionSpec::list())
            .build()
    }

    #[test]
    fn test_set_unknown_lists_options_and_changes_nothing() {
        let mut options = ModuleOptions::new(schema());
        let before = options.registry();
        let err = options.set("hots", "x").unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, CurlyError::Resolution(_)));
        assert!(msg.contains("host"));
        assert!(msg.contains("port"));
        assert!(msg.contains("headers"));
        assert_eq!(options.registry(), before);
    }

    #[test]
    fn test_set_updates_registry_display() {
        let mut options = ModuleOptions::new(schema());
        options.set("port", "8443").unwrap();
        let row = options.registry().into_iter().find(|(n, _, _)| n == "port").unwrap();
        assert_eq!(row.1, "8443");
    }

    #[test]
    fn test_invalid_set_is_validation_error() {
        let mut options = ModuleOptions::new(schema());
        assert!(matches!(options.set("port", "0"), Err(CurlyError::Validation(_))));
        assert_eq!(options.get("port").unwrap().as_port(), Some(80));
    }

    #[test]
    fn test_apply_template_partial_and_unknown_keys() {
        let mut options = ModuleOptions::new(schema());
        let mut template = Template::new();
        template.insert("port".into(), TemplateValue::Text("9000".into()));
        template.insert("bogus".into(), TemplateValue::Text("1".into()));
        options.set("host", "kept.example").unwrap();

        assert_eq!(options.apply_template(&template).unwrap(), 1);
        assert_eq!(options.get("port").unwrap().as_port(), Some(9000));
        assert_eq!(options.str("host"), "kept.example");
        assert!(!options.contains("bogus"));
    }

    #[test]
    fn test_apply_template_skips_unknown_keys_of_any_shape() {
        let mut options = ModuleOptions::new(schema());
        let mut template = Template::new();
        template.insert("host".into(), TemplateValue::Text("a.example".into()));
        template.insert("extra".into(), TemplateValue::Other(serde_json::json!(5)));
        template.insert("more".into(), TemplateValue::Other(serde_json::json!([1])));
        assert_eq!(options.apply_template(&template).unwrap(), 1);
        assert_eq!(options.str("host"), "a.example");
    }

    #[test]
    fn test_apply_template_accepts_json_literals_for_scalars() {
        let mut options = ModuleOptions::new(schema());
        let mut template = Template::new();
        template.insert("port".into(), TemplateValue::Other(serde_json::json!(8080)));
        assert_eq!(options.apply_template(&template).unwrap(), 1);
        assert_eq!(options.get("port").unwrap().as_port(), Some(8080));

        template.insert("headers".into(), TemplateValue::Other(serde_json::json!([1])));
        assert!(options.apply_template(&template).is_err());
    }

    #[test]
    fn test_apply_template_is_atomic() {
        let mut options = ModuleOptions::new(schema());
        let mut template = Template::new();
        template.insert("host".into(), TemplateValue::Text("new.example".into()));
        template.insert("port".into(), TemplateValue::Text("99999".into()));
        assert!(options.apply_template(&template).is_err());
        assert_eq!(options.str("host"), "");
    }

    #[test]
    fn test_overrides_apply_by_name_only() {
        let mut options = ModuleOptions::new(schema());
        let mut globals = IndexMap::new();
        globals.insert("host".to_string(), "g.example".to_string());
        globals.insert("scheme".to_string(), "https".to_string());
        let applied = options.apply_overrides(&globals);
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].0, "host");
        assert!(applied[0].1.is_ok());
        assert_eq!(options.str("host"), "g.example");
        assert!(!options.contains("scheme"));
    }

    #[test]
    fn test_snapshot_keeps_list_entries() {
        let mut options = ModuleOptions::new(schema());
        options.add("headers", "Accept", "*/*").unwrap();
        let snapshot = options.snapshot();
        match &snapshot["headers"] {
            TemplateValue::Entries(map) => assert_eq!(map["Accept"], "*/*"),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(snapshot["port"], TemplateValue::Text("80".into()));
    }
}
