//! Saved option templates
//!
//! One JSON file per saved configuration at
//! `<root>/<module path segments>/<name>.json`, holding a flat object from
//! option name to its display value (list options are stored as objects).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::errors::CurlyError;
use crate::modules::pythonize_path;

/// Persisted value of one option
///
/// Hand-edited files may hold any JSON; whatever is neither a string nor a
/// string map lands in `Other` and is only looked at if the module has an
/// option of that name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateValue {
    Text(String),
    Entries(IndexMap<String, String>),
    Other(serde_json::Value),
}

/// Option name -> persisted value
pub type Template = IndexMap<String, TemplateValue>;

const EXTENSION: &str = "json";

/// Template files rooted at one directory
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the templates of one module
    pub fn module_dir(&self, module_path: &str) -> PathBuf {
        pythonize_path(module_path)
            .split('.')
            .filter(|s| !s.is_empty())
            .fold(self.root.clone(), |dir, segment| dir.join(segment))
    }

    /// File path of a named template
    pub fn template_path(&self, module_path: &str, name: &str) -> Result<PathBuf, CurlyError> {
        validate_name(name)?;
        Ok(self
            .module_dir(module_path)
            .join(format!("{}.{}", name, EXTENSION)))
    }

    pub fn exists(&self, module_path: &str, name: &str) -> bool {
        self.template_path(module_path, name)
            .map(|p| p.exists())
            .unwrap_or(false)
    }

    /// Write a new template; an existing one is never overwritten
    pub fn save(&self, module_path: &str, name: &str, template: &Template) -> Result<PathBuf, CurlyError> {
        let path = self.template_path(module_path, name)?;
        if path.exists() {
            return Err(CurlyError::Template(
                "File with given name already exists, pick another".to_string(),
            ));
        }

        let parent = self.module_dir(module_path);
        fs::create_dir_all(&parent)
            .map_err(|e| CurlyError::Template(format!("Failed to create template directory: {}", e)))?;

        let content = serde_json::to_string_pretty(template)?;

        let mut temp = NamedTempFile::new_in(&parent)
            .map_err(|e| CurlyError::Template(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| CurlyError::Template(format!("Failed to write template: {}", e)))?;

        // Fails if someone created the file meanwhile
        temp.persist_noclobber(&path).map_err(|e| {
            CurlyError::Template(format!("Failed to save template {}: {}", name, e.error))
        })?;

        Ok(path)
    }

    pub fn load(&self, module_path: &str, name: &str) -> Result<Template, CurlyError> {
        let path = self.template_path(module_path, name)?;
        if !path.exists() {
            return Err(CurlyError::Template("File with given name does not exist".to_string()));
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| CurlyError::Template(format!("Failed to read template: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| CurlyError::Template(format!("Failed to parse template {}: {}", name, e)))
    }

    /// Names of the templates saved for one module, sorted
    pub fn list(&self, module_path: &str) -> Vec<String> {
        let dir = self.module_dir(module_path);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == EXTENSION))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().to_string()))
            .collect();
        names.sort();
        names
    }

    /// Every saved template as a dotted `module.path.name`, sorted
    pub fn index(&self) -> Vec<String> {
        let mut all: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().is_some_and(|e| e == EXTENSION))
            .filter_map(|path| {
                let relative = path.strip_prefix(&self.root).ok()?.with_extension("");
                let segments: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect();
                Some(segments.join("."))
            })
            .collect();
        all.sort();
        all
    }
}

/// Template names are single path components without dots
///
/// Dots separate segments in the template index.
fn validate_name(name: &str) -> Result<(), CurlyError> {
    let valid = !name.is_empty()
        && !name.contains(['/', '\\', '.'])
        && !name.chars().any(char::is_whitespace);
    if valid {
        Ok(())
    } else {
        Err(CurlyError::Template(format!("Invalid template name '{}'", name)))
    }
}
