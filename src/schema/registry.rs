//! Doctype Registry
//!
//! Named doctypes loaded from `*.doctype` files, plus the bootstrap doctype
//! registered as `doctype`.

use super::doctype::Doctype;
use anyhow::{Context, Result};
use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// File extension of doctype files.
pub const DOCTYPE_EXTENSION: &str = "doctype";

/// Name under which the bootstrap doctype is registered.
pub const BOOTSTRAP_NAME: &str = "doctype";

static DECLARATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)<!doctype\s+([^\s>\[]+)").ok());

/// In-memory registry of named doctypes.
#[derive(Debug, Clone)]
pub struct DoctypeRegistry {
    doctypes: HashMap<String, Arc<Doctype>>,
    active: Option<String>,
}

impl Default for DoctypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DoctypeRegistry {
    pub fn new() -> Self {
        let mut doctypes = HashMap::new();
        doctypes.insert(BOOTSTRAP_NAME.to_string(), Doctype::bootstrap());
        Self {
            doctypes,
            active: None,
        }
    }

    /// Register a doctype, replacing any previous one of the same name.
    pub fn add(&mut self, name: &str, doctype: Arc<Doctype>) {
        self.doctypes.insert(name.to_string(), doctype);
    }

    /// Load a single doctype file, registered under its file stem.
    pub fn load_file(&mut self, path: &Path) -> Result<String> {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .with_context(|| format!("Invalid doctype file name: {}", path.display()))?
            .to_string();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read doctype file: {}", path.display()))?;
        let doctype = Doctype::parse(&content)
            .with_context(|| format!("Failed to parse doctype file: {}", path.display()))?;
        debug!(
            "Loaded doctype '{}' ({} elements) from {}",
            name,
            doctype.len(),
            path.display()
        );
        self.add(&name, Arc::new(doctype));
        Ok(name)
    }

    /// Load every `*.doctype` file in a directory, in file name order.
    ///
    /// Files that fail to load are logged and skipped. A missing directory
    /// loads nothing. Returns the number of doctypes loaded.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        if !dir.exists() {
            return Ok(0);
        }

        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read doctype directory: {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.extension().and_then(|ext| ext.to_str()) == Some(DOCTYPE_EXTENSION)
            })
            .collect::<Vec<_>>();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match self.load_file(&path) {
                Ok(_) => loaded += 1,
                Err(e) => warn!("Skipping doctype file {}: {:#}", path.display(), e),
            }
        }
        Ok(loaded)
    }

    /// Set the active doctype. Returns false if no doctype has that name.
    pub fn set_active(&mut self, name: &str) -> bool {
        if self.doctypes.contains_key(name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn active(&self) -> Option<&Arc<Doctype>> {
        self.active.as_ref().and_then(|name| self.doctypes.get(name))
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Doctype>> {
        self.doctypes.get(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.doctypes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Name of the registered doctype declared by the document
    /// (`<!DOCTYPE name ...>`), if any.
    pub fn detect_declared_doctype(&self, content: &str) -> Option<String> {
        let pattern = DECLARATION_RE.as_ref()?;
        pattern.captures_iter(content).find_map(|captures| {
            let name = captures.get(1)?.as_str();
            if self.doctypes.contains_key(name) {
                Some(name.to_string())
            } else {
                let lower = name.to_lowercase();
                self.doctypes.contains_key(&lower).then_some(lower)
            }
        })
    }

    /// Select the doctype for a document.
    ///
    /// Priority: explicit name, then the document's own declaration, then the
    /// configured default, then the active doctype. Unknown names are logged
    /// and skipped.
    pub fn resolve(
        &self,
        explicit: Option<&str>,
        content: &str,
        default: Option<&str>,
    ) -> Option<(String, Arc<Doctype>)> {
        let declared = self.detect_declared_doctype(content);
        let candidates = [
            ("command line", explicit),
            ("document declaration", declared.as_deref()),
            ("configured default", default),
            ("active doctype", self.active_name()),
        ];
        for (source, name) in candidates {
            let Some(name) = name else { continue };
            match self.doctypes.get(name) {
                Some(doctype) => {
                    debug!("Using doctype '{name}' from {source}");
                    return Some((name.to_string(), Arc::clone(doctype)));
                }
                None => warn!("Doctype '{name}' from {source} is not registered"),
            }
        }
        None
    }
}
