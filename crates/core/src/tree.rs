use crate::config::IgnoreFilter;
use crate::models::Module;
use crate::patterns;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Module name for headers placed directly in the headers root
pub const ROOT_MODULE: &str = "root";

/// Recursively collect files under `root` with the given extension.
///
/// Returns `(absolute, relative)` pairs in sorted walk order. A missing root
/// yields an empty list. Ignore rules see paths relative to the filter's own
/// root, which may be an ancestor of `root`.
pub fn collect_files(
    root: &Path,
    extension: &str,
    filter: &IgnoreFilter,
    follow_links: bool,
) -> Vec<(PathBuf, PathBuf)> {
    if !root.is_dir() {
        return Vec::new();
    }

    let walker = WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() > 0 && e.file_type().is_dir() {
                return !filter.should_ignore(filter.relative(e.path()), true);
            }
            true
        });

    let mut files = Vec::new();
    for entry in walker.filter_map(|e| e.ok()) {
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        if filter.should_ignore(filter.relative(path), false) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();

        files.push((path.to_path_buf(), relative));
    }

    files
}

/// Modules keyed by name, kept in first-seen order
#[derive(Debug, Clone, Default)]
pub struct ModuleMap {
    modules: Vec<Module>,
    index: HashMap<String, usize>,
}

impl ModuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the module with this name, creating it on first use
    pub fn upsert(&mut self, name: &str) -> &mut Module {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.modules.push(Module::new(name));
                let idx = self.modules.len() - 1;
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.modules[idx]
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.index.get(name).map(|&idx| &self.modules[idx])
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn into_modules(self) -> Vec<Module> {
        self.modules
    }
}

/// Module key for a header path relative to the headers root
pub fn module_key(relative: &Path) -> String {
    let mut components = relative.components();
    match (components.next(), components.next()) {
        (Some(first), Some(_)) => first.as_os_str().to_string_lossy().into_owned(),
        _ => ROOT_MODULE.to_string(),
    }
}

/// First namespace declared in a header
pub fn extract_namespace(content: &str) -> Option<String> {
    patterns::NAMESPACE
        .captures(content)
        .map(|caps| caps[1].to_string())
}

/// Group the headers under `include_dir` into modules
pub fn scan_headers(
    include_dir: &Path,
    extensions: &[String],
    filter: &IgnoreFilter,
    follow_links: bool,
) -> ModuleMap {
    let mut modules = ModuleMap::new();

    for extension in extensions {
        for (path, relative) in collect_files(include_dir, extension, filter, follow_links) {
            let module = modules.upsert(&module_key(&relative));
            module.headers.push(relative);

            if module.namespace.is_some() {
                continue;
            }

            match fs::read(&path) {
                Ok(bytes) => {
                    module.namespace = extract_namespace(&String::from_utf8_lossy(&bytes));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping namespace extraction");
                }
            }
        }
    }

    debug!(
        root = %include_dir.display(),
        modules = modules.len(),
        "Scanned headers"
    );
    modules
}

/// List translation units under `src_dir`, grouped by extension in the given order
pub fn scan_sources(
    src_dir: &Path,
    extensions: &[String],
    filter: &IgnoreFilter,
    follow_links: bool,
) -> Vec<PathBuf> {
    let sources: Vec<PathBuf> = extensions
        .iter()
        .flat_map(|extension| collect_files(src_dir, extension, filter, follow_links))
        .map(|(_, relative)| relative)
        .collect();

    debug!(root = %src_dir.display(), sources = sources.len(), "Scanned sources");
    sources
}
