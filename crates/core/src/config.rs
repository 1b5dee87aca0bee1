use crate::classifier::{Classifier, KeywordGroup};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the project root
pub const CONFIG_FILE_NAME: &str = ".cppmap.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Configuration for scanning
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Root directory to scan
    pub root: PathBuf,
    /// Build script file name, relative to the root
    pub build_file: String,
    /// Header root candidates, first existing wins
    pub header_dirs: Vec<String>,
    /// Source root candidates, first existing wins
    pub source_dirs: Vec<String>,
    /// Extensions grouped into modules
    pub header_extensions: Vec<String>,
    /// Extensions scanned for declarations, one full walk per extension
    pub declaration_extensions: Vec<String>,
    /// Translation unit extensions, one full walk per extension
    pub source_extensions: Vec<String>,
    /// Additional ignore patterns (glob style)
    pub ignore_patterns: Vec<String>,
    /// Apply the root `.gitignore`
    pub respect_gitignore: bool,
    pub follow_symlinks: bool,
    /// Number of threads (1 = sequential, 0 = auto)
    pub threads: usize,
    pub classifier: Classifier,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            build_file: "CMakeLists.txt".to_string(),
            header_dirs: strings(&["include", "inc", "headers"]),
            source_dirs: strings(&["src", "source", "sources"]),
            header_extensions: strings(&["hpp"]),
            declaration_extensions: strings(&["hpp", "h"]),
            source_extensions: strings(&["cpp", "cc", "cxx"]),
            ignore_patterns: vec![],
            respect_gitignore: false,
            follow_symlinks: false,
            threads: 1,
            classifier: Classifier::default(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl ScanConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            ..Default::default()
        }
    }

    pub fn with_build_file(mut self, name: impl Into<String>) -> Self {
        self.build_file = name.into();
        self
    }

    pub fn with_header_dirs(mut self, dirs: Vec<String>) -> Self {
        self.header_dirs = dirs;
        self
    }

    pub fn with_source_dirs(mut self, dirs: Vec<String>) -> Self {
        self.source_dirs = dirs;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Apply overrides from a parsed config file. Absent keys keep their current value.
    pub fn with_file(mut self, file: ConfigFile) -> Self {
        if let Some(build_file) = file.build_file {
            self = self.with_build_file(build_file);
        }
        if let Some(dirs) = file.header_dirs {
            self = self.with_header_dirs(dirs);
        }
        if let Some(dirs) = file.source_dirs {
            self = self.with_source_dirs(dirs);
        }
        self.ignore_patterns.extend(file.ignore);
        if let Some(respect) = file.respect_gitignore {
            self = self.with_respect_gitignore(respect);
        }
        if let Some(follow) = file.follow_symlinks {
            self = self.with_follow_symlinks(follow);
        }
        if let Some(threads) = file.threads {
            self = self.with_threads(threads);
        }
        if let Some(classifier) = file.classifier {
            self = self.with_classifier(Classifier::new(classifier.groups));
        }
        self
    }

    /// First existing `<root>/<candidate>` directory
    pub fn resolve_dir(&self, candidates: &[String]) -> Option<PathBuf> {
        candidates
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_dir())
    }

    pub fn header_root(&self) -> Option<PathBuf> {
        self.resolve_dir(&self.header_dirs)
    }

    pub fn source_root(&self) -> Option<PathBuf> {
        self.resolve_dir(&self.source_dirs)
    }
}

/// On-disk configuration (`.cppmap.toml`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub build_file: Option<String>,
    pub header_dirs: Option<Vec<String>>,
    pub source_dirs: Option<Vec<String>>,
    pub ignore: Vec<String>,
    pub respect_gitignore: Option<bool>,
    pub follow_symlinks: Option<bool>,
    pub threads: Option<usize>,
    pub classifier: Option<ClassifierSection>,
}

/// `[classifier]` table; `groups` replaces the built-in keyword table
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSection {
    pub groups: Vec<KeywordGroup>,
}

impl ConfigFile {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, path)
    }

    /// Load `<root>/.cppmap.toml` if present
    pub fn discover(root: &Path) -> Result<Option<Self>, ConfigError> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::load(&path).map(Some)
    }
}

/// Filter for ignoring files and directories
pub struct IgnoreFilter {
    root: PathBuf,
    gitignore: Option<Gitignore>,
    custom_globs: GlobSet,
}

impl IgnoreFilter {
    /// Build a filter for paths under `root`. Nothing is ignored by default.
    pub fn new(root: &Path, config: &ScanConfig) -> Result<Self, ConfigError> {
        let gitignore = if config.respect_gitignore {
            Self::build_gitignore(root)
        } else {
            None
        };

        let mut builder = GlobSetBuilder::new();
        for pattern in &config.ignore_patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob(e.to_string()))?;
            builder.add(glob);
        }
        let custom_globs = builder
            .build()
            .map_err(|e| ConfigError::InvalidGlob(e.to_string()))?;

        Ok(Self {
            root: root.to_path_buf(),
            gitignore,
            custom_globs,
        })
    }

    fn build_gitignore(root: &Path) -> Option<Gitignore> {
        let gitignore_path = root.join(".gitignore");
        if !gitignore_path.exists() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(root);
        builder.add(&gitignore_path);
        // A broken .gitignore is not worth failing the scan over
        builder.build().ok()
    }

    /// `path` relative to the filter root, or unchanged when it lies outside
    pub fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Check if a path (relative to the filter root) should be ignored
    pub fn should_ignore(&self, relative: &Path, is_dir: bool) -> bool {
        if self.custom_globs.is_match(relative) {
            return true;
        }

        if let Some(ref gi) = self.gitignore {
            if gi.matched(relative, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority};
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.header_dirs, vec!["include", "inc", "headers"]);
        assert_eq!(config.source_extensions, vec!["cpp", "cc", "cxx"]);
        assert_eq!(config.threads, 1);
        assert!(!config.respect_gitignore);
    }

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::new(PathBuf::from("/test"))
            .with_build_file("build.cmake")
            .with_ignore_patterns(vec!["**/detail/**".to_string()])
            .with_threads(4);

        assert_eq!(config.root, PathBuf::from("/test"));
        assert_eq!(config.build_file, "build.cmake");
        assert_eq!(config.ignore_patterns.len(), 1);
        assert_eq!(config.threads, 4);
    }

    #[test]
    fn test_resolve_dir_takes_first_existing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("headers")).unwrap();
        fs::create_dir(dir.path().join("inc")).unwrap();

        let config = ScanConfig::new(dir.path().to_path_buf());
        assert_eq!(config.header_root(), Some(dir.path().join("inc")));
        assert_eq!(config.source_root(), None);
    }

    #[test]
    fn test_config_file_overrides() {
        let content = r#"
            build_file = "Root.cmake"
            header_dirs = ["api"]
            ignore = ["**/third_party/**"]
            follow_symlinks = true
            threads = 2

            [[classifier.groups]]
            category = "network"
            priority = "P0"
            keywords = ["publish"]
        "#;
        let file = ConfigFile::parse(content, Path::new(CONFIG_FILE_NAME)).unwrap();
        let config = ScanConfig::default().with_file(file);

        assert_eq!(config.build_file, "Root.cmake");
        assert_eq!(config.header_dirs, vec!["api"]);
        assert_eq!(config.source_dirs, vec!["src", "source", "sources"]);
        assert_eq!(config.ignore_patterns, vec!["**/third_party/**"]);
        assert_eq!(config.threads, 2);
        assert!(config.follow_symlinks);
        assert!(!config.respect_gitignore);
        assert_eq!(
            config.classifier.classify("publishEvent"),
            (Priority::P0, Category::Network)
        );
    }

    #[test]
    fn test_config_file_parse_error() {
        let result = ConfigFile::parse("threads = \"many\"", Path::new("bad.toml"));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_discover_missing_config() {
        let dir = TempDir::new().unwrap();
        assert!(ConfigFile::discover(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_ignore_filter_custom_patterns() {
        let config = ScanConfig::default().with_ignore_patterns(vec!["detail/**".to_string()]);
        let filter = IgnoreFilter::new(Path::new("."), &config).unwrap();

        assert!(filter.should_ignore(Path::new("detail/impl.hpp"), false));
        assert!(!filter.should_ignore(Path::new("net/socket.hpp"), false));
    }

    #[test]
    fn test_ignore_filter_gitignore_opt_in() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "generated/\n").unwrap();

        let off = IgnoreFilter::new(dir.path(), &ScanConfig::default()).unwrap();
        assert!(!off.should_ignore(Path::new("generated"), true));

        let config = ScanConfig::default().with_respect_gitignore(true);
        let on = IgnoreFilter::new(dir.path(), &config).unwrap();
        assert!(on.should_ignore(Path::new("generated"), true));
    }

    #[test]
    fn test_invalid_glob() {
        let config = ScanConfig::default().with_ignore_patterns(vec!["a[".to_string()]);
        assert!(matches!(
            IgnoreFilter::new(Path::new("."), &config),
            Err(ConfigError::InvalidGlob(_))
        ));
    }
}
