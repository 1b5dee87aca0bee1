use crate::build::read_build_file;
use crate::config::{IgnoreFilter, ScanConfig};
use crate::declarations::extract_relative;
use crate::models::{FunctionInfo, FunctionReport, ProjectInfo, ScanMetadata};
use crate::tree::{collect_files, scan_headers, scan_sources};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory does not exist: {0}")]
    RootNotFound(PathBuf),
    #[error("Config error: {0}")]
    ConfigError(#[from] crate::config::ConfigError),
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

fn ensure_dir(path: &Path) -> Result<(), ScanError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ScanError::RootNotFound(path.to_path_buf()))
    }
}

fn build_metadata(start: Instant, files_scanned: usize) -> ScanMetadata {
    ScanMetadata {
        scan_duration_ms: start.elapsed().as_millis() as u64,
        files_scanned,
        timestamp: chrono::Utc::now().to_rfc3339(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Builds the project topology summary for a C++ source tree
pub struct ProjectScanner {
    config: ScanConfig,
}

impl ProjectScanner {
    /// Fails only when the project root is not a directory
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        ensure_dir(&config.root)?;
        Ok(Self { config })
    }

    /// Scan the project and return its topology
    pub fn scan(&self) -> Result<ProjectInfo, ScanError> {
        let start = Instant::now();
        let root = &self.config.root;

        // 1. Build script
        let build = read_build_file(&root.join(&self.config.build_file));

        // Ignore rules are project-relative for both trees
        let filter = IgnoreFilter::new(root, &self.config)?;

        // 2. Headers grouped into modules
        let mut modules = match self.config.header_root() {
            Some(include_dir) => {
                debug!(dir = %include_dir.display(), "Using header root");
                scan_headers(
                    &include_dir,
                    &self.config.header_extensions,
                    &filter,
                    self.config.follow_symlinks,
                )
                .into_modules()
            }
            None => {
                debug!("No header root found");
                Vec::new()
            }
        };

        // 3. Sources, all attributed to the first module
        let mut files_scanned: usize = modules.iter().map(|m| m.headers.len()).sum();
        if let Some(src_dir) = self.config.source_root() {
            debug!(dir = %src_dir.display(), "Using source root");
            let sources = scan_sources(
                &src_dir,
                &self.config.source_extensions,
                &filter,
                self.config.follow_symlinks,
            );
            files_scanned += sources.len();
            if let Some(first) = modules.first_mut() {
                first.sources = sources;
            }
        }

        let name = if build.project_name.is_empty() {
            root_name(root)
        } else {
            build.project_name
        };

        info!(
            project = %name,
            modules = modules.len(),
            targets = build.targets.len(),
            "Project scan complete"
        );

        Ok(ProjectInfo {
            root: root.clone(),
            name,
            language_standard: build.language_standard,
            targets: build.targets,
            modules,
            external_dependencies: build.external_dependencies,
            metadata: build_metadata(start, files_scanned),
        })
    }
}

/// Final path component of the root, resolving `.` and `..` when possible
fn root_name(root: &Path) -> String {
    let resolved = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extracts and classifies the declarations of every header under a directory
pub struct FunctionScanner {
    config: ScanConfig,
    ignore_filter: IgnoreFilter,
}

impl FunctionScanner {
    /// `config.root` is the header directory itself
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        ensure_dir(&config.root)?;
        let ignore_filter = IgnoreFilter::new(&config.root, &config)?;
        Ok(Self {
            config,
            ignore_filter,
        })
    }

    /// Declarations in walk order: every file of the first declaration
    /// extension, then every file of the next, and so on. Unsorted.
    pub fn scan_functions(&self) -> Result<Vec<FunctionInfo>, ScanError> {
        Ok(self.collect()?.0)
    }

    /// Scan and rank the declarations for reporting
    pub fn scan(&self) -> Result<FunctionReport, ScanError> {
        let start = Instant::now();
        let (functions, files_scanned) = self.collect()?;

        info!(
            functions = functions.len(),
            files = files_scanned,
            "Function scan complete"
        );

        Ok(FunctionReport::ranked(
            self.config.root.clone(),
            functions,
            build_metadata(start, files_scanned),
        ))
    }

    fn collect(&self) -> Result<(Vec<FunctionInfo>, usize), ScanError> {
        let headers: Vec<(PathBuf, PathBuf)> = self
            .config
            .declaration_extensions
            .iter()
            .flat_map(|ext| {
                collect_files(
                    &self.config.root,
                    ext,
                    &self.ignore_filter,
                    self.config.follow_symlinks,
                )
            })
            .collect();

        let classifier = &self.config.classifier;
        let extract = |(path, relative): &(PathBuf, PathBuf)| {
            extract_relative(path, relative, classifier)
        };

        // Collecting an indexed parallel iterator keeps input order
        let per_file: Vec<Vec<FunctionInfo>> = if self.config.threads == 1 {
            headers.iter().map(extract).collect()
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.threads)
                .build()
                .map_err(|e| ScanError::ThreadPoolError(e.to_string()))?;
            pool.install(|| headers.par_iter().map(extract).collect())
        };

        Ok((per_file.into_iter().flatten().collect(), headers.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Priority, TargetKind};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn create_test_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        write(
            root,
            "CMakeLists.txt",
            indoc! {"
                project(NetIO)
                set(CMAKE_CXX_STANDARD 17)
                find_package(Threads)
                add_library(netio src/socket.cpp)
                add_executable(demo src/main.cpp)
            "},
        );
        write(
            root,
            "include/netio/socket.hpp",
            indoc! {"
                namespace netio {
                class Socket {
                public:
                    int connect(const char* host);
                    bool isOpen() const;
                };
                }
            "},
        );
        write(root, "include/netio/buffer.hpp", "namespace netio::detail {}\n");
        write(root, "include/util.hpp", "int toInt(const char* s);\n");
        write(root, "src/socket.cpp", "");
        write(root, "src/main.cpp", "");

        dir
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = ScanConfig::new(dir.path().join("missing"));

        assert!(matches!(
            ProjectScanner::new(config.clone()),
            Err(ScanError::RootNotFound(_))
        ));
        assert!(matches!(
            FunctionScanner::new(config),
            Err(ScanError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_project_scan() {
        let dir = create_test_project();
        let scanner = ProjectScanner::new(ScanConfig::new(dir.path().to_path_buf())).unwrap();
        let info = scanner.scan().unwrap();

        assert_eq!(info.name, "NetIO");
        assert_eq!(info.language_standard, "17");
        assert_eq!(info.external_dependencies, vec!["Threads"]);
        let kinds: Vec<TargetKind> = info.targets.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TargetKind::Library, TargetKind::Executable]);

        let names: Vec<&str> = info.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["netio", "root"]);

        let netio = &info.modules[0];
        assert_eq!(netio.headers.len(), 2);
        assert_eq!(netio.namespace.as_deref(), Some("netio::detail"));
        assert_eq!(
            netio.sources,
            vec![PathBuf::from("main.cpp"), PathBuf::from("socket.cpp")]
        );
        assert!(info.modules[1].sources.is_empty());
        assert_eq!(info.metadata.files_scanned, 5);
    }

    #[test]
    fn test_empty_project_uses_directory_name() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "CMakeLists.txt", "message(STATUS hello)\n");

        let scanner = ProjectScanner::new(ScanConfig::new(dir.path().to_path_buf())).unwrap();
        let info = scanner.scan().unwrap();

        let expected = dir
            .path()
            .canonicalize()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        assert_eq!(info.name, expected);
        assert!(info.targets.is_empty());
        assert!(info.external_dependencies.is_empty());
        assert!(info.modules.is_empty());
    }

    #[test]
    fn test_sources_without_headers_are_dropped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "source/main.cc", "");

        let scanner = ProjectScanner::new(ScanConfig::new(dir.path().to_path_buf())).unwrap();
        let info = scanner.scan().unwrap();

        assert!(info.modules.is_empty());
        assert_eq!(info.metadata.files_scanned, 1);
    }

    #[test]
    fn test_project_ignore_rules_are_root_relative() {
        let dir = create_test_project();
        write(dir.path(), "include/vendor/json.hpp", "namespace nlohmann {}\n");
        write(dir.path(), "src/vendor/json.cpp", "");
        write(dir.path(), ".gitignore", "include/vendor/\n");
        let module_names = |config: ScanConfig| -> Vec<String> {
            let info = ProjectScanner::new(config).unwrap().scan().unwrap();
            info.modules.into_iter().map(|m| m.name).collect()
        };

        let root = dir.path().to_path_buf();
        assert_eq!(
            module_names(ScanConfig::new(root.clone())),
            vec!["netio", "root", "vendor"]
        );
        assert_eq!(
            module_names(ScanConfig::new(root.clone()).with_respect_gitignore(true)),
            vec!["netio", "root"]
        );

        let config = ScanConfig::new(root)
            .with_ignore_patterns(vec!["include/vendor/**".to_string(), "src/vendor".to_string()]);
        let info = ProjectScanner::new(config).unwrap().scan().unwrap();
        let names: Vec<&str> = info.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["netio", "root"]);
        assert_eq!(
            info.modules[0].sources,
            vec![PathBuf::from("main.cpp"), PathBuf::from("socket.cpp")]
        );
    }

    #[test]
    fn test_project_scan_is_repeatable() {
        let dir = create_test_project();
        let scanner = ProjectScanner::new(ScanConfig::new(dir.path().to_path_buf())).unwrap();

        let first = scanner.scan().unwrap();
        let second = scanner.scan().unwrap();
        assert_eq!(first.modules, second.modules);
        assert_eq!(first.targets, second.targets);
    }

    #[test]
    fn test_function_scan_relative_paths_and_order() {
        let dir = create_test_project();
        write(dir.path(), "include/legacy.h", "int readConfig(const char* path);\n");

        let config = ScanConfig::new(dir.path().join("include"));
        let scanner = FunctionScanner::new(config).unwrap();
        let functions = scanner.scan_functions().unwrap();

        let found: Vec<(&str, PathBuf)> = functions
            .iter()
            .map(|f| (f.qualified_name.as_str(), f.file.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("Socket::connect", PathBuf::from("netio/socket.hpp")),
                ("Socket::isOpen", PathBuf::from("netio/socket.hpp")),
                ("toInt", PathBuf::from("util.hpp")),
                ("readConfig", PathBuf::from("legacy.h")),
            ]
        );
    }

    #[test]
    fn test_function_report_is_ranked() {
        let dir = create_test_project();
        let scanner = FunctionScanner::new(ScanConfig::new(dir.path().join("include"))).unwrap();
        let report = scanner.scan().unwrap();

        let ranked: Vec<(&str, Priority, Category)> = report
            .functions
            .iter()
            .map(|f| (f.name.as_str(), f.priority, f.category))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("connect", Priority::P2, Category::Network),
                ("isOpen", Priority::P3, Category::Utility),
                ("toInt", Priority::P3, Category::Utility),
            ]
        );
        assert_eq!(report.stats.total, 3);
        assert_eq!(report.metadata.files_scanned, 3);
    }

    #[test]
    fn test_parallel_scan_matches_sequential() {
        let dir = create_test_project();
        for i in 0..8 {
            write(
                dir.path(),
                &format!("include/gen/file{}.hpp", i),
                &format!("class Gen{} {{ void handle{}(); }};\n", i, i),
            );
        }
        let root = dir.path().join("include");

        let sequential = FunctionScanner::new(ScanConfig::new(root.clone()))
            .unwrap()
            .scan_functions()
            .unwrap();
        let parallel = FunctionScanner::new(ScanConfig::new(root).with_threads(4))
            .unwrap()
            .scan_functions()
            .unwrap();

        assert_eq!(sequential, parallel);
    }
}
