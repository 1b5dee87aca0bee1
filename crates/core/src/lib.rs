//! MTA Rust CppMap Core Library
//!
//! Heuristic, text-level analysis of C++ projects: build topology from the
//! CMake script, header modules inferred from the directory layout, and a
//! prioritized inventory of the functions declared in the headers.
//!
//! # Features
//!
//! - Extract project name, C++ standard, targets and packages from `CMakeLists.txt`
//! - Group headers into modules by their top-level directory
//! - Find function declarations in headers and attribute them to the nearest class
//! - Rank functions into priority tiers by name keywords
//! - Output results as JSON, YAML or plain text
//!
//! # Example
//!
//! ```no_run
//! use mta_rust_cppmap_core::{format_project, OutputFormat, ProjectScanner, ScanConfig};
//! use std::path::PathBuf;
//!
//! let config = ScanConfig::new(PathBuf::from("."));
//! let scanner = ProjectScanner::new(config).unwrap();
//! let info = scanner.scan().unwrap();
//!
//! let text = format_project(&info, OutputFormat::Text).unwrap();
//! println!("{}", text);
//! ```

pub mod analyzer;
pub mod build;
pub mod classifier;
pub mod config;
pub mod declarations;
pub mod models;
pub mod output;
pub mod patterns;
pub mod tree;

// Re-exports for convenience
pub use analyzer::{FunctionScanner, ProjectScanner, ScanError};
pub use classifier::{Classifier, KeywordGroup};
pub use config::{ConfigError, ConfigFile, ScanConfig};
pub use models::*;
pub use output::{format_functions, format_project, FormatError, OutputFormat};
