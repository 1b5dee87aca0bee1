use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Kind of build unit declared in the build script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Executable,
    Library,
}

impl TargetKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_lowercase().as_str() {
            "executable" => Some(TargetKind::Executable),
            "library" => Some(TargetKind::Library),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Executable => "executable",
            TargetKind::Library => "library",
        }
    }
}

/// A build target (`add_executable` / `add_library`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    pub name: String,
    pub kind: TargetKind,
    /// Never filled by the build script extractor
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

impl BuildTarget {
    pub fn new(name: impl Into<String>, kind: TargetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            sources: Vec::new(),
        }
    }
}

/// Facts recovered from a single build-description file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub project_name: String,
    pub language_standard: String,
    pub targets: Vec<BuildTarget>,
    pub external_dependencies: Vec<String>,
}

/// A module inferred from the top-level directory of the headers root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    /// First namespace found among this module's headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Header paths relative to the headers root
    pub headers: Vec<PathBuf>,
    /// Source paths relative to the sources root
    pub sources: Vec<PathBuf>,
    pub dependencies: Vec<String>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            headers: Vec::new(),
            sources: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

/// Project topology summary for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project root path
    pub root: PathBuf,
    pub name: String,
    pub language_standard: String,
    pub targets: Vec<BuildTarget>,
    pub modules: Vec<Module>,
    pub external_dependencies: Vec<String>,
    /// Scan metadata
    pub metadata: ScanMetadata,
}

/// Priority tier assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::P0, Priority::P1, Priority::P2, Priority::P3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }

    /// Heading used by the text report
    pub fn title(&self) -> &'static str {
        match self {
            Priority::P0 => "Protocol/Parsing (Highest Priority)",
            Priority::P1 => "Core Business",
            Priority::P2 => "Network I/O",
            Priority::P3 => "Utilities",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "P0" => Some(Priority::P0),
            "P1" => Some(Priority::P1),
            "P2" => Some(Priority::P2),
            "P3" => Some(Priority::P3),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Functional category assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Protocol,
    Business,
    Network,
    Utility,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Protocol => "protocol",
            Category::Business => "business",
            Category::Network => "network",
            Category::Utility => "utility",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function or method declaration found in a header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    /// `Type::name` when declared after a class/struct, otherwise `name`
    pub qualified_name: String,
    pub file: PathBuf,
    /// 1-based line of the match start
    pub line: usize,
    pub signature_text: String,
    pub return_type: String,
    pub priority: Priority,
    pub category: Category,
}

/// Per-tier counts for a function inventory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionStats {
    pub total: usize,
    pub p0: usize,
    pub p1: usize,
    pub p2: usize,
    pub p3: usize,
}

impl FunctionStats {
    pub fn tally(functions: &[FunctionInfo]) -> Self {
        let mut stats = FunctionStats {
            total: functions.len(),
            ..Default::default()
        };

        for function in functions {
            match function.priority {
                Priority::P0 => stats.p0 += 1,
                Priority::P1 => stats.p1 += 1,
                Priority::P2 => stats.p2 += 1,
                Priority::P3 => stats.p3 += 1,
            }
        }

        stats
    }

    pub fn count(&self, priority: Priority) -> usize {
        match priority {
            Priority::P0 => self.p0,
            Priority::P1 => self.p1,
            Priority::P2 => self.p2,
            Priority::P3 => self.p3,
        }
    }
}

/// Ranked function inventory handed to the formatters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionReport {
    /// Directory the headers were scanned from
    pub root: PathBuf,
    pub functions: Vec<FunctionInfo>,
    pub stats: FunctionStats,
    pub metadata: ScanMetadata,
}

impl FunctionReport {
    /// Sort by `(priority, category, name)` and tally the tiers.
    ///
    /// The sort is stable, so declarations with equal keys keep scan order.
    pub fn ranked(root: PathBuf, mut functions: Vec<FunctionInfo>, metadata: ScanMetadata) -> Self {
        functions.sort_by(|a, b| {
            (a.priority, a.category.as_str(), a.name.as_str()).cmp(&(
                b.priority,
                b.category.as_str(),
                b.name.as_str(),
            ))
        });
        let stats = FunctionStats::tally(&functions);

        Self {
            root,
            functions,
            stats,
            metadata,
        }
    }

    /// Keep only the given tiers. Stats are recomputed.
    pub fn filter_to_priorities(&self, priorities: &[Priority]) -> Self {
        let functions: Vec<FunctionInfo> = self
            .functions
            .iter()
            .filter(|f| priorities.contains(&f.priority))
            .cloned()
            .collect();
        let stats = FunctionStats::tally(&functions);

        FunctionReport {
            root: self.root.clone(),
            functions,
            stats,
            metadata: self.metadata.clone(),
        }
    }
}

/// Scan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_duration_ms: u64,
    pub files_scanned: usize,
    pub timestamp: String,
    pub tool_version: String,
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            scan_duration_ms: 0,
            files_scanned: 0,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
