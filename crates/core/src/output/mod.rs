mod json;
mod text;
mod yaml;

pub use json::to_json;
pub use text::{functions_text, project_text};
pub use yaml::to_yaml;

use crate::models::{FunctionReport, ProjectInfo};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Text,
}

/// Format a project topology report
pub fn format_project(info: &ProjectInfo, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(info),
        OutputFormat::Yaml => to_yaml(info),
        OutputFormat::Text => Ok(project_text(info)),
    }
}

/// Format a ranked function report
pub fn format_functions(report: &FunctionReport, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Yaml => to_yaml(report),
        OutputFormat::Text => Ok(functions_text(report)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}
