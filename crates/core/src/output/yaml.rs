use super::FormatError;
use serde::Serialize;

/// Serialize a report to YAML
pub fn to_yaml<T: Serialize>(report: &T) -> Result<String, FormatError> {
    serde_yaml::to_string(report).map_err(FormatError::from)
}
