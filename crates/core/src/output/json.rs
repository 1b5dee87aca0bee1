use super::FormatError;
use serde::Serialize;

/// Serialize a report to pretty-printed JSON
pub fn to_json<T: Serialize>(report: &T) -> Result<String, FormatError> {
    serde_json::to_string_pretty(report).map_err(FormatError::from)
}
