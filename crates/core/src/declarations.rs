use crate::classifier::Classifier;
use crate::models::FunctionInfo;
use crate::patterns::{self, line_number};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extract declarations from header text.
///
/// Each declaration is attributed to the nearest preceding `class`/`struct`.
/// Scope closure is not tracked, so a free function declared after a class
/// body is still reported as a member of that class.
///
/// `file` is recorded as given; callers walking a directory rewrite it to the
/// path relative to their root.
pub fn extract_declarations(
    content: &str,
    file: &Path,
    classifier: &Classifier,
) -> Vec<FunctionInfo> {
    let mut functions = Vec::new();
    let type_decls = type_declarations(content);

    for caps in patterns::FUNCTION.captures_iter(content) {
        let (Some(whole), Some(ret), Some(name), Some(params)) =
            (caps.get(0), caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };

        let return_type = ret.as_str().trim();
        let name = name.as_str().trim();
        let params = params.as_str().trim();

        // Destructors and constructors
        if name.starts_with('~') || return_type == name {
            continue;
        }

        if name.starts_with("operator") {
            continue;
        }

        let start = whole.start();
        let qualified_name = match enclosing_type(&type_decls, start) {
            Some(class_name) => format!("{}::{}", class_name, name),
            None => name.to_string(),
        };
        let (priority, category) = classifier.classify(name);

        functions.push(FunctionInfo {
            name: name.to_string(),
            qualified_name,
            file: file.to_path_buf(),
            line: line_number(content, start),
            signature_text: format!("{} {}({})", return_type, name, params),
            return_type: return_type.to_string(),
            priority,
            category,
        });
    }

    functions
}

/// `(end offset, type name)` of every type declaration, in text order
fn type_declarations(content: &str) -> Vec<(usize, &str)> {
    patterns::TYPE_DECL
        .captures_iter(content)
        .filter_map(|caps| Some((caps.get(0)?.end(), caps.get(1)?.as_str())))
        .collect()
}

/// Name of the last type declaration that completes at or before `offset`
fn enclosing_type<'a>(type_decls: &[(usize, &'a str)], offset: usize) -> Option<&'a str> {
    let idx = type_decls.partition_point(|&(end, _)| end <= offset);
    idx.checked_sub(1).map(|i| type_decls[i].1)
}

/// Read a header and extract its declarations, recorded under its file name.
///
/// Unreadable files contribute nothing.
pub fn extract_file(path: &Path, classifier: &Classifier) -> Vec<FunctionInfo> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping unreadable header");
            return Vec::new();
        }
    };

    let file_name = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| path.to_path_buf());

    extract_declarations(&String::from_utf8_lossy(&bytes), &file_name, classifier)
}

/// Extract declarations from a header and record them under `relative`
pub fn extract_relative(path: &Path, relative: &Path, classifier: &Classifier) -> Vec<FunctionInfo> {
    let mut functions = extract_file(path, classifier);
    for function in &mut functions {
        function.file = relative.to_path_buf();
    }
    functions
}
