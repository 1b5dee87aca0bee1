use crate::models::{BuildInfo, BuildTarget, TargetKind};
use crate::patterns;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Extract build facts from build script text.
///
/// Control flow is not evaluated; every textual declaration counts.
pub fn parse_build_script(content: &str) -> BuildInfo {
    let mut info = BuildInfo::default();

    if let Some(caps) = patterns::PROJECT.captures(content) {
        info.project_name = caps[1].to_string();
    }

    if let Some(caps) = patterns::CXX_STANDARD.captures(content) {
        info.language_standard = caps[1].to_string();
    }

    for caps in patterns::BUILD_TARGET.captures_iter(content) {
        if let Some(kind) = TargetKind::from_keyword(&caps[1]) {
            info.targets.push(BuildTarget::new(&caps[2], kind));
        }
    }

    info.external_dependencies = patterns::FIND_PACKAGE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect();

    info
}

/// Read and parse a build script. A missing or unreadable file yields an empty result.
pub fn read_build_file(path: &Path) -> BuildInfo {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Build file not readable");
            return BuildInfo::default();
        }
    };

    let content = String::from_utf8_lossy(&bytes);
    let info = parse_build_script(&content);
    debug!(
        path = %path.display(),
        targets = info.targets.len(),
        packages = info.external_dependencies.len(),
        "Parsed build file"
    );
    info
}
