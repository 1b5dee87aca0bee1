use crate::models::{FunctionReport, Priority, ProjectInfo};

/// Human-readable project topology
pub fn project_text(info: &ProjectInfo) -> String {
    let mut lines = vec![format!("Project: {}", info.name)];
    if !info.language_standard.is_empty() {
        lines.push(format!("C++ Standard: C++{}", info.language_standard));
    }

    lines.push(String::new());
    lines.push("Build Targets:".to_string());
    for target in &info.targets {
        lines.push(format!("  - [{}] {}", target.kind.as_str(), target.name));
    }

    lines.push(String::new());
    lines.push("Modules:".to_string());
    for module in &info.modules {
        lines.push(format!(
            "  - {} ({})",
            module.name,
            module.namespace.as_deref().unwrap_or("no namespace")
        ));
        lines.push(format!("    Headers: {} files", module.headers.len()));
        lines.push(format!("    Sources: {} files", module.sources.len()));
    }

    if !info.external_dependencies.is_empty() {
        lines.push(String::new());
        lines.push("External dependencies:".to_string());
        for dep in &info.external_dependencies {
            lines.push(format!("  - {}", dep));
        }
    }

    lines.join("\n")
}

/// Human-readable function inventory, one section per non-empty tier
pub fn functions_text(report: &FunctionReport) -> String {
    let mut lines = vec!["# Key Functions List".to_string(), String::new()];

    for priority in Priority::ALL {
        let mut group = report
            .functions
            .iter()
            .filter(|f| f.priority == priority)
            .peekable();
        if group.peek().is_none() {
            continue;
        }

        lines.push(format!("## {}: {}", priority, priority.title()));
        lines.push(String::new());

        for function in group {
            lines.push(format!(
                "- `{}` [{}:{}]",
                function.qualified_name,
                function.file.display(),
                function.line
            ));
            lines.push(format!("  - Signature: `{}`", function.signature_text));
            lines.push(format!("  - Category: {}", function.category));
            lines.push(String::new());
        }
    }

    lines.push("---".to_string());
    lines.push(format!("Total: {} functions", report.stats.total));
    for priority in Priority::ALL {
        lines.push(format!("  {}: {}", priority, report.stats.count(priority)));
    }

    lines.join("\n")
}
