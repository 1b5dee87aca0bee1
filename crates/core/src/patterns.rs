use once_cell::sync::Lazy;
use regex::Regex;

/// `project(Name ...)`, case-insensitive
pub static PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)project\s*\(\s*(\w+)").expect("Invalid project regex")
});

/// `CMAKE_CXX_STANDARD 17`
pub static CXX_STANDARD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"CMAKE_CXX_STANDARD\s+(\d+)").expect("Invalid C++ standard regex")
});

/// `add_executable(name ...)` / `add_library(name ...)`, case-insensitive
pub static BUILD_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)add_(executable|library)\s*\(\s*(\w+)").expect("Invalid build target regex")
});

/// `find_package(Name ...)`, case-insensitive
pub static FIND_PACKAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)find_package\s*\(\s*(\w+)").expect("Invalid find_package regex")
});

/// `namespace a::b {`
pub static NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"namespace\s+(\w+(?:::\w+)*)\s*\{").expect("Invalid namespace regex")
});

/// `class Name : public Base {` / `struct Name {`
pub static TYPE_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:class|struct)\s+(\w+)\s*(?::\s*[^{]+)?\s*\{").expect("Invalid type regex")
});

/// Function-like declaration over unparsed text. Templates, macros and
/// preprocessor conditionals are not resolved.
///
/// Groups: 1 = return type run, 2 = name (may start with `~`), 3 = parameter
/// text without nested parentheses. The return type starts on a non-blank
/// character and stays on one line, so the match offset lands on the
/// declaration line and access labels (`public:`) are not folded into it.
pub static FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        (?:virtual\s+)?
        (?:static\s+)?
        (?:inline\s+)?
        ([\w:<>,*&][\w:<>,*&\x20\t]*?)
        \s+
        ([\w~]+)
        \s*
        \(([^)]*)\)
        \s*
        (?:const)?
        (?:\s*noexcept)?
        (?:\s*override)?
        \s*
        (?:;|=|\{)
        ",
    )
    .expect("Invalid function regex")
});

/// Calculate 1-indexed line number from byte offset.
pub fn line_number(content: &str, byte_offset: usize) -> usize {
    content[..byte_offset].matches('\n').count() + 1
}
