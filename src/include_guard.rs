//! Include-guard verification for headers.
//!
//! Every header must carry an `#ifndef`/`#define`/`#endif // ` triad whose
//! name is derived from the file's path under the source root. Only `.h` and
//! `.h.in` files are checked.

use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Structural shape of a guarded header: optional leading whitespace and
/// comments, the guard triad, nothing after the trailing `#endif` comment.
fn guard_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?s)^(?:\s*|/\*.*?\*/|//[^\n]*)*#ifndef\s+(\S*)\s*\n\s*#define\s(\S*).*\n.*#endif\s+//\s+(\S*)\s*$",
        )
        .unwrap()
    })
}

/// Check `content` of the header at `path` against its canonical guard name.
/// Returns the rendered diagnostic, empty when the guard is correct or the
/// file is not a header.
pub fn check(path: &Path, content: &str, prefix: &str) -> String {
    if !is_header(path) {
        return String::new();
    }

    let Some(caps) = guard_regex().captures(content) else {
        return format!("{}: error: missing include guard", path.display());
    };

    let guard = guard_name(path, prefix);
    let mut errors = Vec::new();

    for group in 1..=3 {
        if let Some(found) = caps.get(group)
            && found.as_str() != guard
        {
            let (line, column) = index_to_line_column(content, found.start());
            errors.push(format!(
                "{}:{}:{}: error: include guard name should be {}",
                path.display(),
                line,
                column,
                guard
            ));
        }
    }

    errors.join("\n")
}

fn is_header(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.ends_with(".h") || name.ends_with(".h.in")
}

/// `src/foo/bar.h` with prefix `PROJECT` becomes `PROJECT_FOO_BAR_H`.
/// Template-instantiated headers drop the `.in` before the real extension.
fn guard_name(path: &Path, prefix: &str) -> String {
    let rel = path.strip_prefix("src").unwrap_or(path);

    let mut stem = rel.with_extension("");
    if rel.extension().is_some_and(|ext| ext == "in") {
        stem = stem.with_extension("");
    }

    let joined = stem
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("_");

    format!("{}_{}_H", prefix, joined.to_uppercase())
}

/// 1-based line and column of a byte index, found by walking line lengths.
fn index_to_line_column(content: &str, index: usize) -> (usize, usize) {
    let mut line = 1;
    let mut remaining = index;

    for length in content.split_inclusive('\n').map(str::len) {
        if remaining < length {
            return (line, remaining + 1);
        }
        remaining -= length;
        line += 1;
    }

    (line, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = "#ifndef PROJECT_FOO_BAR_H\n\
                        #define PROJECT_FOO_BAR_H\n\
                        int f();\n\
                        #endif // PROJECT_FOO_BAR_H\n";

    #[test]
    fn test_correct_guard_has_no_diagnostic() {
        assert_eq!(check(Path::new("foo/bar.h"), GOOD, "PROJECT"), "");
    }

    #[test]
    fn test_leading_comments_are_allowed() {
        let content = format!("// Copyright notice.\n/* block\n   comment */\n\n{}", GOOD);
        assert_eq!(check(Path::new("foo/bar.h"), &content, "PROJECT"), "");
    }

    #[test]
    fn test_define_line_may_have_trailing_tokens() {
        let content = "#ifndef PROJECT_FOO_BAR_H\n\
                       #define PROJECT_FOO_BAR_H 1\n\
                       #endif // PROJECT_FOO_BAR_H\n";
        assert_eq!(check(Path::new("foo/bar.h"), content, "PROJECT"), "");
    }

    #[test]
    fn test_missing_guard() {
        assert_eq!(
            check(Path::new("foo/bar.h"), "int f();\n", "PROJECT"),
            "foo/bar.h: error: missing include guard"
        );
    }

    #[test]
    fn test_wrong_ifndef_name_reports_line_and_column() {
        let content = GOOD.replacen("#ifndef PROJECT_FOO_BAR_H", "#ifndef WRONG_H", 1);
        assert_eq!(
            check(Path::new("foo/bar.h"), &content, "PROJECT"),
            "foo/bar.h:1:9: error: include guard name should be PROJECT_FOO_BAR_H"
        );
    }

    #[test]
    fn test_wrong_define_name_reports_line_and_column() {
        let content = GOOD.replacen("#define PROJECT_FOO_BAR_H", "#define WRONG_H", 1);
        assert_eq!(
            check(Path::new("foo/bar.h"), &content, "PROJECT"),
            "foo/bar.h:2:9: error: include guard name should be PROJECT_FOO_BAR_H"
        );
    }

    #[test]
    fn test_wrong_endif_name_reports_line_and_column() {
        let content = GOOD.replacen("#endif // PROJECT_FOO_BAR_H", "#endif // WRONG_H", 1);
        assert_eq!(
            check(Path::new("foo/bar.h"), &content, "PROJECT"),
            "foo/bar.h:4:11: error: include guard name should be PROJECT_FOO_BAR_H"
        );
    }

    #[test]
    fn test_non_header_is_ignored() {
        assert_eq!(check(Path::new("foo/bar.cpp"), "int f();\n", "PROJECT"), "");
    }

    #[test]
    fn test_guard_name_strips_source_root() {
        assert_eq!(guard_name(Path::new("src/foo/bar.h"), "PROJECT"), "PROJECT_FOO_BAR_H");
    }

    #[test]
    fn test_guard_name_strips_secondary_in_extension() {
        assert_eq!(guard_name(Path::new("src/config.h.in"), "PROJECT"), "PROJECT_CONFIG_H");
    }

    #[test]
    fn test_index_to_line_column() {
        assert_eq!(index_to_line_column("ab\ncd\n", 0), (1, 1));
        assert_eq!(index_to_line_column("ab\ncd\n", 4), (2, 2));
        assert_eq!(index_to_line_column("ab\ncd\n", 6), (3, 1));
    }
}
