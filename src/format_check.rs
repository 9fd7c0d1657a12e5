//! clang-format based formatting check.
//!
//! Runs clang-format on a file's content and renders the line diff between
//! what is on disk and what the formatter wanted, one diagnostic block per
//! differing region.

use similar::{DiffOp, TextDiff};
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::thread;

/// Format-check `content` as read from `path`. Returns the rendered
/// diagnostic, empty when the file is already formatted. All tool failures
/// come back as diagnostic text too.
pub fn check(path: &Path, content: &str) -> String {
    let output = match format_content(content) {
        Ok(output) => output,
        Err(err) => {
            return format!("{}: error: failed to run clang-format: {}", path.display(), err);
        }
    };

    if !output.status.success() {
        // The formatter itself failed; its stderr is the diagnostic.
        return String::from_utf8_lossy(&output.stderr).into_owned();
    }

    let formatted = String::from_utf8_lossy(&output.stdout);
    diff_diagnostics(path, content, &formatted)
}

fn format_content(content: &str) -> io::Result<Output> {
    let mut child = Command::new("clang-format")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    // Feed stdin from a separate thread so a large formatted output cannot
    // deadlock against a full pipe buffer.
    let mut stdin = child.stdin.take().expect("stdin is piped");
    let owned = content.to_string();
    let writer = thread::spawn(move || {
        let _ = stdin.write_all(owned.as_bytes());
    });

    let output = child.wait_with_output()?;
    let _ = writer.join();

    Ok(output)
}

/// Line-diff `original` against `formatted` with zero context and render one
/// block per replace/insert/delete region, ordered by original line number.
fn diff_diagnostics(path: &Path, original: &str, formatted: &str) -> String {
    let diff = TextDiff::from_lines(original, formatted);
    let formatted_lines: Vec<&str> = formatted.split_inclusive('\n').collect();
    let mut out = String::new();

    for group in diff.grouped_ops(0) {
        for op in group {
            match op {
                DiffOp::Replace {
                    old_index,
                    new_index,
                    new_len,
                    ..
                }
                | DiffOp::Insert {
                    old_index,
                    new_index,
                    new_len,
                } => {
                    out.push_str(&format!(
                        "{}:{}: error: wrong format, change to:\n",
                        path.display(),
                        old_index + 1
                    ));
                    for line in &formatted_lines[new_index..new_index + new_len] {
                        out.push_str(line);
                    }
                }
                DiffOp::Delete { old_index, .. } => {
                    out.push_str(&format!(
                        "{}:{}: error: remove white space\n",
                        path.display(),
                        old_index + 1
                    ));
                }
                DiffOp::Equal { .. } => {}
            }
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag(original: &str, formatted: &str) -> String {
        diff_diagnostics(Path::new("src/a.cpp"), original, formatted)
    }

    #[test]
    fn test_identical_content_has_no_diagnostic() {
        assert_eq!(diag("int main() {}\n", "int main() {}\n"), "");
    }

    #[test]
    fn test_inserted_blank_line_reports_wrong_format() {
        let out = diag("int a;\nint b;\n", "int a;\n\nint b;\n");
        assert_eq!(out, "src/a.cpp:2: error: wrong format, change to:");
    }

    #[test]
    fn test_replaced_line_includes_replacement() {
        let out = diag("int  x ;\n", "int x;\n");
        assert_eq!(out, "src/a.cpp:1: error: wrong format, change to:\nint x;");
    }

    #[test]
    fn test_deleted_line_reports_remove_white_space() {
        let out = diag("int a;\n\nint b;\n", "int a;\nint b;\n");
        assert_eq!(out, "src/a.cpp:2: error: remove white space");
    }

    #[test]
    fn test_regions_ordered_by_original_line() {
        let original = "int  a ;\nint b;\nint c;\nint  d ;\n";
        let formatted = "int a;\nint b;\nint c;\nint d;\n";
        let out = diag(original, formatted);

        let first = out.find("src/a.cpp:1:").unwrap();
        let second = out.find("src/a.cpp:4:").unwrap();
        assert!(first < second);
    }
}
