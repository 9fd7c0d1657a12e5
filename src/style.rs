//! Source-tree style check.
//!
//! Enumerates the checked subtrees, resolves each file to its compile command
//! and runs clang-tidy, the include-guard check and the clang-format check
//! per file on a rayon worker pool. Results stream through the progress
//! printer in completion order; the printed counts stay ordered regardless.

use crate::compile_commands::{CompileCommand, read_compile_commands};
use crate::format_check;
use crate::include_guard;
use crate::lint;
use crate::progress::ProgressPrinter;
use anyhow::Result;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subtrees of the source root that are style-checked.
const SOURCE_SUBDIRS: &[&str] = &["src"];

/// Recognized source file suffixes. `.h.in` is a double extension, so these
/// match against the whole file name.
const SOURCE_SUFFIXES: &[&str] = &[".cpp", ".h", ".h.in"];

/// Enumerate checkable files under `source_dir`, as sorted relative paths.
/// Sorting keeps the dispatch order independent of filesystem iteration
/// order.
pub fn find_source_paths(source_dir: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for subdir in SOURCE_SUBDIRS {
        for entry in WalkDir::new(source_dir.join(subdir))
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if SOURCE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
                && let Ok(rel) = entry.path().strip_prefix(source_dir)
            {
                paths.push(rel.to_path_buf());
            }
        }
    }

    paths.sort();
    paths
}

/// Style-check the whole tree. Returns whether any file produced output.
pub fn style_check(source_dir: &Path, build_dir: &Path, guard_prefix: &str) -> Result<bool> {
    let paths = find_source_paths(source_dir);
    let commands = read_compile_commands(source_dir, build_dir)?;

    let printer = ProgressPrinter::new();
    printer.start("Checking source", paths.len());

    let found_issues = paths
        .par_iter()
        .map(|path| {
            let result = check_file(source_dir, path, commands.get(path), guard_prefix);
            printer.result(&result);
            !result.is_empty()
        })
        .reduce(|| false, |a, b| a || b);

    Ok(found_issues)
}

/// All checks for one file, joined into one result string. A file without a
/// compile command is still guard- and format-checked; template-only headers
/// are never compiled directly.
fn check_file(
    source_dir: &Path,
    path: &Path,
    command: Option<&CompileCommand>,
    guard_prefix: &str,
) -> String {
    let content = match fs::read_to_string(source_dir.join(path)) {
        Ok(content) => content,
        Err(err) => return format!("{}: error: {}", path.display(), err),
    };

    let mut outputs = Vec::new();
    if let Some(command) = command {
        outputs.push(lint::run_clang_tidy(command));
    }
    outputs.push(include_guard::check(path, &content, guard_prefix));
    outputs.push(format_check::check(path, &content));

    outputs.retain(|output| !output.is_empty());
    outputs.join("\n")
}
