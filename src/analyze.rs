//! Static analysis over the compile-command database.
//!
//! Unlike the style check this is database-driven, not filesystem-driven:
//! every compiled file gets its invocation rewritten for the Clang static
//! analyzer and executed, in parallel.

use crate::compile_commands::{CompileCommand, read_compile_commands};
use crate::progress::ProgressPrinter;
use crate::rewrite::{RewriteMode, rewrite};
use crate::shell;
use anyhow::Result;
use rayon::prelude::*;
use std::path::Path;

/// Analyze every entry of the database. Returns whether any analyzer output
/// was produced.
pub fn analyze(source_dir: &Path, build_dir: &Path) -> Result<bool> {
    let commands = read_compile_commands(source_dir, build_dir)?;
    let commands: Vec<&CompileCommand> = commands.values().collect();

    let printer = ProgressPrinter::new();
    printer.start("Analyzing source", commands.len());

    let found_issues = commands
        .par_iter()
        .map(|command| {
            let invocation = rewrite(&command.invocation, RewriteMode::Analyze);
            let output = shell::run_capture(&invocation, &command.work_dir)
                .trim()
                .to_string();
            printer.result(&output);
            !output.is_empty()
        })
        .reduce(|| false, |a, b| a || b);

    Ok(found_issues)
}
