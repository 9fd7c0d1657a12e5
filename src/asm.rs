//! Assembler output for a single source file.
//!
//! Looks up the file's compile command, switches it to compile-to-assembly
//! with output on stdout, and runs it with inherited stdio.

use crate::compile_commands::find_command_for_file;
use crate::rewrite::{RewriteMode, rewrite};
use crate::shell;
use anyhow::{Context, Result, bail};
use std::path::Path;

pub fn print_assembler(build_dir: &Path, source_file: &Path) -> Result<()> {
    let command = find_command_for_file(build_dir, source_file)?
        .with_context(|| format!("do not know how to compile {}", source_file.display()))?;

    let invocation = rewrite(&command.invocation, RewriteMode::AssemblyOnly);
    let status = shell::run_inherit(&invocation, &command.work_dir)
        .with_context(|| format!("failed to run `{}`", invocation))?;

    if !status.success() {
        bail!("compiler command for outputting assembler failed");
    }

    Ok(())
}
