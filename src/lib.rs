//! # cxcheck - C/C++ source-tree checking driven by compile commands
//!
//! cxcheck reads the `compile_commands.json` a build system generates,
//! rewrites each compiler invocation into an alternate-tool invocation, and
//! runs the results in parallel across all CPU cores with a single ordered
//! progress line.
//!
//! ## What it runs
//!
//! - **Style check**: clang-tidy (per compile command), clang-format diff and
//!   include-guard verification per source file
//! - **Analyze**: the Clang static analyzer over every compiled file
//! - **Asm**: one file's compile command switched to assembly-on-stdout
//! - **Scene data**: checksum-verified download and extraction of large
//!   assets kept out of the repository
//!
//! ## Module Organization
//!
//! - [`compile_commands`] - Database loading and indexing
//! - [`rewrite`] - Invocation rewriting rules
//! - [`style`] / [`analyze`] - The concurrent check engines
//! - [`progress`] - Ordered console progress reporting

/// Static analysis over the compile-command database.
pub mod analyze;

/// Assembler output for a single source file.
pub mod asm;

/// Compile-command database loading.
pub mod compile_commands;

/// clang-format based formatting check.
pub mod format_check;

/// Include-guard verification for headers.
pub mod include_guard;

/// clang-tidy invocation and output cleanup.
pub mod lint;

/// Ordered console progress reporting.
pub mod progress;

/// Compiler-invocation rewriting.
pub mod rewrite;

/// Scene data download and extraction.
pub mod scenes;

/// Shell execution helpers.
pub mod shell;

/// The source-tree style check engine.
pub mod style;
