//! Compiler-invocation rewriting.
//!
//! Derives the command line for an alternate tool (static analyzer,
//! clang-tidy, or compile-to-assembly) from the compile command recorded in
//! the database. The compiler-name substitution runs first, as a plain string
//! replacement; every other rule works on a quote-aware token list. The rule
//! order is load-bearing: later rules assume the layout earlier ones leave
//! behind.

use regex::{NoExpand, Regex};
use std::path::Path;
use std::sync::OnceLock;

/// Target of the rewrite.
#[derive(Debug, Clone, Copy)]
pub enum RewriteMode<'a> {
    /// Run the Clang static analyzer with text diagnostics.
    Analyze,
    /// Keep the compiler, but compile to assembly on standard output.
    AssemblyOnly,
    /// Run clang-tidy on the given source file.
    Lint(&'a Path),
}

const ANALYZER_PREFIX: &str = "clang++ --analyze -Xanalyzer -analyzer-output=text";

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap())
}

/// Leading compiler token, anything up to and including a `++` suffix.
/// Tolerates a quoted compiler path by eating the closing quote.
fn compiler_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"^.*?\+\+'?")
}

fn warning_flag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"^-W[a-z0-9-=]+$")
}

/// `-M`, `-MM`, `-MG`, `-MP`, `-MD`, `-MMD`: dependency generation without a
/// file argument.
fn dep_flag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"^-M(?:MD|[MGPD])?$")
}

/// `-MF`, `-MT`, `-MQ`: dependency generation flags that consume the next
/// argument.
fn dep_file_flag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"^-M[FTQ]$")
}

/// Rewrite one compile invocation for `mode`.
pub fn rewrite(invocation: &str, mode: RewriteMode) -> String {
    let replaced = match mode {
        RewriteMode::Analyze => compiler_regex()
            .replace(invocation, ANALYZER_PREFIX)
            .into_owned(),
        RewriteMode::Lint(path) => {
            let prefix = format!("clang-tidy {} --", path.display());
            compiler_regex()
                .replace(invocation, NoExpand(&prefix))
                .into_owned()
        }
        RewriteMode::AssemblyOnly => invocation.to_string(),
    };

    apply_token_rules(&replaced, mode)
}

/// Rules 2-7: strip or rewrite flags on the tokenized invocation.
fn apply_token_rules(args: &str, mode: RewriteMode) -> String {
    let assembly = matches!(mode, RewriteMode::AssemblyOnly);
    let mut out: Vec<String> = Vec::new();
    let mut tokens = tokenize(args).into_iter();

    while let Some(token) = tokens.next() {
        // Classification ignores single quotes; the database quotes paths
        // that contain shell metacharacters.
        let bare = token.trim_matches('\'');

        if bare == "-c" {
            if assembly {
                out.push("-S".to_string());
            }
        } else if bare == "-o" {
            // The output path goes with it.
            let _ = tokens.next();
            if assembly {
                out.push("-o-".to_string());
            }
        } else if bare == "-pipe" {
            // Rejected by some of the alternate tools.
        } else if warning_flag_regex().is_match(bare) {
            // The alternate tools carry their own warning configuration.
        } else if dep_flag_regex().is_match(bare) {
            // Meaningless without an object file being produced.
        } else if dep_file_flag_regex().is_match(bare) {
            let _ = tokens.next();
        } else {
            out.push(token);
        }
    }

    out.join(" ")
}

/// Split on whitespace, keeping single-quoted spans (quotes included) intact.
fn tokenize(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for ch in args.chars() {
        match ch {
            '\'' => {
                in_quote = !in_quote;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_quote => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
