//! clang-tidy invocation and output cleanup.

use crate::compile_commands::CompileCommand;
use crate::rewrite::{RewriteMode, rewrite};
use crate::shell;
use regex::Regex;
use std::sync::OnceLock;

/// Status lines clang-tidy always prints, findings or not. They would make
/// every file look like it had output, so they get filtered away.
fn noise_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^([0-9]+ warnings? (and [0-9]+ errors? )?generated\.|Suppressed [0-9]+ warnings? \([0-9]+ in non-user code(, [0-9]+ NOLINT)?\)\.|Use -header-filter=.* to display errors from all non-system headers\.)$",
        )
        .unwrap()
    })
}

/// Run clang-tidy on the file behind `command`. Returns the findings, empty
/// when the file is clean.
pub fn run_clang_tidy(command: &CompileCommand) -> String {
    // clang-tidy runs in the recorded working directory, so the file goes in
    // as the database recorded it, not as the store key.
    let invocation = rewrite(&command.invocation, RewriteMode::Lint(&command.file));
    let output = shell::run_capture(&invocation, &command.work_dir);
    strip_noise(&output)
}

fn strip_noise(output: &str) -> String {
    noise_regex().replace_all(output, "").trim().to_string()
}
