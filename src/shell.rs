//! Shell execution of rewritten invocations.
//!
//! Compile commands come out of the database as full shell command lines,
//! quoting included, so they run through `sh -c` in the recorded working
//! directory rather than being re-parsed into argv.

use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Run `command` and capture stdout and stderr as one merged string.
/// A command that cannot be started becomes diagnostic text; nothing here
/// ever crosses a task boundary as an error.
pub fn run_capture(command: &str, work_dir: &Path) -> String {
    let output = Command::new("sh")
        .args(["-c", command])
        .current_dir(work_dir)
        .stdin(Stdio::null())
        .output();

    match output {
        Ok(output) => {
            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&stderr);
            }
            text
        }
        Err(err) => format!("error: failed to run `{}`: {}", command, err),
    }
}

/// Run `command` with inherited stdio; used when the tool's output should go
/// straight to the console.
pub fn run_inherit(command: &str, work_dir: &Path) -> std::io::Result<ExitStatus> {
    Command::new("sh")
        .args(["-c", command])
        .current_dir(work_dir)
        .status()
}
