//! Ordered console progress reporting.
//!
//! Tasks finish on worker threads in whatever order they like; all of their
//! results funnel through one [`ProgressPrinter`], which owns the running
//! count and the single status line. The printed counts are therefore always
//! 1, 2, ..., N no matter which task finished when.

use std::io::{self, Write};
use std::sync::Mutex;

pub struct ProgressPrinter<W: Write = io::Stdout> {
    inner: Mutex<State<W>>,
}

struct State<W> {
    writer: W,
    label: String,
    count: usize,
    total: usize,
}

impl ProgressPrinter<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for ProgressPrinter<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ProgressPrinter<W> {
    pub fn with_writer(writer: W) -> Self {
        Self {
            inner: Mutex::new(State {
                writer,
                label: String::new(),
                count: 0,
                total: 0,
            }),
        }
    }

    /// Announce a new run of `total` tasks and print the initial status line.
    pub fn start(&self, label: &str, total: usize) {
        let mut state = self.inner.lock().unwrap();
        state.label = label.to_string();
        state.count = 0;
        state.total = total;
        state.print_status();
    }

    /// Record one finished task. A non-empty result is printed on its own
    /// lines above the status line.
    pub fn result(&self, text: &str) {
        let mut state = self.inner.lock().unwrap();
        state.count += 1;
        if !text.is_empty() {
            let _ = write!(state.writer, "\r{}\n", text);
        }
        state.print_status();
    }

    /// Tear down the printer and hand back its sink. Test use.
    #[cfg(test)]
    fn into_writer(self) -> W {
        self.inner.into_inner().unwrap().writer
    }
}

impl<W: Write> State<W> {
    fn print_status(&mut self) {
        let trailing = if self.count == self.total {
            ". Done.\n"
        } else {
            "..."
        };
        let _ = write!(
            self.writer,
            "\r[{}/{}] {}{}",
            self.count, self.total, self.label, trailing
        );
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(printer: ProgressPrinter<Vec<u8>>) -> String {
        String::from_utf8(printer.into_writer()).unwrap()
    }

    #[test]
    fn test_counts_are_sequential() {
        let printer = ProgressPrinter::with_writer(Vec::new());
        printer.start("Checking source", 3);
        for _ in 0..3 {
            printer.result("");
        }

        let output = printed(printer);
        assert!(output.contains("[0/3] Checking source..."));
        assert!(output.contains("[1/3] Checking source..."));
        assert!(output.contains("[2/3] Checking source..."));
        assert!(output.contains("[3/3] Checking source. Done.\n"));
    }

    #[test]
    fn test_final_line_is_done_sentinel() {
        let printer = ProgressPrinter::with_writer(Vec::new());
        printer.start("Analyzing source", 1);
        printer.result("");

        let output = printed(printer);
        assert!(output.ends_with("[1/1] Analyzing source. Done.\n"));
    }

    #[test]
    fn test_nonempty_result_printed_before_status() {
        let printer = ProgressPrinter::with_writer(Vec::new());
        printer.start("Checking source", 2);
        printer.result("src/a.h: error: missing include guard");
        printer.result("");

        let output = printed(printer);
        assert!(output.contains("\rsrc/a.h: error: missing include guard\n\r[1/2]"));
        assert!(output.ends_with("[2/2] Checking source. Done.\n"));
    }

    #[test]
    fn test_zero_tasks_is_done_immediately() {
        let printer = ProgressPrinter::with_writer(Vec::new());
        printer.start("Checking source", 0);
        assert!(printed(printer).ends_with("[0/0] Checking source. Done.\n"));
    }

    #[test]
    fn test_shared_across_threads() {
        let printer = ProgressPrinter::with_writer(Vec::new());
        printer.start("Checking source", 8);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| printer.result(""));
            }
        });

        let output = printed(printer);
        for count in 1..=8 {
            assert!(output.contains(&format!("[{}/8]", count)));
        }
        assert!(output.ends_with("[8/8] Checking source. Done.\n"));
    }
}
