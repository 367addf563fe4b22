//! Line-oriented report output
//!
//! Probes write their findings as they go, so the report is a single stream
//! in probe order. Write errors (e.g. a closed pipe) are ignored; the exit
//! code still carries the result.

use crate::outcome::Outcome;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Width of the `=` rules framing the report
pub const RULE_WIDTH: usize = 60;

pub struct Console {
    out: Box<dyn Write + Send>,
    verbose: bool,
}

impl Console {
    pub fn new(out: Box<dyn Write + Send>, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn stdout(verbose: bool) -> Self {
        Self::new(Box::new(io::stdout()), verbose)
    }

    /// Console writing into memory, with a handle to read it back
    pub fn capture(verbose: bool) -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        (Self::new(Box::new(captured.clone()), verbose), captured)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    pub fn blank(&mut self) {
        let _ = writeln!(self.out);
    }

    pub fn rule(&mut self) {
        self.line("=".repeat(RULE_WIDTH));
    }

    /// Top-level finding prefixed with the outcome symbol
    pub fn outcome(&mut self, outcome: Outcome, message: impl AsRef<str>) {
        let _ = writeln!(self.out, "{} {}", outcome.symbol(), message.as_ref());
    }

    pub fn pass(&mut self, message: impl AsRef<str>) {
        self.outcome(Outcome::Pass, message);
    }

    pub fn fail(&mut self, message: impl AsRef<str>) {
        self.outcome(Outcome::Fail, message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.outcome(Outcome::Indeterminate, message);
    }

    /// Indented supporting line
    pub fn detail(&mut self, message: impl AsRef<str>) {
        let _ = writeln!(self.out, "   {}", message.as_ref());
    }

    /// Indented line shown only with `--verbose`
    pub fn verbose(&mut self, message: impl AsRef<str>) {
        if self.verbose {
            self.detail(message);
        }
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

/// Shared in-memory sink behind [`Console::capture`]
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let buffer = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
