//! Console output abstraction
//!
//! The coordinator writes the table and diagnostics through [`RunOutput`] so
//! runs can be observed in tests without capturing process streams.

use crate::classify::Severity;
use std::io::{Stderr, Stdout, Write};

/// Destination for run output
pub trait RunOutput: Send {
    /// Emit the rendered size table
    fn table(&mut self, rendered: &str);

    /// Emit one classification diagnostic
    fn diagnostic(&mut self, severity: Severity, line: &str);
}

/// Table and info lines to `out`, failures to `err`
#[derive(Debug)]
pub struct WriterOutput<O, E> {
    out: O,
    err: E,
}

impl<O, E> WriterOutput<O, E> {
    /// Create output over a pair of writers
    #[inline]
    #[must_use]
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// Recover the writers
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write + Send, E: Write + Send> RunOutput for WriterOutput<O, E> {
    fn table(&mut self, rendered: &str) {
        emit(&mut self.out, rendered);
    }

    fn diagnostic(&mut self, severity: Severity, line: &str) {
        match severity {
            Severity::Failure => emit(&mut self.err, line),
            Severity::Info => emit(&mut self.out, line),
        }
    }
}

/// Process stdout and stderr
pub type ConsoleOutput = WriterOutput<Stdout, Stderr>;

impl ConsoleOutput {
    /// Output to the process streams
    #[inline]
    #[must_use]
    pub fn console() -> Self {
        Self::new(std::io::stdout(), std::io::stderr())
    }
}

/// Write one line; a closed stream must not abort the run
fn emit(stream: &mut impl Write, text: &str) {
    if let Err(error) = writeln!(stream, "{text}") {
        tracing::debug!(%error, "dropped console output");
    }
}

/// Records output in memory, split by stream
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Lines that would go to stdout
    pub stdout: Vec<String>,
    /// Lines that would go to stderr
    pub stderr: Vec<String>,
}

impl CapturedOutput {
    /// Create empty capture
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunOutput for CapturedOutput {
    fn table(&mut self, rendered: &str) {
        self.stdout.push(rendered.to_string());
    }

    fn diagnostic(&mut self, severity: Severity, line: &str) {
        match severity {
            Severity::Failure => self.stderr.push(line.to_string()),
            Severity::Info => self.stdout.push(line.to_string()),
        }
    }
}
