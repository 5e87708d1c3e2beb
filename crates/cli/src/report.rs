//! Operator-facing check output.
//!
//! Checks write their ✓/✗ diagnostics through a [`Reporter`] rather than
//! printing directly, so the same checks drive stdout in the binary and an
//! in-memory buffer in tests. Logs go through `tracing` separately.

/// Width of the `=` rule around banners.
const RULE_WIDTH: usize = 60;

/// Sink for check diagnostics.
///
/// Implementors only provide [`Reporter::line`]; the provided methods fix
/// the formatting so every sink renders identical text.
pub trait Reporter {
    /// Emit one rendered line.
    fn line(&mut self, line: String);

    /// A title framed by `=` rules.
    fn banner(&mut self, title: &str) {
        let rule = "=".repeat(RULE_WIDTH);
        self.line(rule.clone());
        self.line(title.to_owned());
        self.line(rule);
    }

    /// Start of a check, preceded by a blank line.
    fn section(&mut self, title: &str) {
        self.line(String::new());
        self.line(title.to_owned());
    }

    /// A passed condition.
    fn pass(&mut self, message: &str) {
        self.line(format!("✓ {message}"));
    }

    /// A failed condition.
    fn fail(&mut self, message: &str) {
        self.line(format!("✗ {message}"));
    }

    /// Supporting detail for the preceding line.
    fn detail(&mut self, message: &str) {
        self.line(format!("  {message}"));
    }
}

/// Writes diagnostics to standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    #[allow(clippy::print_stdout)]
    fn line(&mut self, line: String) {
        println!("{line}");
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    lines: Vec<String>,
}

impl MemoryReporter {
    /// Create an empty reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Every line emitted so far.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn line(&mut self, line: String) {
        self.lines.push(line);
    }
}
