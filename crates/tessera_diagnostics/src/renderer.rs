//! Diagnostic rendering backends for human-readable and machine-readable output.

use colored::{Color, Colorize};

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// error[P003]: assignment solver failed: time limit exceeded
///   --> CR_X0Y0_To_CR_X1Y3 <-> CR_X2Y0_To_CR_X3Y3
///    = note: ...
///    = help: ...
/// ```
pub struct TerminalRenderer {
    /// Whether to color severity headers.
    pub color: bool,
    /// The terminal width; long subjects are truncated to fit.
    pub width: u16,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool, width: u16) -> Self {
        Self { color, width }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let color = match severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Note => Color::Cyan,
            Severity::Help => Color::Green,
        };
        text.color(color).bold().to_string()
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = String::new();

        let header = format!("{}[{}]", diag.severity, diag.code);
        out.push_str(&format!(
            "{}: {}\n",
            self.paint(diag.severity, &header),
            diag.message
        ));

        if let Some(subject) = &diag.subject {
            let budget = (self.width as usize).saturating_sub(6).max(16);
            let shown: String = if subject.chars().count() > budget {
                let mut s: String = subject.chars().take(budget - 3).collect();
                s.push_str("...");
                s
            } else {
                subject.clone()
            };
            out.push_str(&format!("  --> {shown}\n"));
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        out
    }
}

/// Renders each diagnostic as a single JSON object (one per line).
pub struct JsonRenderer;

impl DiagnosticRenderer for JsonRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        match serde_json::to_string(diag) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(e) => format!("{{\"severity\":\"error\",\"message\":\"unserializable diagnostic: {e}\"}}\n"),
        }
    }
}
