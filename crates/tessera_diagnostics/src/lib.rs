//! Diagnostic creation, severity management, and rendering.
//!
//! Every stage of the backend reports through structured [`Diagnostic`]
//! values: routing notes, connection-report mismatches, per-pair placement
//! failures. The thread-safe [`DiagnosticSink`] is shared by all parallel
//! placement tasks, and [`DiagnosticRenderer`] implementations format the
//! accumulated diagnostics for a terminal or as JSON lines.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
