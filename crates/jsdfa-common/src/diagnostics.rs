//! Analysis diagnostics.
//!
//! The engine never aborts on an anomaly; it degrades the affected value to
//! "unknown" and records a [`Diagnostic`] in the analyzer's [`LogSink`].
//! Every recorded diagnostic is mirrored as a `tracing` event.

use crate::position::Position;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

/// File the log sink flushes to when the host does not name one.
pub const DEFAULT_LOG_FILE: &str = "log.txt";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Assignment target has no resolvable root; the write is queued.
    UnresolvableAssignmentTarget,
    /// Undeclared identifier assigned outside the global scope.
    MissingDeclaration,
    /// Expression has no resolvable host variable.
    InvalidReference,
    /// Variable resolved but holds no value at the queried point.
    UndefinedReference,
    /// Substitution or reference chain loops back on itself.
    CircularReference,
    /// A node is one of its own ancestors.
    CircularAst,
    /// Callee is already executing on the live caller chain.
    RecursiveCall,
    /// A call used as a member-access root returned nothing.
    UndefinedReturn,
    /// A variable was used after losing its owning scope.
    DetachedVariable,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvableAssignmentTarget => "unresolvable assignment target",
            DiagnosticKind::MissingDeclaration => "maybe forgot to declare",
            DiagnosticKind::InvalidReference => "invalid reference",
            DiagnosticKind::UndefinedReference => "undefined reference",
            DiagnosticKind::CircularReference => "circular reference",
            DiagnosticKind::CircularAst => "circular AST",
            DiagnosticKind::RecursiveCall => "recursive call",
            DiagnosticKind::UndefinedReturn => "function returned no value",
            DiagnosticKind::DetachedVariable => "variable has no scope",
        }
    }

    /// Kinds that usually point at an input the engine cannot model.
    pub fn is_warning(self) -> bool {
        matches!(
            self,
            DiagnosticKind::CircularReference
                | DiagnosticKind::CircularAst
                | DiagnosticKind::RecursiveCall
                | DiagnosticKind::DetachedVariable
        )
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Position of the node the diagnostic is about, if it has one.
    pub position: Option<Position>,
    /// Rendered source of that node.
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
            position: None,
            source: None,
        }
    }

    pub fn with_node(mut self, position: Option<Position>, source: impl Into<String>) -> Self {
        self.position = position;
        self.source = Some(source.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(position) = self.position {
            write!(f, "{position}:\t\t")?;
        }
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(source) = &self.source {
            write!(f, ",  EXPR: {source}")?;
        }
        Ok(())
    }
}

/// Buffered, switchable diagnostic log.
#[derive(Debug)]
pub struct LogSink {
    enabled: bool,
    entries: Vec<Diagnostic>,
}

impl Default for LogSink {
    fn default() -> Self {
        LogSink::new(true)
    }
}

impl LogSink {
    pub fn new(enabled: bool) -> Self {
        LogSink {
            enabled,
            entries: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Record a diagnostic. Disabled sinks drop it without tracing.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if !self.enabled {
            return;
        }
        if diagnostic.kind.is_warning() {
            tracing::warn!(kind = diagnostic.kind.as_str(), "{diagnostic}");
        } else {
            tracing::debug!(kind = diagnostic.kind.as_str(), "{diagnostic}");
        }
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Write every buffered diagnostic to `writer`, one per line, and empty
    /// the buffer.
    pub fn flush_to(&mut self, writer: &mut impl Write) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(writer, "{entry}")?;
        }
        writer.flush()?;
        self.entries.clear();
        Ok(())
    }

    /// Write buffered diagnostics to `path` (created or truncated).
    pub fn flush(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        self.flush_to(&mut file)
    }
}

#[cfg(test)]
#[path = "tests/diagnostics_tests.rs"]
mod diagnostics_tests;
