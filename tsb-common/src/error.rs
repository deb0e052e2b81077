//! Error handling for the bridge generator
//!
//! This module defines the error taxonomy shared by IR construction and the
//! three generators, plus the diagnostics collector used for the
//! collect-and-report policy: a declaration that cannot be bridged is
//! reported and skipped while the rest of the artifact is still produced.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type covering every phase of bridge generation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// A reference whose declaration cannot be found in the arena.
    /// Fatal for the declaration being processed.
    #[error("unresolved symbol `{reference}` referenced by {context}")]
    UnresolvedSymbol { reference: String, context: String },

    /// A type variant that cannot cross the boundary at all
    /// (conditional types, bare mapped parameters, unknown declarations).
    #[error("type variant `{variant}` cannot cross the boundary in {context}")]
    UnsupportedBoundaryType { variant: String, context: String },

    /// More than one union member was left without a distinguishing runtime
    /// check. Recoverable: placeholder guards are emitted and the run
    /// succeeds.
    #[error("union `{union}` leaves {unresolved} members without a distinguishing runtime check")]
    AmbiguousDiscriminant { union: String, unresolved: usize },

    /// A literal union mixing string/number/bool members. Fatal at IR
    /// construction time; never reaches the generators.
    #[error("literal union mixes base kinds: expected {expected}, found {found}")]
    MixedLiteralBaseKind { expected: String, found: String },

    #[error("internal generator error: {message}")]
    Internal { message: String },
}

impl BridgeError {
    /// Create an unresolved-symbol error for a reference inside `context`
    pub fn unresolved(reference: impl Into<String>, context: impl Into<String>) -> Self {
        BridgeError::UnresolvedSymbol {
            reference: reference.into(),
            context: context.into(),
        }
    }

    /// Create an unsupported-boundary-type error naming the offending variant
    pub fn unsupported(variant: impl Into<String>, context: impl Into<String>) -> Self {
        BridgeError::UnsupportedBoundaryType {
            variant: variant.into(),
            context: context.into(),
        }
    }
}

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message tied to the declaration that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// FQN of the declaration being processed, if any
    pub declaration: Option<String>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, declaration: Option<String>) -> Self {
        Self {
            severity: Severity::Error,
            message,
            declaration,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: String, declaration: Option<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            declaration,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.declaration {
            Some(decl) => write!(f, "{}: {}: {}", self.severity, decl, self.message)?,
            None => write!(f, "{}: {}", self.severity, self.message)?,
        }
        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }
        Ok(())
    }
}

/// Collector for diagnostics produced during a generation run
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fatal per-declaration error
    pub fn error(&mut self, err: &BridgeError, declaration: Option<&str>) {
        self.diagnostics.push(Diagnostic::error(
            err.to_string(),
            declaration.map(String::from),
        ));
        self.error_count += 1;
    }

    /// Record a recoverable warning
    pub fn warning(&mut self, message: String, declaration: Option<&str>) {
        self.diagnostics.push(Diagnostic::warning(
            message,
            declaration.map(String::from),
        ));
        self.warning_count += 1;
    }

    /// Merge another collector's diagnostics into this one
    pub fn extend(&mut self, other: Diagnostics) {
        self.error_count += other.error_count;
        self.warning_count += other.warning_count;
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "no errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}
