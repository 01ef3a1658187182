//! Diagnostics sink for recoverable rendering anomalies
//!
//! Nothing in the render or attachment path is fatal. Tag pairing problems, stray
//! closing tags and unresolved partials are recovered from and reported here.

use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Category of a recoverable anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Closing tag address disagreed with the open-element stack
    TagMismatch,
    /// Closing tag arrived with nothing open
    StrayClose,
    /// Partial name absent from both local and process-wide registries
    UnresolvedPartial,
    /// Partial expansion recursed into itself or past the depth limit
    PartialCycle,
    /// Attribute produced outside of an element's start tag
    MisplacedAttribute,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::TagMismatch => write!(f, "tag-mismatch"),
            WarningKind::StrayClose => write!(f, "stray-close"),
            WarningKind::UnresolvedPartial => write!(f, "unresolved-partial"),
            WarningKind::PartialCycle => write!(f, "partial-cycle"),
            WarningKind::MisplacedAttribute => write!(f, "misplaced-attribute"),
        }
    }
}

/// A recoverable anomaly observed while rendering or attaching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Receiver for warnings. Implementations must not panic.
pub trait Diagnostics: Send + Sync + fmt::Debug {
    fn warn(&self, warning: Warning);
}

/// Forwards warnings to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn warn(&self, warning: Warning) {
        tracing::warn!(kind = %warning.kind, "{}", warning.message);
    }
}

/// Keeps every warning for later inspection
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings collected so far
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Warnings of one kind
    pub fn of_kind(&self, kind: WarningKind) -> Vec<Warning> {
        self.warnings()
            .into_iter()
            .filter(|w| w.kind == kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn warn(&self, warning: Warning) {
        tracing::debug!(kind = %warning.kind, "collected: {}", warning.message);
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }
}
