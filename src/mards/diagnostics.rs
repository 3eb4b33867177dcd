//! Diagnostic reporting
//!
//! Single diagnostic type used across parsing, schema compilation, and
//! validation. The engine never aborts on bad input: every problem becomes a
//! `Diagnostic` in an ordered list, and the offending entry is pruned so
//! processing can continue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Log,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Log => write!(f, "log"),
        }
    }
}

/// Which input the diagnostic is about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Doc,
    Schema,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Doc => write!(f, "doc"),
            Origin::Schema => write!(f, "schema"),
        }
    }
}

/// Where the diagnostic points
///
/// Parse problems carry a 0-based line number; compile and validation
/// problems carry the structural id of the entry involved. Diagnostics
/// raised against the tree root (which has no id) use `Root`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Location {
    Root,
    Line(usize),
    Id(String),
}

impl Location {
    /// Build an id location from anything string-like
    pub fn id(id: impl Into<String>) -> Self {
        Location::Id(id.into())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Root => write!(f, "-"),
            Location::Line(n) => write!(f, "{n}"),
            Location::Id(id) => write!(f, "{id}"),
        }
    }
}

/// One reported problem or note
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub origin: Origin,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        origin: Origin,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            origin,
            location,
            message: message.into(),
        }
    }

    pub fn error(origin: Origin, location: Location, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, origin, location, message)
    }

    pub fn warning(origin: Origin, location: Location, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, origin, location, message)
    }

    pub fn log(origin: Origin, location: Location, message: impl Into<String>) -> Self {
        Self::new(Severity::Log, origin, location, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}:{} {}",
            self.severity, self.origin, self.location, self.message
        )
    }
}

/// True when any diagnostic in the list is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
