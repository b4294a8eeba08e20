//! Error types for grid construction.

use std::fmt;

/// Errors raised by the grid builder.
///
/// Both kinds are surfaced before any output exists - there is no partial
/// result to recover.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// The region (or an exclusion polygon) is empty, malformed, or
    /// self-intersecting.
    InvalidGeometry {
        /// What went wrong.
        reason: String,
    },
    /// A numeric or enumerated parameter is out of range.
    InvalidParameter {
        /// What went wrong.
        reason: String,
    },
}

impl GridError {
    pub(crate) fn geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry { reason: reason.into() }
    }

    pub(crate) fn parameter(reason: impl Into<String>) -> Self {
        Self::InvalidParameter { reason: reason.into() }
    }
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry { reason } => write!(f, "invalid geometry: {reason}"),
            Self::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
        }
    }
}

impl std::error::Error for GridError {}
