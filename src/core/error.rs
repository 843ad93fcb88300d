//! Error types for definition-document parsing.
//!
//! This module provides `RigError`, the error enum for every way a
//! definition document can fail to load. Solve-time anomalies are never
//! errors: an inactive combo or a degenerate sub-simplex simply
//! contributes nothing.

use std::fmt;

/// Errors that can occur while reading a rig definition document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RigError {
    /// The definition is not parseable JSON.
    MalformedDocument {
        /// The JSON parser's message.
        msg: String,
        /// Byte offset of the failure in the document.
        offset: usize,
    },
    /// Structurally parseable, but a required member is missing, of the
    /// wrong type, or a referenced index is out of range.
    SchemaViolation {
        /// Description of the violation.
        msg: String,
        /// Byte offset when known, 0 otherwise (value-tree walking does
        /// not track source spans).
        offset: usize,
    },
    /// The document declares an `encodingVersion` this solver does not
    /// understand.
    UnsupportedEncoding {
        /// The declared version.
        version: u64,
    },
}

impl RigError {
    /// Create a `SchemaViolation` with no offset information.
    pub fn schema(msg: impl Into<String>) -> Self {
        RigError::SchemaViolation {
            msg: msg.into(),
            offset: 0,
        }
    }

    /// Create a `MalformedDocument` at a byte offset.
    pub fn malformed(msg: impl Into<String>, offset: usize) -> Self {
        RigError::MalformedDocument {
            msg: msg.into(),
            offset,
        }
    }

    /// Byte offset of the failure, 0 when unknown.
    #[must_use]
    pub fn offset(&self) -> usize {
        match self {
            RigError::MalformedDocument { offset, .. }
            | RigError::SchemaViolation { offset, .. } => *offset,
            RigError::UnsupportedEncoding { .. } => 0,
        }
    }
}

impl fmt::Display for RigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RigError::MalformedDocument { msg, offset } => {
                write!(f, "Malformed definition document: {} (offset {})", msg, offset)
            }
            RigError::SchemaViolation { msg, .. } => {
                write!(f, "Definition schema violation: {}", msg)
            }
            RigError::UnsupportedEncoding { version } => {
                write!(f, "Unsupported encodingVersion: {}", version)
            }
        }
    }
}

impl std::error::Error for RigError {}
