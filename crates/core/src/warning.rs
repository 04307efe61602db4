// SPDX-License-Identifier: MIT

//! Lenient-parsing warnings.
//!
//! Per spec.md §9's design note, every parser in this workspace is modeled
//! as a total function `bytes -> (Value, Vec<Warning>)`: malformed input
//! never aborts the caller, it just produces a best-effort default plus a
//! warning the caller may log or surface in a recommendation.

/// A non-fatal parsing anomaly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub path: String,
    pub message: String,
}

impl Warning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}
