#![forbid(unsafe_code)]

//! Error taxonomy for the reactive layer.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unresolved path | A segment is missing at resolution time | Caller logs and substitutes a placeholder |
//! | Invalid path | Empty or malformed dotted path | Rejected at parse time |
//! | Missing hook | A lifecycle hook was not configured | Treated as a no-op by the orchestrator |
//! | Reentrant tracking | Watcher built while another holds the registry | Rejected, registry untouched |
//! | Read-only | Write to a computed key | Rejected, model untouched |

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReactiveError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    #[error("unresolved path `{path}`: no property `{segment}`")]
    UnresolvedPath { path: String, segment: String },

    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("lifecycle hook `{hook}` is not configured")]
    MissingHook { hook: &'static str },

    #[error("cannot track `{requested}` while `{active}` is still tracking")]
    ReentrantTracking { active: String, requested: String },

    #[error("property `{key}` is read-only")]
    ReadOnly { key: String },
}

impl ReactiveError {
    #[must_use]
    pub fn unresolved(path: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::UnresolvedPath {
            path: path.into(),
            segment: segment.into(),
        }
    }

    #[must_use]
    pub fn invalid(path: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// Whether the error is recoverable by substituting a placeholder value.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedPath { .. })
    }
}
