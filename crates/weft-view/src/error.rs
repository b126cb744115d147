#![forbid(unsafe_code)]

//! Errors raised while loading markup, locating nodes or binding a view.

use thiserror::Error;
use weft_reactive::ReactiveError;

pub type Result<T> = std::result::Result<T, ViewError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewError {
    /// A locator is neither `#id` nor a tag name.
    #[error("invalid locator {locator:?}: {reason}")]
    InvalidLocator {
        locator: String,
        reason: &'static str,
    },

    /// The markup parser rejected its input.
    #[error("markup could not be parsed: {reason}")]
    Markup { reason: String },

    #[error(transparent)]
    Reactive(#[from] ReactiveError),
}

impl ViewError {
    pub(crate) fn locator(locator: &str, reason: &'static str) -> Self {
        Self::InvalidLocator {
            locator: locator.to_owned(),
            reason,
        }
    }
}
