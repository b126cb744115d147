#![forbid(unsafe_code)]

use thiserror::Error;
use weft_reactive::ReactiveError;
use weft_view::ViewError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Reactive(#[from] ReactiveError),

    /// The `el` locator matched nothing in the document.
    #[error("no element matches {locator:?}")]
    ElementNotFound { locator: String },

    #[error("invalid locator {locator:?}: {reason}")]
    InvalidLocator {
        locator: String,
        reason: &'static str,
    },

    #[error("markup could not be parsed: {reason}")]
    Markup { reason: String },

    #[error("invalid JSON data: {0}")]
    Json(#[from] serde_json::Error),

    /// A required option is missing or has the wrong shape.
    #[error("invalid options: {reason}")]
    InvalidOptions { reason: &'static str },
}

impl From<ViewError> for Error {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::InvalidLocator { locator, reason } => Self::InvalidLocator { locator, reason },
            ViewError::Markup { reason } => Self::Markup { reason },
            ViewError::Reactive(inner) => Self::Reactive(inner),
        }
    }
}

impl Error {
    /// The underlying reactive error, if any.
    #[must_use]
    pub fn as_reactive(&self) -> Option<&ReactiveError> {
        match self {
            Self::Reactive(err) => Some(err),
            _ => None,
        }
    }
}
