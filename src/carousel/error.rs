//! Carousel error types.
//!
//! Every variant is a reportable condition, never a panic. The controller
//! keeps the most recent ones as diagnostics, so the type is `Clone`.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CarouselError {
    #[error("carousel host not found: {0}")]
    HostNotFound(String),

    #[error("no stories found in the carousel")]
    NoStories,

    #[error("story {entry} is missing required field `{field}`")]
    MissingField { entry: usize, field: &'static str },

    #[error("story {entry} has an invalid timestamp: {value}")]
    InvalidTimestamp { entry: usize, value: String },

    #[error("markup error: {0}")]
    Markup(String),

    #[error("story data error: {0}")]
    Data(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("current post not found (group {group}, index {index})")]
    CurrentPostMissing { group: usize, index: usize },

    #[error("the post date is in the future: {0}")]
    FutureTimestamp(DateTime<Utc>),

    #[error("initial index {index} out of range for {len} stories")]
    InitialIndexOutOfRange { index: usize, len: usize },
}

impl From<std::io::Error> for CarouselError {
    fn from(e: std::io::Error) -> Self {
        CarouselError::Io(e.to_string())
    }
}

pub type CarouselResult<T> = Result<T, CarouselError>;
