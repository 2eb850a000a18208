//! Error taxonomy shared by the loading layer and the chart pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// An artifact could not be fetched or is not parseable at all.
    #[error("source '{location}' unavailable: {reason}")]
    SourceUnavailable { location: String, reason: String },

    /// An artifact parsed but its shape is not what the dashboard expects.
    #[error("schema error: {0}")]
    Schema(String),

    #[error("area '{0}' not found in snapshot")]
    NotFound(String),

    #[error("invalid area '{0}'")]
    InvalidArea(String),

    /// Too few points to establish a plot range or a difference.
    #[error("series for '{0}' has no usable data points")]
    EmptySeries(String),
}

impl Error {
    pub fn unavailable(location: &str, reason: impl ToString) -> Self {
        Error::SourceUnavailable {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Errors a caller can recover from by showing a different view.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NotFound(_) | Error::InvalidArea(_) | Error::EmptySeries(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
