/*!
 * Error types for the texttrack service.
 *
 * Every public operation returns `Result<T, TextTrackError>`. Callers that need
 * the numeric status-code view of an operation (one distinguished OK value plus
 * one code per failure kind) use `StatusCode`.
 */

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionId;

/// Errors returned by session and style operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextTrackError {
    /// The session id does not reference a live session
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// A parameter failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The session is not in a state that permits the operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The feature is unavailable for the current session configuration
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// The referenced item (e.g. an observer) is not registered
    #[error("Not found: {0}")]
    NotFound(String),

    /// A resource needed by the operation could not be obtained
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl TextTrackError {
    /// Status code reported for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::SessionNotFound,
            Self::InvalidArgument(_) => StatusCode::InvalidArgument,
            Self::InvalidState(_) => StatusCode::InvalidState,
            Self::NotSupported(_) => StatusCode::NotSupported,
            Self::NotFound(_) => StatusCode::NotFound,
            Self::Unavailable(_) => StatusCode::Unavailable,
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

/// Result alias used throughout the library
pub type TextTrackResult<T> = Result<T, TextTrackError>;

/// Numeric status of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum StatusCode {
    Ok = 0,
    SessionNotFound = 1,
    InvalidArgument = 2,
    InvalidState = 3,
    NotSupported = 4,
    NotFound = 5,
    Unavailable = 6,
}

impl StatusCode {
    /// Status of a finished operation
    pub fn of<T>(result: &TextTrackResult<T>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(e) => e.status(),
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InvalidState => "INVALID_STATE",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::NotFound => "NOT_FOUND",
            Self::Unavailable => "UNAVAILABLE",
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Failure reported by a style observer while handling an event
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObserverError {
    /// The observer could not be reached (e.g. its client went away)
    #[error("Observer unreachable: {0}")]
    Unreachable(String),

    /// The observer rejected or failed to process the event
    #[error("Observer failed: {0}")]
    Failed(String),
}

/// Main application error type used by the command line front end
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error parsing or executing a script
    #[error("Script error: {0}")]
    Script(String),

    /// Error from the text track service
    #[error("Text track error: {0}")]
    TextTrack(#[from] TextTrackError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::Script(error.to_string())
    }
}
