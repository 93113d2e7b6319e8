use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Login email storage error: {0}")]
    Storage(String),

    #[error("Login rejected ({status}): {message}")]
    LoginRejected { status: StatusCode, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Refresh(#[from] RefreshError),
}

impl From<config::ConfigError> for AuthError {
    fn from(err: config::ConfigError) -> Self {
        AuthError::Configuration(err.to_string())
    }
}

/// Outcome of a failed token reissue.
///
/// Every request queued behind the failing refresh receives its own copy,
/// hence `Clone` and string payloads instead of the underlying errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("Token reissue rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Token reissue failed: {0}")]
    Transport(String),

    #[error("Token reissue returned an unreadable body: {0}")]
    MalformedResponse(String),

    #[error("Token reissue was abandoned before it settled")]
    Abandoned,
}

impl From<reqwest::Error> for RefreshError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RefreshError::MalformedResponse(err.to_string())
        } else {
            RefreshError::Transport(err.to_string())
        }
    }
}
