use serde::{Deserialize, Serialize};
use reqwest::StatusCode;
use tally_auth::{AuthError, RefreshError, Unauthorized};

#[derive(Debug)]
pub enum ApiError {
    /// The server answered with an error status
    Tally(StatusCode, ErrorDetail),
    /// The token could not be reissued and the session is gone
    SessionExpired(RefreshError),
    Auth(AuthError),
    Http(reqwest::Error),
    /// A body that could not be decoded, or a request that could not be built
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Tally(status, _) => Some(*status),
            _ => None,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired(_))
    }

    /// Text suitable for showing to the user
    pub fn message(&self) -> String {
        match self {
            ApiError::Tally(_, detail) => detail.message().to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        ApiError::Http(value)
    }
}

impl From<RefreshError> for ApiError {
    fn from(value: RefreshError) -> Self {
        ApiError::SessionExpired(value)
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Refresh(e) => ApiError::SessionExpired(e),
            e => ApiError::Auth(e),
        }
    }
}

impl Unauthorized for ApiError {
    fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Tally(status, detail) => write!(f, "({}) {}", status, detail.message()),
            ApiError::SessionExpired(e) => write!(f, "Session expired: {}", e),
            ApiError::Auth(e) => write!(f, "Authentication error: {}", e),
            ApiError::Http(e) => write!(f, "HTTP error: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::SessionExpired(e) => Some(e),
            ApiError::Auth(e) => Some(e),
            ApiError::Http(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorDetail {
    /// Parses an error body, keeping the raw text when it is not the usual JSON shape
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ErrorDetail>(body) {
            Ok(detail) => detail,
            Err(_) => {
                let body = body.trim();
                ErrorDetail {
                    details: (!body.is_empty()).then(|| body.to_string()),
                    message: None,
                }
            }
        }
    }

    pub fn message(&self) -> &str {
        self.details
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("request failed")
    }
}
