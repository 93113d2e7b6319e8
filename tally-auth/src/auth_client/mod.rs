mod models;

use crate::settings::Settings;
use crate::error::{AuthError, RefreshError};
use crate::refresh::Reissuer;
use crate::session::Session;
pub use models::Credentials;
use models::*;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;

/// Marks the reissue call so a 401 on it is never mistaken for an expired
/// bearer token on an ordinary request.
pub const REISSUE_MARKER_HEADER: &str = "X-Token-Reissue";

const LOGIN_PATH: &str = "/auth/login";
const REISSUE_PATH: &str = "/auth/reissue";
const LOGOUT_PATH: &str = "/auth/logout";

/// Authentication endpoints never carry a bearer token and are never
/// retried through a reissue.
pub fn is_auth_endpoint(path: &str) -> bool {
    let path = path.trim_start_matches('/');
    path == "auth" || path.starts_with("auth/")
}

/// Talks to the `/auth` endpoints.
///
/// The server keeps the long-lived refresh credential in an HTTP-only
/// cookie set at login, so this client keeps a cookie store and sends it
/// back on reissue.
pub struct AuthClient {
    http_client: Client,
    api_url: String,
    session: Arc<Session>,
}

impl AuthClient {
    pub fn new(settings: &Settings, session: Arc<Session>) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            http_client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let url = format!("{}{}", self.api_url, LOGIN_PATH);
        let req = LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };

        let resp = self.http_client.post(&url).json(&req).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = error_message(status, resp).await;
            tracing::warn!(%status, "Login rejected");
            return Err(AuthError::LoginRejected { status, message });
        }

        let body = resp.json::<TokenResponse>().await?;
        self.session.set_token(body.access_token.into());
        tracing::info!(email = %credentials.email, "Logged in");
        Ok(())
    }

    /// Ends the session on the server. The local token is dropped either way.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let url = format!("{}{}", self.api_url, LOGOUT_PATH);
        let result = self
            .http_client
            .post(&url)
            .send()
            .await
            .and_then(Response::error_for_status);

        self.session.clear();
        result?;
        Ok(())
    }
}

impl Reissuer for AuthClient {
    async fn reissue(&self) -> Result<SecretString, RefreshError> {
        let url = format!("{}{}", self.api_url, REISSUE_PATH);

        let resp = self
            .http_client
            .post(&url)
            .header(REISSUE_MARKER_HEADER, "true")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = error_message(status, resp).await;
            return Err(RefreshError::Rejected { status, message });
        }

        let body = resp.json::<TokenResponse>().await?;
        Ok(body.access_token.into())
    }
}

async fn error_message(status: StatusCode, resp: Response) -> String {
    let text = resp.text().await.unwrap_or_default();
    serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                status.canonical_reason().unwrap_or("request failed").to_string()
            } else {
                text
            }
        })
}
