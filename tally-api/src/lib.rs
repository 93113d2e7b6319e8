pub mod endpoints;
mod error;
mod macros;
pub mod repositories;

pub use crate::error::{ApiError, ErrorDetail};
use repositories::*;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tally_auth::{
    AuthClient, Authenticator, Credentials, Reissuer, Session, Settings, is_auth_endpoint,
};
use tower_api_client::{Request as ApiRequest, RequestData};

/// Tally REST client.
///
/// Every request except the `/auth` ones carries the session's bearer token.
/// A 401 triggers one token reissue shared by every request that hit the
/// same expiry, after which each of them is replayed once.
pub struct Client<R = AuthClient> {
    base_url: String,
    http_client: reqwest::Client,
    auth: Authenticator<R>,
}

impl Client<AuthClient> {
    pub fn new(settings: &Settings) -> Result<Self, ApiError> {
        let session = Arc::new(Session::with_login_path(settings.login_path.clone()));
        let auth_client = AuthClient::new(settings, session.clone())?;
        Self::with_reissuer(settings, session, auth_client)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.auth_client().login(credentials).await?;
        Ok(())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.auth_client().logout().await?;
        Ok(())
    }

    fn auth_client(&self) -> &AuthClient {
        self.auth.coordinator().reissuer()
    }
}

impl<R: Reissuer> Client<R> {
    pub fn with_reissuer(
        settings: &Settings,
        session: Arc<Session>,
        reissuer: R,
    ) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.api_url.trim_end_matches('/').to_string(),
            http_client,
            auth: Authenticator::new(session, reissuer),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        self.auth.session()
    }

    pub fn authenticator(&self) -> &Authenticator<R> {
        &self.auth
    }

    pub async fn send<Q>(&self, request: Q) -> Result<Q::Response, ApiError>
    where
        Q: ApiRequest,
        Q::Data: Serialize,
        Q::Response: DeserializeOwned,
    {
        let path = request.endpoint().into_owned();
        if is_auth_endpoint(&path) {
            tracing::debug!(%path, "Sending auth endpoint request without bearer token");
            return self.dispatch(&request, &path, None).await;
        }

        let request = &request;
        let path = path.as_str();
        self.auth
            .execute(move |attempt| async move {
                if attempt.retried {
                    tracing::debug!(%path, "Replaying request with reissued token");
                }
                self.dispatch(request, path, attempt.token.as_ref()).await
            })
            .await
    }

    async fn dispatch<Q>(
        &self,
        request: &Q,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<Q::Response, ApiError>
    where
        Q: ApiRequest,
        Q::Data: Serialize,
        Q::Response: DeserializeOwned,
    {
        let method = Method::from_bytes(Q::METHOD.as_str().as_bytes())
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self.http_client.request(method, &url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        builder = match request.data() {
            RequestData::Query(data) => builder.query(data),
            RequestData::Json(data) => builder.json(data),
            _ => builder,
        };

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        tracing::debug!(%path, %status, "Response received");

        if !status.is_success() {
            return Err(ApiError::Tally(status, ErrorDetail::from_body(&body)));
        }
        decode_body(&body)
    }
}

/// Decodes a success body.
///
/// Mutations answer with a bare confirmation sentence rather than JSON, so a
/// body that does not parse is offered to the response type as a string.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).or_else(|err| {
        serde_json::from_value(serde_json::Value::String(body.trim().to_string()))
            .map_err(|_| ApiError::Internal(format!("Unexpected response body: {}", err)))
    })
}

impl<R> std::fmt::Debug for Client<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish()
    }
}

pub struct Request;

impl Request {
    pub fn sales_records() -> SalesRecordRepository {
        SalesRecordRepository::new()
    }

    pub fn expense_records() -> ExpenseRecordRepository {
        ExpenseRecordRepository::new()
    }

    pub fn stores() -> StoreRepository {
        StoreRepository::new()
    }

    pub fn stats() -> StatsRepository {
        StatsRepository::new()
    }

    pub fn users() -> UserRepository {
        UserRepository::new()
    }
}
