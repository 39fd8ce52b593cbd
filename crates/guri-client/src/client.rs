use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;

use guri_types::ApiResponse;

use crate::error::{ClientError, Result};
use crate::session::Session;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Guri API client (HTTP direct, JSON envelope)
pub struct GuriClient {
    http_client: reqwest::Client,
    base_url: String,
    session: RwLock<Session>,
}

/// Builder for [`GuriClient`]
#[derive(Debug, Clone)]
pub struct GuriClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
}

impl Default for GuriClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GuriClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server origin, e.g. `https://guri.so`; `/api` is appended per request
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<GuriClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Config("base_url is required".to_string()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got '{}'",
                base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()?;

        Ok(GuriClient {
            http_client,
            base_url,
            session: RwLock::new(Session::Anonymous),
        })
    }
}

impl GuriClient {
    /// Client with default settings
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        GuriClientBuilder::new().base_url(base_url).build()
    }

    pub fn builder() -> GuriClientBuilder {
        GuriClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    pub(crate) async fn set_session(&self, session: Session) {
        *self.session.write().await = session;
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Request without any credentials
    pub(crate) fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.http_client.request(method, self.url(path))
    }

    /// Request with the session's bearer token attached when there is one
    pub(crate) async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.anonymous(method, path);
        match self.session.read().await.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request that must carry a token; fails locally when logged out
    pub(crate) async fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let session = self.session.read().await;
        let token = session.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(self.anonymous(method, path).bearer_auth(token))
    }

    /// Send and unwrap the envelope's `data`
    pub(crate) async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let envelope: ApiResponse<T> = self.execute(request).await?;
        match envelope.into_result() {
            Ok(Some(data)) => Ok(data),
            Ok(None) => Err(ClientError::MissingData),
            Err(message) => Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                message,
            }),
        }
    }

    /// Send where success carries no payload (deletes, acknowledgements)
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let envelope: ApiResponse<Value> = self.execute(request).await?;
        envelope
            .into_result()
            .map(|_| ())
            .map_err(|message| ClientError::Api {
                status: StatusCode::OK.as_u16(),
                message,
            })
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<ApiResponse<T>> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), url = %response.url(), "response received");

        if !status.is_success() {
            return Err(self.failure(status, response).await);
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn failure(&self, status: StatusCode, response: Response) -> ClientError {
        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(message = %message, "session rejected, logging out");
            self.set_session(Session::Anonymous).await;
            return ClientError::Unauthorized(message);
        }

        tracing::debug!(status = status.as_u16(), message = %message, "request failed");
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// The envelope's `message`, else the raw body, else the status reason
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiResponse<Value>>(body) {
        if let Some(message) = envelope.message.filter(|m| !m.trim().is_empty()) {
            return message;
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}
