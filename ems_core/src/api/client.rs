//! HTTP client with bearer-token injection and refresh interception.

use super::errors::{ApiError, ApiResult};
use crate::auth::{SessionStore, TokenPair};
use reqwest::{Method, Response, StatusCode, Url};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Endpoint exchanging a refresh token for a new access token.
pub const REFRESH_PATH: &str = "/refresh/";

/// Endpoint invalidating a refresh token on logout.
pub const LOGOUT_PATH: &str = "/auth/logout/";

/// A request that can be replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    retried: bool,
}

impl PendingRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<B: Serialize>(path: impl Into<String>, body: &B) -> ApiResult<Self> {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put<B: Serialize>(path: impl Into<String>, body: &B) -> ApiResult<Self> {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    fn with_body<B: Serialize>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this request has already been replayed after a refresh.
    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// API client for the EMS backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    session: Arc<SessionStore>,
    /// Serializes refresh attempts between concurrent requests
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// * `ApiError::InvalidBaseUrl` - `base_url` isn't an absolute http(s) URL
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> ApiResult<Self> {
        Self::with_http_client(base_url, session, reqwest::Client::new())
    }

    /// Create a client around a pre-configured `reqwest::Client`.
    pub fn with_http_client(
        base_url: impl Into<String>,
        session: Arc<SessionStore>,
        http: reqwest::Client,
    ) -> ApiResult<Self> {
        let base_url = base_url.into();
        let parsed =
            Url::parse(&base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.clone()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            session,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send an authenticated request.
    ///
    /// A 401 on the first attempt triggers one refresh and one replay. A 401
    /// on the replay, like every other HTTP status, is returned as-is.
    ///
    /// # Errors
    ///
    /// * `ApiError::SessionExpired` - 401 with no refresh token, or the
    ///   refresh was rejected; the session has been logged out
    /// * `ApiError::Network` - Transport failure
    pub async fn send(&self, mut request: PendingRequest) -> ApiResult<Response> {
        loop {
            let sent_with = self.session.access_token();
            let response = self.dispatch(&request, sent_with.as_deref()).await?;

            if response.status() != StatusCode::UNAUTHORIZED || request.retried {
                return Ok(response);
            }

            request.retried = true;
            self.recover_session(sent_with.as_deref()).await?;
            log::debug!("Replaying {} {}", request.method, request.path);
        }
    }

    /// Send an authenticated request and decode a JSON success body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: PendingRequest) -> ApiResult<T> {
        let response = self.send(request).await?;
        expect_json(response).await
    }

    /// Send an authenticated request, ignoring any success body.
    pub async fn send_empty(&self, request: PendingRequest) -> ApiResult<()> {
        let response = self.send(request).await?;
        expect_success(response).await.map(|_| ())
    }

    async fn dispatch(&self, request: &PendingRequest, token: Option<&str>) -> ApiResult<Response> {
        log::debug!("{} {}", request.method, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path));
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder.send().await?)
    }

    /// Obtain a fresh access token after a 401, or log out.
    async fn recover_session(&self, rejected: Option<&str>) -> ApiResult<()> {
        let _guard = self.refresh_lock.lock().await;

        // Another request refreshed while we waited for the lock
        if let Some(current) = self.session.access_token()
            && Some(current.as_str()) != rejected
        {
            return Ok(());
        }

        let Some(refresh) = self.session.refresh_token() else {
            log::warn!("Access token rejected and no refresh token held, logging out");
            self.session.logout();
            return Err(ApiError::SessionExpired);
        };

        log::info!("Access token rejected, attempting refresh");
        match self.refresh_access_token(&refresh).await {
            Ok(tokens) => {
                self.session.set_tokens(tokens);
                log::info!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                log::warn!("Token refresh failed, logging out: {}", e);
                self.session.logout();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// Keeps `refresh` unless the backend rotated it.
    pub async fn refresh_access_token(&self, refresh: &str) -> ApiResult<TokenPair> {
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh })
            .send()
            .await?;

        let body: RefreshResponse = expect_json(response).await?;
        Ok(TokenPair {
            access: body.access,
            refresh: body.refresh.unwrap_or_else(|| refresh.to_string()),
        })
    }

    /// Log out locally, telling the backend to invalidate the refresh token.
    ///
    /// The backend call is best effort: failures are logged and otherwise
    /// ignored, and the local session is cleared regardless.
    pub async fn logout(&self) {
        if let Some(refresh) = self.session.refresh_token() {
            let mut builder = self
                .http
                .post(self.url(LOGOUT_PATH))
                .json(&RefreshRequest { refresh: &refresh });
            if let Some(access) = self.session.access_token() {
                builder = builder.bearer_auth(access);
            }

            match builder.send().await {
                Ok(response) if !response.status().is_success() => {
                    log::debug!("Logout endpoint answered {}", response.status());
                }
                Ok(_) => {}
                Err(e) => log::debug!("Logout endpoint unreachable: {}", e),
            }
        }

        self.session.logout();
    }
}

/// Turn a non-success response into `ApiError::Backend`.
pub(crate) async fn expect_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
    Err(ApiError::backend(status, &body))
}

/// Decode a JSON success body.
pub(crate) async fn expect_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let response = expect_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
