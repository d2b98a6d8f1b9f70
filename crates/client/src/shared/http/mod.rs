//! Request engine.
//!
//! Every backend call goes through [`ApiClient::request`]: JSON headers and
//! bearer token are attached here, the answer is classified into
//! [`ApiError`], and a 401 is handed to the [`RefreshCoordinator`] once.

pub mod refresh;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::shared::api_utils::{api_url, build_query};
use crate::shared::config::Config;
use crate::shared::error::ApiError;
use crate::system::auth::events::{AuthEvent, EVENT_CHANNEL_CAPACITY};
use crate::system::auth::storage::SessionStore;

pub use refresh::RefreshCoordinator;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized with `serde_json` when sent
    Json(serde_json::Value),
    /// Sent as-is
    Text(String),
}

/// One call to the backend. Cheap to clone so it can be sent again after a
/// token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    body: Option<RequestBody>,
    anonymous: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            body: None,
            anonymous: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Query string from a filter struct; an empty result adds no `?`
    pub fn query<Q: Serialize>(mut self, query: &Q) -> Result<Self, ApiError> {
        let query = build_query(query)?;
        self.query = if query.is_empty() { None } else { Some(query) };
        Ok(self)
    }

    /// Caller headers win over the defaults (`Content-Type`, `Authorization`)
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// No access token is attached and a 401 is an ordinary error.
    /// Used for login, registration and the refresh call itself.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.anonymous
    }
}

/// Session-aware HTTP client; clones share the connection pool, the token
/// store and the refresh gate.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: String,
    login_route: String,
    store: Arc<dyn SessionStore>,
    refresh: RefreshCoordinator,
    events: broadcast::Sender<AuthEvent>,
}

impl ApiClient {
    pub fn new(config: &Config, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.api.base_url.clone(),
                login_route: config.session.login_route.clone(),
                store,
                refresh: RefreshCoordinator::new(),
                events,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn login_route(&self) -> &str {
        &self.inner.login_route
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Receiver for session lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.inner.events.subscribe()
    }

    pub(crate) fn publish(&self, event: AuthEvent) {
        // no subscriber is fine
        let _ = self.inner.events.send(event);
    }

    /// Send a request and decode the JSON answer into `T`.
    ///
    /// An empty or non-JSON 2xx body decodes as JSON `null`, so `()` and
    /// `Option<_>` work for endpoints without content.
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let sent_token = if request.anonymous {
            None
        } else {
            self.inner.store.access_token()
        };

        let response = self.send(&request, sent_token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.anonymous {
            return read_response(response).await;
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            "401 received, attempting token refresh"
        );
        self.inner
            .refresh
            .recover(self, sent_token.as_deref())
            .await?;

        // final attempt: whatever comes back is the answer, a second 401 included
        let token = self.inner.store.access_token();
        let retried = self.send(&request, token.as_deref()).await?;
        read_response(retried).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: impl Into<String>) -> Result<T, ApiError> {
        self.request(ApiRequest::get(path)).await
    }

    pub async fn post<T, B>(&self, path: impl Into<String>, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<T, B>(&self, path: impl Into<String>, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<T, B>(&self, path: impl Into<String>, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(ApiRequest::patch(path).json(body)?).await
    }

    /// DELETE whose answer body, if any, is ignored
    pub async fn delete(&self, path: impl Into<String>) -> Result<(), ApiError> {
        self.request::<IgnoredAny>(ApiRequest::delete(path))
            .await
            .map(|_| ())
    }

    /// One round trip without the 401 recovery; the refresh call itself
    /// goes through here
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = self.send(request, token).await?;
        read_response(response).await
    }

    async fn send(&self, request: &ApiRequest, token: Option<&str>) -> Result<Response, ApiError> {
        let mut url = api_url(&self.inner.base_url, &request.path);
        if let Some(query) = &request.query {
            url.push('?');
            url.push_str(query);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(request.headers.clone());
        if let Some(token) = token {
            if !headers.contains_key(AUTHORIZATION) {
                match bearer(token) {
                    Some(value) => {
                        headers.insert(AUTHORIZATION, value);
                    }
                    None => tracing::warn!("Stored access token is not a valid header value"),
                }
            }
        }

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .headers(headers);
        match &request.body {
            Some(RequestBody::Json(value)) => builder = builder.body(serde_json::to_vec(value)?),
            Some(RequestBody::Text(text)) => builder = builder.body(text.clone()),
            None => {}
        }

        tracing::debug!(method = %request.method, url = %url, "sending request");
        Ok(builder.send().await?)
    }
}

pub(crate) fn bearer(token: &str) -> Option<HeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).ok()?;
    value.set_sensitive(true);
    Some(value)
}

async fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        // the status is the error; the body only refines the message
        let body = response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "request failed");
        return Err(ApiError::from_status(status, &body));
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(is_json_content_type)
        .unwrap_or(false);
    let body = response.bytes().await?;

    let value = if body.is_empty() || !is_json {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body)?
    };
    Ok(serde_json::from_value(value)?)
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || mime.ends_with("+json")
}
