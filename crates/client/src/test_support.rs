//! In-process stub of the ZenCat backend for the client tests.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use crate::shared::config::test_config;
use crate::shared::http::ApiClient;
use crate::system::auth::storage::{CookiePolicy, CookieSessionStore};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Canned answer for one stubbed request
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    content_type: Option<&'static str>,
    body: String,
    delay: Option<Duration>,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain"),
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Caller {
    Any,
    Anonymous,
    Token(String),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

type RouteKey = (String, String, Caller);

#[derive(Default)]
struct Shared {
    routes: Mutex<HashMap<RouteKey, VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl Shared {
    /// Replies are consumed in order; the last one keeps answering
    fn next_reply(&self, method: &str, path: &str, token: Option<&str>) -> Option<Reply> {
        let mut routes = self.routes.lock().unwrap();
        let specific = match token {
            Some(token) => Caller::Token(token.to_string()),
            None => Caller::Anonymous,
        };
        for caller in [specific, Caller::Any] {
            if let Some(queue) = routes.get_mut(&(method.to_string(), path.to_string(), caller)) {
                return if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                };
            }
        }
        None
    }
}

pub struct StubBackend {
    base_url: String,
    shared: Arc<Shared>,
}

impl StubBackend {
    pub async fn start() -> Self {
        init_tracing();
        let shared = Arc::new(Shared::default());
        let app = Router::new().fallback(handle).with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            shared,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Answer `method path` for any caller
    pub fn on(&self, method: &str, path: &str, reply: Reply) {
        self.add(method, path, Caller::Any, reply);
    }

    /// Answer only requests carrying `Bearer <token>`
    pub fn on_token(&self, method: &str, path: &str, token: &str, reply: Reply) {
        self.add(method, path, Caller::Token(token.to_string()), reply);
    }

    /// Answer only requests without an `Authorization` header
    pub fn on_anonymous(&self, method: &str, path: &str, reply: Reply) {
        self.add(method, path, Caller::Anonymous, reply);
    }

    fn add(&self, method: &str, path: &str, caller: Caller, reply: Reply) {
        self.shared
            .routes
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string(), caller))
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn last(&self, method: &str, path: &str) -> RecordedRequest {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .last()
            .unwrap_or_else(|| panic!("no {} {} was sent", method, path))
    }

    /// Client wired to this backend with an empty in-memory cookie jar
    pub fn client(&self) -> (ApiClient, Arc<CookieSessionStore>) {
        let config = test_config(&self.base_url);
        let store = Arc::new(CookieSessionStore::new(CookiePolicy::default()));
        let client = ApiClient::new(&config, store.clone()).unwrap();
        (client, store)
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_str = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let authorization = header_str(header::AUTHORIZATION);
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: authorization.clone(),
        content_type: header_str(header::CONTENT_TYPE),
        body: String::from_utf8_lossy(&body).into_owned(),
    };
    shared.requests.lock().unwrap().push(request);

    let token = authorization
        .as_deref()
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value));
    let Some(reply) = shared.next_reply(method.as_str(), uri.path(), token) else {
        return (
            StatusCode::NOT_FOUND,
            [(header::CONTENT_TYPE, "application/json")],
            format!(r#"{{"message":"no stub for {} {}"}}"#, method, uri.path()),
        )
            .into_response();
    };

    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(reply.status).unwrap();
    match reply.content_type {
        Some(content_type) => {
            (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
        }
        None => status.into_response(),
    }
}
