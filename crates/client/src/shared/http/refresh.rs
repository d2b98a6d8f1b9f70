//! Recovery from an expired access token.
//!
//! One refresh at a time: callers that hit 401 while a refresh is running
//! wait on the gate and then reuse its result instead of sending their own
//! `POST /auth/refresh/`.

use contracts::shared::api_response::Payload;
use contracts::system::auth::AuthTokens;
use tokio::sync::Mutex;

use super::ApiClient;
use crate::shared::error::ApiError;
use crate::system::auth::api;
use crate::system::auth::events::AuthEvent;

#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a fresh access token available after a 401.
    ///
    /// `stale_token` is the token the failed request carried. `Ok` means the
    /// store now holds a token worth one retry. On failure the tokens are
    /// cleared, `SessionExpired` is published and `Unauthenticated` returned.
    pub(crate) async fn recover(
        &self,
        client: &ApiClient,
        stale_token: Option<&str>,
    ) -> Result<(), ApiError> {
        let _guard = self.gate.lock().await;
        let store = client.store();

        if let Some(current) = store.access_token() {
            if Some(current.as_str()) != stale_token {
                tracing::debug!("Access token was refreshed by a concurrent request");
                return Ok(());
            }
        }

        let outcome = match store.refresh_token() {
            Some(refresh_token) => client
                .execute::<Payload<AuthTokens>>(&api::refresh_request(&refresh_token), None)
                .await
                .map(Payload::into_inner),
            None => {
                tracing::debug!("No refresh token available");
                Err(ApiError::Unauthenticated)
            }
        };

        match outcome {
            Ok(tokens) => {
                store.set_tokens(&tokens);
                tracing::info!("Access token refreshed");
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                // still under the gate, so waiters cannot reuse the dead refresh token
                store.clear_tokens();
                client.publish(AuthEvent::SessionExpired {
                    redirect_to: client.login_route().to_string(),
                });
                Err(ApiError::Unauthenticated)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RefreshCoordinator;
    use crate::shared::config::test_config;
    use crate::shared::error::ApiError;
    use crate::shared::http::ApiClient;
    use crate::system::auth::events::AuthEvent;
    use crate::system::auth::storage::{CookieSessionStore, SessionStore};
    use crate::test_support::{Reply, StubBackend};
    use chrono::{Duration, Utc};
    use contracts::system::auth::AuthTokens;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn fresh_tokens() -> Value {
        json!({
            "access_token": "access-2",
            "refresh_token": "refresh-2",
            "token_type": "bearer",
            "expires_in": 3600
        })
    }

    #[tokio::test]
    async fn test_401_then_success_refreshes_once() {
        let backend = StubBackend::start().await;
        backend.on_token("GET", "/me/", "access-1", Reply::json(401, json!({})));
        backend.on_token("GET", "/me/", "access-2", Reply::json(200, json!({"ok": true})));
        backend.on("POST", "/auth/refresh/", Reply::json(200, fresh_tokens()));
        let (client, store) = backend.client();
        store.set_tokens(&AuthTokens::new("access-1", "refresh-1"));

        let body: Value = client.get("/me/").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
        assert_eq!(backend.count("POST", "/auth/refresh/"), 1);
        assert_eq!(backend.count("GET", "/me/"), 2);

        let refresh = backend
            .requests()
            .into_iter()
            .find(|r| r.path == "/auth/refresh/")
            .unwrap();
        assert_eq!(refresh.authorization.as_deref(), Some("Bearer refresh-1"));
        assert_eq!(store.access_token().as_deref(), Some("access-2"));
        assert_eq!(store.refresh_token().as_deref(), Some("refresh-2"));
    }

    #[tokio::test]
    async fn test_failed_refresh_clears_tokens_and_publishes() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/me/", Reply::json(401, json!({})));
        backend.on("POST", "/auth/refresh/", Reply::json(401, json!({"message": "expired"})));
        let (client, store) = backend.client();
        let mut events = client.subscribe();
        store.set_tokens(&AuthTokens::new("access-1", "refresh-1"));

        let err = client.get::<Value>("/me/").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
        assert_eq!(err.to_string(), "Authentication failed");
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
        assert_eq!(backend.count("POST", "/auth/refresh/"), 1);
        assert_eq!(backend.count("GET", "/me/"), 1);
        assert_eq!(
            events.try_recv().unwrap(),
            AuthEvent::SessionExpired {
                redirect_to: "/login".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unreadable_refresh_body_is_a_failed_refresh() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/me/", Reply::json(401, json!({})));
        backend.on("POST", "/auth/refresh/", Reply::text(200, "not tokens"));
        let (client, store) = backend.client();
        store.set_tokens(&AuthTokens::new("access-1", "refresh-1"));

        let err = client.get::<Value>("/me/").await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_unreachable_refresh_endpoint_ends_session() {
        let config = test_config("http://127.0.0.1:1");
        let store = Arc::new(CookieSessionStore::new(Default::default()));
        store.set_tokens(&AuthTokens::new("access-1", "refresh-1"));
        let client = ApiClient::new(&config, store.clone()).unwrap();
        let mut events = client.subscribe();

        let err = RefreshCoordinator::new()
            .recover(&client, Some("access-1"))
            .await
            .unwrap_err();
        assert!(err.is_unauthenticated());
        assert!(!store.is_authenticated());
        assert_eq!(
            events.try_recv().unwrap(),
            AuthEvent::SessionExpired {
                redirect_to: "/login".into()
            }
        );
    }

    #[tokio::test]
    async fn test_missing_refresh_token_fails_without_post() {
        let backend = StubBackend::start().await;
        backend.on("GET", "/me/", Reply::json(401, json!({})));
        let (client, _store) = backend.client();

        let err = client.get::<Value>("/me/").await.unwrap_err();
        assert!(err.is_unauthenticated());
        assert_eq!(backend.count("POST", "/auth/refresh/"), 0);
    }

    #[tokio::test]
    async fn test_second_401_is_surfaced_not_looped() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/me/",
            Reply::json(401, json!({"message": "Token revocado"})),
        );
        backend.on("POST", "/auth/refresh/", Reply::json(200, fresh_tokens()));
        let (client, store) = backend.client();
        store.set_tokens(&AuthTokens::new("access-1", "refresh-1"));

        let err = client.get::<Value>("/me/").await.unwrap_err();
        match &err {
            ApiError::Http {
                status, message, ..
            } => {
                assert_eq!(*status, 401);
                assert_eq!(message, "Token revocado");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.count("POST", "/auth/refresh/"), 1);
        assert_eq!(backend.count("GET", "/me/"), 2);
        // the refreshed pair stays: the session itself is still valid
        assert_eq!(store.access_token().as_deref(), Some("access-2"));
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let backend = StubBackend::start().await;
        backend.on_token("GET", "/me/", "access-1", Reply::json(401, json!({})));
        backend.on_token("GET", "/me/", "access-2", Reply::json(200, json!({"ok": true})));
        backend.on(
            "POST",
            "/auth/refresh/",
            Reply::json(200, fresh_tokens()).delayed(std::time::Duration::from_millis(150)),
        );
        let (client, store) = backend.client();
        store.set_tokens(&AuthTokens::new("access-1", "refresh-1"));

        let (a, b, c) = tokio::join!(
            client.get::<Value>("/me/"),
            client.get::<Value>("/me/"),
            client.get::<Value>("/me/"),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());
        assert_eq!(backend.count("POST", "/auth/refresh/"), 1);
    }

    #[tokio::test]
    async fn test_expired_access_cookie_refreshes_before_retry() {
        let backend = StubBackend::start().await;
        backend.on_anonymous("GET", "/me/", Reply::json(401, json!({})));
        backend.on_token("GET", "/me/", "access-2", Reply::json(200, json!({"ok": true})));
        backend.on("POST", "/auth/refresh/", Reply::json(200, fresh_tokens()));
        let (client, store) = backend.client();
        // access cookie issued two hours ago with a one hour lifetime
        store.set_tokens_at(
            &AuthTokens::new("access-1", "refresh-1").with_expires_in(3600),
            Utc::now() - Duration::hours(2),
        );
        assert!(store.access_token().is_none());

        let body: Value = client.get("/me/").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
        assert!(backend.requests()[0].authorization.is_none());
        assert_eq!(backend.count("POST", "/auth/refresh/"), 1);
    }
}
