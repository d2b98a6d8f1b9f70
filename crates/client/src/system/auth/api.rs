use contracts::shared::api_response::{ApiResponse, Payload};
use contracts::system::auth::{
    AuthTokens, LoginRequest, LoginResponse, RegisterRequest, UserInfo,
};
use reqwest::header::AUTHORIZATION;
use serde::de::IgnoredAny;
use serde_json::json;

use crate::shared::error::ApiError;
use crate::shared::http::{bearer, ApiClient, ApiRequest};

/// Login with email and password
pub async fn login(
    client: &ApiClient,
    email: impl Into<String>,
    password: impl Into<String>,
) -> Result<LoginResponse, ApiError> {
    let request = LoginRequest {
        email: email.into(),
        password: password.into(),
    };
    client
        .request(ApiRequest::post("/login/").json(&request)?.anonymous())
        .await
}

/// Create an account; the backend answers like a login
pub async fn register(
    client: &ApiClient,
    request: &RegisterRequest,
) -> Result<LoginResponse, ApiError> {
    client
        .request(ApiRequest::post("/register/").json(request)?.anonymous())
        .await
}

/// `POST /auth/refresh/` with the refresh token as bearer.
///
/// Anonymous: a 401 here ends the session instead of triggering another
/// refresh.
pub(crate) fn refresh_request(refresh_token: &str) -> ApiRequest {
    let request = ApiRequest::post("/auth/refresh/").anonymous();
    match bearer(refresh_token) {
        Some(value) => request.header(AUTHORIZATION, value),
        None => request,
    }
}

/// Exchange the refresh token for a new pair
pub async fn refresh_token(
    client: &ApiClient,
    refresh_token: &str,
) -> Result<AuthTokens, ApiError> {
    let payload: Payload<AuthTokens> = client.request(refresh_request(refresh_token)).await?;
    Ok(payload.into_inner())
}

/// Revoke the session on the backend; returns the backend's message, if any
pub async fn logout(client: &ApiClient) -> Result<Option<String>, ApiError> {
    let store = client.store();
    let mut request = ApiRequest::post("/auth/logout/").anonymous();
    if let Some(refresh_token) = store.refresh_token() {
        request = request.json(&json!({ "refresh_token": refresh_token }))?;
    }
    if let Some(value) = store.access_token().as_deref().and_then(bearer) {
        request = request.header(AUTHORIZATION, value);
    }
    let body: serde_json::Value = client.request(request).await?;
    let message = serde_json::from_value::<ApiResponse<IgnoredAny>>(body)
        .ok()
        .and_then(|response| response.message);
    Ok(message)
}

/// Get current user info
pub async fn get_current_user(client: &ApiClient) -> Result<UserInfo, ApiError> {
    let payload: Payload<UserInfo> = client.get("/me/").await?;
    Ok(payload.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::auth::storage::SessionStore;
    use crate::test_support::{Reply, StubBackend};
    use contracts::system::users::UserRole;

    #[tokio::test]
    async fn test_login_is_anonymous_and_parses_tokens() {
        let backend = StubBackend::start().await;
        backend.on(
            "POST",
            "/login/",
            Reply::json(
                200,
                json!({
                    "access_token": "a-1",
                    "refresh_token": "r-1",
                    "expires_in": 900,
                    "user": {"id": "u-1", "email": "ana@zencat.app", "role": "admin"}
                }),
            ),
        );
        let (client, store) = backend.client();
        store.set_tokens(&AuthTokens::new("old", "old-r"));

        let response = login(&client, "ana@zencat.app", "secret").await.unwrap();
        assert_eq!(response.tokens.access_token, "a-1");
        assert_eq!(response.tokens.expires_in, Some(900));
        assert_eq!(response.user.unwrap().role, UserRole::Admin);

        let sent = backend.last("POST", "/login/");
        assert!(sent.authorization.is_none());
        assert_eq!(
            sent.json(),
            json!({"email": "ana@zencat.app", "password": "secret"})
        );
    }

    #[tokio::test]
    async fn test_refresh_sends_refresh_token_as_bearer() {
        let backend = StubBackend::start().await;
        backend.on(
            "POST",
            "/auth/refresh/",
            Reply::json(
                200,
                json!({"data": {"access_token": "a-2", "refresh_token": "r-2"}}),
            ),
        );
        let (client, _store) = backend.client();

        let tokens = refresh_token(&client, "r-1").await.unwrap();
        assert_eq!(tokens, AuthTokens::new("a-2", "r-2"));
        assert_eq!(
            backend.last("POST", "/auth/refresh/").authorization.as_deref(),
            Some("Bearer r-1")
        );
    }

    #[tokio::test]
    async fn test_logout_carries_both_tokens() {
        let backend = StubBackend::start().await;
        backend.on("POST", "/auth/logout/", Reply::json(200, json!({"message": "ok"})));
        let (client, store) = backend.client();
        store.set_tokens(&AuthTokens::new("a-1", "r-1"));

        let message = logout(&client).await.unwrap();
        assert_eq!(message.as_deref(), Some("ok"));
        let sent = backend.last("POST", "/auth/logout/");
        assert_eq!(sent.authorization.as_deref(), Some("Bearer a-1"));
        assert_eq!(sent.json(), json!({"refresh_token": "r-1"}));
    }

    #[tokio::test]
    async fn test_logout_without_body_has_no_message() {
        let backend = StubBackend::start().await;
        backend.on("POST", "/auth/logout/", Reply::empty(204));
        let (client, _store) = backend.client();

        assert_eq!(logout(&client).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_current_user_accepts_envelope_and_bare() {
        let backend = StubBackend::start().await;
        backend.on(
            "GET",
            "/me/",
            Reply::json(200, json!({"data": {"id": "u-1", "email": "a@b.c"}})),
        );
        backend.on(
            "GET",
            "/me/",
            Reply::json(200, json!({"id": "u-2", "email": "d@e.f", "role": "manager"})),
        );
        let (client, _store) = backend.client();

        assert_eq!(get_current_user(&client).await.unwrap().id, "u-1");
        let bare = get_current_user(&client).await.unwrap();
        assert_eq!(bare.id, "u-2");
        assert_eq!(bare.role, UserRole::Manager);
    }
}
