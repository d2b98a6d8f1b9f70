//! Session state for the whole application.
//!
//! Wraps the auth endpoints so that tokens, the cached user and the auth
//! events always change together.

use contracts::system::auth::{LoginResponse, RegisterRequest, UserInfo};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::api;
use super::events::AuthEvent;
use super::local_storage::UserCache;
use crate::shared::error::ApiError;
use crate::shared::http::ApiClient;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthState {
    pub authenticated: bool,
    pub user: Option<UserInfo>,
}

impl AuthState {
    fn signed_in(user: UserInfo) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthContext {
    client: ApiClient,
    users: UserCache,
}

impl AuthContext {
    pub fn new(client: ApiClient, users: UserCache) -> Self {
        Self { client, users }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Derived from the token store and the cached user; nothing is fetched
    pub fn state(&self) -> AuthState {
        let user = self.users.load();
        AuthState {
            authenticated: self.client.store().is_authenticated() && user.is_some(),
            user,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().authenticated
    }

    pub fn is_admin(&self) -> bool {
        let state = self.state();
        state.authenticated && state.user.map(|u| u.is_admin()).unwrap_or(false)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthState, ApiError> {
        let response = api::login(&self.client, email, password).await?;
        self.start_session(response).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthState, ApiError> {
        let response = api::register(&self.client, request).await?;
        self.start_session(response).await
    }

    /// Bootstrap: check a leftover session against `/me/`.
    ///
    /// An expired access token is refreshed by the engine on the way.
    pub async fn restore(&self) -> Result<AuthState, ApiError> {
        if self.client.store().refresh_token().is_none() {
            self.client.store().clear_tokens();
            self.users.clear();
            return Ok(AuthState::default());
        }

        match api::get_current_user(&self.client).await {
            Ok(user) => {
                self.users.save(&user);
                tracing::info!("Session restored for {}", user.email);
                Ok(AuthState::signed_in(user))
            }
            Err(ApiError::Unauthenticated) => {
                self.users.clear();
                Ok(AuthState::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Local state is cleared even when the backend call fails
    pub async fn logout(&self) {
        match api::logout(&self.client).await {
            Ok(Some(message)) => tracing::debug!("Backend logout: {}", message),
            Ok(None) => {}
            Err(e) => tracing::warn!("Logout request failed: {}", e),
        }
        self.client.store().clear_tokens();
        self.users.clear();
        self.client.publish(AuthEvent::LoggedOut);
        tracing::info!("Logged out");
    }

    /// Drop the cached user whenever the session expires underneath us
    pub fn spawn_event_handler(&self) -> JoinHandle<()> {
        let mut events = self.client.subscribe();
        let users = self.users.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(AuthEvent::SessionExpired { .. }) => users.clear(),
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    async fn start_session(&self, response: LoginResponse) -> Result<AuthState, ApiError> {
        let store = self.client.store();
        store.set_tokens(&response.tokens);

        let user = match response.user {
            Some(user) => user,
            None => match api::get_current_user(&self.client).await {
                Ok(user) => user,
                Err(e) => {
                    // no half-open session without a user
                    store.clear_tokens();
                    return Err(e);
                }
            },
        };

        self.users.save(&user);
        tracing::info!("Logged in as {}", user.email);
        self.client.publish(AuthEvent::LoggedIn {
            user_id: user.id.clone(),
        });
        Ok(AuthState::signed_in(user))
    }
}
