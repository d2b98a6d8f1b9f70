//! Session lifecycle events and the single navigation listener.
//!
//! The HTTP layer never navigates; it publishes [`AuthEvent`]s and one
//! listener at the top of the application turns them into route changes.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Capacity of the auth event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn { user_id: String },
    LoggedOut,
    /// Refresh failed or no refresh token was available; tokens are cleared
    SessionExpired { redirect_to: String },
}

/// Whatever performs route changes (router, window location, a test recorder)
pub trait Navigator: Send + Sync + 'static {
    fn navigate(&self, route: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn navigate(&self, route: &str) {
        self(route)
    }
}

/// Spawn the listener that redirects to the login route when the session
/// expires.
///
/// Several in-flight calls can fail together; only the first expiry after a
/// login (or after start) navigates. The task ends when every sender is gone.
pub fn spawn_navigation_listener<N: Navigator>(
    mut events: broadcast::Receiver<AuthEvent>,
    navigator: N,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut expired = false;
        loop {
            match events.recv().await {
                Ok(AuthEvent::SessionExpired { redirect_to }) => {
                    if !expired {
                        expired = true;
                        tracing::info!("Session expired, redirecting to {}", redirect_to);
                        navigator.navigate(&redirect_to);
                    }
                }
                Ok(AuthEvent::LoggedIn { .. }) => expired = false,
                Ok(AuthEvent::LoggedOut) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Navigation listener skipped {} auth events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_navigator() -> (Arc<Mutex<Vec<String>>>, impl Navigator) {
        let routes = Arc::new(Mutex::new(Vec::new()));
        let sink = routes.clone();
        (routes, move |route: &str| {
            sink.lock().unwrap().push(route.to_string())
        })
    }

    fn expired() -> AuthEvent {
        AuthEvent::SessionExpired {
            redirect_to: "/login".into(),
        }
    }

    #[tokio::test]
    async fn test_repeated_expiry_navigates_once_per_login() {
        let (tx, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (routes, navigator) = recording_navigator();
        let handle = spawn_navigation_listener(rx, navigator);

        tx.send(expired()).unwrap();
        tx.send(expired()).unwrap();
        tx.send(AuthEvent::LoggedIn {
            user_id: "u-1".into(),
        })
        .unwrap();
        tx.send(expired()).unwrap();
        drop(tx);

        handle.await.unwrap();
        assert_eq!(*routes.lock().unwrap(), vec!["/login", "/login"]);
    }

    #[tokio::test]
    async fn test_logout_does_not_navigate() {
        let (tx, rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (routes, navigator) = recording_navigator();
        let handle = spawn_navigation_listener(rx, navigator);

        tx.send(AuthEvent::LoggedOut).unwrap();
        drop(tx);

        handle.await.unwrap();
        assert!(routes.lock().unwrap().is_empty());
    }
}
