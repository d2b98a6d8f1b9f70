//! ZenCat API client
//!
//! Session-aware HTTP layer shared by the admin back-office and the member
//! portal: a cookie-backed token store, a request engine that refreshes the
//! access token once on 401, and typed modules for every backend resource.
//!
//! ```no_run
//! use std::sync::Arc;
//! use client::{ApiClient, CookieSessionStore};
//! use client::domain::a001_community::api as communities;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = client::load_config()?;
//! let store = Arc::new(CookieSessionStore::from_config(&config));
//! let api = ApiClient::new(&config, store)?;
//! let list = communities::fetch_communities(&api).await?;
//! # let _ = list;
//! # Ok(())
//! # }
//! ```

pub mod domain;
pub mod shared;
pub mod system;

#[cfg(test)]
mod test_support;

pub use shared::config::{load_config, Config};
pub use shared::error::ApiError;
pub use shared::http::{ApiClient, ApiRequest, RequestBody};
pub use system::auth::context::{AuthContext, AuthState};
pub use system::auth::events::{spawn_navigation_listener, AuthEvent, Navigator};
pub use system::auth::local_storage::{LocalStorage, UserCache};
pub use system::auth::storage::{CookieSessionStore, SessionStore, StorageError};
