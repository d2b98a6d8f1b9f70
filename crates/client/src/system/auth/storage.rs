//! Token store.
//!
//! The access/refresh pair lives in a cookie jar with the same policy the
//! browser apps use: explicit expiry on both cookies, `Secure` under HTTPS and
//! `SameSite=Strict` always. The store is an explicit object handed to the
//! client, never a global.

use chrono::{DateTime, Duration, Utc};
use contracts::system::auth::AuthTokens;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;

use crate::shared::config::Config;
use crate::shared::persist;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// File name of the persisted jar inside `session.storage_dir`
pub const COOKIE_JAR_FILE: &str = "cookies.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Holder of the token pair.
///
/// Readers must never see half a pair: implementations write and clear both
/// tokens as one unit.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Replace both tokens
    fn set_tokens(&self, tokens: &AuthTokens);

    /// Current access token; `None` when missing, expired, or when its
    /// refresh token is gone
    fn access_token(&self) -> Option<String>;

    fn refresh_token(&self) -> Option<String>;

    /// Remove both tokens. Idempotent.
    fn clear_tokens(&self);

    /// Local presence check only; the backend is not asked
    fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        };
        f.write_str(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Cookie {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// `Set-Cookie` header value for this cookie
    pub fn to_set_cookie(&self) -> String {
        let mut header = format!(
            "{}={}; Path={}; Expires={}",
            self.name,
            urlencoding::encode(&self.value),
            self.path,
            self.expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
        );
        if self.secure {
            header.push_str("; Secure");
        }
        header.push_str(&format!("; SameSite={}", self.same_site));
        header
    }
}

/// Expiry and flags applied to the token cookies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub secure: bool,
    /// Used when the token response carries no usable `expires_in`
    pub default_access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl CookiePolicy {
    pub fn from_config(config: &Config) -> Self {
        let defaults = Self::default();
        Self {
            secure: config.is_secure(),
            default_access_ttl: seconds(config.session.access_token_ttl_secs)
                .unwrap_or(defaults.default_access_ttl),
            refresh_ttl: seconds(config.session.refresh_token_ttl_days.saturating_mul(86_400))
                .unwrap_or(defaults.refresh_ttl),
        }
    }

    fn access_ttl(&self, expires_in: Option<u64>) -> Duration {
        expires_in
            .filter(|secs| *secs > 0)
            .and_then(seconds)
            .unwrap_or(self.default_access_ttl)
    }
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            secure: false,
            default_access_ttl: Duration::days(1),
            refresh_ttl: Duration::days(7),
        }
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}

type Jar = BTreeMap<String, Cookie>;

/// Cookie-jar backed [`SessionStore`], optionally persisted to a JSON file
pub struct CookieSessionStore {
    jar: RwLock<Jar>,
    policy: CookiePolicy,
    path: Option<PathBuf>,
}

impl fmt::Debug for CookieSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // cookie values are credentials
        f.debug_struct("CookieSessionStore")
            .field("policy", &self.policy)
            .field("path", &self.path)
            .field("cookies", &self.read_jar().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CookieSessionStore {
    /// In-memory jar
    pub fn new(policy: CookiePolicy) -> Self {
        Self {
            jar: RwLock::new(Jar::new()),
            policy,
            path: None,
        }
    }

    /// Jar persisted at `path`; expired cookies are dropped on load
    pub fn open(path: impl Into<PathBuf>, policy: CookiePolicy) -> Result<Self, StorageError> {
        let path = path.into();
        let mut jar: Jar = persist::read_json_or_default(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        let now = Utc::now();
        jar.retain(|_, cookie| !cookie.is_expired_at(now));
        Ok(Self {
            jar: RwLock::new(jar),
            policy,
            path: Some(path),
        })
    }

    /// Store configured by `session.storage_dir`; falls back to memory when the
    /// jar file cannot be read
    pub fn from_config(config: &Config) -> Self {
        let policy = CookiePolicy::from_config(config);
        match config.storage_dir() {
            Some(dir) => {
                let path = dir.join(COOKIE_JAR_FILE);
                match Self::open(&path, policy.clone()) {
                    Ok(store) => store,
                    Err(e) => {
                        tracing::warn!("Cookie jar unavailable, keeping session in memory: {}", e);
                        Self::new(policy)
                    }
                }
            }
            None => Self::new(policy),
        }
    }

    pub fn policy(&self) -> &CookiePolicy {
        &self.policy
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Unexpired cookies, for callers that mirror them into a real browser
    pub fn cookies(&self) -> Vec<Cookie> {
        let now = Utc::now();
        self.read_jar()
            .values()
            .filter(|c| !c.is_expired_at(now))
            .cloned()
            .collect()
    }

    pub fn set_cookie_headers(&self) -> Vec<String> {
        self.cookies().iter().map(Cookie::to_set_cookie).collect()
    }

    pub(crate) fn set_tokens_at(&self, tokens: &AuthTokens, now: DateTime<Utc>) {
        let access = self.cookie(
            ACCESS_TOKEN_COOKIE,
            &tokens.access_token,
            expiry(now, self.policy.access_ttl(tokens.expires_in)),
        );
        let refresh = self.cookie(
            REFRESH_TOKEN_COOKIE,
            &tokens.refresh_token,
            expiry(now, self.policy.refresh_ttl),
        );

        let mut jar = self.write_jar();
        jar.insert(access.name.clone(), access);
        jar.insert(refresh.name.clone(), refresh);
        self.persist(&jar);
    }

    pub(crate) fn access_token_at(&self, now: DateTime<Utc>) -> Option<String> {
        let jar = self.read_jar();
        let access = live_value(&jar, ACCESS_TOKEN_COOKIE, now)?;
        // half a pair is not a session
        live_value(&jar, REFRESH_TOKEN_COOKIE, now)?;
        Some(access)
    }

    pub(crate) fn refresh_token_at(&self, now: DateTime<Utc>) -> Option<String> {
        live_value(&self.read_jar(), REFRESH_TOKEN_COOKIE, now)
    }

    fn cookie(&self, name: &str, value: &str, expires_at: DateTime<Utc>) -> Cookie {
        Cookie {
            name: name.to_string(),
            value: value.to_string(),
            path: "/".to_string(),
            expires_at,
            secure: self.policy.secure,
            same_site: SameSite::Strict,
        }
    }

    fn persist(&self, jar: &Jar) {
        if let Some(path) = &self.path {
            if let Err(e) = persist::write_json(path, jar) {
                tracing::warn!("Failed to persist cookie jar at {}: {}", path.display(), e);
            }
        }
    }

    fn read_jar(&self) -> RwLockReadGuard<'_, Jar> {
        self.jar.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_jar(&self) -> RwLockWriteGuard<'_, Jar> {
        self.jar.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SessionStore for CookieSessionStore {
    fn set_tokens(&self, tokens: &AuthTokens) {
        self.set_tokens_at(tokens, Utc::now());
    }

    fn access_token(&self) -> Option<String> {
        self.access_token_at(Utc::now())
    }

    fn refresh_token(&self) -> Option<String> {
        self.refresh_token_at(Utc::now())
    }

    fn clear_tokens(&self) {
        let mut jar = self.write_jar();
        let removed_access = jar.remove(ACCESS_TOKEN_COOKIE).is_some();
        let removed_refresh = jar.remove(REFRESH_TOKEN_COOKIE).is_some();
        if removed_access || removed_refresh {
            self.persist(&jar);
        }
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn live_value(jar: &Jar, name: &str, now: DateTime<Utc>) -> Option<String> {
    jar.get(name)
        .filter(|cookie| !cookie.is_expired_at(now))
        .map(|cookie| cookie.value.clone())
}
