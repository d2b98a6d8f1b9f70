use contracts::system::auth::UserInfo;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use crate::shared::config::Config;
use crate::shared::persist;
use crate::system::auth::storage::StorageError;

pub const USER_KEY: &str = "user";

/// File name of the persisted storage inside `session.storage_dir`
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// String key/value store with `localStorage` semantics
#[derive(Debug, Default)]
pub struct LocalStorage {
    items: RwLock<BTreeMap<String, String>>,
    path: Option<PathBuf>,
}

impl LocalStorage {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = persist::read_json_or_default(&path).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            items: RwLock::new(items),
            path: Some(path),
        })
    }

    pub fn from_config(config: &Config) -> Self {
        match config.storage_dir() {
            Some(dir) => Self::open(dir.join(LOCAL_STORAGE_FILE)).unwrap_or_else(|e| {
                tracing::warn!("Local storage unavailable, keeping it in memory: {}", e);
                Self::in_memory()
            }),
            None => Self::in_memory(),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), value.to_string());
        self.persist(&items);
    }

    pub fn remove_item(&self, key: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if items.remove(key).is_some() {
            self.persist(&items);
        }
    }

    fn persist(&self, items: &BTreeMap<String, String>) {
        if let Some(path) = &self.path {
            if let Err(e) = persist::write_json(path, items) {
                tracing::warn!("Failed to persist local storage at {}: {}", path.display(), e);
            }
        }
    }
}

/// The user object cached next to the tokens
#[derive(Debug, Clone)]
pub struct UserCache {
    storage: Arc<LocalStorage>,
}

impl UserCache {
    pub fn new(storage: Arc<LocalStorage>) -> Self {
        Self { storage }
    }

    pub fn save(&self, user: &UserInfo) {
        match serde_json::to_string(user) {
            Ok(json) => self.storage.set_item(USER_KEY, &json),
            Err(e) => tracing::warn!("Failed to serialize cached user: {}", e),
        }
    }

    /// Cached user; an unreadable blob is dropped
    pub fn load(&self) -> Option<UserInfo> {
        let raw = self.storage.get_item(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Discarding unreadable cached user: {}", e);
                self.storage.remove_item(USER_KEY);
                None
            }
        }
    }

    pub fn clear(&self) {
        self.storage.remove_item(USER_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::system::users::UserRole;

    fn user() -> UserInfo {
        UserInfo {
            id: "u-1".into(),
            email: "ana@zencat.app".into(),
            first_name: Some("Ana".into()),
            last_name: None,
            role: UserRole::Admin,
            community_id: None,
        }
    }

    #[test]
    fn test_user_cache_round_trip_and_clear() {
        let cache = UserCache::new(Arc::new(LocalStorage::in_memory()));
        assert!(cache.load().is_none());
        cache.save(&user());
        assert_eq!(cache.load(), Some(user()));
        cache.clear();
        cache.clear();
        assert!(cache.load().is_none());
    }

    #[test]
    fn test_corrupt_blob_is_discarded() {
        let storage = Arc::new(LocalStorage::in_memory());
        storage.set_item(USER_KEY, "{not json");
        let cache = UserCache::new(storage.clone());
        assert!(cache.load().is_none());
        assert!(storage.get_item(USER_KEY).is_none());
    }

    #[test]
    fn test_persisted_storage_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCAL_STORAGE_FILE);
        UserCache::new(Arc::new(LocalStorage::open(&path).unwrap())).save(&user());

        let reopened = UserCache::new(Arc::new(LocalStorage::open(&path).unwrap()));
        assert_eq!(reopened.load(), Some(user()));
    }
}
