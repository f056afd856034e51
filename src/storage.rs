//! Persistent client-side storage
//!
//! A small fjall-backed key-value store holding user preferences (selected
//! currency, session tokens) and short-lived lookups such as reverse
//! geocoding results. Entries are postcard-encoded with an optional expiry.

use crate::{Result, TravelError};
use fjall::{Database, Keyspace, PersistMode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: Option<u64>, // Unix timestamp (seconds)
}

fn now_secs() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| TravelError::storage(format!("clock before epoch: {e}")))
}

#[derive(Clone)]
pub struct PersistentStore {
    db: Database,
    store: Keyspace,
}

impl PersistentStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let db = Database::builder(path).open()?;
        let items = db.keyspace("client_storage", fjall::KeyspaceCreateOptions::default)?;
        tracing::debug!("Opened persistent store at {}", path.display());
        Ok(PersistentStore { db, store: items })
    }

    /// Stores a serializable value, expiring after `ttl` when one is given.
    #[tracing::instrument(name = "put_store", level = "debug", skip(self, value))]
    pub fn put<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) -> Result<()> {
        let expires_at = match ttl {
            Some(ttl) => Some(
                now_secs()?
                    .checked_add(ttl.as_secs())
                    .ok_or_else(|| TravelError::storage("TTL overflow"))?,
            ),
            None => None,
        };
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;
        self.store.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Expired entries are removed and reported as a miss.
    #[tracing::instrument(name = "query_store", level = "debug", skip(self))]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(bytes) = self.store.get(key.as_bytes())? else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = postcard::from_bytes(&bytes)?;
        match entry.expires_at {
            Some(expires_at) if now_secs()? >= expires_at => {
                tracing::debug!("Key found but expired");
                self.remove(key)?;
                Ok(None)
            }
            _ => Ok(Some(entry.value)),
        }
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.store.remove(key.as_bytes())?;
        Ok(())
    }

    /// Flush the journal so writes survive the process.
    pub fn persist(&self) -> Result<()> {
        self.db.persist(PersistMode::SyncAll)?;
        Ok(())
    }

    /// [`put`](Self::put) on the blocking pool.
    pub async fn put_async<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let this = self.clone();
        let key = key.to_string();
        task::spawn_blocking(move || this.put(&key, &value, ttl))
            .await
            .map_err(|e| TravelError::storage(format!("store task failed: {e}")))?
    }

    /// [`get`](Self::get) on the blocking pool.
    pub async fn get_async<T: DeserializeOwned + Send + 'static>(
        &self,
        key: &str,
    ) -> Result<Option<T>> {
        let this = self.clone();
        let key = key.to_string();
        task::spawn_blocking(move || this.get(&key))
            .await
            .map_err(|e| TravelError::storage(format!("store task failed: {e}")))?
    }
}

/// String preferences, the equivalent of browser local storage.
pub trait PreferenceStore {
    fn get_pref(&self, key: &str) -> Result<Option<String>>;
    fn set_pref(&self, key: &str, value: &str) -> Result<()>;
    fn remove_pref(&self, key: &str) -> Result<()>;
}

impl PreferenceStore for PersistentStore {
    fn get_pref(&self, key: &str) -> Result<Option<String>> {
        self.get(key)
    }

    fn set_pref(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, &value.to_string(), None)?;
        self.persist()
    }

    fn remove_pref(&self, key: &str) -> Result<()> {
        self.remove(key)?;
        self.persist()
    }
}

/// Process-local preferences that vanish on exit.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| TravelError::storage("preference map poisoned"))
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_pref(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_pref(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_pref(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for &P {
    fn get_pref(&self, key: &str) -> Result<Option<String>> {
        (**self).get_pref(key)
    }

    fn set_pref(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_pref(key, value)
    }

    fn remove_pref(&self, key: &str) -> Result<()> {
        (**self).remove_pref(key)
    }
}
