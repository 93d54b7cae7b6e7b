use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StoreError;

/// CredentialKey
///
/// The entries persisted for a session. The string forms are the on-disk keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    Role,
}

impl CredentialKey {
    /// Every key owned by a session; logout clears all of them together.
    pub const ALL: [CredentialKey; 3] = [
        CredentialKey::AccessToken,
        CredentialKey::RefreshToken,
        CredentialKey::Role,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKey::AccessToken => "accessToken",
            CredentialKey::RefreshToken => "refreshToken",
            CredentialKey::Role => "role",
        }
    }
}

// 1. CredentialStore Contract
/// CredentialStore
///
/// Durable key-value persistence for the session credentials. The trait lets the client
/// swap the file-backed store used in the binary for the in-memory store used in tests.
///
/// Absence of a key is `Ok(None)`, never an error. Every write is durable before the
/// returned future resolves.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError>;

    /// Writes several entries in one durable operation.
    async fn set_many(&self, entries: &[(CredentialKey, String)]) -> Result<(), StoreError> {
        self.replace(entries, &[]).await
    }

    /// Writes `entries` and removes `remove` in one durable operation: either all of it
    /// is persisted or none of it is.
    async fn replace(
        &self,
        entries: &[(CredentialKey, String)],
        remove: &[CredentialKey],
    ) -> Result<(), StoreError>;

    /// Removes several entries in one durable operation.
    async fn clear(&self, keys: &[CredentialKey]) -> Result<(), StoreError>;
}

// 2. The Real Implementation (JSON file)
/// FileCredentialStore
///
/// Persists all entries as one JSON object. Writes go to a sibling temp file which is
/// fsync'd and renamed over the target, so a crash leaves either the old or the new
/// object on disk and never a token without its role.
pub struct FileCredentialStore {
    path: PathBuf,
    // Serialises read-modify-write cycles between concurrent screens.
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        // A leftover temp file from an interrupted write may carry other permissions.
        match fs::remove_file(&tmp).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        let mut file = private_file_options().open(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// Options for the temp file: owner read/write only from the moment it exists.
#[cfg(unix)]
fn private_file_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true).mode(0o600);
    options
}

#[cfg(not(unix))]
fn private_file_options() -> fs::OpenOptions {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    options
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key.as_str()))
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value.to_string())]).await
    }

    async fn replace(
        &self,
        updates: &[(CredentialKey, String)],
        remove: &[CredentialKey],
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        for key in remove {
            entries.remove(key.as_str());
        }
        for (key, value) in updates {
            entries.insert(key.as_str().to_string(), value.clone());
        }
        self.write_entries(&entries).await
    }

    async fn clear(&self, keys: &[CredentialKey]) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        // A corrupt file is replaced rather than blocking logout.
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(StoreError::Corrupt(reason)) => {
                tracing::warn!(%reason, "discarding corrupt credential file during clear");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        for key in keys {
            entries.remove(key.as_str());
        }
        self.write_entries(&entries).await
    }
}

// 3. The Mock Implementation (For Tests)
/// MemoryCredentialStore
///
/// In-memory store used by unit and integration tests. `new_failing()` simulates a
/// storage layer that is unavailable for every operation.
#[derive(Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<BTreeMap<CredentialKey, String>>,
    writes: AtomicUsize,
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Pre-populated store, e.g. a session persisted by a previous run.
    pub fn with_entries(entries: &[(CredentialKey, &str)]) -> Self {
        let map = entries
            .iter()
            .map(|(key, value)| (*key, value.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
            ..Self::default()
        }
    }

    /// Copy of the current contents, for assertions.
    pub async fn snapshot(&self) -> BTreeMap<CredentialKey, String> {
        self.entries.lock().await.clone()
    }

    /// Number of successful write operations (set, replace, clear) so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.should_fail {
            return Err(StoreError::Unavailable(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.entries.lock().await.get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: &str) -> Result<(), StoreError> {
        self.replace(&[(key, value.to_string())], &[]).await
    }

    async fn replace(
        &self,
        updates: &[(CredentialKey, String)],
        remove: &[CredentialKey],
    ) -> Result<(), StoreError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().await;
        for key in remove {
            entries.remove(key);
        }
        for (key, value) in updates {
            entries.insert(*key, value.clone());
        }
        Ok(())
    }

    async fn clear(&self, keys: &[CredentialKey]) -> Result<(), StoreError> {
        self.check()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut entries = self.entries.lock().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

/// CredentialState
///
/// The shared handle to the credential store used across the client.
pub type CredentialState = Arc<dyn CredentialStore>;
