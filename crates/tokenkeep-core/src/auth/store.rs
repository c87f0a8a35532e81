//! Durable persistence for the current token pair.
//!
//! The store sits behind the `CredentialStore` trait so the session logic
//! runs unchanged against the file backend, the OS keychain, or an
//! in-memory fake. Whatever the backend, `get` returns the pair whole or
//! not at all.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// File name for the file-backed store
const TOKENS_FILE: &str = "tokens.json";

/// Keychain entry names for the two halves of the pair
const ACCESS_TOKEN_KEY: &str = "access_token";
const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// The current access/refresh credential pair. Both tokens are opaque
/// bearer strings; this library never inspects or decodes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Durable key/value persistence for the token pair.
///
/// Implementations are whole-pair: `save` persists both tokens as one
/// unit and `get` never yields a partially populated pair.
pub trait CredentialStore: Send + Sync {
    /// Persist the pair, replacing any previous one.
    fn save(&self, tokens: &TokenPair) -> Result<()>;

    /// The current pair, or `None` when no session is stored.
    fn get(&self) -> Result<Option<TokenPair>>;

    /// Remove the pair. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<()>;
}

/// JSON-file store under the application data directory. Survives process
/// restarts; writes go to a temp file followed by a rename so a crash
/// mid-write never leaves a torn pair on disk.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(TOKENS_FILE),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, tokens: &TokenPair) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::Io("token path has no parent directory".into()))?;
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::Io(format!("creating data directory: {e}")))?;

        let contents = serde_json::to_string_pretty(tokens)
            .map_err(|e| Error::Io(format!("serializing tokens: {e}")))?;

        let tmp_path = dir.join(format!(".tokens.tmp.{}", std::process::id()));
        std::fs::write(&tmp_path, contents)
            .map_err(|e| Error::Io(format!("writing temp token file: {e}")))?;

        // 0600: the file holds live bearer tokens (unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&tmp_path, perms)
                .map_err(|e| Error::Io(format!("setting token file permissions: {e}")))?;
        }

        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| Error::Io(format!("renaming temp token file: {e}")))?;
        debug!(path = %self.path.display(), "persisted token pair");
        Ok(())
    }

    fn get(&self) -> Result<Option<TokenPair>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Io(format!("reading token file: {e}")))?;
        let tokens = serde_json::from_str(&contents)
            .map_err(|e| Error::Io(format!("parsing token file: {e}")))?;
        Ok(Some(tokens))
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| Error::Io(format!("removing token file: {e}")))?;
            debug!(path = %self.path.display(), "cleared token pair");
        }
        Ok(())
    }
}

/// OS-keychain store: two entries under one service name.
///
/// `get` requires both entries; a lone survivor (interrupted save, manual
/// keychain edits) reads as no session rather than a half pair.
pub struct KeyringCredentialStore {
    service: String,
}

impl KeyringCredentialStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> Result<Entry> {
        Entry::new(&self.service, key)
            .map_err(|e| Error::Io(format!("creating keyring entry: {e}")))
    }

    fn delete_entry(&self, key: &str) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(Error::Io(format!("deleting keyring entry: {e}"))),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save(&self, tokens: &TokenPair) -> Result<()> {
        self.entry(REFRESH_TOKEN_KEY)?
            .set_password(&tokens.refresh_token)
            .map_err(|e| Error::Io(format!("storing refresh token: {e}")))?;
        self.entry(ACCESS_TOKEN_KEY)?
            .set_password(&tokens.access_token)
            .map_err(|e| Error::Io(format!("storing access token: {e}")))?;
        debug!(service = %self.service, "persisted token pair to keychain");
        Ok(())
    }

    fn get(&self) -> Result<Option<TokenPair>> {
        let access_token = match self.entry(ACCESS_TOKEN_KEY)?.get_password() {
            Ok(token) => token,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(Error::Io(format!("reading access token: {e}"))),
        };
        let refresh_token = match self.entry(REFRESH_TOKEN_KEY)?.get_password() {
            Ok(token) => token,
            Err(keyring::Error::NoEntry) => return Ok(None),
            Err(e) => return Err(Error::Io(format!("reading refresh token: {e}"))),
        };
        Ok(Some(TokenPair {
            access_token,
            refresh_token,
        }))
    }

    fn clear(&self) -> Result<()> {
        self.delete_entry(ACCESS_TOKEN_KEY)?;
        self.delete_entry(REFRESH_TOKEN_KEY)?;
        Ok(())
    }
}

/// In-memory store for tests and embedders that handle persistence
/// themselves.
#[derive(Default)]
pub struct MemoryCredentialStore {
    tokens: Mutex<Option<TokenPair>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<TokenPair>>> {
        self.tokens
            .lock()
            .map_err(|_| Error::Io("memory store lock poisoned".into()))
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, tokens: &TokenPair) -> Result<()> {
        *self.slot()? = Some(tokens.clone());
        Ok(())
    }

    fn get(&self) -> Result<Option<TokenPair>> {
        Ok(self.slot()?.clone())
    }

    fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(suffix: &str) -> TokenPair {
        TokenPair {
            access_token: format!("at_{suffix}"),
            refresh_token: format!("rt_{suffix}"),
        }
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());

        assert_eq!(store.get().unwrap(), None);
        store.save(&pair("1")).unwrap();
        assert_eq!(store.get().unwrap(), Some(pair("1")));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileCredentialStore::new(dir.path()).save(&pair("1")).unwrap();

        let reopened = FileCredentialStore::new(dir.path());
        assert_eq!(reopened.get().unwrap(), Some(pair("1")));
    }

    #[test]
    fn file_store_overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());

        store.save(&pair("1")).unwrap();
        store.save(&pair("2")).unwrap();
        assert_eq!(store.get().unwrap(), Some(pair("2")));
    }

    #[test]
    fn file_store_clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());

        store.save(&pair("1")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);

        // Clearing an already-empty store must not error
        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKENS_FILE), "not json").unwrap();

        let store = FileCredentialStore::new(dir.path());
        assert!(matches!(store.get(), Err(Error::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn file_store_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        store.save(&pair("1")).unwrap();

        let metadata = std::fs::metadata(dir.path().join(TOKENS_FILE)).unwrap();
        let mode = metadata.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "token file must be 0600, got {mode:o}");
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryCredentialStore::new();

        assert_eq!(store.get().unwrap(), None);
        store.save(&pair("1")).unwrap();
        assert_eq!(store.get().unwrap(), Some(pair("1")));

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
        store.clear().unwrap();
    }
}
