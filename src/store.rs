// Persistent token store
// SQLite-backed key/value cache of token bundles with an in-process fast path

use dashmap::DashMap;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::auth::TokenBundle;
use crate::error::StoreError;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS token_cache (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";

/// Durable store of token bundles keyed by account id
pub struct TokenStore {
    /// Durable medium
    conn: Mutex<Connection>,

    /// In-process copy of every entry read or written through this store
    entries: DashMap<String, TokenBundle>,

    /// One lock per account, serializing authenticate-then-persist sequences
    account_locks: DashMap<String, Arc<tokio::sync::Mutex<()>>>,

    /// Return sentinels instead of `KeyNotFound`/`KeyExists`
    fail_silently: bool,

    /// Database location, `None` for in-memory stores
    path: Option<PathBuf>,
}

impl TokenStore {
    /// Open (or create) a store backed by the SQLite file at `path`
    pub fn open(path: impl AsRef<Path>, fail_silently: bool) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        tracing::debug!("Opening token cache: {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn, fail_silently, Some(path.to_path_buf()))
    }

    /// Open a store that lives only as long as this process
    pub fn open_in_memory(fail_silently: bool) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, fail_silently, None)
    }

    fn from_connection(
        conn: Connection,
        fail_silently: bool,
        path: Option<PathBuf>,
    ) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;

        Ok(Self {
            conn: Mutex::new(conn),
            entries: DashMap::new(),
            account_locks: DashMap::new(),
            fail_silently,
            path,
        })
    }

    /// Whether missing/conflicting keys yield sentinels instead of errors
    pub fn fails_silently(&self) -> bool {
        self.fail_silently
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write `bundle` under `key`.
    ///
    /// Returns `Ok(false)` when the key exists, `overwrite` is false and the
    /// store runs in silent mode. Both the durable medium and the in-process
    /// map are updated before `Ok(true)` is returned.
    pub fn write(&self, key: &str, bundle: &TokenBundle, overwrite: bool) -> Result<bool, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;

        if !overwrite && self.exists_locked(&conn, key)? {
            if self.fail_silently {
                tracing::debug!("Token cache already holds \"{}\", not overwriting", key);
                return Ok(false);
            }
            return Err(StoreError::KeyExists(key.to_string()));
        }

        let value = serde_json::to_string(bundle)?;
        conn.execute(
            "INSERT INTO token_cache (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, &value),
        )?;
        self.entries.insert(key.to_string(), bundle.clone());

        tracing::debug!("Stored token bundle for \"{}\"", key);
        Ok(true)
    }

    /// Read the bundle stored under `key`.
    ///
    /// A missing key yields `Ok(None)` in silent mode and
    /// `StoreError::KeyNotFound` in strict mode.
    pub fn get(&self, key: &str) -> Result<Option<TokenBundle>, StoreError> {
        if let Some(entry) = self.entries.get(key) {
            return Ok(Some(entry.value().clone()));
        }

        let raw: Option<String> = {
            let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
            conn.query_row(
                "SELECT value FROM token_cache WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?
        };

        match raw {
            Some(raw) => {
                let bundle: TokenBundle = serde_json::from_str(&raw)?;
                self.entries.insert(key.to_string(), bundle.clone());
                Ok(Some(bundle))
            }
            None if self.fail_silently => Ok(None),
            None => Err(StoreError::KeyNotFound(key.to_string())),
        }
    }

    /// Like [`TokenStore::get`], substituting `default` for a missing key in silent mode
    pub fn get_or(&self, key: &str, default: Option<TokenBundle>) -> Result<Option<TokenBundle>, StoreError> {
        Ok(self.get(key)?.or(default))
    }

    /// Lock guarding the authenticate-then-persist sequence for `key`
    pub fn account_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.account_locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn exists_locked(&self, conn: &Connection, key: &str) -> Result<bool, StoreError> {
        if self.entries.contains_key(key) {
            return Ok(true);
        }
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM token_cache WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("path", &self.path)
            .field("fail_silently", &self.fail_silently)
            .field("cached_entries", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bundle(access: &str, refresh: &str) -> TokenBundle {
        TokenBundle {
            access_token: access.to_string(),
            access_token_expiration: 1_700_000_000,
            refresh_token: refresh.to_string(),
            refresh_token_expiration: 1_700_086_400,
        }
    }

    #[test]
    fn test_write_then_get() {
        let store = TokenStore::open_in_memory(true).unwrap();
        assert!(store.write("u1", &bundle("A", "R"), true).unwrap());
        assert_eq!(store.get("u1").unwrap(), Some(bundle("A", "R")));
    }

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tokens.sqlite3");

        {
            let store = TokenStore::open(&path, true).unwrap();
            store.write("u1", &bundle("A", "R"), true).unwrap();
        }

        // A fresh instance has an empty in-process map and must read from disk
        let store = TokenStore::open(&path, false).unwrap();
        assert_eq!(store.get("u1").unwrap(), Some(bundle("A", "R")));
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let store = TokenStore::open_in_memory(false).unwrap();
        store.write("u1", &bundle("A", "R"), true).unwrap();
        store.write("u1", &bundle("B", "S"), true).unwrap();
        assert_eq!(store.get("u1").unwrap(), Some(bundle("B", "S")));
    }

    #[test]
    fn test_no_overwrite_strict_mode() {
        let store = TokenStore::open_in_memory(false).unwrap();
        store.write("u1", &bundle("A", "R"), true).unwrap();

        let err = store.write("u1", &bundle("B", "S"), false).unwrap_err();
        assert!(matches!(err, StoreError::KeyExists(ref k) if k == "u1"));
        assert_eq!(store.get("u1").unwrap(), Some(bundle("A", "R")));
    }

    #[test]
    fn test_no_overwrite_silent_mode() {
        let store = TokenStore::open_in_memory(true).unwrap();
        store.write("u1", &bundle("A", "R"), true).unwrap();

        assert!(!store.write("u1", &bundle("B", "S"), false).unwrap());
        assert_eq!(store.get("u1").unwrap(), Some(bundle("A", "R")));
    }

    #[test]
    fn test_no_overwrite_detects_durable_only_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.sqlite3");
        TokenStore::open(&path, false)
            .unwrap()
            .write("u1", &bundle("A", "R"), true)
            .unwrap();

        let store = TokenStore::open(&path, false).unwrap();
        assert!(matches!(
            store.write("u1", &bundle("B", "S"), false),
            Err(StoreError::KeyExists(_))
        ));
    }

    #[test]
    fn test_missing_key_modes() {
        let strict = TokenStore::open_in_memory(false).unwrap();
        assert!(matches!(strict.get("nobody"), Err(StoreError::KeyNotFound(ref k)) if k == "nobody"));

        let silent = TokenStore::open_in_memory(true).unwrap();
        assert_eq!(silent.get("nobody").unwrap(), None);
        assert_eq!(
            silent.get_or("nobody", Some(bundle("D", "D"))).unwrap(),
            Some(bundle("D", "D"))
        );
    }

    #[test]
    fn test_corrupt_entry_is_serialization_error() {
        let store = TokenStore::open_in_memory(true).unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO token_cache (key, value) VALUES ('u1', 'not json')",
                [],
            )
            .unwrap();
        }
        assert!(matches!(store.get("u1"), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn test_stored_value_keeps_carrier_field_names() {
        let store = TokenStore::open_in_memory(true).unwrap();
        store.write("u1", &bundle("A", "R"), true).unwrap();

        let conn = store.conn.lock().unwrap();
        let raw: String = conn
            .query_row("SELECT value FROM token_cache WHERE key = 'u1'", [], |row| row.get(0))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["accessToken"], "A");
        assert_eq!(value["accessTokenExpiration"], 1_700_000_000);
        assert_eq!(value["refreshToken"], "R");
        assert_eq!(value["refreshTokenExpiration"], 1_700_086_400);
    }

    #[tokio::test]
    async fn test_account_lock_is_shared_per_key() {
        let store = TokenStore::open_in_memory(true).unwrap();
        let a = store.account_lock("u1");
        let b = store.account_lock("u1");
        let c = store.account_lock("u2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        let _guard = a.lock().await;
        assert!(b.try_lock().is_err());
        assert!(c.try_lock().is_ok());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_round_trip_through_durable_medium(
            key in "[a-zA-Z0-9_-]{1,24}",
            access in ".*",
            refresh in ".*",
            access_exp in any::<i64>(),
            refresh_exp in any::<i64>(),
        ) {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("tokens.sqlite3");
            let original = TokenBundle {
                access_token: access,
                access_token_expiration: access_exp,
                refresh_token: refresh,
                refresh_token_expiration: refresh_exp,
            };

            TokenStore::open(&path, false).unwrap().write(&key, &original, true).unwrap();
            let read_back = TokenStore::open(&path, false).unwrap().get(&key).unwrap();
            prop_assert_eq!(read_back, Some(original));
        }
    }
}
