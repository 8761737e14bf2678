//! Authentication context and token stores
//!
//! The token is never read from ambient global state. Callers build an
//! [`AuthContext`] and hand it to each API module; the interceptors read and
//! clear the token through it.

use crate::error::{ApiError, ApiResult};
use notebook_core::storage::LocalStore;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Key under which the token is persisted
pub const TOKEN_KEY: &str = "token";

/// Storage for the bearer token
pub trait TokenStore: Send + Sync {
    /// Current token, if any
    fn load(&self) -> ApiResult<Option<String>>;

    /// Replace the token
    fn save(&self, token: &str) -> ApiResult<()>;

    /// Forget the token
    fn clear(&self) -> ApiResult<()>;
}

/// In-process token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ApiResult<Option<String>> {
        let guard = self
            .token
            .read()
            .map_err(|_| ApiError::TokenStore(notebook_core::Error::state_locked()))?;
        Ok(guard.clone())
    }

    fn save(&self, token: &str) -> ApiResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ApiError::TokenStore(notebook_core::Error::state_locked()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        let mut guard = self
            .token
            .write()
            .map_err(|_| ApiError::TokenStore(notebook_core::Error::state_locked()))?;
        *guard = None;
        Ok(())
    }
}

/// Token store persisted in the local state file
#[derive(Debug)]
pub struct FileTokenStore {
    store: LocalStore,
}

impl FileTokenStore {
    /// Open the state file at `path`
    pub fn open(path: impl Into<PathBuf>) -> ApiResult<Self> {
        Ok(Self {
            store: LocalStore::open(path)?,
        })
    }

    /// Location of the state file
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ApiResult<Option<String>> {
        Ok(self.store.get(TOKEN_KEY)?)
    }

    fn save(&self, token: &str) -> ApiResult<()> {
        Ok(self.store.set(TOKEN_KEY, token)?)
    }

    fn clear(&self) -> ApiResult<()> {
        self.store.remove(TOKEN_KEY)?;
        Ok(())
    }
}

/// Authentication context passed to every API module
///
/// Cloning shares the underlying store, so a 401 seen by one module clears
/// the token for every other holder of the same context.
#[derive(Clone)]
pub struct AuthContext {
    store: Arc<dyn TokenStore>,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext").finish_non_exhaustive()
    }
}

impl AuthContext {
    /// Wrap a token store
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Context without a token
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(MemoryTokenStore::new())
    }

    /// In-memory context holding `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(MemoryTokenStore::with_token(token))
    }

    /// Current token; empty tokens count as absent
    pub fn token(&self) -> ApiResult<Option<String>> {
        Ok(self.store.load()?.filter(|t| !t.trim().is_empty()))
    }

    /// Store a new token
    pub fn set_token(&self, token: &str) -> ApiResult<()> {
        if token.trim().is_empty() {
            return Err(ApiError::invalid_input("token cannot be empty"));
        }
        self.store.save(token.trim())
    }

    /// Forget the token (session invalidation)
    pub fn clear(&self) -> ApiResult<()> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_token() {
        assert_eq!(AuthContext::anonymous().token().unwrap(), None);
    }

    #[test]
    fn test_clones_share_store() {
        let auth = AuthContext::with_token("abc");
        let other = auth.clone();

        other.clear().unwrap();
        assert_eq!(auth.token().unwrap(), None);

        auth.set_token("def").unwrap();
        assert_eq!(other.token().unwrap().as_deref(), Some("def"));
    }

    #[test]
    fn test_empty_token_is_absent() {
        let auth = AuthContext::new(MemoryTokenStore::with_token("  "));
        assert_eq!(auth.token().unwrap(), None);
        assert!(auth.set_token("").is_err());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        AuthContext::new(FileTokenStore::open(&path).unwrap())
            .set_token("persisted")
            .unwrap();

        let auth = AuthContext::new(FileTokenStore::open(&path).unwrap());
        assert_eq!(auth.token().unwrap().as_deref(), Some("persisted"));

        auth.clear().unwrap();
        let reopened = AuthContext::new(FileTokenStore::open(&path).unwrap());
        assert_eq!(reopened.token().unwrap(), None);
    }
}
