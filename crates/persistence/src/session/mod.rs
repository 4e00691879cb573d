//! Session credential storage
//!
//! The bearer token lives in exactly one slot. Whoever needs it (the REST
//! client, the push connection) gets a [`SessionContext`] handed in at
//! construction instead of reaching for a global.

use crate::encryption::TokenEncryptor;
use crate::sqlite::{self, Database};
use async_trait::async_trait;
use numberplay_core::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Well-known key of the access token slot
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Storage capability for the session credential
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current token, if any
    async fn get(&self) -> Result<Option<String>>;

    /// Replace the stored token
    async fn set(&self, token: &str) -> Result<()>;

    /// Forget the stored token. Clearing an empty slot is not an error.
    async fn clear(&self) -> Result<()>;
}

/// Process-local store, lost on exit
#[derive(Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self) -> Result<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn set(&self, token: &str) -> Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

/// Encrypted SQLite-backed store that survives restarts
pub struct SqliteCredentialStore {
    db: Database,
    encryptor: Arc<TokenEncryptor>,
}

impl SqliteCredentialStore {
    pub fn new(db: Database, encryptor: Arc<TokenEncryptor>) -> Self {
        Self { db, encryptor }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn get(&self) -> Result<Option<String>> {
        let stored = sqlite::get_credential(self.db.pool(), ACCESS_TOKEN_KEY).await?;
        match stored {
            Some(stored) => {
                debug!("Loaded access token saved at {}", stored.updated_at);
                self.encryptor.decrypt(&stored.encrypted).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, token: &str) -> Result<()> {
        let encrypted = self.encryptor.encrypt(token)?;
        sqlite::save_credential(self.db.pool(), ACCESS_TOKEN_KEY, &encrypted).await
    }

    async fn clear(&self) -> Result<()> {
        sqlite::delete_credential(self.db.pool(), ACCESS_TOKEN_KEY).await
    }
}

/// Explicit session handle shared by the API client and the push connection
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Session backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCredentialStore::new()))
    }

    pub async fn token(&self) -> Result<Option<String>> {
        self.store.get().await
    }

    pub async fn store_token(&self, token: &str) -> Result<()> {
        debug!("Storing new access token");
        self.store.set(token).await
    }

    pub async fn clear(&self) -> Result<()> {
        debug!("Clearing access token");
        self.store.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_last_write_wins() {
        let session = SessionContext::in_memory();
        assert_eq!(session.token().await.unwrap(), None);

        session.store_token("a").await.unwrap();
        session.store_token("b").await.unwrap();
        assert_eq!(session.token().await.unwrap().as_deref(), Some("b"));

        session.clear().await.unwrap();
        session.clear().await.unwrap();
        assert_eq!(session.token().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_store_encrypts_at_rest() {
        let db = Database::connect_in_memory().await.unwrap();
        let encryptor = Arc::new(TokenEncryptor::from_password("pw").unwrap());
        let store = SqliteCredentialStore::new(db.clone(), encryptor);

        store.set("eyJ.secret.token").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("eyJ.secret.token"));

        let raw = sqlite::get_credential(db.pool(), ACCESS_TOKEN_KEY)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(raw.encrypted.ciphertext, b"eyJ.secret.token".to_vec());

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sessions_share_one_slot() {
        let session = SessionContext::in_memory();
        let other = session.clone();
        session.store_token("shared").await.unwrap();
        assert_eq!(other.token().await.unwrap().as_deref(), Some("shared"));
    }
}
