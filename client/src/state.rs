//! Application state

use crate::config::ClientConfig;
use crate::views::{follow, ResultsView};
use numberplay_core::Result;
use numberplay_networking::{ConnectionManager, GameApi, NumberPlayClient};
use numberplay_persistence::{
    derive_machine_key, Database, SessionContext, SqliteCredentialStore, TokenEncryptor,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Everything the front end shares: the REST client, the push connection,
/// and the results view it feeds.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub client: NumberPlayClient,
    pub connection: Arc<ConnectionManager>,
    pub results: Arc<RwLock<ResultsView>>,
}

impl AppState {
    /// Open credential storage and wire up the client. Must run inside a
    /// tokio runtime.
    pub async fn new(config: ClientConfig) -> Result<Self> {
        let session = open_session(&config).await?;
        let client = NumberPlayClient::new(&config.api_url, session)?;

        let connection = Arc::new(ConnectionManager::for_client(
            &client,
            config.connection.clone(),
        ));
        let results = Arc::new(RwLock::new(ResultsView::new()));
        follow(results.clone(), connection.subscribe());

        Ok(Self {
            config,
            client,
            connection,
            results,
        })
    }

    pub fn api(&self) -> Arc<dyn GameApi> {
        Arc::new(self.client.clone())
    }
}

async fn open_session(config: &ClientConfig) -> Result<SessionContext> {
    if config.memory_store {
        info!("Keeping credentials in memory");
        return Ok(SessionContext::in_memory());
    }

    let key = derive_machine_key()?;
    let encryptor = TokenEncryptor::new(&key)?;
    info!("Encryption key derived from machine fingerprint");

    let db_path = config.database_path();
    let db = Database::connect(&db_path).await?;
    info!("Credential store at {}", db_path.display());

    Ok(SessionContext::new(Arc::new(SqliteCredentialStore::new(
        db,
        Arc::new(encryptor),
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use numberplay_networking::ConnectionState;

    #[tokio::test]
    async fn test_memory_state_starts_disconnected() {
        let config = ClientConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            data_dir: std::env::temp_dir(),
            memory_store: true,
            connection: Default::default(),
        };
        let state = AppState::new(config).await.unwrap();

        assert_eq!(state.connection.state(), ConnectionState::Disabled);
        assert!(!state.api().check_auth().await.unwrap());
        assert!(state.results.read().await.feed().is_empty());
    }

    #[tokio::test]
    async fn test_bad_api_url_fails() {
        let config = ClientConfig {
            api_url: "not a url".to_string(),
            data_dir: std::env::temp_dir(),
            memory_store: true,
            connection: Default::default(),
        };
        assert!(AppState::new(config).await.is_err());
    }
}
