//! Authentication gate
//!
//! Decides whether the user may see the game and drives the push
//! connection's enabling flag from that decision.

use numberplay_core::Result;
use numberplay_networking::{ConnectionManager, GameApi};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Authenticated,
    /// Send the user to login
    LoginRequired,
}

pub struct AuthGate {
    api: Arc<dyn GameApi>,
    connection: Arc<ConnectionManager>,
}

impl AuthGate {
    pub fn new(api: Arc<dyn GameApi>, connection: Arc<ConnectionManager>) -> Self {
        Self { api, connection }
    }

    /// Check the stored credential. Any failure counts as logged out.
    pub async fn check(&self) -> AuthStatus {
        let status = match self.api.check_auth().await {
            Ok(true) => AuthStatus::Authenticated,
            Ok(false) => AuthStatus::LoginRequired,
            Err(e) => {
                warn!("Authentication check failed: {}", e);
                AuthStatus::LoginRequired
            }
        };

        self.connection
            .set_enabled(status == AuthStatus::Authenticated);
        info!("Authentication status: {:?}", status);
        status
    }

    /// Forget the credential and stop the push connection
    pub async fn logout(&self) -> Result<()> {
        self.connection.set_enabled(false);
        self.api.logout().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numberplay_core::Error;
    use numberplay_networking::api::MockGameApi;
    use numberplay_networking::websocket::memory::{MemoryConnector, RemoteEnd};
    use numberplay_networking::{ConnectionConfig, ConnectionState, Url};
    use numberplay_persistence::{MemoryCredentialStore, SessionContext};
    use std::time::Duration;

    type Remotes = tokio::sync::mpsc::UnboundedReceiver<RemoteEnd>;

    fn connection() -> (Arc<ConnectionManager>, Arc<MemoryConnector>, Remotes) {
        let (connector, accepted) = MemoryConnector::new();
        let connector = Arc::new(connector);
        let session = SessionContext::new(Arc::new(MemoryCredentialStore::with_token("tok")));
        let manager = ConnectionManager::spawn(
            ConnectionConfig::default(),
            Url::parse("http://localhost:8000").unwrap(),
            session,
            connector.clone(),
        );
        (Arc::new(manager), connector, accepted)
    }

    #[tokio::test(start_paused = true)]
    async fn test_authenticated_enables_connection() {
        let mut api = MockGameApi::new();
        api.expect_check_auth().times(1).returning(|| Ok(true));
        let (manager, connector, _accepted) = connection();
        let gate = AuthGate::new(Arc::new(api), manager.clone());

        assert_eq!(gate.check().await, AuthStatus::Authenticated);
        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_check_errors_mean_login() {
        let mut api = MockGameApi::new();
        api.expect_check_auth()
            .times(1)
            .returning(|| Err(Error::NetworkError("offline".into())));
        let (manager, connector, _accepted) = connection();
        let gate = AuthGate::new(Arc::new(api), manager.clone());

        assert_eq!(gate.check().await, AuthStatus::LoginRequired);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(connector.attempts(), 0);
        assert_eq!(manager.state(), ConnectionState::Disabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_disables_connection() {
        let mut api = MockGameApi::new();
        api.expect_check_auth().returning(|| Ok(true));
        api.expect_logout().times(1).returning(|| Ok(()));
        let (manager, _connector, _accepted) = connection();
        let gate = AuthGate::new(Arc::new(api), manager.clone());

        gate.check().await;
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(manager.is_connected());

        gate.logout().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(manager.state(), ConnectionState::Disabled);
    }
}
