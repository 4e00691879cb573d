//! Push connection for real-time game results
//!
//! A [`ConnectionManager`] keeps one authenticated channel to
//! `/ws/game/` open while enabled, retrying every few seconds forever
//! until it is disabled or explicitly disconnected.

mod manager;
mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use manager::ConnectionManager;
pub use transport::{Channel, Connector, TungsteniteConnector};

use numberplay_core::{Error, GamePlayResponse, Result};
use reqwest::Url;
use std::time::Duration;

/// Push connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not allowed to connect (user not authenticated)
    Disabled,
    /// Enabled but no channel, and no retry pending
    Disconnected,
    Connecting,
    Open,
    /// Channel lost; a retry is pending while enabled
    Closed,
}

/// Events delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    GameResult(GamePlayResponse),
    ConnectionChanged(bool),
}

/// Timing and addressing for the push channel
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Fixed delay before every reconnect attempt
    pub reconnect_delay: Duration,
    /// Delay between enabling and the first attempt
    pub settle_delay: Duration,
    pub ping_interval: Duration,
    pub port: u16,
    pub path: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_millis(3000),
            settle_delay: Duration::from_millis(1000),
            ping_interval: Duration::from_millis(30000),
            port: 8000,
            path: "/ws/game/".to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Build the channel URL for `api_base`'s host.
    ///
    /// The scheme follows the API's transport security (https → wss) and
    /// the token travels as the `token` query parameter, which is what the
    /// push server authenticates on.
    pub fn push_url(&self, api_base: &Url, token: &str) -> Result<Url> {
        let scheme = if api_base.scheme() == "https" { "wss" } else { "ws" };
        let host = api_base
            .host_str()
            .ok_or_else(|| Error::InvalidData(format!("API base {} has no host", api_base)))?;

        let mut url = Url::parse(&format!("{}://{}:{}{}", scheme, host, self.port, self.path))
            .map_err(|e| Error::InvalidData(format!("Invalid push URL: {}", e)))?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }
}
