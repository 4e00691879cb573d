//! Push channel transport
//!
//! The connection manager only ever sees text frames through [`Channel`],
//! which keeps tokio-tungstenite behind one small seam.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use numberplay_core::{Error, Result};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

/// Opens push channels
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, url: Url) -> Result<Box<dyn Channel>>;
}

/// One open duplex text channel
#[async_trait]
pub trait Channel: Send {
    async fn send(&mut self, text: String) -> Result<()>;

    /// Next text frame. `Ok(None)` means the peer closed the channel.
    /// Must be cancel-safe.
    async fn recv(&mut self) -> Result<Option<String>>;

    async fn close(&mut self);
}

/// WebSocket connector backed by tokio-tungstenite
#[derive(Debug, Default, Clone, Copy)]
pub struct TungsteniteConnector;

#[async_trait]
impl Connector for TungsteniteConnector {
    async fn open(&self, url: Url) -> Result<Box<dyn Channel>> {
        let (stream, response) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::ConnectionError(e.to_string()))?;
        debug!("Push channel handshake completed: HTTP {}", response.status());
        Ok(Box::new(TungsteniteChannel { stream }))
    }
}

struct TungsteniteChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Channel for TungsteniteChannel {
    async fn send(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| Error::ConnectionError(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Option<String>> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Push server closed channel: {:?}", frame);
                    return Ok(None);
                }
                Some(Ok(Message::Binary(data))) => {
                    warn!("Ignoring {} byte binary frame", data.len());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(Error::ConnectionError(e.to_string())),
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Error while closing push channel: {}", e);
        }
    }
}
