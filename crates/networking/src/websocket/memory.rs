//! In-memory push transport
//!
//! Every accepted channel hands a [`RemoteEnd`] to the test, which plays the
//! server: push frames, close or break the channel, read what the client sent.

use super::transport::{Channel, Connector};
use async_trait::async_trait;
use numberplay_core::{Error, Result};
use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

#[derive(Debug)]
enum Frame {
    Text(String),
    Close,
    Fail(String),
}

#[derive(Default)]
struct ConnectorState {
    urls: Vec<Url>,
    refuse: bool,
    channels: Vec<Arc<AtomicBool>>,
}

/// Connector that opens in-process channels
pub struct MemoryConnector {
    state: Mutex<ConnectorState>,
    accepted: mpsc::UnboundedSender<RemoteEnd>,
}

impl MemoryConnector {
    /// The receiver yields the server side of each channel as it opens.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RemoteEnd>) {
        let (accepted, accepted_rx) = mpsc::unbounded_channel();
        let connector = Self {
            state: Mutex::new(ConnectorState::default()),
            accepted,
        };
        (connector, accepted_rx)
    }

    fn lock(&self) -> MutexGuard<'_, ConnectorState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fail every following attempt
    pub fn set_refuse(&self, refuse: bool) {
        self.lock().refuse = refuse;
    }

    /// Number of `open` calls, refused ones included
    pub fn attempts(&self) -> usize {
        self.lock().urls.len()
    }

    pub fn urls(&self) -> Vec<Url> {
        self.lock().urls.clone()
    }

    /// Channels opened and not yet closed or dropped by the client
    pub fn live_channels(&self) -> usize {
        self.lock()
            .channels
            .iter()
            .filter(|closed| !closed.load(Ordering::SeqCst))
            .count()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, url: Url) -> Result<Box<dyn Channel>> {
        let closed = Arc::new(AtomicBool::new(false));
        {
            let mut state = self.lock();
            state.urls.push(url.clone());
            if state.refuse {
                return Err(Error::ConnectionError("connection refused".to_string()));
            }
            state.channels.push(Arc::clone(&closed));
        }

        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();

        let remote = RemoteEnd {
            url,
            to_client,
            from_client,
            closed: Arc::clone(&closed),
        };
        // A test that dropped its receiver just never sees the remote end
        let _ = self.accepted.send(remote);

        Ok(Box::new(MemoryChannel {
            incoming,
            outgoing,
            closed,
        }))
    }
}

/// Server side of one in-memory channel
///
/// Dropping it closes the channel as seen by the client.
pub struct RemoteEnd {
    pub url: Url,
    to_client: mpsc::UnboundedSender<Frame>,
    from_client: mpsc::UnboundedReceiver<String>,
    closed: Arc<AtomicBool>,
}

impl RemoteEnd {
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.to_client.send(Frame::Text(text.into()));
    }

    /// Orderly close from the server
    pub fn close(&self) {
        let _ = self.to_client.send(Frame::Close);
    }

    /// Transport error on the client's next read
    pub fn fail(&self, message: &str) {
        let _ = self.to_client.send(Frame::Fail(message.to_string()));
    }

    /// Next frame the client sent, waiting for it
    pub async fn next_sent(&mut self) -> Option<String> {
        self.from_client.recv().await
    }

    /// Next frame the client sent, if any is queued
    pub fn try_next_sent(&mut self) -> Option<String> {
        self.from_client.try_recv().ok()
    }

    pub fn is_closed_by_client(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct MemoryChannel {
    incoming: mpsc::UnboundedReceiver<Frame>,
    outgoing: mpsc::UnboundedSender<String>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Channel for MemoryChannel {
    async fn send(&mut self, text: String) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::ConnectionError("channel closed".to_string()));
        }
        self.outgoing
            .send(text)
            .map_err(|_| Error::ConnectionError("remote end gone".to_string()))
    }

    async fn recv(&mut self) -> Result<Option<String>> {
        match self.incoming.recv().await {
            Some(Frame::Text(text)) => Ok(Some(text)),
            Some(Frame::Close) | None => Ok(None),
            Some(Frame::Fail(message)) => Err(Error::ConnectionError(message)),
        }
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Drop for MemoryChannel {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
