//! Live results feed, fed only by push events

use numberplay_core::GamePlayResponse;
use numberplay_networking::ConnectionEvent;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How many outcomes the feed keeps
pub const RESULT_FEED_CAPACITY: usize = 10;

/// Most recent outcomes, newest first
#[derive(Debug, Clone, Default)]
pub struct ResultFeed {
    items: VecDeque<GamePlayResponse>,
}

impl ResultFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front, evicting the oldest past capacity
    pub fn push(&mut self, outcome: GamePlayResponse) {
        self.items.push_front(outcome);
        self.items.truncate(RESULT_FEED_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GamePlayResponse> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GamePlayResponse> {
        self.items.iter()
    }
}

/// Results view state
#[derive(Debug, Clone, Default)]
pub struct ResultsView {
    feed: ResultFeed,
    connected: bool,
}

impl ResultsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::GameResult(outcome) => self.feed.push(outcome),
            ConnectionEvent::ConnectionChanged(connected) => self.connected = connected,
        }
    }

    pub fn feed(&self) -> &ResultFeed {
        &self.feed
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Keep `view` in sync with a connection's events until the connection
/// goes away.
pub fn follow(
    view: Arc<RwLock<ResultsView>>,
    mut events: broadcast::Receiver<ConnectionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => view.write().await.apply(event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Results view fell behind, {} events skipped", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("Results view detached");
    })
}
