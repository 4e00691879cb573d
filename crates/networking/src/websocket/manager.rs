//! Reconnecting push connection
//!
//! All connection state lives in one spawned task. The public handle only
//! posts commands to it and reads back `watch`/`broadcast` channels, so every
//! transition (open, frame, close, timer) is handled one at a time to
//! completion. Timers are plain `Option`s: clearing one cancels it.

use super::transport::{Channel, Connector, TungsteniteConnector};
use super::{ConnectionConfig, ConnectionEvent, ConnectionState};
use crate::NumberPlayClient;
use numberplay_core::{Error, InboundMessage, OutboundMessage, Result};
use numberplay_persistence::SessionContext;
use reqwest::Url;
use std::future::{pending, Future};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, Sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const EVENT_CAPACITY: usize = 64;

type PendingAttempt = Pin<Box<dyn Future<Output = Result<Box<dyn Channel>>> + Send>>;

#[derive(Debug)]
enum Command {
    SetEnabled(bool),
    Connect,
    Disconnect,
}

// ─── Handle ──────────────────────────────────────────────────────────

/// Handle to the push connection task
///
/// Dropping the handle stops the task and closes the channel.
pub struct ConnectionManager {
    commands: mpsc::UnboundedSender<Command>,
    events: broadcast::Sender<ConnectionEvent>,
    state_rx: watch::Receiver<ConnectionState>,
    error_rx: watch::Receiver<Option<String>>,
    cancel: CancellationToken,
}

impl ConnectionManager {
    /// Spawn the connection task. Starts out disabled.
    pub fn spawn(
        config: ConnectionConfig,
        api_base: Url,
        session: SessionContext,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disabled);
        let (error_tx, error_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        let driver = Driver {
            config,
            api_base,
            session,
            connector,
            events: events.clone(),
            state_tx,
            error_tx,
            cancel: cancel.clone(),
            enabled: false,
            channel: None,
            attempt: None,
            settle_timer: None,
            reconnect_timer: None,
            ping: None,
        };
        tokio::spawn(driver.run(command_rx));

        Self {
            commands,
            events,
            state_rx,
            error_rx,
            cancel,
        }
    }

    /// Push connection for the same host and session as `client`
    pub fn for_client(client: &NumberPlayClient, config: ConnectionConfig) -> Self {
        Self::spawn(
            config,
            client.base_url().clone(),
            client.session().clone(),
            Arc::new(TungsteniteConnector),
        )
    }

    /// Allow or forbid connecting. Enabling connects after the settle
    /// delay and starts the pinger; disabling tears everything down.
    pub fn set_enabled(&self, enabled: bool) {
        self.send(Command::SetEnabled(enabled));
    }

    /// Connect now. Ignored while disabled or already open/connecting.
    pub fn connect(&self) {
        self.send(Command::Connect);
    }

    /// Close the channel and cancel any pending attempt or retry
    pub fn disconnect(&self) {
        self.send(Command::Disconnect);
    }

    pub fn is_connected(&self) -> bool {
        *self.state_rx.borrow() == ConnectionState::Open
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Last connection error, cleared once a channel opens
    pub fn error(&self) -> Option<String> {
        self.error_rx.borrow().clone()
    }

    /// Receive game results and connection changes. Drop to unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionEvent> {
        self.events.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    pub fn watch_error(&self) -> watch::Receiver<Option<String>> {
        self.error_rx.clone()
    }

    /// Stop the connection task
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Connection manager already stopped, command ignored");
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ─── Task ────────────────────────────────────────────────────────────

struct Driver {
    config: ConnectionConfig,
    api_base: Url,
    session: SessionContext,
    connector: Arc<dyn Connector>,
    events: broadcast::Sender<ConnectionEvent>,
    state_tx: watch::Sender<ConnectionState>,
    error_tx: watch::Sender<Option<String>>,
    cancel: CancellationToken,
    enabled: bool,
    /// At most one channel; only set while Open
    channel: Option<Box<dyn Channel>>,
    attempt: Option<PendingAttempt>,
    settle_timer: Option<Pin<Box<Sleep>>>,
    reconnect_timer: Option<Pin<Box<Sleep>>>,
    ping: Option<Interval>,
}

impl Driver {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        debug!("Connection manager started");

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                result = next_attempt(&mut self.attempt) => {
                    self.attempt = None;
                    self.on_attempt_finished(result);
                }
                frame = next_frame(&mut self.channel) => self.on_frame(frame).await,
                _ = expire(&mut self.settle_timer) => {
                    self.settle_timer = None;
                    self.connect().await;
                }
                _ = expire(&mut self.reconnect_timer) => {
                    self.reconnect_timer = None;
                    info!("Reconnecting push channel");
                    self.connect().await;
                }
                _ = next_tick(&mut self.ping) => self.send_ping().await,
            }
        }

        self.teardown().await;
        debug!("Connection manager stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        debug!("Connection command: {:?}", command);
        match command {
            Command::SetEnabled(true) => self.enable(),
            Command::SetEnabled(false) => self.disable().await,
            Command::Connect => self.connect().await,
            Command::Disconnect => self.disconnect().await,
        }
    }

    fn enable(&mut self) {
        if self.enabled {
            return;
        }
        self.enabled = true;
        info!(
            "Push connection enabled, connecting in {:?}",
            self.config.settle_delay
        );

        self.set_state(ConnectionState::Disconnected);
        self.settle_timer = Some(Box::pin(tokio::time::sleep(self.config.settle_delay)));

        let period = self.config.ping_interval;
        let mut ping = tokio::time::interval_at(Instant::now() + period, period);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ping = Some(ping);
    }

    async fn disable(&mut self) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.ping = None;
        self.disconnect().await;
        self.set_state(ConnectionState::Disabled);
        info!("Push connection disabled");
    }

    async fn connect(&mut self) {
        if !self.enabled {
            debug!("Push connection disabled, not connecting");
            return;
        }
        if self.channel.is_some() || self.attempt.is_some() {
            debug!("Push channel already open or connecting");
            return;
        }

        let token = match self.session.token().await {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("No stored token, cannot open push channel");
                self.set_error(Some(Error::AuthenticationMissing.to_string()));
                return;
            }
            Err(e) => {
                warn!("Failed to read stored token: {}", e);
                self.set_error(Some(e.to_string()));
                return;
            }
        };

        let url = match self.config.push_url(&self.api_base, &token) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot build push URL: {}", e);
                self.set_error(Some(e.to_string()));
                return;
            }
        };

        info!(
            "Connecting push channel to {}://{}:{}{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            self.config.port,
            url.path()
        );

        self.reconnect_timer = None;
        self.set_state(ConnectionState::Connecting);
        let connector = Arc::clone(&self.connector);
        self.attempt = Some(Box::pin(async move { connector.open(url).await }));
    }

    fn on_attempt_finished(&mut self, result: Result<Box<dyn Channel>>) {
        match result {
            Ok(channel) => {
                info!("Push channel open");
                self.channel = Some(channel);
                self.set_error(None);
                self.set_state(ConnectionState::Open);
                self.emit(ConnectionEvent::ConnectionChanged(true));
            }
            Err(e) => {
                warn!("Push channel connection failed: {}", e);
                self.set_error(Some(e.to_string()));
                self.on_closed();
            }
        }
    }

    async fn on_frame(&mut self, frame: Result<Option<String>>) {
        match frame {
            Ok(Some(text)) => self.dispatch(&text),
            Ok(None) => {
                info!("Push channel closed by server");
                self.channel = None;
                self.on_closed();
            }
            Err(e) => {
                warn!("Push channel error: {}", e);
                self.set_error(Some(e.to_string()));
                if let Some(mut channel) = self.channel.take() {
                    channel.close().await;
                }
                self.on_closed();
            }
        }
    }

    /// Route one inbound frame. Only game results reach subscribers.
    fn dispatch(&mut self, text: &str) {
        match InboundMessage::parse(text) {
            Ok(InboundMessage::GameResult(outcome)) => {
                debug!(
                    "Game result pushed: {} -> {:?}",
                    outcome.number, outcome.result
                );
                self.emit(ConnectionEvent::GameResult(outcome));
            }
            Ok(InboundMessage::ConnectionEstablished { message }) => {
                info!(
                    "Push server: {}",
                    message.as_deref().unwrap_or("connection established")
                );
            }
            Ok(InboundMessage::Pong) => debug!("Pong received"),
            Ok(InboundMessage::Error { message }) => {
                warn!(
                    "Push server reported an error: {}",
                    message.as_deref().unwrap_or("unknown")
                );
            }
            Err(e) => warn!("Discarding malformed push frame: {}", e),
        }
    }

    /// Channel lost or attempt failed: report, then retry after the fixed
    /// delay. There is no cap; only disconnect/disable stop the cycle.
    fn on_closed(&mut self) {
        self.set_state(ConnectionState::Closed);
        self.emit(ConnectionEvent::ConnectionChanged(false));

        if self.enabled {
            debug!(
                "Reconnect scheduled in {:?}",
                self.config.reconnect_delay
            );
            self.reconnect_timer =
                Some(Box::pin(tokio::time::sleep(self.config.reconnect_delay)));
        }
    }

    async fn disconnect(&mut self) {
        self.settle_timer = None;
        if self.reconnect_timer.take().is_some() {
            debug!("Pending reconnect cancelled");
        }
        if self.attempt.take().is_some() {
            debug!("In-flight connection attempt dropped");
        }

        let was_open = match self.channel.take() {
            Some(mut channel) => {
                channel.close().await;
                true
            }
            None => false,
        };

        if self.enabled {
            self.set_state(ConnectionState::Disconnected);
        }
        if was_open {
            info!("Push channel disconnected");
            self.emit(ConnectionEvent::ConnectionChanged(false));
        }
    }

    /// Keep-alive. No pong is awaited; a silent server is only noticed when
    /// the transport itself reports the close.
    async fn send_ping(&mut self) {
        let Some(channel) = self.channel.as_mut() else {
            return;
        };

        let text = match OutboundMessage::Ping.to_text() {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to encode ping: {}", e);
                return;
            }
        };

        match channel.send(text).await {
            Ok(()) => debug!("Ping sent"),
            Err(e) => warn!("Failed to send ping: {}", e),
        }
    }

    async fn teardown(&mut self) {
        self.enabled = false;
        self.settle_timer = None;
        self.reconnect_timer = None;
        self.ping = None;
        self.attempt = None;
        if let Some(mut channel) = self.channel.take() {
            channel.close().await;
        }
        self.set_state(ConnectionState::Disabled);
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!("Push connection state {:?} -> {:?}", previous, state);
        }
    }

    fn set_error(&self, error: Option<String>) {
        self.error_tx.send_replace(error);
    }

    fn emit(&self, event: ConnectionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

async fn next_attempt(attempt: &mut Option<PendingAttempt>) -> Result<Box<dyn Channel>> {
    match attempt.as_mut() {
        Some(fut) => fut.await,
        None => pending().await,
    }
}

async fn next_frame(channel: &mut Option<Box<dyn Channel>>) -> Result<Option<String>> {
    match channel.as_mut() {
        Some(channel) => channel.recv().await,
        None => pending().await,
    }
}

async fn expire(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer.as_mut() {
        Some(sleep) => sleep.as_mut().await,
        None => pending().await,
    }
}

async fn next_tick(ping: &mut Option<Interval>) {
    match ping.as_mut() {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending::<()>().await,
    }
}
