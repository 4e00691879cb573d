//! NumberPlay Networking - REST client, push connection, and API wrappers

pub mod api;
pub mod http;
pub mod websocket;

pub use api::GameApi;
pub use http::NumberPlayClient;
pub use reqwest::Url;
pub use websocket::{ConnectionConfig, ConnectionEvent, ConnectionManager, ConnectionState};
