//! NumberPlay Client - view controllers, authentication gate and app wiring

pub mod auth;
pub mod command;
pub mod config;
pub mod views;
mod state;

pub use auth::{AuthGate, AuthStatus};
pub use command::Command;
pub use config::ClientConfig;
pub use state::AppState;
