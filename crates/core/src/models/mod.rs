//! Data models for NumberPlay entities

mod game;
mod message;
mod user;

pub use game::*;
pub use message::*;
pub use user::*;
