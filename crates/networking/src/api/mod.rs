//! High-level API surface used by the view controllers
//!
//! [`GameApi`] is the seam between views and the REST client; the free
//! functions add client-side validation before anything hits the network.

mod auth;
mod game;

pub use auth::*;
pub use game::*;

use crate::NumberPlayClient;
use async_trait::async_trait;
use numberplay_core::{GamePlayResponse, GameRecord, PlayNumber, Result, UserStatistics};

/// Operations the views rely on
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn check_auth(&self) -> Result<bool>;

    async fn play_game(&self, number: PlayNumber) -> Result<GamePlayResponse>;

    async fn get_game_history(&self) -> Result<Vec<GameRecord>>;

    async fn get_user_statistics(&self) -> Result<UserStatistics>;

    async fn logout(&self) -> Result<()>;
}

#[async_trait]
impl GameApi for NumberPlayClient {
    async fn check_auth(&self) -> Result<bool> {
        NumberPlayClient::check_auth(self).await
    }

    async fn play_game(&self, number: PlayNumber) -> Result<GamePlayResponse> {
        NumberPlayClient::play_game(self, number).await
    }

    async fn get_game_history(&self) -> Result<Vec<GameRecord>> {
        NumberPlayClient::get_game_history(self).await
    }

    async fn get_user_statistics(&self) -> Result<UserStatistics> {
        NumberPlayClient::get_user_statistics(self).await
    }

    async fn logout(&self) -> Result<()> {
        NumberPlayClient::logout(self).await
    }
}
