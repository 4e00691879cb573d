//! Aggregate statistics

use numberplay_core::{Result, UserStatistics};
use numberplay_networking::GameApi;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StatsView {
    api: Arc<dyn GameApi>,
    loading: bool,
    error: Option<String>,
    stats: Option<UserStatistics>,
}

impl StatsView {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self {
            api,
            loading: false,
            error: None,
            stats: None,
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        self.loading = true;
        self.error = None;
        let result = self.api.get_user_statistics().await;
        self.loading = false;

        match result {
            Ok(stats) => {
                debug!("Statistics loaded: {} games", stats.total_games);
                self.stats = Some(stats);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load statistics: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn stats(&self) -> Option<&UserStatistics> {
        self.stats.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numberplay_core::Error;
    use numberplay_networking::api::MockGameApi;

    #[tokio::test]
    async fn test_load_once() {
        let mut api = MockGameApi::new();
        api.expect_get_user_statistics().times(1).returning(|| {
            Ok(UserStatistics {
                total_games: 4,
                wins: 1,
                losses: 3,
                win_rate: 25.0,
                total_prize: 50.0,
                average_prize: 12.5,
                best_prize: 50.0,
                last_played: Some("2024-03-01T10:00:00Z".to_string()),
            })
        });
        let mut view = StatsView::new(Arc::new(api));
        assert!(view.stats().is_none());

        view.load().await.unwrap();
        let stats = view.stats().unwrap();
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.win_rate, 25.0);
        assert_eq!(view.error(), None);
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut api = MockGameApi::new();
        api.expect_get_user_statistics()
            .returning(|| Err(Error::RateLimited));
        let mut view = StatsView::new(Arc::new(api));

        let err = view.load().await.unwrap_err();
        assert!(matches!(err, Error::RateLimited));
        assert!(view.error().is_some());
        assert!(!view.is_loading());
    }
}
