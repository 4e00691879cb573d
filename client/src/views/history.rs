//! Game history with client-side paging

use numberplay_core::{GameRecord, Result};
use numberplay_networking::GameApi;
use std::sync::Arc;
use tracing::{debug, warn};

pub const HISTORY_PAGE_SIZE: usize = 10;

pub struct HistoryView {
    api: Arc<dyn GameApi>,
    loading: bool,
    error: Option<String>,
    records: Vec<GameRecord>,
}

impl HistoryView {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self {
            api,
            loading: false,
            error: None,
            records: Vec::new(),
        }
    }

    /// Fetch the history once. A failure keeps the previous records.
    pub async fn load(&mut self) -> Result<()> {
        self.loading = true;
        self.error = None;
        let result = self.api.get_game_history().await;
        self.loading = false;

        match result {
            Ok(records) => {
                debug!("History loaded: {} games", records.len());
                self.records = records;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load history: {}", e);
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

    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// At least one page, even when empty
    pub fn page_count(&self) -> usize {
        self.records.len().div_ceil(HISTORY_PAGE_SIZE).max(1)
    }

    /// Records on a 1-based page; out of range pages are empty
    pub fn page(&self, page: usize) -> &[GameRecord] {
        if page == 0 {
            return &[];
        }
        let start = (page - 1) * HISTORY_PAGE_SIZE;
        if start >= self.records.len() {
            return &[];
        }
        let end = (start + HISTORY_PAGE_SIZE).min(self.records.len());
        &self.records[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numberplay_core::{Error, GameOutcomeKind};
    use numberplay_networking::api::MockGameApi;

    fn record(id: i64) -> GameRecord {
        GameRecord {
            id,
            user_username: "alice".to_string(),
            number: id * 3,
            result: if id % 2 == 0 {
                GameOutcomeKind::Win
            } else {
                GameOutcomeKind::Lose
            },
            prize: None,
            formatted_prize: None,
            formatted_date: None,
            created_at: "2024-03-01T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_load_and_page() {
        let mut api = MockGameApi::new();
        api.expect_get_game_history()
            .times(1)
            .returning(|| Ok((1..=23).rev().map(record).collect()));
        let mut view = HistoryView::new(Arc::new(api));

        assert_eq!(view.page_count(), 1);
        view.load().await.unwrap();
        assert!(!view.is_loading());
        assert_eq!(view.records().len(), 23);
        assert_eq!(view.page_count(), 3);
        assert_eq!(view.page(1).len(), 10);
        assert_eq!(view.page(1)[0].id, 23);
        assert_eq!(view.page(3).len(), 3);
        assert_eq!(view.page(3)[2].id, 1);
        assert!(view.page(0).is_empty());
        assert!(view.page(4).is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_sets_error() {
        let mut api = MockGameApi::new();
        api.expect_get_game_history()
            .times(1)
            .returning(|| Err(Error::NetworkError("connection refused".into())));
        let mut view = HistoryView::new(Arc::new(api));

        assert!(view.load().await.is_err());
        assert!(view.error().unwrap().contains("connection refused"));
        assert!(view.records().is_empty());
    }
}
