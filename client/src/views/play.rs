//! Play form

use numberplay_core::{GamePlayResponse, Result};
use numberplay_networking::api::play_input;
use numberplay_networking::GameApi;
use std::sync::Arc;
use tracing::{info, warn};

/// Play form state: the raw input, a loading flag, the last error and the
/// outcome of the last successful submission.
pub struct PlayView {
    api: Arc<dyn GameApi>,
    input: String,
    loading: bool,
    error: Option<String>,
    last_outcome: Option<GamePlayResponse>,
}

impl PlayView {
    pub fn new(api: Arc<dyn GameApi>) -> Self {
        Self {
            api,
            input: String::new(),
            loading: false,
            error: None,
            last_outcome: None,
        }
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn last_outcome(&self) -> Option<&GamePlayResponse> {
        self.last_outcome.as_ref()
    }

    /// The form only accepts plays while the push channel is up
    pub fn can_submit(&self, connected: bool) -> bool {
        connected && !self.loading
    }

    /// Validate and play the current input.
    ///
    /// Success clears the input; failure keeps it and records the message.
    pub async fn submit(&mut self) -> Result<GamePlayResponse> {
        self.loading = true;
        self.error = None;
        let result = play_input(self.api.as_ref(), &self.input).await;
        self.loading = false;

        match result {
            Ok(outcome) => {
                info!("Played {}: {:?}", outcome.number, outcome.result);
                self.input.clear();
                self.last_outcome = Some(outcome.clone());
                Ok(outcome)
            }
            Err(e) => {
                warn!("Play failed: {}", e);
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numberplay_core::{Error, GameOutcomeKind, INVALID_NUMBER_MESSAGE};
    use numberplay_networking::api::MockGameApi;

    #[tokio::test]
    async fn test_invalid_input_is_rejected_locally() {
        let mut api = MockGameApi::new();
        api.expect_play_game().never();
        let mut view = PlayView::new(Arc::new(api));

        for input in ["", "0", "10000", "12.5", "twelve"] {
            view.set_input(input);
            assert!(view.submit().await.is_err());
            assert_eq!(view.error(), Some(INVALID_NUMBER_MESSAGE));
            assert_eq!(view.input(), input);
            assert!(!view.is_loading());
        }
        assert!(view.last_outcome().is_none());
    }

    #[tokio::test]
    async fn test_success_clears_input() {
        let mut api = MockGameApi::new();
        api.expect_play_game().times(1).returning(|number| {
            Ok(GamePlayResponse {
                number: number.get() as i64,
                result: GameOutcomeKind::Win,
                prize: Some(100.0),
            })
        });
        let mut view = PlayView::new(Arc::new(api));

        view.set_input(" 9999 ");
        let outcome = view.submit().await.unwrap();
        assert_eq!(outcome.number, 9999);
        assert_eq!(view.input(), "");
        assert_eq!(view.error(), None);
        assert_eq!(view.last_outcome().unwrap().prize, Some(100.0));
    }

    #[tokio::test]
    async fn test_server_error_keeps_input() {
        let mut api = MockGameApi::new();
        api.expect_play_game()
            .times(1)
            .returning(|_| Err(Error::RateLimited));
        let mut view = PlayView::new(Arc::new(api));

        view.set_input("77");
        let err = view.submit().await.unwrap_err();
        assert!(matches!(err, Error::RateLimited));
        assert_eq!(view.input(), "77");
        assert!(view.error().is_some());

        view.dismiss_error();
        assert_eq!(view.error(), None);
    }

    #[test]
    fn test_can_submit_needs_connection() {
        let view = PlayView::new(Arc::new(MockGameApi::new()));
        assert!(view.can_submit(true));
        assert!(!view.can_submit(false));
    }
}
