//! Game operations with client-side validation

use super::GameApi;
use numberplay_core::{GamePlayResponse, PlayNumber, Result};
use tracing::debug;

/// Validate raw form input and play it.
///
/// Invalid input fails with a validation error before the API is touched.
pub async fn play_input(api: &dyn GameApi, input: &str) -> Result<GamePlayResponse> {
    let number = PlayNumber::parse(input)?;
    debug!("Submitting play for {}", number);
    api.play_game(number).await
}
