//! Game-related models

use crate::PlayNumber;
use serde::{Deserialize, Serialize};

/// Outcome of a single play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcomeKind {
    Win,
    Lose,
}

impl GameOutcomeKind {
    pub fn is_win(&self) -> bool {
        matches!(self, GameOutcomeKind::Win)
    }
}

/// Request body for `POST /api/game/play/`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GamePlayRequest {
    pub number: PlayNumber,
}

/// Play outcome, returned by `POST /api/game/play/` and pushed as `game_result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePlayResponse {
    pub number: i64,
    pub result: GameOutcomeKind,
    #[serde(default)]
    pub prize: Option<f64>,
}

impl GamePlayResponse {
    /// Prize, only when the play was a win
    pub fn winnings(&self) -> Option<f64> {
        if self.result.is_win() {
            self.prize
        } else {
            None
        }
    }
}

/// A stored game, as returned by `GET /api/game/history/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: i64,
    #[serde(default)]
    pub user_username: String,
    pub number: i64,
    pub result: GameOutcomeKind,
    /// Decimal field; the server may send it as a string
    #[serde(default, deserialize_with = "deserialize_opt_f64")]
    pub prize: Option<f64>,
    #[serde(default)]
    pub formatted_prize: Option<String>,
    #[serde(default)]
    pub formatted_date: Option<String>,
    pub created_at: String,
}

/// Aggregate statistics from `GET /api/game/statistics/`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_rate: f64,
    pub total_prize: f64,
    pub average_prize: f64,
    pub best_prize: f64,
    #[serde(default)]
    pub last_played: Option<String>,
}

/// Accepts a number, a numeric string, or null
fn deserialize_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => s
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected prize as number or string, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_response_without_prize() {
        let r: GamePlayResponse =
            serde_json::from_str(r#"{"number":841,"result":"lose","prize":null}"#).unwrap();
        assert_eq!(r.result, GameOutcomeKind::Lose);
        assert_eq!(r.prize, None);
        assert_eq!(r.winnings(), None);
    }

    #[test]
    fn test_record_accepts_decimal_string_prize() {
        let json = r#"{
            "id": 7,
            "user_username": "john_doe",
            "number": 842,
            "result": "win",
            "prize": "589.40",
            "formatted_prize": "$589.40",
            "formatted_date": "2025-01-02 10:00:00",
            "created_at": "2025-01-02T10:00:00Z"
        }"#;
        let record: GameRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.prize, Some(589.4));
        assert!(record.result.is_win());
    }

    #[test]
    fn test_empty_statistics() {
        let json = r#"{"total_games":0,"wins":0,"losses":0,"win_rate":0,
            "total_prize":0,"average_prize":0,"best_prize":0,"last_played":null}"#;
        let stats: UserStatistics = serde_json::from_str(json).unwrap();
        assert_eq!(stats, UserStatistics::default());
    }
}
