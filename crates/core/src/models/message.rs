//! Push channel frames (`/ws/game/`)

use crate::{Error, GamePlayResponse, Result};
use serde::{Deserialize, Serialize};

/// Frame tag as sent by the push server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundKind {
    ConnectionEstablished,
    GameResult,
    Pong,
    Error,
}

/// Raw inbound frame as it appears on the wire
#[derive(Debug, Clone, Deserialize)]
struct RawInbound {
    #[serde(rename = "type")]
    kind: InboundKind,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<GamePlayResponse>,
}

/// Typed inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    ConnectionEstablished { message: Option<String> },
    GameResult(GamePlayResponse),
    Pong,
    Error { message: Option<String> },
}

impl InboundMessage {
    /// Parse a text frame.
    ///
    /// Unknown tags, invalid JSON, a malformed `data` payload, and a
    /// `game_result` without `data` are all rejected.
    pub fn parse(text: &str) -> Result<Self> {
        let raw: RawInbound = serde_json::from_str(text)?;
        match raw.kind {
            InboundKind::ConnectionEstablished => Ok(InboundMessage::ConnectionEstablished {
                message: raw.message,
            }),
            InboundKind::GameResult => raw
                .data
                .map(InboundMessage::GameResult)
                .ok_or_else(|| Error::InvalidData("game_result frame without data".to_string())),
            InboundKind::Pong => Ok(InboundMessage::Pong),
            InboundKind::Error => Ok(InboundMessage::Error {
                message: raw.message,
            }),
        }
    }

    pub fn kind(&self) -> InboundKind {
        match self {
            InboundMessage::ConnectionEstablished { .. } => InboundKind::ConnectionEstablished,
            InboundMessage::GameResult(_) => InboundKind::GameResult,
            InboundMessage::Pong => InboundKind::Pong,
            InboundMessage::Error { .. } => InboundKind::Error,
        }
    }
}

/// Frames the client sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Ping,
}

impl OutboundMessage {
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameOutcomeKind;

    #[test]
    fn test_parse_game_result() {
        let msg =
            InboundMessage::parse(r#"{"type":"game_result","data":{"number":42,"result":"lose"}}"#)
                .unwrap();
        assert_eq!(
            msg,
            InboundMessage::GameResult(GamePlayResponse {
                number: 42,
                result: GameOutcomeKind::Lose,
                prize: None,
            })
        );
    }

    #[test]
    fn test_parse_informational_frames() {
        let msg = InboundMessage::parse(
            r#"{"type":"connection_established","message":"Connected to game channel"}"#,
        )
        .unwrap();
        assert_eq!(msg.kind(), InboundKind::ConnectionEstablished);

        let msg = InboundMessage::parse(r#"{"type":"pong","message":"pong"}"#).unwrap();
        assert_eq!(msg, InboundMessage::Pong);

        let msg = InboundMessage::parse(r#"{"type":"error","message":"Invalid JSON format"}"#)
            .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Error {
                message: Some("Invalid JSON format".to_string())
            }
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(InboundMessage::parse("not json").is_err());
        assert!(InboundMessage::parse(r#"{"type":"chat","message":"hi"}"#).is_err());
        assert!(InboundMessage::parse(r#"{"type":"game_result"}"#).is_err());
        assert!(InboundMessage::parse(
            r#"{"type":"game_result","data":{"number":"x","result":"draw"}}"#
        )
        .is_err());
    }

    #[test]
    fn test_ping_frame() {
        assert_eq!(OutboundMessage::Ping.to_text().unwrap(), r#"{"type":"ping"}"#);
    }
}
