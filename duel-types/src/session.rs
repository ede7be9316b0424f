use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    User,
    Guest,
}

/// Per-player mutable state within a room, keyed by `(room_code, player_id)`.
/// This is the server-side record; it carries the secret code and must never
/// be serialized into a response as-is. Use [`PlayerPublicView`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub room_code: String,
    pub player_id: PlayerId,
    pub player_name: String,
    pub role: PlayerRole,
    pub is_player_joined: bool,
    pub is_ready: bool,
    pub secret_code: Option<String>,
    pub has_turn: bool,
    pub current_guess: Option<String>,
    pub last_seen: String, // ISO 8601 string
}

/// Opponent-safe projection of a session. The secret code is reduced to a
/// boolean here, so no serialization path can leak the code value.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerPublicView {
    pub player_id: PlayerId,
    pub player_name: String,
    pub role: PlayerRole,
    pub is_joined: bool,
    pub is_ready: bool,
    pub has_secret_code: bool,
    pub has_turn: bool,
    pub current_guess: Option<String>,
    pub last_seen: String,
}

impl From<&PlayerSession> for PlayerPublicView {
    fn from(session: &PlayerSession) -> Self {
        PlayerPublicView {
            player_id: session.player_id.clone(),
            player_name: session.player_name.clone(),
            role: session.role,
            is_joined: session.is_player_joined,
            is_ready: session.is_ready,
            has_secret_code: session.secret_code.is_some(),
            has_turn: session.has_turn,
            current_guess: session.current_guess.clone(),
            last_seen: session.last_seen.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_view_hides_secret_code() {
        let session = PlayerSession {
            room_code: "AB12".to_string(),
            player_id: "p1".to_string(),
            player_name: "Alice".to_string(),
            role: PlayerRole::User,
            is_player_joined: true,
            is_ready: true,
            secret_code: Some("1234".to_string()),
            has_turn: true,
            current_guess: None,
            last_seen: "2024-01-01T00:00:00Z".to_string(),
        };

        let view = PlayerPublicView::from(&session);
        assert!(view.has_secret_code);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("1234"));
    }
}
