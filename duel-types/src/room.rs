use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::PlayerId;
use crate::session::PlayerPublicView;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Room {
    pub room_code: String,
    /// Ordered by join time, at most 2 entries, no duplicates.
    pub players: Vec<PlayerId>,
    pub room_creator: PlayerId,
    pub is_active_room: bool,
    pub is_game_started: bool,
    pub winner_player_id: Option<PlayerId>,
    pub created_at: String, // ISO 8601 string
}

/// One entry of the append-only guess log. Storage order is insertion
/// order; latest-first display is the client's concern.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GuessRecord {
    pub player_id: PlayerId,
    pub guess: String,
    pub correct_positions: u32,
    pub misplaced: u32,
    pub message: String,
    pub timestamp: String, // ISO 8601 string
}

/// Composite snapshot returned by the status endpoint. Clients poll this
/// on an interval to observe turn changes, guesses and the win state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RoomStatus {
    pub room: Room,
    pub players: Vec<PlayerPublicView>,
    pub guess_history: Vec<GuessRecord>,
    pub can_start_game: bool,
}
