use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Domain error taxonomy for the room state machine. Every precondition
/// failure gets its own variant so the client can show a specific message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum RoomError {
    #[error("{message}")]
    Validation { message: String },
    #[error("Room {room_code} not found")]
    RoomNotFound { room_code: String },
    #[error("No session for player {player_id} in this room")]
    SessionNotFound { player_id: String },
    #[error("No registered player with id {player_id}")]
    PlayerNotFound { player_id: String },
    #[error("Room is full")]
    RoomFull,
    #[error("Room is closed")]
    RoomClosed,
    #[error("Game has already started")]
    GameAlreadyStarted,
    #[error("Player already in room")]
    AlreadyInRoom,
    #[error("Player not in room")]
    NotInRoom,
    #[error("Only room members may perform this action")]
    Unauthorized,
    #[error("At least 2 players are required to start the game, current players: {current}")]
    InsufficientPlayers { current: usize },
    #[error("Not all players have joined properly")]
    IncompleteJoin,
    #[error("{unready} player(s) have not set their secret code")]
    PlayersNotReady { unready: usize },
    #[error("It is not your turn")]
    NotYourTurn,
    #[error("The game is over")]
    GameOver,
    #[error("Internal server error")]
    Internal { message: String },
}

impl RoomError {
    pub fn validation(message: impl Into<String>) -> Self {
        RoomError::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        RoomError::Internal {
            message: message.into(),
        }
    }

    /// Stable machine-readable kind, used as the `error` field on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            RoomError::Validation { .. } => "validation",
            RoomError::RoomNotFound { .. } => "room_not_found",
            RoomError::SessionNotFound { .. } => "session_not_found",
            RoomError::PlayerNotFound { .. } => "player_not_found",
            RoomError::RoomFull => "room_full",
            RoomError::RoomClosed => "room_closed",
            RoomError::GameAlreadyStarted => "game_already_started",
            RoomError::AlreadyInRoom => "already_in_room",
            RoomError::NotInRoom => "not_in_room",
            RoomError::Unauthorized => "unauthorized",
            RoomError::InsufficientPlayers { .. } => "insufficient_players",
            RoomError::IncompleteJoin => "incomplete_join",
            RoomError::PlayersNotReady { .. } => "players_not_ready",
            RoomError::NotYourTurn => "not_your_turn",
            RoomError::GameOver => "game_over",
            RoomError::Internal { .. } => "internal",
        }
    }
}
