use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
};
use uuid::Uuid;

use crate::entities::{prelude::*, rooms};
use duel_types::Room;

/// Storage operations for rooms. All functions take any [`ConnectionTrait`]
/// so callers can run them inside a transaction; the durable store is the
/// synchronization point for every room mutation.
pub struct RoomRepository;

impl RoomRepository {
    pub fn to_domain(model: &rooms::Model) -> Result<Room> {
        let players: Vec<String> = serde_json::from_str(&model.players)?;
        Ok(Room {
            room_code: model.room_code.clone(),
            players,
            room_creator: model.room_creator.clone(),
            is_active_room: model.is_active_room,
            is_game_started: model.is_game_started,
            winner_player_id: model.winner_player_id.clone(),
            created_at: model.created_at.to_rfc3339(),
        })
    }

    pub fn players_of(model: &rooms::Model) -> Result<Vec<String>> {
        Ok(serde_json::from_str(&model.players)?)
    }

    pub async fn create(
        conn: &impl ConnectionTrait,
        room_code: &str,
        creator_id: &str,
    ) -> Result<rooms::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let model = rooms::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            room_code: ActiveValue::Set(room_code.to_string()),
            players: ActiveValue::Set(serde_json::to_string(&[creator_id]).unwrap_or_default()),
            room_creator: ActiveValue::Set(creator_id.to_string()),
            is_active_room: ActiveValue::Set(true),
            is_game_started: ActiveValue::Set(false),
            winner_player_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        model.insert(conn).await
    }

    pub async fn find_by_code(
        conn: &impl ConnectionTrait,
        room_code: &str,
    ) -> Result<Option<rooms::Model>, DbErr> {
        Rooms::find()
            .filter(rooms::Column::RoomCode.eq(room_code))
            .one(conn)
            .await
    }

    pub async fn save_players(
        conn: &impl ConnectionTrait,
        model: rooms::Model,
        players: &[String],
    ) -> Result<rooms::Model, DbErr> {
        let mut active: rooms::ActiveModel = model.into();
        active.players = ActiveValue::Set(serde_json::to_string(players).unwrap_or_default());
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(conn).await
    }

    pub async fn set_game_started(
        conn: &impl ConnectionTrait,
        model: rooms::Model,
        started: bool,
    ) -> Result<rooms::Model, DbErr> {
        let mut active: rooms::ActiveModel = model.into();
        active.is_game_started = ActiveValue::Set(started);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(conn).await
    }

    pub async fn set_winner(
        conn: &impl ConnectionTrait,
        model: rooms::Model,
        winner_player_id: &str,
    ) -> Result<rooms::Model, DbErr> {
        let mut active: rooms::ActiveModel = model.into();
        active.winner_player_id = ActiveValue::Set(Some(winner_player_id.to_string()));
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(conn).await
    }

    /// Put a room back to its pre-start state: not started, no winner.
    /// Used when a started room drops to a single player.
    pub async fn reset_round(
        conn: &impl ConnectionTrait,
        model: rooms::Model,
    ) -> Result<rooms::Model, DbErr> {
        let mut active: rooms::ActiveModel = model.into();
        active.is_game_started = ActiveValue::Set(false);
        active.winner_player_id = ActiveValue::Set(None);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(conn).await
    }

    pub async fn delete(conn: &impl ConnectionTrait, id: &str) -> Result<(), DbErr> {
        Rooms::delete_by_id(id).exec(conn).await?;
        Ok(())
    }
}
