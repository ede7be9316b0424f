use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::entities::{guesses, prelude::*};
use duel_types::GuessRecord;

/// Append-only guess log for a room. The auto-increment id is the storage
/// order; readers get rows back in insertion order.
pub struct GuessRepository;

impl GuessRepository {
    pub fn to_domain(model: &guesses::Model) -> GuessRecord {
        GuessRecord {
            player_id: model.player_id.clone(),
            guess: model.guess.clone(),
            correct_positions: model.correct_positions as u32,
            misplaced: model.misplaced as u32,
            message: model.message.clone(),
            timestamp: model.created_at.to_rfc3339(),
        }
    }

    pub async fn append(
        conn: &impl ConnectionTrait,
        room_code: &str,
        player_id: &str,
        guess: &str,
        correct_positions: u32,
        misplaced: u32,
        message: &str,
    ) -> Result<guesses::Model, DbErr> {
        let model = guesses::ActiveModel {
            id: ActiveValue::NotSet,
            room_code: ActiveValue::Set(room_code.to_string()),
            player_id: ActiveValue::Set(player_id.to_string()),
            guess: ActiveValue::Set(guess.to_string()),
            correct_positions: ActiveValue::Set(correct_positions as i32),
            misplaced: ActiveValue::Set(misplaced as i32),
            message: ActiveValue::Set(message.to_string()),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        model.insert(conn).await
    }

    pub async fn find_all_for_room(
        conn: &impl ConnectionTrait,
        room_code: &str,
    ) -> Result<Vec<guesses::Model>, DbErr> {
        Guesses::find()
            .filter(guesses::Column::RoomCode.eq(room_code))
            .order_by_asc(guesses::Column::Id)
            .all(conn)
            .await
    }

    pub async fn delete_all_for_room(
        conn: &impl ConnectionTrait,
        room_code: &str,
    ) -> Result<(), DbErr> {
        Guesses::delete_many()
            .filter(guesses::Column::RoomCode.eq(room_code))
            .exec(conn)
            .await?;
        Ok(())
    }
}
