use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entities::{player_sessions, prelude::*};
use duel_types::{PlayerRole, PlayerSession};

/// Storage operations for per-(room, player) sessions. The unique compound
/// index on (room_code, player_id) is what makes duplicate joins impossible
/// even under concurrent requests.
pub struct SessionRepository;

impl SessionRepository {
    pub fn role_to_str(role: PlayerRole) -> &'static str {
        match role {
            PlayerRole::User => "user",
            PlayerRole::Guest => "guest",
        }
    }

    fn str_to_role(role: &str) -> PlayerRole {
        match role {
            "guest" => PlayerRole::Guest,
            _ => PlayerRole::User,
        }
    }

    pub fn to_domain(model: &player_sessions::Model) -> PlayerSession {
        PlayerSession {
            room_code: model.room_code.clone(),
            player_id: model.player_id.clone(),
            player_name: model.player_name.clone(),
            role: Self::str_to_role(&model.role),
            is_player_joined: model.is_player_joined,
            is_ready: model.is_ready,
            secret_code: model.secret_code.clone(),
            has_turn: model.has_turn,
            current_guess: model.current_guess.clone(),
            last_seen: model.last_seen.to_rfc3339(),
        }
    }

    pub async fn create(
        conn: &impl ConnectionTrait,
        room_code: &str,
        player_id: &str,
        player_name: &str,
        role: PlayerRole,
    ) -> Result<player_sessions::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let model = player_sessions::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            room_code: ActiveValue::Set(room_code.to_string()),
            player_id: ActiveValue::Set(player_id.to_string()),
            player_name: ActiveValue::Set(player_name.to_string()),
            role: ActiveValue::Set(Self::role_to_str(role).to_string()),
            is_player_joined: ActiveValue::Set(true),
            is_ready: ActiveValue::Set(false),
            secret_code: ActiveValue::Set(None),
            has_turn: ActiveValue::Set(false),
            current_guess: ActiveValue::Set(None),
            last_seen: ActiveValue::Set(now),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        model.insert(conn).await
    }

    pub async fn find(
        conn: &impl ConnectionTrait,
        room_code: &str,
        player_id: &str,
    ) -> Result<Option<player_sessions::Model>, DbErr> {
        PlayerSessions::find()
            .filter(player_sessions::Column::RoomCode.eq(room_code))
            .filter(player_sessions::Column::PlayerId.eq(player_id))
            .one(conn)
            .await
    }

    pub async fn find_all_for_room(
        conn: &impl ConnectionTrait,
        room_code: &str,
    ) -> Result<Vec<player_sessions::Model>, DbErr> {
        PlayerSessions::find()
            .filter(player_sessions::Column::RoomCode.eq(room_code))
            .order_by_asc(player_sessions::Column::CreatedAt)
            .all(conn)
            .await
    }

    /// Setting a valid code is what makes a player ready; there is no
    /// separate ready toggle.
    pub async fn set_secret_code(
        conn: &impl ConnectionTrait,
        model: player_sessions::Model,
        code: &str,
    ) -> Result<player_sessions::Model, DbErr> {
        let mut active: player_sessions::ActiveModel = model.into();
        active.secret_code = ActiveValue::Set(Some(code.to_string()));
        active.is_ready = ActiveValue::Set(true);
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(conn).await
    }

    pub async fn set_current_guess(
        conn: &impl ConnectionTrait,
        model: player_sessions::Model,
        guess: &str,
    ) -> Result<player_sessions::Model, DbErr> {
        let mut active: player_sessions::ActiveModel = model.into();
        active.current_guess = ActiveValue::Set(Some(guess.to_string()));
        active.updated_at = ActiveValue::Set(chrono::Utc::now().into());
        active.update(conn).await
    }

    /// Clear every turn flag in the room, then grant the turn to one player.
    /// Run inside the same transaction as the guess that rotates the turn so
    /// the exactly-one-turn invariant holds at every commit point.
    pub async fn rotate_turn(
        conn: &impl ConnectionTrait,
        room_code: &str,
        next_player_id: &str,
    ) -> Result<(), DbErr> {
        PlayerSessions::update_many()
            .col_expr(player_sessions::Column::HasTurn, Expr::value(false))
            .filter(player_sessions::Column::RoomCode.eq(room_code))
            .exec(conn)
            .await?;

        PlayerSessions::update_many()
            .col_expr(player_sessions::Column::HasTurn, Expr::value(true))
            .filter(player_sessions::Column::RoomCode.eq(room_code))
            .filter(player_sessions::Column::PlayerId.eq(next_player_id))
            .exec(conn)
            .await?;

        Ok(())
    }

    /// Reset every session in the room to its initial state: not ready, no
    /// turn, no secret code, no guess. Used when a started room drops to a
    /// single player and the survivors must re-ready for a new round.
    pub async fn reset_round(
        conn: &impl ConnectionTrait,
        room_code: &str,
    ) -> Result<(), DbErr> {
        PlayerSessions::update_many()
            .col_expr(player_sessions::Column::IsReady, Expr::value(false))
            .col_expr(player_sessions::Column::HasTurn, Expr::value(false))
            .col_expr(
                player_sessions::Column::SecretCode,
                Expr::value(Option::<String>::None),
            )
            .col_expr(
                player_sessions::Column::CurrentGuess,
                Expr::value(Option::<String>::None),
            )
            .filter(player_sessions::Column::RoomCode.eq(room_code))
            .exec(conn)
            .await?;

        Ok(())
    }

    /// Heartbeat upsert. If no session row exists yet (a poll racing a
    /// not-yet-committed join), a placeholder row is inserted; the unique
    /// compound index turns the conflict into a plain last_seen update.
    pub async fn touch(
        conn: &impl ConnectionTrait,
        room_code: &str,
        player_id: &str,
        when: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DbErr> {
        let when = when.into();
        let model = player_sessions::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            room_code: ActiveValue::Set(room_code.to_string()),
            player_id: ActiveValue::Set(player_id.to_string()),
            player_name: ActiveValue::Set(String::new()),
            role: ActiveValue::Set("user".to_string()),
            is_player_joined: ActiveValue::Set(false),
            is_ready: ActiveValue::Set(false),
            secret_code: ActiveValue::Set(None),
            has_turn: ActiveValue::Set(false),
            current_guess: ActiveValue::Set(None),
            last_seen: ActiveValue::Set(when),
            created_at: ActiveValue::Set(when),
            updated_at: ActiveValue::Set(when),
        };

        PlayerSessions::insert(model)
            .on_conflict(
                OnConflict::columns([
                    player_sessions::Column::RoomCode,
                    player_sessions::Column::PlayerId,
                ])
                .update_columns([
                    player_sessions::Column::LastSeen,
                    player_sessions::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(conn)
            .await?;

        Ok(())
    }

    pub async fn find_stale(
        conn: &impl ConnectionTrait,
        cutoff: chrono::DateTime<chrono::Utc>,
    ) -> Result<Vec<player_sessions::Model>, DbErr> {
        let cutoff: sea_orm::prelude::DateTimeWithTimeZone = cutoff.into();
        PlayerSessions::find()
            .filter(player_sessions::Column::LastSeen.lt(cutoff))
            .all(conn)
            .await
    }

    pub async fn delete(
        conn: &impl ConnectionTrait,
        room_code: &str,
        player_id: &str,
    ) -> Result<(), DbErr> {
        PlayerSessions::delete_many()
            .filter(player_sessions::Column::RoomCode.eq(room_code))
            .filter(player_sessions::Column::PlayerId.eq(player_id))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn delete_all_for_room(
        conn: &impl ConnectionTrait,
        room_code: &str,
    ) -> Result<(), DbErr> {
        PlayerSessions::delete_many()
            .filter(player_sessions::Column::RoomCode.eq(room_code))
            .exec(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::DatabaseConnection;

    async fn setup_test_db() -> DatabaseConnection {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_compound_index_rejects_duplicate_session() {
        let db = setup_test_db().await;

        SessionRepository::create(&db, "AB12", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap();
        let err = SessionRepository::create(&db, "AB12", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap_err();
        assert!(crate::repositories::is_unique_violation(&err));

        // Same player in a different room is fine.
        SessionRepository::create(&db, "CD34", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_secret_code_marks_ready() {
        let db = setup_test_db().await;

        let model = SessionRepository::create(&db, "AB12", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap();
        assert!(!model.is_ready);

        let model = SessionRepository::set_secret_code(&db, model, "1234")
            .await
            .unwrap();
        assert!(model.is_ready);
        assert_eq!(model.secret_code.as_deref(), Some("1234"));
    }

    #[tokio::test]
    async fn test_rotate_turn_leaves_exactly_one_flag() {
        let db = setup_test_db().await;

        SessionRepository::create(&db, "AB12", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap();
        SessionRepository::create(&db, "AB12", "p2", "Bob", PlayerRole::Guest)
            .await
            .unwrap();

        SessionRepository::rotate_turn(&db, "AB12", "p1").await.unwrap();
        let sessions = SessionRepository::find_all_for_room(&db, "AB12")
            .await
            .unwrap();
        let with_turn: Vec<_> = sessions.iter().filter(|s| s.has_turn).collect();
        assert_eq!(with_turn.len(), 1);
        assert_eq!(with_turn[0].player_id, "p1");

        SessionRepository::rotate_turn(&db, "AB12", "p2").await.unwrap();
        let sessions = SessionRepository::find_all_for_room(&db, "AB12")
            .await
            .unwrap();
        let with_turn: Vec<_> = sessions.iter().filter(|s| s.has_turn).collect();
        assert_eq!(with_turn.len(), 1);
        assert_eq!(with_turn[0].player_id, "p2");
    }

    #[tokio::test]
    async fn test_touch_upserts_last_seen_only() {
        let db = setup_test_db().await;

        let model = SessionRepository::create(&db, "AB12", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap();
        let model = SessionRepository::set_secret_code(&db, model, "1234")
            .await
            .unwrap();

        let later = chrono::Utc::now() + chrono::Duration::seconds(10);
        SessionRepository::touch(&db, "AB12", "p1", later).await.unwrap();

        let found = SessionRepository::find(&db, "AB12", "p1")
            .await
            .unwrap()
            .unwrap();
        // last_seen moved, nothing else changed
        assert_eq!(found.last_seen.timestamp(), later.timestamp());
        assert!(found.is_ready);
        assert_eq!(found.secret_code.as_deref(), Some("1234"));
        assert_eq!(found.player_name, "Alice");

        // touch for an unknown session inserts a placeholder row
        SessionRepository::touch(&db, "AB12", "p2", chrono::Utc::now())
            .await
            .unwrap();
        let phantom = SessionRepository::find(&db, "AB12", "p2")
            .await
            .unwrap()
            .unwrap();
        assert!(!phantom.is_player_joined);
    }

    #[tokio::test]
    async fn test_find_stale_filters_on_cutoff() {
        let db = setup_test_db().await;

        SessionRepository::create(&db, "AB12", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap();
        let past = chrono::Utc::now() - chrono::Duration::seconds(60);
        SessionRepository::touch(&db, "AB12", "p1", past).await.unwrap();
        SessionRepository::create(&db, "AB12", "p2", "Bob", PlayerRole::User)
            .await
            .unwrap();

        let cutoff = chrono::Utc::now() - chrono::Duration::seconds(30);
        let stale = SessionRepository::find_stale(&db, cutoff).await.unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].player_id, "p1");
    }

    #[tokio::test]
    async fn test_reset_round_clears_game_state() {
        let db = setup_test_db().await;

        let model = SessionRepository::create(&db, "AB12", "p1", "Alice", PlayerRole::User)
            .await
            .unwrap();
        let model = SessionRepository::set_secret_code(&db, model, "1234")
            .await
            .unwrap();
        SessionRepository::set_current_guess(&db, model, "5678")
            .await
            .unwrap();
        SessionRepository::rotate_turn(&db, "AB12", "p1").await.unwrap();

        SessionRepository::reset_round(&db, "AB12").await.unwrap();

        let found = SessionRepository::find(&db, "AB12", "p1")
            .await
            .unwrap()
            .unwrap();
        assert!(!found.is_ready);
        assert!(!found.has_turn);
        assert!(found.secret_code.is_none());
        assert!(found.current_guess.is_none());
        // join state survives a round reset
        assert!(found.is_player_joined);
    }
}
