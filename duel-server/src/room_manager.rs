use chrono::Utc;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use tracing::{info, warn};

use duel_core::code::{generate_room_code, parse_code, validate_code};
use duel_core::scoring::{GuessScore, ScoringEngine};
use duel_persistence::entities::rooms;
use duel_persistence::repositories::{
    GuessRepository, RoomRepository, SessionRepository, UserRepository, is_unique_violation,
};
use duel_types::{
    CreateRoomResponse, ExitRoomResponse, HeartbeatResponse, JoinRoomResponse, PlayerPublicView,
    PlayerRole, Room, RoomError, RoomStatus, SetSecretCodeResponse, StartGameResponse,
    SubmitGuessResponse,
};

use crate::identity::{IdentityService, ResolvedIdentity};

/// Maximum attempts to find an unused room code before giving up. Collisions
/// are rare at this code length; hitting the cap means something is wrong.
const ROOM_CODE_ATTEMPTS: usize = 5;

const MAX_PLAYERS: usize = 2;

/// All room lifecycle and gameplay operations. Every mutation runs as a
/// single transaction against the durable store, which is the only
/// synchronization point; no room state is held in process memory.
pub struct RoomManager {
    db: DatabaseConnection,
    identity: IdentityService,
    stale_after: chrono::Duration,
}

fn storage(err: DbErr) -> RoomError {
    warn!("Storage error: {}", err);
    RoomError::internal(err.to_string())
}

fn corrupt(err: anyhow::Error) -> RoomError {
    warn!("Corrupt room record: {}", err);
    RoomError::internal(err.to_string())
}

impl RoomManager {
    pub fn new(db: DatabaseConnection, identity: IdentityService, stale_after_seconds: u64) -> Self {
        Self {
            db,
            identity,
            stale_after: chrono::Duration::seconds(stale_after_seconds as i64),
        }
    }

    /// Create a room with a fresh code and the creator as its first member.
    /// The unique index on room_code arbitrates code collisions; on a
    /// collision a new code is drawn and the insert retried.
    pub async fn create_room(&self, player_id: &str) -> Result<CreateRoomResponse, RoomError> {
        if player_id.is_empty() {
            return Err(RoomError::validation("player_id must not be empty"));
        }

        for _ in 0..ROOM_CODE_ATTEMPTS {
            let room_code = generate_room_code();
            let txn = self.db.begin().await.map_err(storage)?;

            let room_model = match RoomRepository::create(&txn, &room_code, player_id).await {
                Ok(model) => model,
                Err(err) if is_unique_violation(&err) => continue,
                Err(err) => return Err(storage(err)),
            };

            let (name, role) = Self::creator_identity(&txn, player_id).await?;
            let session = SessionRepository::create(&txn, &room_code, player_id, &name, role)
                .await
                .map_err(storage)?;

            let room = RoomRepository::to_domain(&room_model).map_err(corrupt)?;
            txn.commit().await.map_err(storage)?;

            info!("Room {} created by {}", room_code, player_id);
            return Ok(CreateRoomResponse {
                room,
                player_session: PlayerPublicView::from(&SessionRepository::to_domain(&session)),
            });
        }

        Err(RoomError::internal("Could not allocate a unique room code"))
    }

    async fn creator_identity(
        conn: &impl ConnectionTrait,
        player_id: &str,
    ) -> Result<(String, PlayerRole), RoomError> {
        if IdentityService::is_guest_id(player_id) {
            return Ok((player_id.to_string(), PlayerRole::Guest));
        }
        let name = UserRepository::find_by_id(conn, player_id)
            .await
            .map_err(storage)?
            .map(|user| user.display_name)
            .unwrap_or_else(|| player_id.to_string());
        Ok((name, PlayerRole::User))
    }

    /// Join an existing room, minting a guest identity when no registered
    /// player id is supplied. The membership list and session row are
    /// written in one transaction; the compound unique index on
    /// (room_code, player_id) closes the duplicate-join race.
    pub async fn join_room(
        &self,
        room_code: &str,
        supplied_id: Option<&str>,
    ) -> Result<JoinRoomResponse, RoomError> {
        let txn = self.db.begin().await.map_err(storage)?;

        let room_model = Self::require_room(&txn, room_code).await?;
        if !room_model.is_active_room {
            return Err(RoomError::RoomClosed);
        }
        if room_model.is_game_started {
            return Err(RoomError::GameAlreadyStarted);
        }

        let mut players = RoomRepository::players_of(&room_model).map_err(corrupt)?;
        if players.len() >= MAX_PLAYERS {
            return Err(RoomError::RoomFull);
        }

        let ResolvedIdentity {
            player_id,
            display_name,
            role,
            guest_token,
        } = self.identity.resolve(&txn, supplied_id).await?;

        if players.iter().any(|p| p == &player_id) {
            return Err(RoomError::AlreadyInRoom);
        }

        // A heartbeat can insert a placeholder row before the join lands;
        // replace it rather than tripping the unique index.
        if let Some(existing) = SessionRepository::find(&txn, room_code, &player_id)
            .await
            .map_err(storage)?
        {
            if existing.is_player_joined {
                return Err(RoomError::AlreadyInRoom);
            }
            SessionRepository::delete(&txn, room_code, &player_id)
                .await
                .map_err(storage)?;
        }

        let session =
            match SessionRepository::create(&txn, room_code, &player_id, &display_name, role).await
            {
                Ok(model) => model,
                Err(err) if is_unique_violation(&err) => return Err(RoomError::AlreadyInRoom),
                Err(err) => return Err(storage(err)),
            };

        players.push(player_id.clone());
        let room_model = RoomRepository::save_players(&txn, room_model, &players)
            .await
            .map_err(storage)?;

        let room = RoomRepository::to_domain(&room_model).map_err(corrupt)?;
        txn.commit().await.map_err(storage)?;

        info!("Player {} joined room {}", player_id, room_code);
        let guest_display_name = guest_token.as_ref().map(|_| display_name);
        Ok(JoinRoomResponse {
            room,
            player_session: PlayerPublicView::from(&SessionRepository::to_domain(&session)),
            guest_token,
            guest_display_name,
        })
    }

    /// Leave a room. The last player out tears the room down; a started game
    /// dropping to one player resets to the pre-start state so the survivor
    /// can wait for a new opponent.
    pub async fn exit_room(
        &self,
        room_code: &str,
        player_id: &str,
    ) -> Result<ExitRoomResponse, RoomError> {
        let txn = self.db.begin().await.map_err(storage)?;

        let room_model = Self::require_room(&txn, room_code).await?;
        let players = RoomRepository::players_of(&room_model).map_err(corrupt)?;
        if !players.iter().any(|p| p == player_id) {
            return Err(RoomError::NotInRoom);
        }

        let remaining = Self::remove_player(&txn, room_model, player_id).await?;
        let response = match remaining {
            Some(model) => ExitRoomResponse {
                room: Some(RoomRepository::to_domain(&model).map_err(corrupt)?),
                room_deleted: false,
            },
            None => ExitRoomResponse {
                room: None,
                room_deleted: true,
            },
        };

        txn.commit().await.map_err(storage)?;
        info!("Player {} left room {}", player_id, room_code);
        Ok(response)
    }

    /// Record a player's secret code, which is also what marks them ready.
    /// Codes are locked once the game has started.
    pub async fn set_secret_code(
        &self,
        room_code: &str,
        player_id: &str,
        code: &str,
    ) -> Result<SetSecretCodeResponse, RoomError> {
        validate_code(code)?;

        let txn = self.db.begin().await.map_err(storage)?;

        let room_model = Self::require_room(&txn, room_code).await?;
        if room_model.is_game_started {
            return Err(RoomError::GameAlreadyStarted);
        }

        let session = Self::require_session(&txn, room_code, player_id).await?;
        SessionRepository::set_secret_code(&txn, session, code)
            .await
            .map_err(storage)?;

        txn.commit().await.map_err(storage)?;
        Ok(SetSecretCodeResponse {
            has_secret_code: true,
        })
    }

    /// Start the game once both players are present and ready. The first
    /// joiner gets the opening turn.
    pub async fn start_game(
        &self,
        room_code: &str,
        player_id: &str,
    ) -> Result<StartGameResponse, RoomError> {
        let txn = self.db.begin().await.map_err(storage)?;

        let room_model = Self::require_room(&txn, room_code).await?;
        let players = RoomRepository::players_of(&room_model).map_err(corrupt)?;
        if !players.iter().any(|p| p == player_id) {
            return Err(RoomError::Unauthorized);
        }
        if players.len() < MAX_PLAYERS {
            return Err(RoomError::InsufficientPlayers {
                current: players.len(),
            });
        }
        if room_model.is_game_started {
            return Err(RoomError::GameAlreadyStarted);
        }

        let mut unready = 0;
        for member in &players {
            let session = SessionRepository::find(&txn, room_code, member)
                .await
                .map_err(storage)?;
            match session {
                Some(s) if s.is_player_joined => {
                    if !s.is_ready || s.secret_code.is_none() {
                        unready += 1;
                    }
                }
                _ => return Err(RoomError::IncompleteJoin),
            }
        }
        if unready > 0 {
            return Err(RoomError::PlayersNotReady { unready });
        }

        let room_model = RoomRepository::set_game_started(&txn, room_model, true)
            .await
            .map_err(storage)?;
        SessionRepository::rotate_turn(&txn, room_code, &players[0])
            .await
            .map_err(storage)?;

        let room = RoomRepository::to_domain(&room_model).map_err(corrupt)?;
        txn.commit().await.map_err(storage)?;

        info!("Game started in room {}, {} opens", room_code, players[0]);
        Ok(StartGameResponse { room })
    }

    /// Score a guess against the opponent's secret, append it to the log
    /// and pass the turn. The turn check and the turn flip happen in the
    /// same transaction, so two racing submissions cannot both score.
    pub async fn submit_guess(
        &self,
        room_code: &str,
        player_id: &str,
        guess: &str,
    ) -> Result<SubmitGuessResponse, RoomError> {
        let Some(guess_digits) = parse_code(guess) else {
            return Err(RoomError::validation(
                "Guess must be exactly 4 digits (0-9)",
            ));
        };

        let txn = self.db.begin().await.map_err(storage)?;

        let room_model = Self::require_room(&txn, room_code).await?;
        if room_model.winner_player_id.is_some() {
            return Err(RoomError::GameOver);
        }

        let session = Self::require_session(&txn, room_code, player_id).await?;
        if !session.has_turn {
            return Err(RoomError::NotYourTurn);
        }

        let players = RoomRepository::players_of(&room_model).map_err(corrupt)?;
        let opponent_id = players.iter().find(|p| p.as_str() != player_id);

        // No opponent or no opponent secret scores as a zero guess; the
        // round still consumes the turn.
        let mut score = GuessScore::default();
        if let Some(opponent_id) = opponent_id {
            let opponent = SessionRepository::find(&txn, room_code, opponent_id)
                .await
                .map_err(storage)?;
            if let Some(secret) = opponent
                .as_ref()
                .and_then(|s| s.secret_code.as_deref())
                .and_then(parse_code)
            {
                score = ScoringEngine::evaluate_guess(&guess_digits, &secret);
            }
        }

        let message = score.message();
        GuessRepository::append(
            &txn,
            room_code,
            player_id,
            guess,
            score.correct_positions,
            score.misplaced,
            &message,
        )
        .await
        .map_err(storage)?;
        SessionRepository::set_current_guess(&txn, session, guess)
            .await
            .map_err(storage)?;

        let next_turn_player_id = if score.is_winning() {
            RoomRepository::set_winner(&txn, room_model, player_id)
                .await
                .map_err(storage)?;
            info!("Player {} won room {}", player_id, room_code);
            None
        } else {
            let position = players.iter().position(|p| p == player_id).unwrap_or(0);
            let next = players[(position + 1) % players.len()].clone();
            SessionRepository::rotate_turn(&txn, room_code, &next)
                .await
                .map_err(storage)?;
            Some(next)
        };

        let session = Self::require_session(&txn, room_code, player_id).await?;
        let view = PlayerPublicView::from(&SessionRepository::to_domain(&session));
        txn.commit().await.map_err(storage)?;

        Ok(SubmitGuessResponse {
            message,
            player_session: view,
            next_turn_player_id,
        })
    }

    /// Record liveness for a player in a room. Safe to call before the join
    /// has committed; repeated calls only move the last-seen time forward.
    pub async fn heartbeat(
        &self,
        room_code: &str,
        player_id: &str,
    ) -> Result<HeartbeatResponse, RoomError> {
        SessionRepository::touch(&self.db, room_code, player_id, Utc::now())
            .await
            .map_err(storage)?;
        Ok(HeartbeatResponse { ok: true })
    }

    /// Snapshot a room for polling clients. Stale members are evicted first
    /// so a poll never reports a player whose heartbeats have lapsed.
    pub async fn room_status(&self, room_code: &str) -> Result<RoomStatus, RoomError> {
        self.evict_stale_in_room(room_code).await?;

        let txn = self.db.begin().await.map_err(storage)?;

        let room_model = Self::require_room(&txn, room_code).await?;
        let room = RoomRepository::to_domain(&room_model).map_err(corrupt)?;

        let mut players = Vec::with_capacity(room.players.len());
        for member in &room.players {
            if let Some(session) = SessionRepository::find(&txn, room_code, member)
                .await
                .map_err(storage)?
            {
                players.push(PlayerPublicView::from(&SessionRepository::to_domain(
                    &session,
                )));
            }
        }

        let guess_history = GuessRepository::find_all_for_room(&txn, room_code)
            .await
            .map_err(storage)?
            .iter()
            .map(GuessRepository::to_domain)
            .collect();

        let can_start_game = Self::can_start(&room, &players);
        txn.commit().await.map_err(storage)?;

        Ok(RoomStatus {
            room,
            players,
            guess_history,
            can_start_game,
        })
    }

    fn can_start(room: &Room, players: &[PlayerPublicView]) -> bool {
        !room.is_game_started
            && room.players.len() >= MAX_PLAYERS
            && players.len() == room.players.len()
            && players.iter().all(|p| p.is_ready && p.has_secret_code)
    }

    /// Evict every player in the room whose last heartbeat is older than the
    /// staleness window. Eviction follows the same path as a voluntary exit,
    /// including teardown and round reset.
    pub async fn evict_stale_in_room(&self, room_code: &str) -> Result<usize, RoomError> {
        let cutoff = Utc::now() - self.stale_after;
        let txn = self.db.begin().await.map_err(storage)?;

        let Some(room_model) = RoomRepository::find_by_code(&txn, room_code)
            .await
            .map_err(storage)?
        else {
            // A heartbeat can land after teardown and recreate session rows
            // for a room that no longer exists; drop them or the sweep will
            // re-find them on every tick.
            SessionRepository::delete_all_for_room(&txn, room_code)
                .await
                .map_err(storage)?;
            txn.commit().await.map_err(storage)?;
            return Ok(0);
        };

        let sessions = SessionRepository::find_all_for_room(&txn, room_code)
            .await
            .map_err(storage)?;

        let mut evicted = 0;
        let mut room_model = Some(room_model);
        for session in sessions {
            if session.last_seen >= cutoff {
                continue;
            }
            if !session.is_player_joined {
                // Stale placeholder from a heartbeat that never became a join.
                SessionRepository::delete(&txn, room_code, &session.player_id)
                    .await
                    .map_err(storage)?;
                continue;
            }
            let Some(model) = room_model.take() else { break };
            warn!(
                "Evicting stale player {} from room {}",
                session.player_id, room_code
            );
            room_model = Self::remove_player(&txn, model, &session.player_id).await?;
            evicted += 1;
        }

        txn.commit().await.map_err(storage)?;
        Ok(evicted)
    }

    /// Sweep every room with a lapsed member. Driven by the background task
    /// so rooms nobody polls still get cleaned up.
    pub async fn sweep_stale(&self) -> Result<usize, RoomError> {
        let cutoff = Utc::now() - self.stale_after;
        let stale = SessionRepository::find_stale(&self.db, cutoff)
            .await
            .map_err(storage)?;

        let mut room_codes: Vec<String> = stale.into_iter().map(|s| s.room_code).collect();
        room_codes.sort();
        room_codes.dedup();

        let mut evicted = 0;
        for room_code in room_codes {
            evicted += self.evict_stale_in_room(&room_code).await?;
        }
        Ok(evicted)
    }

    async fn require_room(
        conn: &impl ConnectionTrait,
        room_code: &str,
    ) -> Result<rooms::Model, RoomError> {
        RoomRepository::find_by_code(conn, room_code)
            .await
            .map_err(storage)?
            .ok_or_else(|| RoomError::RoomNotFound {
                room_code: room_code.to_string(),
            })
    }

    async fn require_session(
        conn: &impl ConnectionTrait,
        room_code: &str,
        player_id: &str,
    ) -> Result<duel_persistence::entities::player_sessions::Model, RoomError> {
        SessionRepository::find(conn, room_code, player_id)
            .await
            .map_err(storage)?
            .filter(|s| s.is_player_joined)
            .ok_or_else(|| RoomError::SessionNotFound {
                player_id: player_id.to_string(),
            })
    }

    /// Remove a member from a room, cascading per the lifecycle rules.
    /// Returns the updated room model, or `None` when the room was deleted.
    async fn remove_player(
        conn: &impl ConnectionTrait,
        room_model: rooms::Model,
        player_id: &str,
    ) -> Result<Option<rooms::Model>, RoomError> {
        let room_code = room_model.room_code.clone();
        let mut players = RoomRepository::players_of(&room_model).map_err(corrupt)?;
        players.retain(|p| p != player_id);

        SessionRepository::delete(conn, &room_code, player_id)
            .await
            .map_err(storage)?;

        if players.is_empty() {
            GuessRepository::delete_all_for_room(conn, &room_code)
                .await
                .map_err(storage)?;
            SessionRepository::delete_all_for_room(conn, &room_code)
                .await
                .map_err(storage)?;
            RoomRepository::delete(conn, &room_model.id)
                .await
                .map_err(storage)?;
            info!("Room {} deleted, last player gone", room_code);
            return Ok(None);
        }

        let mut room_model = RoomRepository::save_players(conn, room_model, &players)
            .await
            .map_err(storage)?;

        if room_model.is_game_started && players.len() < MAX_PLAYERS {
            room_model = RoomRepository::reset_round(conn, room_model)
                .await
                .map_err(storage)?;
            SessionRepository::reset_round(conn, &room_code)
                .await
                .map_err(storage)?;
            GuessRepository::delete_all_for_room(conn, &room_code)
                .await
                .map_err(storage)?;
            info!("Room {} reset, opponent left mid-game", room_code);
        }

        Ok(Some(room_model))
    }
}
