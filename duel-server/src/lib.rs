use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;

use crate::room_manager::RoomManager;
use duel_types::{
    CreateRoomRequest, ExitRoomRequest, JoinRoomRequest, RoomError, SetSecretCodeRequest,
    StartGameRequest, SubmitGuessRequest,
};

pub mod config;
pub mod identity;
pub mod room_manager;

pub fn create_routes(
    room_manager: Arc<RoomManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let manager_filter = warp::any().map({
        let room_manager = room_manager.clone();
        move || room_manager.clone()
    });

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    let create_room = warp::path!("rooms")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_create_room);

    let join_room = warp::path!("rooms" / String / "join")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_join_room);

    let exit_room = warp::path!("rooms" / String / "exit")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_exit_room);

    let start_game = warp::path!("rooms" / String / "start")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_start_game);

    let set_secret = warp::path!("rooms" / String / "secret")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_set_secret_code);

    let submit_guess = warp::path!("rooms" / String / "guess")
        .and(warp::post())
        .and(warp::body::json())
        .and(manager_filter.clone())
        .and_then(handle_submit_guess);

    // Polling endpoint; stale members are evicted before the snapshot is taken
    let room_status = warp::path!("rooms" / String / "status")
        .and(warp::get())
        .and(manager_filter.clone())
        .and_then(handle_room_status);

    let heartbeat = warp::path!("rooms" / String / "players" / String / "heartbeat")
        .and(warp::post())
        .and(manager_filter.clone())
        .and_then(handle_heartbeat);

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST"]);

    health
        .or(create_room)
        .or(join_room)
        .or(exit_room)
        .or(start_game)
        .or(set_secret)
        .or(submit_guess)
        .or(room_status)
        .or(heartbeat)
        .with(cors)
        .with(warp::log("code_duel"))
}

/// One HTTP status per error kind so clients can branch on the code and
/// still show the specific message.
fn error_status(err: &RoomError) -> StatusCode {
    match err {
        RoomError::Validation { .. } => StatusCode::BAD_REQUEST,
        RoomError::RoomNotFound { .. }
        | RoomError::SessionNotFound { .. }
        | RoomError::PlayerNotFound { .. } => StatusCode::NOT_FOUND,
        RoomError::Unauthorized => StatusCode::FORBIDDEN,
        RoomError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        // State-machine precondition failures
        RoomError::RoomFull
        | RoomError::RoomClosed
        | RoomError::GameAlreadyStarted
        | RoomError::AlreadyInRoom
        | RoomError::NotInRoom
        | RoomError::InsufficientPlayers { .. }
        | RoomError::IncompleteJoin
        | RoomError::PlayersNotReady { .. }
        | RoomError::NotYourTurn
        | RoomError::GameOver => StatusCode::CONFLICT,
    }
}

fn error_reply(err: RoomError) -> warp::reply::WithStatus<warp::reply::Json> {
    let status = error_status(&err);
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": err.kind(),
            "message": err.to_string(),
        })),
        status,
    )
}

fn ok_reply<T: serde::Serialize>(body: &T) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

async fn handle_create_room(
    request: CreateRoomRequest,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match manager.create_room(&request.player_id).await {
        Ok(response) => {
            warp::reply::with_status(warp::reply::json(&response), StatusCode::CREATED)
        }
        Err(err) => error_reply(err),
    })
}

async fn handle_join_room(
    room_code: String,
    request: JoinRoomRequest,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(
        match manager
            .join_room(&room_code, request.player_id.as_deref())
            .await
        {
            Ok(response) => ok_reply(&response),
            Err(err) => error_reply(err),
        },
    )
}

async fn handle_exit_room(
    room_code: String,
    request: ExitRoomRequest,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(
        match manager.exit_room(&room_code, &request.player_id).await {
            Ok(response) => ok_reply(&response),
            Err(err) => error_reply(err),
        },
    )
}

async fn handle_start_game(
    room_code: String,
    request: StartGameRequest,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(
        match manager.start_game(&room_code, &request.player_id).await {
            Ok(response) => ok_reply(&response),
            Err(err) => error_reply(err),
        },
    )
}

async fn handle_set_secret_code(
    room_code: String,
    request: SetSecretCodeRequest,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(
        match manager
            .set_secret_code(&room_code, &request.player_id, &request.code)
            .await
        {
            Ok(response) => ok_reply(&response),
            Err(err) => error_reply(err),
        },
    )
}

async fn handle_submit_guess(
    room_code: String,
    request: SubmitGuessRequest,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(
        match manager
            .submit_guess(&room_code, &request.player_id, &request.guess)
            .await
        {
            Ok(response) => ok_reply(&response),
            Err(err) => error_reply(err),
        },
    )
}

async fn handle_room_status(
    room_code: String,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match manager.room_status(&room_code).await {
        Ok(response) => ok_reply(&response),
        Err(err) => error_reply(err),
    })
}

async fn handle_heartbeat(
    room_code: String,
    player_id: String,
    manager: Arc<RoomManager>,
) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(match manager.heartbeat(&room_code, &player_id).await {
        Ok(response) => ok_reply(&response),
        Err(err) => error_reply(err),
    })
}
