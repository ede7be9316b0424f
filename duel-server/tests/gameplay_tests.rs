
use duel_types::RoomError;
use test_helpers::TestApp;

#[tokio::test]
async fn test_first_joiner_opens_and_turn_alternates() {
    let app = TestApp::new().await;
    let (code, p1, p2) = app.started_game().await;

    let status = app.manager.room_status(&code).await.unwrap();
    let holders: Vec<_> = status.players.iter().filter(|p| p.has_turn).collect();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].player_id, p1);

    let response = app.manager.submit_guess(&code, &p1, "1111").await.unwrap();
    assert_eq!(response.next_turn_player_id.as_deref(), Some(p2.as_str()));

    let response = app.manager.submit_guess(&code, &p2, "2222").await.unwrap();
    assert_eq!(response.next_turn_player_id.as_deref(), Some(p1.as_str()));

    // Exactly one turn holder after every rotation
    let status = app.manager.room_status(&code).await.unwrap();
    assert_eq!(status.players.iter().filter(|p| p.has_turn).count(), 1);
}

#[tokio::test]
async fn test_off_turn_guess_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let (code, p1, p2) = app.started_game().await;

    let err = app.manager.submit_guess(&code, &p2, "1234").await.unwrap_err();
    assert_eq!(err, RoomError::NotYourTurn);

    // Nothing moved: no guess recorded, the turn still belongs to the opener
    let status = app.manager.room_status(&code).await.unwrap();
    assert!(status.guess_history.is_empty());
    let holders: Vec<_> = status.players.iter().filter(|p| p.has_turn).collect();
    assert_eq!(holders[0].player_id, p1);
    assert!(status.room.winner_player_id.is_none());
}

#[tokio::test]
async fn test_guess_feedback_counts_exact_and_misplaced() {
    let app = TestApp::new().await;
    let (code, p1, _p2) = app.started_game().await;

    // Second player's secret is 5678; 5687 hits two exact, two swapped
    let response = app.manager.submit_guess(&code, &p1, "5687").await.unwrap();
    assert_eq!(response.message, "2 positions correct, 2 misplaced");

    let status = app.manager.room_status(&code).await.unwrap();
    assert_eq!(status.guess_history.len(), 1);
    assert_eq!(status.guess_history[0].guess, "5687");
    assert_eq!(status.guess_history[0].correct_positions, 2);
    assert_eq!(status.guess_history[0].misplaced, 2);
    assert_eq!(status.guess_history[0].player_id, p1);
}

#[tokio::test]
async fn test_guess_history_keeps_submission_order() {
    let app = TestApp::new().await;
    let (code, p1, p2) = app.started_game().await;

    app.manager.submit_guess(&code, &p1, "1111").await.unwrap();
    app.manager.submit_guess(&code, &p2, "2222").await.unwrap();
    app.manager.submit_guess(&code, &p1, "3333").await.unwrap();

    let status = app.manager.room_status(&code).await.unwrap();
    let entries: Vec<_> = status
        .guess_history
        .iter()
        .map(|g| (g.player_id.as_str(), g.guess.as_str()))
        .collect();
    assert_eq!(
        entries,
        vec![
            (p1.as_str(), "1111"),
            (p2.as_str(), "2222"),
            (p1.as_str(), "3333"),
        ]
    );
}

#[tokio::test]
async fn test_winning_guess_ends_the_game() {
    let app = TestApp::new().await;
    let (code, p1, p2) = app.started_game().await;

    app.manager.submit_guess(&code, &p1, "1111").await.unwrap();

    // Second player nails the first player's secret
    let response = app.manager.submit_guess(&code, &p2, "1234").await.unwrap();
    assert_eq!(response.message, "4 positions correct, 0 misplaced");
    assert!(response.next_turn_player_id.is_none());

    let status = app.manager.room_status(&code).await.unwrap();
    assert_eq!(status.room.winner_player_id.as_deref(), Some(p2.as_str()));

    // A finished game accepts no more guesses, from either side
    let err = app.manager.submit_guess(&code, &p1, "5678").await.unwrap_err();
    assert_eq!(err, RoomError::GameOver);
    let err = app.manager.submit_guess(&code, &p2, "1234").await.unwrap_err();
    assert_eq!(err, RoomError::GameOver);
}

#[tokio::test]
async fn test_guess_before_start_is_not_your_turn() {
    let app = TestApp::new().await;
    let (code, p1, _p2) = app.room_with_two_ready_players().await;

    let err = app.manager.submit_guess(&code, &p1, "1111").await.unwrap_err();
    assert_eq!(err, RoomError::NotYourTurn);
}

#[tokio::test]
async fn test_malformed_guess_is_validation_error() {
    let app = TestApp::new().await;
    let (code, p1, _p2) = app.started_game().await;

    for bad in ["123", "12345", "12a4", ""] {
        let err = app.manager.submit_guess(&code, &p1, bad).await.unwrap_err();
        assert!(
            matches!(err, RoomError::Validation { .. }),
            "expected rejection of {bad:?}"
        );
    }
}

#[tokio::test]
async fn test_start_requires_every_secret() {
    let app = TestApp::new().await;

    let created = app.manager.create_room("player-one").await.unwrap();
    let code = created.room.room_code;
    app.manager.join_room(&code, None).await.unwrap();

    app.manager
        .set_secret_code(&code, "player-one", "1234")
        .await
        .unwrap();

    let err = app.manager.start_game(&code, "player-one").await.unwrap_err();
    assert_eq!(err, RoomError::PlayersNotReady { unready: 1 });
}

#[tokio::test]
async fn test_start_twice_is_rejected() {
    let app = TestApp::new().await;
    let (code, p1, _p2) = app.started_game().await;

    let err = app.manager.start_game(&code, &p1).await.unwrap_err();
    assert_eq!(err, RoomError::GameAlreadyStarted);
}

#[tokio::test]
async fn test_secret_code_locked_after_start() {
    let app = TestApp::new().await;
    let (code, p1, _p2) = app.started_game().await;

    let err = app
        .manager
        .set_secret_code(&code, &p1, "9999")
        .await
        .unwrap_err();
    assert_eq!(err, RoomError::GameAlreadyStarted);
}
