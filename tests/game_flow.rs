mod support;

use frog_server::domain::GameTuning;
use std::time::Duration;
use support::*;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn second_player_starts_the_game_for_both() {
    let server = start_server(settings()).await;

    let mut a = connect(&server.url).await;
    assert_eq!(
        next_json(&mut a).await,
        serde_json::json!({ "type": "welcome", "yourId": 0 })
    );
    // A lone player only waits.
    assert!(stays_quiet(&mut a, Duration::from_millis(300)).await);

    let mut b = connect(&server.url).await;
    assert_eq!(
        next_json(&mut b).await,
        serde_json::json!({ "type": "welcome", "yourId": 1 })
    );

    for client in [&mut a, &mut b] {
        assert_eq!(
            next_json(client).await,
            serde_json::json!({ "type": "start", "yourId": 1 })
        );
        let state = next_json(client).await;
        assert_eq!(state["type"], "state");
        assert_eq!(state["frogs"].as_array().unwrap().len(), 4);
        assert_eq!(state["obstacles"].as_array().unwrap().len(), 10);
        assert_eq!(state["timer"], 180.0);
        assert_eq!(state["obstacles"][0]["type"], "block");
        assert_eq!(state["frogs"][0]["alive"], true);
    }

    server.stop().await;
}

#[tokio::test]
async fn third_connection_is_refused_with_an_error() {
    let server = start_server(settings()).await;
    let (mut a, _b) = fill_lobby(&server.url).await;

    let mut c = connect(&server.url).await;
    assert_eq!(
        next_json(&mut c).await,
        serde_json::json!({ "type": "error", "message": "Lobby full" })
    );
    match next_frame(&mut c).await {
        None | Some(Message::Close(_)) => {}
        other => panic!("expected close, got {other:?}"),
    }

    // The game carries on for the admitted players.
    next_of_type(&mut a, "start").await;
    next_of_type(&mut a, "state").await;

    server.stop().await;
}

#[tokio::test]
async fn frog_reaching_the_top_wins_and_later_moves_are_ignored() {
    let mut settings = settings();
    settings.session.tick_interval = Duration::from_millis(50);
    settings.session.tuning = GameTuning {
        height: 60.0,
        spawn_band: 0.0,
        obstacle_count: 0,
        ..GameTuning::default()
    };
    let server = start_server(settings).await;
    let (mut a, mut b) = fill_lobby(&server.url).await;
    next_of_type(&mut a, "start").await;

    // Spawn y is 30; the second step clamps to the goal line.
    send_move(&mut a, 3, "up").await;
    send_move(&mut b, 3, "up").await;

    let end = next_of_type(&mut a, "end").await;
    assert_eq!(end, serde_json::json!({ "type": "end", "winner": 3 }));
    assert_eq!(next_of_type(&mut b, "end").await["winner"], 3);

    send_move(&mut a, 0, "up").await;
    assert!(stays_quiet(&mut a, Duration::from_millis(300)).await);

    server.stop().await;
}

#[tokio::test]
async fn running_out_of_time_ends_without_a_winner() {
    let mut settings = settings();
    settings.session.tick_interval = Duration::from_millis(20);
    settings.session.tuning.start_timer = 0.2;
    let server = start_server(settings).await;
    let (mut a, _b) = fill_lobby(&server.url).await;
    next_of_type(&mut a, "start").await;

    let mut last_timer = f64::MAX;
    let end = loop {
        let msg = next_json(&mut a).await;
        match msg["type"].as_str() {
            Some("state") => {
                let timer = msg["timer"].as_f64().unwrap();
                assert!(timer <= last_timer, "clock went up: {timer} > {last_timer}");
                last_timer = timer;
            }
            Some("end") => break msg,
            other => panic!("unexpected message type {other:?}"),
        }
    };
    assert_eq!(end, serde_json::json!({ "type": "end", "winner": null }));

    server.stop().await;
}

#[tokio::test]
async fn hitting_an_obstacle_sends_the_frog_home_and_costs_time() {
    // A one-frog arena as wide as an obstacle, packed with obstacles: every
    // obstacle spans the frog's column, so a step up is all but certain to hit one.
    let mut settings = settings();
    settings.session.players_per_team = 2;
    settings.session.tuning = GameTuning {
        width: 40.0,
        height: 100.0,
        num_teams: 1,
        obstacle_count: 60,
        spawn_band: 0.0,
        ..GameTuning::default()
    };
    let server = start_server(settings).await;
    let (mut a, _b) = fill_lobby(&server.url).await;
    next_of_type(&mut a, "start").await;

    send_move(&mut a, 0, "up").await;

    // Ticks alone need 4s to take the clock below 176.
    let state = loop {
        let state = next_of_type(&mut a, "state").await;
        if state["timer"].as_f64().unwrap() < 176.0 {
            break state;
        }
    };
    assert!(state["timer"].as_f64().unwrap() > 170.0);
    assert_eq!(state["frogs"][0]["x"], 10.0);
    assert_eq!(state["frogs"][0]["y"], 70.0);

    server.stop().await;
}

#[tokio::test]
async fn invalid_input_is_dropped_silently() {
    let server = start_server(settings()).await;
    let (mut a, _b) = fill_lobby(&server.url).await;
    next_of_type(&mut a, "start").await;
    let before = next_of_type(&mut a, "state").await;

    send_text(&mut a, "not json").await;
    send_text(&mut a, r#"{"type":"chat","text":"hi"}"#).await;
    send_text(&mut a, r#"{"type":"move","frogId":1,"dir":"sideways"}"#).await;
    send_move(&mut a, 9, "up").await;
    send_move(&mut a, -1, "up").await;

    // Only state traffic keeps flowing and no frog moved.
    for _ in 0..3 {
        let state = next_json(&mut a).await;
        assert_eq!(state["type"], "state");
        assert_eq!(state["frogs"], before["frogs"]);
    }

    server.stop().await;
}

#[tokio::test]
async fn moves_from_one_player_show_up_for_everyone() {
    let mut settings = settings();
    settings.session.tuning.obstacle_count = 0;
    let server = start_server(settings).await;
    let (mut a, mut b) = fill_lobby(&server.url).await;
    next_of_type(&mut b, "start").await;

    send_move(&mut a, 2, "left").await;

    let moved = loop {
        let state = next_of_type(&mut b, "state").await;
        if state["frogs"][2]["x"] == 210.0 {
            break state;
        }
    };
    assert_eq!(moved["frogs"][2]["y"], 570.0);

    server.stop().await;
}

#[tokio::test]
async fn game_keeps_running_after_a_player_leaves() {
    let server = start_server(settings()).await;
    let (mut a, mut b) = fill_lobby(&server.url).await;
    next_of_type(&mut a, "start").await;

    b.close(None).await.expect("close");
    drop(b);

    for _ in 0..3 {
        next_of_type(&mut a, "state").await;
    }

    server.stop().await;
}
