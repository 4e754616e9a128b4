//! HTTP surface tests against the in-memory store.

mod support;

use actix_web::{test, web, App};
use losiento_backend::config::AppConfig;
use losiento_backend::routes;
use losiento_backend::state::AppState;
use losiento_backend::store::MemoryGameStore;
use serde_json::{json, Value};
use std::sync::Arc;
use support::build_state;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure),
        )
        .await
    };
}

fn post(uri: &str, user: &str, body: Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .insert_header(("X-User-Id", user))
        .set_json(body)
}

fn get(uri: &str, user: &str) -> test::TestRequest {
    test::TestRequest::get()
        .uri(uri)
        .insert_header(("X-User-Id", user))
}

#[actix_web::test]
async fn health_endpoint_responds() {
    let state = build_state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn lobby_flow_over_http() {
    let state = build_state();
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/losiento/host",
            "alice",
            json!({"maxSeats": 2, "displayName": "Alice", "deckSeed": 123}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(body["phase"], "lobby");
    assert_eq!(body["hostName"], "Alice");
    assert_eq!(body["viewerSeatIndex"], 0);
    assert_eq!(body["seats"][0]["color"], "red");
    assert_eq!(body["seats"][1]["status"], "open");
    let game_id = body["gameId"].as_str().unwrap().to_string();

    let joinable: Value =
        test::call_and_read_body_json(&app, get("/api/losiento/joinable", "bob").to_request())
            .await;
    assert_eq!(joinable["games"][0]["gameId"], game_id.as_str());
    assert_eq!(joinable["games"][0]["currentPlayers"], 1);
    assert_eq!(joinable["games"][0]["maxSeats"], 2);

    let body: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/losiento/configure-seat",
            "alice",
            json!({"gameId": game_id, "seatIndex": 1, "isBot": true}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(body["seats"][1]["isBot"], true);

    let body: Value = test::call_and_read_body_json(
        &app,
        post("/api/losiento/start", "alice", json!({"gameId": game_id})).to_request(),
    )
    .await;
    assert_eq!(body["phase"], "active");
    assert_eq!(body["state"]["deckSize"], 45);
    assert_eq!(body["state"]["currentSeatIndex"], 0);
    assert_eq!(body["state"]["result"], "active");
    assert_eq!(
        body["state"]["board"]["pawns"].as_array().unwrap().len(),
        8
    );

    let state_view: Value =
        test::call_and_read_body_json(&app, get("/api/losiento/state", "alice").to_request()).await;
    assert_eq!(state_view["gameId"], game_id.as_str());

    let movers: Value = test::call_and_read_body_json(
        &app,
        get(
            &format!("/api/losiento/legal-movers?gameId={game_id}"),
            "alice",
        )
        .to_request(),
    )
    .await;
    assert_eq!(movers["gameId"], game_id.as_str());
    assert!(movers["card"].is_string());
    assert!(movers["moves"].is_array());

    let played: Value = test::call_and_read_body_json(
        &app,
        post(
            "/api/losiento/play",
            "alice",
            json!({
                "gameId": game_id,
                "payload": {"moveIndex": 0, "secondary": {"moveIndex": 0}}
            }),
        )
        .to_request(),
    )
    .await;
    let discards = played["state"]["discardPile"].as_array().unwrap().len();
    let deck_size = played["state"]["deckSize"].as_u64().unwrap() as usize;
    assert_eq!(deck_size + discards, 45);
    assert_eq!(played["state"]["currentSeatIndex"], 1);

    // The freshly committed human turn gates the bot step; the game record
    // comes back unchanged.
    let gated: Value = test::call_and_read_body_json(
        &app,
        post(
            &format!("/api/losiento/bot-step?gameId={game_id}"),
            "alice",
            json!({}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(gated["state"]["turnNumber"], played["state"]["turnNumber"]);
}

#[actix_web::test]
async fn error_shape_is_problem_json_with_stable_codes() {
    let state = build_state();
    let app = app!(state);

    let resp = test::call_service(
        &app,
        post(
            "/api/losiento/join",
            "alice",
            json!({"gameId": "missing"}),
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["status"], 404);

    let resp =
        test::call_service(&app, get("/api/losiento/state", "nobody").to_request()).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "no_active_game");
}

#[actix_web::test]
async fn hosting_twice_conflicts() {
    let state = build_state();
    let app = app!(state);

    let _: Value = test::call_and_read_body_json(
        &app,
        post("/api/losiento/host", "alice", json!({"maxSeats": 2})).to_request(),
    )
    .await;
    let resp = test::call_service(
        &app,
        post("/api/losiento/host", "alice", json!({"maxSeats": 2})).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 409);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], "already_in_game");
}

#[actix_web::test]
async fn leave_acknowledges_and_clears_the_mapping() {
    let state = build_state();
    let app = app!(state);

    let hosted: Value = test::call_and_read_body_json(
        &app,
        post("/api/losiento/host", "alice", json!({"maxSeats": 2})).to_request(),
    )
    .await;
    let game_id = hosted["gameId"].as_str().unwrap();

    let ack: Value = test::call_and_read_body_json(
        &app,
        post("/api/losiento/leave", "alice", json!({"gameId": game_id})).to_request(),
    )
    .await;
    assert_eq!(ack["ok"], true);

    let resp = test::call_service(&app, get("/api/losiento/state", "alice").to_request()).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn missing_identity_is_rejected_when_anon_is_disabled() {
    let config = AppConfig {
        allow_anon: false,
        ..AppConfig::default()
    };
    let state = AppState::new(Arc::new(MemoryGameStore::new()), config);
    let app = app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/losiento/joinable")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn anonymous_fallback_applies_by_default() {
    let state = build_state();
    let app = app!(state);

    let body: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::post()
            .uri("/api/losiento/host")
            .set_json(json!({"maxSeats": 2}))
            .to_request(),
    )
    .await;
    assert_eq!(body["hostId"], "local-user");
}
