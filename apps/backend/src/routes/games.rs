//! Game-related HTTP routes: the lobby and gameplay surface.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::selector::ClientMovePayload;
use crate::domain::snapshot::{joinable_entry, to_client, GameView, JoinableGame};
use crate::error::AppError;
use crate::errors::GameError;
use crate::extractors::CurrentUser;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostGameBody {
    max_seats: u8,
    display_name: Option<String>,
    deck_seed: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinGameBody {
    game_id: String,
    display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaveGameBody {
    game_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KickPlayerBody {
    game_id: String,
    seat_index: u8,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigureSeatBody {
    game_id: String,
    seat_index: u8,
    is_bot: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartGameBody {
    game_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayMoveBody {
    game_id: String,
    #[serde(default)]
    payload: ClientMovePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameIdQuery {
    game_id: String,
}

#[derive(Serialize)]
struct JoinableListResponse {
    games: Vec<JoinableGame>,
}

#[derive(Serialize)]
struct AckResponse {
    ok: bool,
}

async fn host_game(
    body: web::Json<HostGameBody>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game = app_state
        .sessions
        .host(
            &user.id,
            body.display_name.as_deref(),
            body.max_seats,
            body.deck_seed,
        )
        .await?;
    Ok(web::Json(to_client(&game, &user.id)))
}

async fn list_joinable_games(
    _user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<JoinableListResponse>, AppError> {
    let games = app_state.sessions.list_joinable().await?;
    Ok(web::Json(JoinableListResponse {
        games: games.iter().map(joinable_entry).collect(),
    }))
}

async fn join_game(
    body: web::Json<JoinGameBody>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game = app_state
        .sessions
        .join(&user.id, &body.game_id, body.display_name.as_deref())
        .await?;
    Ok(web::Json(to_client(&game, &user.id)))
}

async fn leave_game(
    body: web::Json<LeaveGameBody>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<AckResponse>, AppError> {
    app_state.sessions.leave(&user.id, &body.game_id).await?;
    Ok(web::Json(AckResponse { ok: true }))
}

async fn kick_player(
    body: web::Json<KickPlayerBody>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game = app_state
        .sessions
        .kick(&user.id, &body.game_id, body.seat_index)
        .await?;
    Ok(web::Json(to_client(&game, &user.id)))
}

async fn configure_seat(
    body: web::Json<ConfigureSeatBody>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game = app_state
        .sessions
        .configure_seat(&user.id, &body.game_id, body.seat_index, body.is_bot)
        .await?;
    Ok(web::Json(to_client(&game, &user.id)))
}

async fn start_game(
    body: web::Json<StartGameBody>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game = app_state.sessions.start(&user.id, &body.game_id).await?;
    Ok(web::Json(to_client(&game, &user.id)))
}

async fn get_state(
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    match app_state.sessions.active_game_for_user(&user.id).await? {
        Some(game) => Ok(HttpResponse::Ok().json(to_client(&game, &user.id))),
        None => Err(GameError::NoActiveGame.into()),
    }
}

async fn get_legal_movers(
    query: web::Query<GameIdQuery>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let preview = app_state.turns.preview(&user.id, &query.game_id).await?;
    Ok(HttpResponse::Ok().json(preview))
}

async fn play_move(
    body: web::Json<PlayMoveBody>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game = app_state
        .turns
        .play_human(&user.id, &body.game_id, &body.payload)
        .await?;
    Ok(web::Json(to_client(&game, &user.id)))
}

async fn bot_step(
    query: web::Query<GameIdQuery>,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<GameView>, AppError> {
    let game = app_state.turns.bot_step(&query.game_id).await?;
    Ok(web::Json(to_client(&game, &user.id)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/host").route(web::post().to(host_game)));
    cfg.service(web::resource("/joinable").route(web::get().to(list_joinable_games)));
    cfg.service(web::resource("/join").route(web::post().to(join_game)));
    cfg.service(web::resource("/leave").route(web::post().to(leave_game)));
    cfg.service(web::resource("/kick").route(web::post().to(kick_player)));
    cfg.service(web::resource("/configure-seat").route(web::post().to(configure_seat)));
    cfg.service(web::resource("/start").route(web::post().to(start_game)));
    cfg.service(web::resource("/state").route(web::get().to(get_state)));
    cfg.service(web::resource("/legal-movers").route(web::get().to(get_legal_movers)));
    cfg.service(web::resource("/play").route(web::post().to(play_move)));
    cfg.service(web::resource("/bot-step").route(web::post().to(bot_step)));
}
