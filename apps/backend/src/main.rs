use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use losiento_backend::config::AppConfig;
use losiento_backend::state::AppState;
use losiento_backend::store::MemoryGameStore;
use losiento_backend::{routes, telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = AppConfig::from_env();
    let bind_addr = config.bind_addr.clone();

    let store = Arc::new(MemoryGameStore::new());
    let app_state = AppState::new(store, config);

    tracing::info!(%bind_addr, "starting Lo Siento backend");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
