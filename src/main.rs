use actix_web::{web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod client;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(config).await;

    let images = web::Data::from(state.images.clone());
    let sessions = web::Data::from(state.sessions.clone());
    let orchestrator = web::Data::from(state.orchestrator.clone());
    let assistant = web::Data::from(state.assistant.clone());
    let export = web::Data::from(state.export.clone());
    let narrative = web::Data::new(state.narrative_client.clone());
    let vision_available = web::Data::new(state.vision_available.clone());

    tracing::info!("Starting disaster assessment server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(images.clone())
            .app_data(sessions.clone())
            .app_data(orchestrator.clone())
            .app_data(assistant.clone())
            .app_data(export.clone())
            .app_data(narrative.clone())
            .app_data(vision_available.clone())
            .configure(api::analysis::configure)
            .configure(api::chat::configure)
            .configure(api::health::configure)
            .configure(api::openapi::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
