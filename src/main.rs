use actix_web::{App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod db;
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

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize application");
        std::io::Error::other(e)
    })?;

    tracing::info!("Starting Model Catalogue server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(app::cors(&config.cors))
            .wrap(actix_web::middleware::Logger::default())
            .app_data(state.db_pool.clone())
            .app_data(state.catalogue.clone())
            .app_data(state.extractor.clone())
            .configure(api::health::configure)
            .configure(api::openapi::configure)
            .configure(api::models::configure)
            .configure(api::benchmarks::configure)
            .configure(api::benchmark_results::configure)
            .configure(api::opinions::configure)
            .configure(api::use_cases::configure)
            .configure(api::extraction::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
