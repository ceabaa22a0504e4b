use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wortspion::{accounts::AccountStore, api, state::AppState, types::GameConfig, ws};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wortspion=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Wortspion...");

    let data_dir =
        std::env::var("WORTSPION_DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let accounts = match AccountStore::open(Path::new(&data_dir)) {
        Ok(accounts) => accounts,
        Err(e) => {
            tracing::error!(dir = %data_dir, error = %e, "cannot open account store");
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState::new(GameConfig::from_env(), accounts));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/register", post(api::register))
        .route("/api/login", post(api::login))
        .route("/api/avatar", post(api::set_avatar))
        .route("/api/profile/{name}", get(api::profile))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = std::env::var("WORTSPION_ADDR")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 4000)));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
