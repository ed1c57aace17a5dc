use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triviaking::{api, bank::QuestionBank, config::QuizConfig, state::AppState, ws};

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
                .unwrap_or_else(|_| "triviaking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting TriviaKing...");

    let config = QuizConfig::from_env();
    tracing::info!("Configuration: {:?}", config);

    let bank = match QuestionBank::load_dir(&config.questions_dir) {
        Ok(bank) => bank,
        Err(e) => {
            tracing::error!("Failed to load questions: {}", e);
            std::process::exit(1);
        }
    };
    if bank.is_empty() {
        tracing::warn!(
            "No questions found in {}, every run will be empty",
            config.questions_dir.display()
        );
    }

    let port = config.port;
    let state = match AppState::open(config, bank).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            tracing::error!("Failed to open data stores: {}", e);
            std::process::exit(1);
        }
    };

    let api_routes = Router::new()
        .route("/api/themes", get(api::list_themes))
        .route("/api/leaderboard", get(api::leaderboard))
        .route("/api/feedback", post(api::submit_feedback));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .merge(api_routes)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
