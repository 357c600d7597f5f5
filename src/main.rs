use std::sync::Arc;

use fighter_trivia_backend::api::{self, AppState};
use fighter_trivia_backend::db::{import, Database};
use fighter_trivia_backend::{metrics, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load();
    metrics::register_metrics();

    let db = Database::new(&config.database_url)
        .await
        .expect("Failed to initialize database");
    if let Some(path) = &config.import_csv {
        import::import_csv_file(&db, path)
            .await
            .unwrap_or_else(|e| panic!("Failed to import {}: {e}", path.display()));
    }
    let db = Arc::new(db);

    let state = AppState::new(db, &config);
    let app = api::router(state, &config.allowed_origins);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {addr}: {e}"));

    tracing::info!(
        database = %config.database_url,
        max_attempts = config.pair_max_attempts,
        "Fighter trivia backend listening on {addr}"
    );
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
