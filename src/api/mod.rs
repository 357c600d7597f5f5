// HTTP API routes (fighter lookups, search, connect-the-dots).

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;
use crate::connect::{ConnectEngine, ConnectError, FightStore, FighterId};
use crate::db::Database;
use crate::metrics;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct FighterQuery {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct PathParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub engine: ConnectEngine<dyn FightStore>,
    pub connect_timeout: Duration,
}

impl AppState {
    pub fn new(db: Arc<Database>, config: &Config) -> Self {
        let store: Arc<dyn FightStore> = db.clone();
        let engine = ConnectEngine::new(store, config.pair_settings());
        Self::with_engine(db, engine, config.connect_timeout)
    }

    /// State whose connect routes run over `engine` rather than `db`.
    pub fn with_engine(
        db: Arc<Database>,
        engine: ConnectEngine<dyn FightStore>,
        connect_timeout: Duration,
    ) -> Self {
        Self {
            db,
            engine,
            connect_timeout,
        }
    }
}

// ── Error helpers ─────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": msg })))
}

fn internal_error(e: sqlx::Error) -> impl IntoResponse {
    tracing::error!("Database error: {e}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Database error")
}

fn connect_error(e: ConnectError) -> Response {
    if e.is_not_found() {
        json_error(StatusCode::NOT_FOUND, &e.to_string()).into_response()
    } else {
        json_error(StatusCode::SERVICE_UNAVAILABLE, &e.to_string()).into_response()
    }
}

fn timed_out() -> Response {
    tracing::warn!("Connect request exceeded its deadline");
    json_error(StatusCode::SERVICE_UNAVAILABLE, "Request timed out").into_response()
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        // Fighters
        .route("/api/fighter", get(get_fighter))
        .route("/api/search", get(search_fighters))
        .route("/api/random-fighter", get(random_fighter))
        .route("/api/daily-fighter", get(daily_fighter))
        // Connect the dots
        .route("/api/connect/path", get(connect_path))
        .route("/api/connect/pair", get(connect_pair))
        .with_state(state)
        .layer(middleware::from_fn(track_metrics))
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{o}': {e}");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let endpoint = metrics::normalize_path(req.uri().path());
    let started = Instant::now();

    let response = next.run(req).await;

    metrics::API_REQUEST_DURATION_SECONDS
        .with_label_values(&[endpoint.as_str()])
        .observe(started.elapsed().as_secs_f64());
    metrics::API_REQUESTS_TOTAL
        .with_label_values(&[method.as_str(), endpoint.as_str(), response.status().as_str()])
        .inc();
    response
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "fighter-trivia-backend" }))
}

async fn get_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}

// ── Fighter handlers ──────────────────────────────────────────────────

async fn get_fighter(
    State(state): State<AppState>,
    Query(params): Query<FighterQuery>,
) -> impl IntoResponse {
    let first_name = params.first_name.unwrap_or_default();
    if first_name.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "First name is required").into_response();
    }
    let id = FighterId::new(&first_name, params.last_name.as_deref());
    match state.db.get_fighter(&id).await {
        Ok(Some(fighter)) => (StatusCode::OK, Json(json!(fighter))).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "Fighter not found").into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn search_fighters(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return (StatusCode::OK, Json(json!([]))).into_response();
    }
    match state.db.search_fighters(&query).await {
        Ok(hits) => (StatusCode::OK, Json(json!(hits))).into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn random_fighter(State(state): State<AppState>) -> impl IntoResponse {
    match state.db.random_fighter().await {
        Ok(Some(fighter)) => (StatusCode::OK, Json(json!(fighter))).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "No fighters found").into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

async fn daily_fighter(State(state): State<AppState>) -> impl IntoResponse {
    let today = chrono::Utc::now().date_naive();
    match state.db.daily_fighter(today).await {
        Ok(Some(fighter)) => (StatusCode::OK, Json(json!(fighter))).into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, "No fighters found").into_response(),
        Err(e) => internal_error(e).into_response(),
    }
}

// ── Connect-the-dots handlers ─────────────────────────────────────────

async fn connect_path(
    State(state): State<AppState>,
    Query(params): Query<PathParams>,
) -> impl IntoResponse {
    let (Some(from), Some(to)) = (params.from, params.to) else {
        return json_error(StatusCode::BAD_REQUEST, "from and to are required").into_response();
    };
    if from.trim().is_empty() || to.trim().is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "from and to are required").into_response();
    }
    let start = FighterId::from_full_name(&from);
    let end = FighterId::from_full_name(&to);

    match tokio::time::timeout(state.connect_timeout, state.engine.shortest_path(&start, &end)).await {
        Ok(Ok(path)) => (StatusCode::OK, Json(json!(path))).into_response(),
        Ok(Err(e)) => connect_error(e),
        Err(_) => timed_out(),
    }
}

async fn connect_pair(State(state): State<AppState>) -> impl IntoResponse {
    match tokio::time::timeout(state.connect_timeout, state.engine.generate_puzzle_pair()).await {
        Ok(Ok((start, end))) => {
            (StatusCode::OK, Json(json!({ "start": start, "end": end }))).into_response()
        }
        Ok(Err(e)) => connect_error(e),
        Err(_) => timed_out(),
    }
}
