//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/v1/...`
/// - CORS (allow any origin/method/headers), adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/methods", get(http::http_get_methods))
        .route("/api/v1/divinations", post(http::http_post_divination))
        .route("/api/v1/prompt", post(http::http_post_prompt))
        .route("/api/v1/parse", post(http::http_post_parse))
        .route("/api/v1/almanac", get(http::http_get_almanac))
        .route("/api/v1/mbti/questions", get(http::http_get_mbti_questions))
        .route("/api/v1/results", get(http::http_list_results))
        .route(
            "/api/v1/results/:id",
            get(http::http_get_result).delete(http::http_delete_result),
        )
        .route("/api/v1/results/:id/sections", put(http::http_put_sections))
        .route("/api/v1/results/:id/share", get(http::http_get_share))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
