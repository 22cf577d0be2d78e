// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{handlers::quiz, state::AppState, utils::cookies};

/// Assembles the main application router.
///
/// * Nests the quiz routes under /api/quiz.
/// * Applies global middleware (session cookie, Trace, CORS).
/// * Injects global state (pool, config, session store).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    // Credentials must be allowed so the session cookie survives a
    // cross-origin frontend during development.
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true);

    let quiz_routes = Router::new()
        .route("/start", post(quiz::start_quiz))
        .route("/question", get(quiz::current_question))
        .route("/answer", post(quiz::submit_answer))
        .route("/advance", post(quiz::advance))
        .route("/retry-wrong", post(quiz::retry_wrong))
        .route("/results", get(quiz::results));

    Router::new()
        .nest("/api/quiz", quiz_routes)
        // Global Middleware (applied from outside in)
        .layer(middleware::from_fn(cookies::session_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
