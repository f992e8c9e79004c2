use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(crate::api::handlers::health::health))
        .route("/generate", post(crate::api::handlers::generate::generate))
        .route(
            "/generate/trace",
            post(crate::api::handlers::generate::generate_with_trace),
        )
}

/// Full application: routes, shared state and HTTP middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
