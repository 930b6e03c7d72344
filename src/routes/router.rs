use crate::models::Student;
use crate::rest::BasePath;
use axum::extract::OriginalUri;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json};
use axum::routing::{delete, get, post};
use serde_json::json;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::health;
use super::resource;
use super::student_handlers;
use super::AppState;

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Create application router
pub fn create_router(state: Arc<AppState>) -> axum::Router {
    use crate::middleware::request_id_middleware;

    let settings = state.settings.clone();

    // Auto-exposed repository resources
    let resources = resource::expose::<Student>(state.students.clone(), settings.base_path().clone());

    // Hand-written endpoints the front-end calls, next to the resources
    let controller = axum::Router::new()
        .route("/all", get(student_handlers::get_all))
        .route("/save", post(student_handlers::save))
        .route("/delete/{id}", delete(student_handlers::delete))
        .with_state(state.clone());

    let api_routes = settings.mount(resources.merge(controller));

    // Health check endpoint, outside the base path
    let health_routes = axum::Router::new()
        .route("/_health", get(health::health_check))
        .with_state(state);

    let base_path = settings.base_path().clone();
    let app = api_routes
        .merge(health_routes)
        .fallback(move |uri: OriginalUri| not_found(uri, base_path.clone()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    settings
        .apply_cors(app)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}

async fn not_found(OriginalUri(uri): OriginalUri, base_path: BasePath) -> impl IntoResponse {
    let path = uri.path();
    let message = if base_path.contains(path) {
        format!("No route for {}", path)
    } else {
        format!(
            "No route for {}; resources are served under {}",
            path, base_path
        )
    };

    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NOT_FOUND",
            "message": message,
        })),
    )
}
