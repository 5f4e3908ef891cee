//! HTTP routing

pub mod auth_routes;
pub mod user_routes;
pub mod vehicle_routes;

use axum::{extract::State, routing::get, Json, Router};

use crate::state::AppState;

/// Assembles the full `/api` surface
pub fn create_api_router(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes::create_auth_router(state.clone()))
        .nest("/app", auth_routes::create_app_auth_router())
        .nest("/users", user_routes::create_user_router(state.clone()))
        .nest("/vehicles", vehicle_routes::create_vehicle_router(state))
        .route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "fileStore": if state.file_store.is_some() { "available" } else { "disabled" },
    }))
}
