//! Authentication endpoints

use axum::{
    extract::State,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::AuthController;
use crate::dto::auth_dto::{AppLoginRequest, LoginRequest, LoginResponse};
use crate::dto::ApiResponse;
use crate::middleware::{auth_middleware, CurrentUser};
use crate::models::User;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::JwtConfig;

/// `/api/auth`: panel login plus the authenticated identity lookup
pub fn create_auth_router(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().route("/login", post(login)).merge(protected)
}

/// `/api/app`: mobile app login
pub fn create_app_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(app_login))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone());
    let jwt_config = JwtConfig::from(state.config.as_ref());
    let response = controller.login(request, &jwt_config).await?;
    Ok(Json(response))
}

async fn app_login(
    State(state): State<AppState>,
    Json(request): Json<AppLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let controller = AuthController::new(state.pool.clone());
    let jwt_config = JwtConfig::from(state.config.as_ref());
    let response = controller.app_login(request, &jwt_config).await?;
    Ok(Json(response))
}

async fn me(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    Ok(Json(ApiResponse::ok(user)))
}
