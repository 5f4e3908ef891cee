//! User management endpoints

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    middleware,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::UserController;
use crate::dto::user_dto::{
    CreateUserRequest, UpdateStatusRequest, UpdateUserRequest, UserListQuery,
};
use crate::dto::{ApiResponse, PaginatedResponse};
use crate::middleware::{auth_middleware, require_super_admin, CurrentUser};
use crate::models::User;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// `/api/users`: account administration, all behind authentication
pub fn create_user_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/", get(list_users))
        .route("/dashboard/summary", get(dashboard_summary))
        .route("/:id", get(get_user))
        .route("/:id", put(update_user))
        .route("/:id", delete(delete_user))
        .route("/:id/status", patch(update_status))
        .route(
            "/:id/profile-image",
            post(upload_profile_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024)),
        )
        .route("/:id/profile-image", delete(delete_profile_image))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_super_admin(&actor)?;
    let controller = UserController::new(state.pool.clone());
    Ok(Json(controller.create(&actor, request).await?))
}

async fn list_users(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<PaginatedResponse<User>>, AppError> {
    require_super_admin(&actor)?;
    let controller = UserController::new(state.pool.clone());
    Ok(Json(controller.list(query).await?))
}

async fn dashboard_summary(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_super_admin(&actor)?;
    let controller = UserController::new(state.pool.clone());
    Ok(Json(controller.dashboard_summary().await?))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_super_admin(&actor)?;
    let controller = UserController::new(state.pool.clone());
    Ok(Json(ApiResponse::ok(controller.get(id).await?)))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_super_admin(&actor)?;
    let controller = UserController::new(state.pool.clone());
    Ok(Json(controller.update(id, request).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    require_super_admin(&actor)?;
    let controller = UserController::new(state.pool.clone());
    Ok(Json(controller.update_status(id, request).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_super_admin(&actor)?;
    let controller = UserController::new(state.pool.clone());
    controller.delete(id, state.file_store.clone()).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "User deleted successfully"
    })))
}

/// Only the Super Admin or the account owner may change a profile image
fn check_image_access(actor: &User, target: Uuid) -> AppResult<()> {
    if actor.is_super_admin() || actor.id == target {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You cannot modify another user's profile image".to_string(),
        ))
    }
}

async fn upload_profile_image(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<User>>, AppError> {
    check_image_access(&actor, id)?;

    let mut image: Option<(String, String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(AppError::from)? {
        if field.file_name().is_none() {
            continue;
        }
        let name = field.file_name().unwrap_or("image").to_string();
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(AppError::from)?;
        image = Some((name, mime, bytes.to_vec()));
        break;
    }

    let (name, mime, bytes) =
        image.ok_or_else(|| AppError::BadRequest("No image file provided".to_string()))?;

    if !matches!(mime.as_str(), "image/jpeg" | "image/png" | "image/gif") {
        return Err(AppError::BadRequest(
            "Profile image must be a JPEG, PNG or GIF".to_string(),
        ));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::PayloadTooLarge(
            "Profile image exceeds the 5MB limit".to_string(),
        ));
    }

    let controller = UserController::new(state.pool.clone());
    let response = controller
        .upload_profile_image(
            id,
            state.file_store.clone(),
            &state.config.upload_dir,
            &name,
            &mime,
            bytes,
        )
        .await?;
    Ok(Json(response))
}

async fn delete_profile_image(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    check_image_access(&actor, id)?;
    let controller = UserController::new(state.pool.clone());
    let response = controller
        .delete_profile_image(id, state.file_store.clone())
        .await?;
    Ok(Json(response))
}
