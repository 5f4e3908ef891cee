//! Vehicle, upload and batch endpoints

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    middleware,
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::upload_controller::MAX_UPLOAD_BYTES;
use crate::controllers::{BatchController, UploadController, VehicleController};
use crate::dto::vehicle_dto::{
    AppVehicle, BatchResponse, RenameBatchRequest, UpdateBatchCompanyRequest, UploadDataRequest,
    UploadResponse, VehicleListQuery,
};
use crate::dto::{ApiResponse, PaginatedResponse};
use crate::middleware::{auth_middleware, require_super_admin, CurrentUser};
use crate::models::{Batch, CanonicalRecord, Vehicle};
use crate::repositories::VehicleStats;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// `/api/vehicles`: listings, bulk ingestion and batch management
pub fn create_vehicle_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024)),
        )
        .route("/upload-data", post(upload_data))
        .route("/", get(list_vehicles))
        .route("/app", get(list_app_vehicles))
        .route("/groups", get(list_groups))
        .route("/vehicle-types", get(list_vehicle_types))
        .route("/stats/summary", get(vehicle_stats))
        .route("/batches", get(list_batches))
        .route("/batches/:id/vehicles", get(list_batch_vehicles))
        .route("/batches/:id/rename", put(rename_batch))
        .route("/batches/:id/company", put(update_batch_company))
        .route("/batches/:id", delete(delete_batch))
        .route("/:id", get(get_vehicle))
        .route("/:id", put(update_vehicle))
        .route("/:id", delete(delete_vehicle))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn upload_file(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    require_super_admin(&actor)?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart.next_field().await.map_err(AppError::from)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(AppError::from)?;
        upload = Some((file_name, bytes.to_vec()));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))?;

    let controller = UploadController::new(state.pool.clone());
    let response = controller
        .upload_file(
            &state.config,
            state.file_store.clone(),
            actor.id,
            file_name,
            bytes,
        )
        .await?;
    Ok(Json(response))
}

async fn upload_data(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Json(request): Json<UploadDataRequest>,
) -> Result<Json<UploadResponse>, AppError> {
    require_super_admin(&actor)?;
    let controller = UploadController::new(state.pool.clone());
    let response = controller
        .upload_data(&state.config, actor.id, request)
        .await?;
    Ok(Json(response))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<PaginatedResponse<Vehicle>>, AppError> {
    require_super_admin(&actor)?;
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.list(query).await?))
}

async fn list_app_vehicles(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<PaginatedResponse<AppVehicle>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.list_app(&actor, query).await?))
}

async fn list_groups(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(ApiResponse::ok(controller.groups().await?)))
}

async fn list_vehicle_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, AppError> {
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(ApiResponse::ok(controller.vehicle_types().await?)))
}

async fn vehicle_stats(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<VehicleStats>>, AppError> {
    require_super_admin(&actor)?;
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(ApiResponse::ok(controller.stats().await?)))
}

async fn list_batches(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<BatchResponse>>>, AppError> {
    require_super_admin(&actor)?;
    let controller = BatchController::new(state.pool.clone());
    Ok(Json(ApiResponse::ok(controller.list().await?)))
}

async fn list_batch_vehicles(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Query(mut query): Query<VehicleListQuery>,
) -> Result<Json<PaginatedResponse<Vehicle>>, AppError> {
    require_super_admin(&actor)?;
    query.batch_id = Some(id);
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.list(query).await?))
}

async fn rename_batch(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<RenameBatchRequest>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    require_super_admin(&actor)?;
    let controller = BatchController::new(state.pool.clone());
    let batch = controller.rename(id, &request.file_name).await?;
    Ok(Json(ApiResponse::with_message("Batch renamed", batch)))
}

async fn update_batch_company(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBatchCompanyRequest>,
) -> Result<Json<ApiResponse<Batch>>, AppError> {
    require_super_admin(&actor)?;
    let controller = BatchController::new(state.pool.clone());
    let batch = controller.update_company(id, &request.company_name).await?;
    Ok(Json(ApiResponse::with_message("Batch company updated", batch)))
}

async fn delete_batch(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_super_admin(&actor)?;
    let controller = BatchController::new(state.pool.clone());
    let removed = controller.delete(id, state.file_store.clone()).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": format!("Batch deleted along with {} vehicles", removed)
    })))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    require_super_admin(&actor)?;
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(ApiResponse::ok(controller.get(id).await?)))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(record): Json<CanonicalRecord>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    require_super_admin(&actor)?;
    let controller = VehicleController::new(state.pool.clone());
    Ok(Json(controller.update(id, record).await?))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(CurrentUser(actor)): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_super_admin(&actor)?;
    let controller = VehicleController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Vehicle deleted successfully"
    })))
}
