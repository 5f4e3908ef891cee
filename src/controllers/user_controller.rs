//! User management
//!
//! Super Admin manages Admin and Sub Seizer accounts from the panel.
//! Profile images are pushed to the external file store when configured.

use std::sync::Arc;

use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::upload_controller::TempFile;
use crate::dto::user_dto::{CreateUserRequest, UpdateStatusRequest, UpdateUserRequest, UserListQuery};
use crate::dto::{ApiResponse, PaginatedResponse, Pagination};
use crate::models::{roles, statuses, User};
use crate::repositories::{NewUser, UserChanges, UserFilter, UserRepository, VehicleRepository};
use crate::services::{file_id_from_link, FileStore};
use crate::utils::errors::{AppError, AppResult};

/// Attempts before giving up on finding a free 4-digit employee id
const EMPLOYEE_ID_ATTEMPTS: usize = 20;

pub struct UserController {
    repository: UserRepository,
    vehicles: VehicleRepository,
}

impl UserController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    async fn generate_employee_id(&self) -> AppResult<String> {
        for _ in 0..EMPLOYEE_ID_ATTEMPTS {
            let candidate = rand::thread_rng().gen_range(1000..=9999).to_string();
            if !self.repository.employee_id_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::Internal(
            "Could not allocate a unique employee id".to_string(),
        ))
    }

    pub async fn create(
        &self,
        actor: &User,
        request: CreateUserRequest,
    ) -> AppResult<ApiResponse<User>> {
        request.validate()?;

        if !roles::is_assignable(&request.role) {
            return Err(AppError::BadRequest(format!(
                "Role must be one of: {}, {}",
                roles::ADMIN,
                roles::SUB_SEIZER
            )));
        }

        if request.role == roles::SUB_SEIZER && request.groups.is_empty() {
            return Err(AppError::BadRequest(
                "At least one group is required for Sub Seizer accounts".to_string(),
            ));
        }

        if self.repository.username_exists(&request.username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)?;
        let employee_id = self.generate_employee_id().await?;

        let user = self
            .repository
            .create(NewUser {
                full_name: request.full_name,
                username: request.username,
                password_hash,
                employee_id,
                mobile_no: request.mobile_no,
                role: request.role,
                i_card: request.i_card,
                groups: request.groups,
                created_by: Some(actor.id),
            })
            .await?;

        Ok(ApiResponse::with_message("User created successfully", user))
    }

    pub async fn list(&self, query: UserListQuery) -> AppResult<PaginatedResponse<User>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(50).clamp(1, 200);

        let filter = UserFilter {
            role: query.role,
            status: query.status,
            search: query.search,
        };

        let total = self.repository.count(&filter).await?;
        let users = self.repository.list(&filter, page, limit).await?;

        Ok(PaginatedResponse::new(
            users,
            Pagination::new(page, limit, total),
        ))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<User> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateUserRequest,
    ) -> AppResult<ApiResponse<User>> {
        if let Some(role) = &request.role {
            if !roles::is_assignable(role) {
                return Err(AppError::BadRequest(format!(
                    "Role must be one of: {}, {}",
                    roles::ADMIN,
                    roles::SUB_SEIZER
                )));
            }
        }

        let user = self
            .repository
            .update(
                id,
                UserChanges {
                    full_name: request.full_name,
                    mobile_no: request.mobile_no,
                    role: request.role,
                    i_card: request.i_card,
                    groups: request.groups,
                },
            )
            .await?;

        Ok(ApiResponse::with_message("User updated successfully", user))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateStatusRequest,
    ) -> AppResult<ApiResponse<User>> {
        if !statuses::is_valid(&request.status) {
            return Err(AppError::BadRequest(format!(
                "Status must be one of: {}, {}, {}",
                statuses::ACTIVE,
                statuses::INACTIVE,
                statuses::HOLD
            )));
        }

        let target = self.get(id).await?;
        if target.is_super_admin() {
            return Err(AppError::Forbidden(
                "Super Admin status cannot be changed".to_string(),
            ));
        }

        let user = self.repository.update_status(id, &request.status).await?;
        Ok(ApiResponse::with_message("Status updated successfully", user))
    }

    pub async fn delete(&self, id: Uuid, file_store: Option<Arc<dyn FileStore>>) -> AppResult<()> {
        let target = self.get(id).await?;
        if target.is_super_admin() {
            return Err(AppError::Forbidden(
                "Super Admin account cannot be deleted".to_string(),
            ));
        }

        self.repository.delete(id).await?;

        // stored image removal is best effort
        if let (Some(store), Some(file_id)) = (
            file_store,
            target.profile_image.as_deref().and_then(file_id_from_link),
        ) {
            if let Err(e) = store.delete(file_id).await {
                log::warn!("Failed to delete profile image {}: {}", file_id, e);
            }
        }

        Ok(())
    }

    /// Stores the uploaded image in the file store, makes it public and
    /// saves the share link. Replaces and removes any previous image.
    pub async fn upload_profile_image(
        &self,
        id: Uuid,
        file_store: Option<Arc<dyn FileStore>>,
        upload_dir: &str,
        original_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> AppResult<ApiResponse<User>> {
        let store = file_store.ok_or_else(|| {
            AppError::ServiceUnavailable("File storage is not configured".to_string())
        })?;

        let previous = self.get(id).await?.profile_image;

        let temp = TempFile::write(upload_dir, original_name, &bytes).await?;
        let stored = store.upload(temp.path(), original_name, mime_type).await?;
        let link = store.make_public(&stored.id).await?;

        let user = self
            .repository
            .update_profile_image(id, Some(link))
            .await?;

        // old image cleanup failures are logged, not surfaced
        if let Some(old_id) = previous.as_deref().and_then(file_id_from_link) {
            if let Err(e) = store.delete(old_id).await {
                log::warn!("Failed to delete previous profile image {}: {}", old_id, e);
            }
        }

        Ok(ApiResponse::with_message("Profile image updated", user))
    }

    pub async fn delete_profile_image(
        &self,
        id: Uuid,
        file_store: Option<Arc<dyn FileStore>>,
    ) -> AppResult<ApiResponse<User>> {
        let current = self.get(id).await?.profile_image;

        if let (Some(store), Some(file_id)) = (
            file_store,
            current.as_deref().and_then(file_id_from_link),
        ) {
            if let Err(e) = store.delete(file_id).await {
                log::warn!("Failed to delete profile image {}: {}", file_id, e);
            }
        }

        let user = self.repository.update_profile_image(id, None).await?;
        Ok(ApiResponse::with_message("Profile image removed", user))
    }

    /// Headline numbers for the panel dashboard
    pub async fn dashboard_summary(&self) -> AppResult<serde_json::Value> {
        let total_users = self.repository.count_all().await?;
        let stats = self.vehicles.stats().await?;

        Ok(serde_json::json!({
            "success": true,
            "data": {
                "totalUsers": total_users,
                "totalVehicles": stats.total_vehicles,
                "totalBranches": stats.total_branches,
                "totalCompanies": stats.total_companies,
                "totalAreas": stats.total_areas,
            }
        }))
    }
}
