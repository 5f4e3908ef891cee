//! Vehicle queries and record maintenance

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vehicle_dto::{AppVehicle, VehicleListQuery};
use crate::dto::{ApiResponse, PaginatedResponse, Pagination};
use crate::ingest::validation::UPDATE_REQUIRED;
use crate::models::{CanonicalRecord, User, Vehicle};
use crate::repositories::{VehicleFilter, VehicleRepository, VehicleStats};
use crate::utils::errors::{AppError, AppResult};

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn list(&self, query: VehicleListQuery) -> AppResult<PaginatedResponse<Vehicle>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(50).clamp(1, 200);

        let filter = VehicleFilter {
            search: query.search,
            vehicle_no: query.vehicle_no,
            chassis_no: query.chassis_no,
            customer_name: query.customer_name,
            company_name: query.company_name,
            branch: query.branch,
            area: query.area,
            vehicle_maker: query.vehicle_maker,
            vehicle_type: query.vehicle_type,
            batch_id: query.batch_id,
        };

        let total = self.repository.count(&filter).await?;
        let vehicles = self.repository.list(&filter, page, limit).await?;

        Ok(PaginatedResponse::new(
            vehicles,
            Pagination::new(page, limit, total),
        ))
    }

    /// Mobile listing. Admins see every vehicle as a complete record;
    /// Sub Seizers only see vehicles whose type matches one of their
    /// assigned groups, projected down to the fields the app shows.
    pub async fn list_app(
        &self,
        user: &User,
        query: VehicleListQuery,
    ) -> AppResult<PaginatedResponse<AppVehicle>> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(50).clamp(1, 200);

        if user.is_admin_or_above() {
            let filter = VehicleFilter {
                search: query.search,
                ..Default::default()
            };
            let total = self.repository.count(&filter).await?;
            let vehicles = self.repository.list(&filter, page, limit).await?;
            let rows = vehicles.into_iter().map(AppVehicle::Full).collect();
            return Ok(PaginatedResponse::new(
                rows,
                Pagination::new(page, limit, total),
            ));
        }

        if user.groups.is_empty() {
            return Ok(PaginatedResponse::new(
                Vec::new(),
                Pagination::new(page, limit, 0),
            ));
        }

        let search = query.search.as_deref();
        let total = self
            .repository
            .count_for_groups(&user.groups, search)
            .await?;
        let vehicles = self
            .repository
            .list_for_groups(&user.groups, search, page, limit)
            .await?;
        let rows = vehicles.into_iter().map(AppVehicle::Reduced).collect();

        Ok(PaginatedResponse::new(
            rows,
            Pagination::new(page, limit, total),
        ))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Vehicle> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))
    }

    /// Full-record replacement. Single-record edits are held to a stricter
    /// required set than the bulk pipeline.
    pub async fn update(
        &self,
        id: Uuid,
        record: CanonicalRecord,
    ) -> AppResult<ApiResponse<Vehicle>> {
        let missing: Vec<&str> = UPDATE_REQUIRED
            .iter()
            .copied()
            .filter(|name| {
                record
                    .field(name)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .collect();

        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let vehicle = self.repository.update(id, &record).await?;
        Ok(ApiResponse::with_message(
            "Vehicle updated successfully",
            vehicle,
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.delete(id).await
    }

    /// Assignable groups are the vehicle types in circulation; this backs
    /// the group picker on the user form.
    pub async fn groups(&self) -> AppResult<Vec<String>> {
        self.repository.distinct_vehicle_types().await
    }

    pub async fn vehicle_types(&self) -> AppResult<Vec<String>> {
        self.repository.distinct_vehicle_types().await
    }

    pub async fn stats(&self) -> AppResult<VehicleStats> {
        self.repository.stats().await
    }
}
