//! Upload batch listing and cascade removal

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vehicle_dto::BatchResponse;
use crate::ingest::BatchStore;
use crate::models::Batch;
use crate::repositories::{BatchRepository, VehicleRepository};
use crate::services::FileStore;
use crate::utils::errors::{AppError, AppResult};

pub struct BatchController {
    batches: BatchRepository,
    vehicles: VehicleRepository,
}

impl BatchController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            batches: BatchRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    pub async fn list(&self) -> AppResult<Vec<BatchResponse>> {
        let batches = self.batches.list_with_counts().await?;

        Ok(batches
            .into_iter()
            .map(|row| BatchResponse {
                id: row.batch.id,
                file_name: row.batch.file_name,
                company_name: row.batch.company_name,
                upload_date: row.batch.upload_date,
                drive_file_link: row.batch.drive_file_link,
                vehicle_count: row.vehicle_count,
            })
            .collect())
    }

    pub async fn rename(&self, id: Uuid, file_name: &str) -> AppResult<Batch> {
        let trimmed = file_name.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest("File name cannot be empty".to_string()));
        }

        self.batches
            .rename(id, trimmed)
            .await?
            .ok_or_else(|| AppError::NotFound("Batch not found".to_string()))
    }

    pub async fn update_company(&self, id: Uuid, company_name: &str) -> AppResult<Batch> {
        let trimmed = company_name.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest(
                "Company name cannot be empty".to_string(),
            ));
        }

        self.batches
            .update_company(id, trimmed)
            .await?
            .ok_or_else(|| AppError::NotFound("Batch not found".to_string()))
    }

    /// Deletes the batch, every vehicle it brought in, and the stored copy
    /// of the source file. File-store failures do not block the delete.
    pub async fn delete(
        &self,
        id: Uuid,
        file_store: Option<Arc<dyn FileStore>>,
    ) -> AppResult<u64> {
        let batch = self
            .batches
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Batch not found".to_string()))?;

        let removed = self.vehicles.delete_by_batch(id).await?;
        self.batches.delete(id).await?;

        if let (Some(store), Some(file_id)) = (file_store, batch.drive_file_id.as_deref()) {
            if let Err(e) = store.delete(file_id).await {
                log::warn!("Failed to delete stored file {}: {}", file_id, e);
            }
        }

        Ok(removed)
    }
}
