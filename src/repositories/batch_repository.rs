//! Upload batch persistence

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::ingest::BatchStore;
use crate::models::{Batch, NewBatch};
use crate::utils::errors::AppResult;

const BATCH_COLUMNS: &str =
    "id, file_name, company_name, upload_date, drive_file_id, drive_file_link, created_at, updated_at";

/// Batch joined with how many vehicle rows it holds
#[derive(Debug, sqlx::FromRow)]
pub struct BatchWithCount {
    #[sqlx(flatten)]
    pub batch: Batch,
    pub vehicle_count: i64,
}

pub struct BatchRepository {
    pool: PgPool,
}

impl BatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Batches newest first, with the per-batch vehicle count
    pub async fn list_with_counts(&self) -> AppResult<Vec<BatchWithCount>> {
        let rows = sqlx::query_as::<_, BatchWithCount>(&format!(
            r#"
            SELECT {BATCH_COLUMNS}, COALESCE(v.count, 0) AS vehicle_count
            FROM batches b
            LEFT JOIN (
                SELECT batch_id, COUNT(*) AS count FROM vehicles GROUP BY batch_id
            ) v ON v.batch_id = b.id
            ORDER BY b.upload_date DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn rename(&self, id: Uuid, file_name: &str) -> AppResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>(&format!(
            "UPDATE batches SET file_name = $1, updated_at = $2 WHERE id = $3 RETURNING {BATCH_COLUMNS}"
        ))
        .bind(file_name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    pub async fn update_company(&self, id: Uuid, company_name: &str) -> AppResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>(&format!(
            "UPDATE batches SET company_name = $1, updated_at = $2 WHERE id = $3 RETURNING {BATCH_COLUMNS}"
        ))
        .bind(company_name)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM batches WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl BatchStore for BatchRepository {
    async fn create(&self, new: NewBatch) -> AppResult<Batch> {
        let now = Utc::now();
        let batch = sqlx::query_as::<_, Batch>(&format!(
            r#"
            INSERT INTO batches
                (id, file_name, company_name, upload_date, drive_file_id, drive_file_link,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $4, $4)
            RETURNING {BATCH_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.file_name)
        .bind(new.company_name)
        .bind(now)
        .bind(new.drive_file_id)
        .bind(new.drive_file_link)
        .fetch_one(&self.pool)
        .await?;

        Ok(batch)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }

    async fn find_recent_by_file_name(
        &self,
        file_name: &str,
        window: Duration,
    ) -> AppResult<Option<Batch>> {
        let since = Utc::now() - window;
        let batch = sqlx::query_as::<_, Batch>(&format!(
            r#"
            SELECT {BATCH_COLUMNS} FROM batches
            WHERE file_name = $1 AND upload_date >= $2
            ORDER BY upload_date DESC
            LIMIT 1
            "#
        ))
        .bind(file_name)
        .bind(since)
        .fetch_optional(&self.pool)
        .await?;

        Ok(batch)
    }
}
