//! Bulk upload entry points
//!
//! Two front doors feed the same ingestion pipeline: a multipart file
//! upload parsed server-side, and a JSON body of rows the client already
//! parsed (optionally split into chunks).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::environment::EnvironmentConfig;
use crate::dto::vehicle_dto::{UploadDataRequest, UploadResponse};
use crate::ingest::{parse_file, BatchIngestor, ChunkPosition, FileKind, RequiredFields};
use crate::models::CanonicalRecord;
use crate::repositories::{BatchRepository, VehicleRepository};
use crate::services::{FileStore, StoredFile};
use crate::utils::errors::{AppError, AppResult};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Removes the on-disk temp copy when the request finishes, on every path.
pub(crate) struct TempFile(PathBuf);

impl TempFile {
    /// Writes the bytes under the upload dir and arms the cleanup guard.
    pub(crate) async fn write(
        upload_dir: &str,
        original_name: &str,
        bytes: &[u8],
    ) -> AppResult<Self> {
        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Could not prepare upload dir: {}", e)))?;

        let temp = Self(Path::new(upload_dir).join(format!("{}-{}", Uuid::new_v4(), original_name)));
        tokio::fs::write(temp.path(), bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Could not store upload: {}", e)))?;

        Ok(temp)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.0) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to remove temp upload {}: {}", self.0.display(), e);
            }
        }
    }
}

/// True when the upload will pass the ingestion gates: within the record
/// ceiling and carrying at least one row with every required field.
fn admissible(records: &[CanonicalRecord], required: &RequiredFields, max_records: usize) -> bool {
    !records.is_empty()
        && records.len() <= max_records
        && records
            .iter()
            .any(|record| required.missing_in(record).is_empty())
}

pub struct UploadController {
    batches: BatchRepository,
    vehicles: VehicleRepository,
}

impl UploadController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            batches: BatchRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    /// Multipart spreadsheet upload: persist to a temp file, parse, push a
    /// copy to the file store when configured, then ingest in one batch.
    pub async fn upload_file(
        &self,
        config: &EnvironmentConfig,
        file_store: Option<Arc<dyn FileStore>>,
        uploaded_by: Uuid,
        file_name: String,
        bytes: Vec<u8>,
    ) -> AppResult<UploadResponse> {
        let kind = FileKind::from_name(&file_name).ok_or_else(|| {
            AppError::BadRequest(
                "Unsupported file type. Only .xlsx, .xls and .csv files are accepted".to_string(),
            )
        })?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(
                "File exceeds the 10MB upload limit".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }

        let temp = TempFile::write(&config.upload_dir, &file_name, &bytes).await?;

        // parsing is CPU/disk bound, keep it off the async workers
        let parse_path = temp.path().to_path_buf();
        let records = tokio::task::spawn_blocking(move || parse_file(&parse_path, kind))
            .await
            .map_err(|e| AppError::Internal(format!("Parse task failed: {}", e)))??;

        // the stored copy is best effort: a file-store outage must never
        // block the ingest itself. Uploads the pipeline will reject outright
        // are never pushed to the store, so a rejection leaves nothing behind.
        let required = RequiredFields::minimal();
        let stored_file = match &file_store {
            Some(store) if admissible(&records, &required, config.ingest.max_records) => {
                match store
                    .upload(temp.path(), &file_name, kind.mime_type())
                    .await
                {
                    Ok(stored) => Some(stored),
                    Err(e) => {
                        log::warn!("File store upload failed for {}: {}", file_name, e);
                        None
                    }
                }
            }
            _ => None,
        };

        self.ingest(
            config,
            &file_name,
            records,
            uploaded_by,
            ChunkPosition::Single,
            stored_file,
        )
        .await
    }

    /// Pre-parsed rows posted as JSON, optionally one chunk of a sequence.
    pub async fn upload_data(
        &self,
        config: &EnvironmentConfig,
        uploaded_by: Uuid,
        request: UploadDataRequest,
    ) -> AppResult<UploadResponse> {
        let position = match (request.is_chunk.unwrap_or(false), request.chunk_index) {
            (false, _) => ChunkPosition::Single,
            (true, Some(0)) | (true, None) => ChunkPosition::Initial,
            (true, Some(_)) => ChunkPosition::Continuation {
                batch_id: request.batch_id,
            },
        };

        let file_name = request
            .file_name
            .unwrap_or_else(|| "Unknown File".to_string());

        self.ingest(
            config,
            &file_name,
            request.vehicles,
            uploaded_by,
            position,
            None,
        )
        .await
    }

    async fn ingest(
        &self,
        config: &EnvironmentConfig,
        file_name: &str,
        records: Vec<CanonicalRecord>,
        uploaded_by: Uuid,
        position: ChunkPosition,
        stored_file: Option<StoredFile>,
    ) -> AppResult<UploadResponse> {
        let file_link = stored_file.as_ref().map(|f| f.link.clone());

        let ingestor = BatchIngestor::new(&self.batches, &self.vehicles, &config.ingest);
        let outcome = ingestor
            .run(
                file_name,
                records,
                &RequiredFields::minimal(),
                uploaded_by,
                position,
                stored_file,
            )
            .await?;

        let message = if outcome.invalid > 0 {
            format!(
                "Uploaded {} vehicles, {} invalid rows skipped",
                outcome.uploaded, outcome.invalid
            )
        } else {
            format!("Uploaded {} vehicles", outcome.uploaded)
        };

        log::info!(
            "📦 Ingested {} rows into batch {} from {}",
            outcome.uploaded,
            outcome.batch.id,
            file_name
        );

        Ok(UploadResponse {
            success: true,
            message,
            uploaded: outcome.uploaded,
            invalid: outcome.invalid,
            batch_id: outcome.batch.id,
            drive_file_link: file_link.or(outcome.batch.drive_file_link),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> CanonicalRecord {
        CanonicalRecord {
            vehicle_no: "MH12AB1234".to_string(),
            chassis_no: "C1".to_string(),
            engine_no: "E1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rejected_uploads_are_not_worth_storing() {
        let required = RequiredFields::minimal();

        assert!(!admissible(&[], &required, 1000));

        let blank = vec![CanonicalRecord::default(); 3];
        assert!(!admissible(&blank, &required, 1000));

        let over_ceiling = vec![valid_record(); 11];
        assert!(!admissible(&over_ceiling, &required, 10));
    }

    #[test]
    fn one_valid_row_makes_the_upload_storable() {
        let required = RequiredFields::minimal();
        let mut records = vec![CanonicalRecord::default(); 4];
        records.push(valid_record());
        assert!(admissible(&records, &required, 1000));
    }
}
