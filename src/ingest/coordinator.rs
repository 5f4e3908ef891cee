//! Batch ingestion coordinator
//!
//! Orchestrates one logical upload (a single request, or one chunk of a
//! client-driven multi-chunk sequence) into batch and vehicle persistence
//! operations. The coordinator talks to storage through the [`BatchStore`]
//! and [`VehicleWriter`] seams so the chunking and batch-resolution rules
//! can be tested without a database.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::ingest::validation::{validate, RequiredFields};
use crate::models::{Batch, CanonicalRecord, NewBatch, NewVehicle};
use crate::services::file_store::StoredFile;
use crate::utils::errors::{AppError, AppResult};

/// Tuning knobs of the ingestion pipeline
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Accepted records are inserted in sub-batches of this size to bound
    /// peak memory on the database round-trip.
    pub insert_batch_size: usize,
    /// Hard per-request record ceiling, enforced before validation.
    pub max_records: usize,
    /// How far back a continuation chunk may match a batch by file name.
    pub batch_match_window: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            insert_batch_size: 100,
            max_records: 1000,
            batch_match_window: Duration::minutes(5),
        }
    }
}

/// Where this request sits inside a logical upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkPosition {
    /// The whole upload in one request
    Single,
    /// First chunk of a multi-chunk upload; creates the batch
    Initial,
    /// Later chunk. Clients that echo back the batch id from the first
    /// chunk resolve by id; otherwise the legacy file-name + recency
    /// fallback applies.
    Continuation { batch_id: Option<Uuid> },
}

/// Persistence seam for batches
#[async_trait]
pub trait BatchStore: Send + Sync {
    async fn create(&self, new: NewBatch) -> AppResult<Batch>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Batch>>;
    async fn find_recent_by_file_name(
        &self,
        file_name: &str,
        window: Duration,
    ) -> AppResult<Option<Batch>>;
}

/// Persistence seam for bulk vehicle inserts
#[async_trait]
pub trait VehicleWriter: Send + Sync {
    async fn insert_many(&self, vehicles: &[NewVehicle]) -> AppResult<u64>;
}

/// Result of one ingested request
#[derive(Debug)]
pub struct IngestOutcome {
    pub uploaded: u64,
    pub invalid: usize,
    pub batch: Batch,
}

pub struct BatchIngestor<'a> {
    batches: &'a dyn BatchStore,
    vehicles: &'a dyn VehicleWriter,
    config: &'a IngestConfig,
}

impl<'a> BatchIngestor<'a> {
    pub fn new(
        batches: &'a dyn BatchStore,
        vehicles: &'a dyn VehicleWriter,
        config: &'a IngestConfig,
    ) -> Self {
        Self {
            batches,
            vehicles,
            config,
        }
    }

    /// Ingest one request's worth of candidate records.
    ///
    /// Order of operations matters: the ceiling and the validation gate run
    /// before any persistence, so a rejected request never creates a batch.
    pub async fn run(
        &self,
        file_name: &str,
        records: Vec<CanonicalRecord>,
        required: &RequiredFields,
        uploaded_by: Uuid,
        position: ChunkPosition,
        stored_file: Option<StoredFile>,
    ) -> AppResult<IngestOutcome> {
        if records.is_empty() {
            return Err(AppError::BadRequest(
                "No valid vehicles data provided".to_string(),
            ));
        }

        if records.len() > self.config.max_records {
            return Err(AppError::BadRequest(format!(
                "Too many records in one request: {} exceeds the limit of {}. \
                 Split the data into smaller chunks.",
                records.len(),
                self.config.max_records
            )));
        }

        let outcome = validate(records, required);
        if outcome.accepted.is_empty() {
            return Err(AppError::BadRequest(
                "No valid vehicles found in the uploaded data".to_string(),
            ));
        }

        let batch = self
            .resolve_batch(file_name, &outcome.accepted, &position, stored_file)
            .await?;

        let stamped: Vec<NewVehicle> = outcome
            .accepted
            .iter()
            .cloned()
            .map(|record| NewVehicle {
                record,
                uploaded_by,
                batch_id: batch.id,
            })
            .collect();

        // Sub-batches are submitted sequentially, never concurrently.
        let mut uploaded = 0u64;
        for chunk in stamped.chunks(self.config.insert_batch_size) {
            uploaded += self.vehicles.insert_many(chunk).await?;
        }

        Ok(IngestOutcome {
            uploaded,
            invalid: outcome.rejected_count(),
            batch,
        })
    }

    async fn resolve_batch(
        &self,
        file_name: &str,
        accepted: &[CanonicalRecord],
        position: &ChunkPosition,
        stored_file: Option<StoredFile>,
    ) -> AppResult<Batch> {
        match position {
            ChunkPosition::Single | ChunkPosition::Initial => {
                let company_name = accepted
                    .first()
                    .map(|r| r.company_name.trim())
                    .filter(|c| !c.is_empty())
                    .unwrap_or("Unknown")
                    .to_string();

                let (drive_file_id, drive_file_link) = match stored_file {
                    Some(file) => (Some(file.id), Some(file.link)),
                    None => (None, None),
                };

                self.batches
                    .create(NewBatch {
                        file_name: if file_name.trim().is_empty() {
                            "Unknown File".to_string()
                        } else {
                            file_name.to_string()
                        },
                        company_name,
                        drive_file_id,
                        drive_file_link,
                    })
                    .await
            }

            ChunkPosition::Continuation { batch_id: Some(id) } => self
                .batches
                .find_by_id(*id)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest("No active batch found for chunk upload".to_string())
                }),

            ChunkPosition::Continuation { batch_id: None } => self
                .batches
                .find_recent_by_file_name(file_name, self.config.batch_match_window)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest("No active batch found for chunk upload".to_string())
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn record(n: usize) -> CanonicalRecord {
        CanonicalRecord {
            vehicle_no: format!("V{}", n),
            chassis_no: format!("C{}", n),
            engine_no: format!("E{}", n),
            company_name: "Acme Finance".to_string(),
            ..Default::default()
        }
    }

    fn records(count: usize) -> Vec<CanonicalRecord> {
        (0..count).map(record).collect()
    }

    fn batch_named(file_name: &str) -> Batch {
        let now = chrono::Utc::now();
        Batch {
            id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            company_name: "Acme Finance".to_string(),
            upload_date: now,
            drive_file_id: None,
            drive_file_link: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[derive(Default)]
    struct MockBatchStore {
        created: Mutex<Vec<NewBatch>>,
        recent: Mutex<Option<Batch>>,
        by_id: Mutex<Option<Batch>>,
    }

    #[async_trait]
    impl BatchStore for MockBatchStore {
        async fn create(&self, new: NewBatch) -> AppResult<Batch> {
            let batch = batch_named(&new.file_name);
            self.created.lock().unwrap().push(new);
            self.recent.lock().unwrap().replace(batch.clone());
            Ok(batch)
        }

        async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Batch>> {
            Ok(self
                .by_id
                .lock()
                .unwrap()
                .clone()
                .filter(|batch| batch.id == id))
        }

        async fn find_recent_by_file_name(
            &self,
            file_name: &str,
            _window: Duration,
        ) -> AppResult<Option<Batch>> {
            Ok(self
                .recent
                .lock()
                .unwrap()
                .clone()
                .filter(|batch| batch.file_name == file_name))
        }
    }

    #[derive(Default)]
    struct MockVehicleWriter {
        insert_sizes: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl VehicleWriter for MockVehicleWriter {
        async fn insert_many(&self, vehicles: &[NewVehicle]) -> AppResult<u64> {
            self.insert_sizes.lock().unwrap().push(vehicles.len());
            Ok(vehicles.len() as u64)
        }
    }

    fn config() -> IngestConfig {
        IngestConfig::default()
    }

    #[tokio::test]
    async fn splits_inserts_into_fixed_size_sub_batches() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);

        let outcome = ingestor
            .run(
                "fleet.xlsx",
                records(250),
                &RequiredFields::minimal(),
                Uuid::new_v4(),
                ChunkPosition::Single,
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.uploaded, 250);
        assert_eq!(outcome.invalid, 0);
        assert_eq!(*vehicles.insert_sizes.lock().unwrap(), vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn rejects_requests_above_the_record_ceiling() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);

        let err = ingestor
            .run(
                "fleet.xlsx",
                records(1001),
                &RequiredFields::minimal(),
                Uuid::new_v4(),
                ChunkPosition::Single,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(vehicles.insert_sizes.lock().unwrap().is_empty());
        assert!(batches.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn zero_accepted_records_create_no_batch() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);

        let invalid = vec![
            CanonicalRecord::default(),
            CanonicalRecord {
                chassis_no: "C1".to_string(),
                ..Default::default()
            },
        ];

        let err = ingestor
            .run(
                "fleet.xlsx",
                invalid,
                &RequiredFields::minimal(),
                Uuid::new_v4(),
                ChunkPosition::Single,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(batches.created.lock().unwrap().is_empty());
        assert!(vehicles.insert_sizes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn continuation_reuses_the_batch_created_by_the_initial_chunk() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);
        let uploader = Uuid::new_v4();

        let first = ingestor
            .run(
                "fleet.xlsx",
                records(10),
                &RequiredFields::minimal(),
                uploader,
                ChunkPosition::Initial,
                None,
            )
            .await
            .unwrap();

        let second = ingestor
            .run(
                "fleet.xlsx",
                records(10),
                &RequiredFields::minimal(),
                uploader,
                ChunkPosition::Continuation { batch_id: None },
                None,
            )
            .await
            .unwrap();

        assert_eq!(batches.created.lock().unwrap().len(), 1);
        assert_eq!(first.batch.id, second.batch.id);
    }

    #[tokio::test]
    async fn continuation_without_a_matching_batch_fails_explicitly() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);

        let err = ingestor
            .run(
                "fleet.xlsx",
                records(10),
                &RequiredFields::minimal(),
                Uuid::new_v4(),
                ChunkPosition::Continuation { batch_id: None },
                None,
            )
            .await
            .unwrap_err();

        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("No active batch")),
            other => panic!("expected BadRequest, got {:?}", other),
        }
        assert!(vehicles.insert_sizes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn continuation_with_an_explicit_batch_id_resolves_by_id() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let known = batch_named("fleet.xlsx");
        batches.by_id.lock().unwrap().replace(known.clone());
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);

        let outcome = ingestor
            .run(
                "renamed-later.xlsx",
                records(5),
                &RequiredFields::minimal(),
                Uuid::new_v4(),
                ChunkPosition::Continuation {
                    batch_id: Some(known.id),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.batch.id, known.id);
        assert!(batches.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_rows_are_dropped_silently_with_an_aggregate_count() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);

        let mut mixed = records(3);
        mixed.push(CanonicalRecord::default());

        let outcome = ingestor
            .run(
                "fleet.csv",
                mixed,
                &RequiredFields::minimal(),
                Uuid::new_v4(),
                ChunkPosition::Single,
                None,
            )
            .await
            .unwrap();

        assert_eq!(outcome.uploaded, 3);
        assert_eq!(outcome.invalid, 1);
    }

    #[tokio::test]
    async fn batch_company_is_inferred_from_the_first_accepted_record() {
        let batches = MockBatchStore::default();
        let vehicles = MockVehicleWriter::default();
        let config = config();
        let ingestor = BatchIngestor::new(&batches, &vehicles, &config);

        ingestor
            .run(
                "fleet.xlsx",
                records(1),
                &RequiredFields::minimal(),
                Uuid::new_v4(),
                ChunkPosition::Single,
                None,
            )
            .await
            .unwrap();

        let created = batches.created.lock().unwrap();
        assert_eq!(created[0].company_name, "Acme Finance");
    }
}
