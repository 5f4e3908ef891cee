//! Bulk upload pipeline
//!
//! spreadsheet parsing → field normalization → validation → batched insert,
//! with a tolerated external file-store side effect on the file path.

pub mod coordinator;
pub mod normalizer;
pub mod spreadsheet;
pub mod validation;

pub use coordinator::{BatchIngestor, BatchStore, ChunkPosition, IngestConfig, IngestOutcome, VehicleWriter};
pub use normalizer::{normalize_row, normalize_rows, AliasTable, Cell, Row};
pub use spreadsheet::{parse_file, FileKind};
pub use validation::{validate, RequiredFields, ValidationOutcome};
