//! Upload batches
//!
//! A batch groups the vehicles that were uploaded together in one logical
//! operation, possibly split across several network chunks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: Uuid,
    pub file_name: String,
    pub company_name: String,
    pub upload_date: DateTime<Utc>,
    pub drive_file_id: Option<String>,
    pub drive_file_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Batch metadata captured when an upload starts
#[derive(Debug, Clone, Default)]
pub struct NewBatch {
    pub file_name: String,
    pub company_name: String,
    pub drive_file_id: Option<String>,
    pub drive_file_link: Option<String>,
}
