//! Vehicle and upload request and response shapes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CanonicalRecord, Vehicle, VehicleAppView};

/// JSON body of the pre-parsed data upload endpoint. Clients splitting a
/// large file send several of these, marking all but the first as chunks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDataRequest {
    #[serde(default)]
    pub file_name: Option<String>,
    pub vehicles: Vec<CanonicalRecord>,
    #[serde(default)]
    pub is_chunk: Option<bool>,
    #[serde(default)]
    pub chunk_index: Option<u32>,
    #[serde(default)]
    pub total_chunks: Option<u32>,
    /// Echoed back from the first chunk's response for exact batch matching
    #[serde(default)]
    pub batch_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub uploaded: u64,
    pub invalid: usize,
    pub batch_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_file_link: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VehicleListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub vehicle_no: Option<String>,
    pub chassis_no: Option<String>,
    pub customer_name: Option<String>,
    pub company_name: Option<String>,
    pub branch: Option<String>,
    pub area: Option<String>,
    pub vehicle_maker: Option<String>,
    pub vehicle_type: Option<String>,
    pub batch_id: Option<Uuid>,
}

/// One row of the mobile listing. Admins receive the complete record;
/// Sub Seizers receive the reduced projection for their groups.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AppVehicle {
    Full(Vehicle),
    Reduced(VehicleAppView),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameBatchRequest {
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatchCompanyRequest {
    pub company_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub id: Uuid,
    pub file_name: String,
    pub company_name: String,
    pub upload_date: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_file_link: Option<String>,
    pub vehicle_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_app_rows_carry_the_complete_record() {
        let vehicle = Vehicle {
            loan_amount: "150000".to_string(),
            vehicle_no: "MH12AB1234".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(AppVehicle::Full(vehicle)).unwrap();
        assert_eq!(json["loanAmount"], "150000");
        assert_eq!(json["vehicleNo"], "MH12AB1234");
    }

    #[test]
    fn sub_seizer_app_rows_stay_reduced() {
        let view = VehicleAppView {
            vehicle_no: "MH12AB1234".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(AppVehicle::Reduced(view)).unwrap();
        assert_eq!(json["vehicleNo"], "MH12AB1234");
        assert!(json.get("loanAmount").is_none());
        assert!(json.get("customerAddress").is_none());
    }
}
