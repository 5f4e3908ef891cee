//! Vehicle records
//!
//! A vehicle row is a denormalized repossession case. Every descriptive
//! attribute is stored as a free-form string exactly as it came out of the
//! source spreadsheet; only the system fields are typed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canonical, alias-resolved representation of one spreadsheet row,
/// independent of source header naming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CanonicalRecord {
    // location
    pub state: String,
    pub branch: String,
    pub city: String,
    pub area: String,
    // identifiers
    pub file_no: String,
    pub loan_agreement_no: String,
    pub vehicle_no: String,
    pub reg_no: String,
    pub chassis_no: String,
    pub engine_no: String,
    pub ag_no: String,
    // customer
    pub name_of_client: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_mobile_number: String,
    pub contact_person1: String,
    pub mobile_number1: String,
    pub contact_person2: String,
    pub mobile_number2: String,
    // classification
    pub vehicle_type: String,
    pub make: String,
    pub vehicle_maker: String,
    pub model: String,
    pub year: String,
    pub month: String,
    // financials
    pub emi: String,
    pub pos: String,
    pub tos: String,
    pub fc_amt: String,
    pub loan_amount: String,
    pub dpd: String,
    // buckets / codes
    pub bkt: String,
    pub lpp: String,
    pub bcc: String,
    #[serde(rename = "group")]
    pub group_name: String,
    pub group_account_count: String,
    // company / agency
    pub company_name: String,
    pub company_branch: String,
    pub company_contact: String,
    pub company_contact_person: String,
    pub agency_name: String,
    pub agency_contact: String,
}

impl CanonicalRecord {
    /// Look up a field value by its canonical (camelCase) name.
    ///
    /// Used by the validation gate, whose required-field sets are
    /// configuration rather than hard-coded struct access.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "state" => &self.state,
            "branch" => &self.branch,
            "city" => &self.city,
            "area" => &self.area,
            "fileNo" => &self.file_no,
            "loanAgreementNo" => &self.loan_agreement_no,
            "vehicleNo" => &self.vehicle_no,
            "regNo" => &self.reg_no,
            "chassisNo" => &self.chassis_no,
            "engineNo" => &self.engine_no,
            "agNo" => &self.ag_no,
            "nameOfClient" => &self.name_of_client,
            "customerName" => &self.customer_name,
            "customerAddress" => &self.customer_address,
            "customerMobileNumber" => &self.customer_mobile_number,
            "contactPerson1" => &self.contact_person1,
            "mobileNumber1" => &self.mobile_number1,
            "contactPerson2" => &self.contact_person2,
            "mobileNumber2" => &self.mobile_number2,
            "vehicleType" => &self.vehicle_type,
            "make" => &self.make,
            "vehicleMaker" => &self.vehicle_maker,
            "model" => &self.model,
            "year" => &self.year,
            "month" => &self.month,
            "emi" => &self.emi,
            "pos" => &self.pos,
            "tos" => &self.tos,
            "fcAmt" => &self.fc_amt,
            "loanAmount" => &self.loan_amount,
            "dpd" => &self.dpd,
            "bkt" => &self.bkt,
            "lpp" => &self.lpp,
            "bcc" => &self.bcc,
            "group" => &self.group_name,
            "groupAccountCount" => &self.group_account_count,
            "companyName" => &self.company_name,
            "companyBranch" => &self.company_branch,
            "companyContact" => &self.company_contact,
            "companyContactPerson" => &self.company_contact_person,
            "agencyName" => &self.agency_name,
            "agencyContact" => &self.agency_contact,
            _ => return None,
        };
        Some(value.as_str())
    }
}

/// A canonical record stamped with its owner and batch, ready for insert
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub record: CanonicalRecord,
    pub uploaded_by: Uuid,
    pub batch_id: Uuid,
}

/// Persisted vehicle row
#[derive(Debug, Clone, Default, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub state: String,
    pub branch: String,
    pub city: String,
    pub area: String,
    pub file_no: String,
    pub loan_agreement_no: String,
    pub vehicle_no: String,
    pub reg_no: String,
    pub chassis_no: String,
    pub engine_no: String,
    pub ag_no: String,
    pub name_of_client: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_mobile_number: String,
    pub contact_person1: String,
    pub mobile_number1: String,
    pub contact_person2: String,
    pub mobile_number2: String,
    pub vehicle_type: String,
    pub make: String,
    pub vehicle_maker: String,
    pub model: String,
    pub year: String,
    pub month: String,
    pub emi: String,
    pub pos: String,
    pub tos: String,
    pub fc_amt: String,
    pub loan_amount: String,
    pub dpd: String,
    pub bkt: String,
    pub lpp: String,
    pub bcc: String,
    #[serde(rename = "group")]
    pub group_name: String,
    pub group_account_count: String,
    pub company_name: String,
    pub company_branch: String,
    pub company_contact: String,
    pub company_contact_person: String,
    pub agency_name: String,
    pub agency_contact: String,
    pub uploaded_by: Uuid,
    pub batch_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reduced projection returned to Sub Seizer users on the mobile listing
#[derive(Debug, Clone, Default, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAppView {
    pub id: Uuid,
    pub vehicle_no: String,
    pub chassis_no: String,
    pub engine_no: String,
    pub customer_name: String,
    pub vehicle_maker: String,
    pub agency_name: String,
    pub agency_contact: String,
    pub vehicle_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_lookup_resolves_canonical_names() {
        let record = CanonicalRecord {
            vehicle_no: "MH12AB1234".to_string(),
            group_name: "Two Wheeler".to_string(),
            ..Default::default()
        };
        assert_eq!(record.field("vehicleNo"), Some("MH12AB1234"));
        assert_eq!(record.field("group"), Some("Two Wheeler"));
        assert_eq!(record.field("chassisNo"), Some(""));
        assert_eq!(record.field("noSuchField"), None);
    }

    #[test]
    fn serializes_group_field_under_its_public_name() {
        let record = CanonicalRecord {
            group_name: "CV".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["group"], "CV");
        assert!(json.get("groupName").is_none());
    }
}
