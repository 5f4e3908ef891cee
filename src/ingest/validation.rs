//! Validation gate
//!
//! Decides which normalized records are eligible for persistence. The
//! required-field set differs between ingestion entry points (the minimal
//! three-field set against the historical sixteen-field set), so it is
//! configuration passed in by the caller rather than a fixed rule.
//!
//! Rejected records are not surfaced individually to API clients (only an
//! aggregate count is reported), but the outcome keeps per-record detail so
//! callers and tests can inspect both.

use crate::models::CanonicalRecord;

/// Minimal required set applied by the current ingestion entry points
const MINIMAL: &[&str] = &["vehicleNo", "chassisNo", "engineNo"];

/// Historical required set applied by the legacy CSV ingestion path
const LEGACY_FULL: &[&str] = &[
    "vehicleNo",
    "chassisNo",
    "engineNo",
    "agNo",
    "branch",
    "customerName",
    "bkt",
    "vehicleMaker",
    "companyName",
    "lpp",
    "bcc",
    "companyBranch",
    "companyContact",
    "companyContactPerson",
    "agencyName",
    "agencyContact",
];

/// Fields a direct single-record update must carry
pub const UPDATE_REQUIRED: &[&str] = &[
    "vehicleNo",
    "chassisNo",
    "engineNo",
    "branch",
    "customerName",
    "bkt",
    "area",
    "vehicleMaker",
    "companyName",
];

/// The configured required-field set for one ingestion entry point
#[derive(Debug, Clone)]
pub struct RequiredFields(Vec<&'static str>);

impl RequiredFields {
    /// {vehicleNo, chassisNo, engineNo}
    pub fn minimal() -> Self {
        Self(MINIMAL.to_vec())
    }

    /// The historical multi-field set
    pub fn legacy_full() -> Self {
        Self(LEGACY_FULL.to_vec())
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.0
    }

    /// Fields of `record` that are missing or blank after trimming
    pub fn missing_in(&self, record: &CanonicalRecord) -> Vec<&'static str> {
        self.0
            .iter()
            .filter(|field| {
                record
                    .field(field)
                    .map(|value| value.trim().is_empty())
                    .unwrap_or(true)
            })
            .copied()
            .collect()
    }
}

/// One silently dropped record, kept for inspection
#[derive(Debug, Clone)]
pub struct RejectedRecord {
    /// zero-based position in the input sequence
    pub row: usize,
    pub missing: Vec<&'static str>,
}

/// Result of running the gate over a candidate sequence
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    pub accepted: Vec<CanonicalRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl ValidationOutcome {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }
}

/// Partition candidate records into accepted and rejected, preserving the
/// input order of the accepted side.
pub fn validate(records: Vec<CanonicalRecord>, required: &RequiredFields) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for (row, record) in records.into_iter().enumerate() {
        let missing = required.missing_in(&record);
        if missing.is_empty() {
            outcome.accepted.push(record);
        } else {
            outcome.rejected.push(RejectedRecord { row, missing });
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(vehicle_no: &str, chassis_no: &str, engine_no: &str) -> CanonicalRecord {
        CanonicalRecord {
            vehicle_no: vehicle_no.to_string(),
            chassis_no: chassis_no.to_string(),
            engine_no: engine_no.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_complete_and_rejects_incomplete() {
        let records = vec![record("V1", "C1", "E1"), record("", "C2", "E2")];
        let outcome = validate(records, &RequiredFields::minimal());

        assert_eq!(outcome.accepted.len(), 1);
        assert_eq!(outcome.rejected_count(), 1);
        assert_eq!(outcome.accepted[0].vehicle_no, "V1");
        assert_eq!(outcome.rejected[0].row, 1);
        assert_eq!(outcome.rejected[0].missing, vec!["vehicleNo"]);
    }

    #[test]
    fn whitespace_only_values_count_as_missing() {
        let records = vec![record("  ", "C1", "E1")];
        let outcome = validate(records, &RequiredFields::minimal());
        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected_count(), 1);
    }

    #[test]
    fn legacy_set_demands_far_more_fields() {
        let outcome = validate(vec![record("V1", "C1", "E1")], &RequiredFields::legacy_full());
        assert!(outcome.accepted.is_empty());
        let missing = &outcome.rejected[0].missing;
        assert!(missing.contains(&"agNo"));
        assert!(missing.contains(&"agencyContact"));
        assert!(!missing.contains(&"vehicleNo"));
    }

    #[test]
    fn accepted_order_matches_input_order() {
        let records = vec![
            record("V1", "C1", "E1"),
            record("", "", ""),
            record("V3", "C3", "E3"),
        ];
        let outcome = validate(records, &RequiredFields::minimal());
        let nos: Vec<_> = outcome.accepted.iter().map(|r| r.vehicle_no.as_str()).collect();
        assert_eq!(nos, vec!["V1", "V3"]);
    }
}
