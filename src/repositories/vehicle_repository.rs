//! Vehicle persistence
//!
//! All descriptive columns are free-form text and are written in one fixed
//! order, shared between the bulk insert and the full-record update so the
//! two can never drift apart.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::ingest::VehicleWriter;
use crate::models::{CanonicalRecord, NewVehicle, Vehicle, VehicleAppView};
use crate::utils::errors::{AppError, AppResult};

const DISTINCT_VEHICLE_TYPES_SQL: &str =
    "SELECT DISTINCT vehicle_type FROM vehicles WHERE vehicle_type <> '' ORDER BY vehicle_type";

/// Descriptive columns in canonical order
const RECORD_COLUMNS: [&str; 42] = [
    "state",
    "branch",
    "city",
    "area",
    "file_no",
    "loan_agreement_no",
    "vehicle_no",
    "reg_no",
    "chassis_no",
    "engine_no",
    "ag_no",
    "name_of_client",
    "customer_name",
    "customer_address",
    "customer_mobile_number",
    "contact_person1",
    "mobile_number1",
    "contact_person2",
    "mobile_number2",
    "vehicle_type",
    "make",
    "vehicle_maker",
    "model",
    "year",
    "month",
    "emi",
    "pos",
    "tos",
    "fc_amt",
    "loan_amount",
    "dpd",
    "bkt",
    "lpp",
    "bcc",
    "group_name",
    "group_account_count",
    "company_name",
    "company_branch",
    "company_contact",
    "company_contact_person",
    "agency_name",
    "agency_contact",
];

/// Field values in the same order as [`RECORD_COLUMNS`]
fn record_values(record: &CanonicalRecord) -> [&String; 42] {
    [
        &record.state,
        &record.branch,
        &record.city,
        &record.area,
        &record.file_no,
        &record.loan_agreement_no,
        &record.vehicle_no,
        &record.reg_no,
        &record.chassis_no,
        &record.engine_no,
        &record.ag_no,
        &record.name_of_client,
        &record.customer_name,
        &record.customer_address,
        &record.customer_mobile_number,
        &record.contact_person1,
        &record.mobile_number1,
        &record.contact_person2,
        &record.mobile_number2,
        &record.vehicle_type,
        &record.make,
        &record.vehicle_maker,
        &record.model,
        &record.year,
        &record.month,
        &record.emi,
        &record.pos,
        &record.tos,
        &record.fc_amt,
        &record.loan_amount,
        &record.dpd,
        &record.bkt,
        &record.lpp,
        &record.bcc,
        &record.group_name,
        &record.group_account_count,
        &record.company_name,
        &record.company_branch,
        &record.company_contact,
        &record.company_contact_person,
        &record.agency_name,
        &record.agency_contact,
    ]
}

/// Listing filters for the admin panel. Per-field filters are
/// case-insensitive substring matches; `vehicle_type` and `batch_id`
/// select exact values.
#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
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

/// Aggregate counts for the stats endpoint
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStats {
    pub total_vehicles: i64,
    pub total_branches: i64,
    pub total_companies: i64,
    pub total_areas: i64,
}

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &VehicleFilter) {
        builder.push(" WHERE 1 = 1");

        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (vehicle_no ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR chassis_no ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR engine_no ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR name_of_client ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR company_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR branch ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        let field_filters = [
            ("vehicle_no", &filter.vehicle_no),
            ("chassis_no", &filter.chassis_no),
            ("customer_name", &filter.customer_name),
            ("company_name", &filter.company_name),
            ("branch", &filter.branch),
            ("area", &filter.area),
            ("vehicle_maker", &filter.vehicle_maker),
        ];
        for (column, value) in field_filters {
            if let Some(value) = value {
                builder
                    .push(format!(" AND {column} ILIKE "))
                    .push_bind(format!("%{}%", value));
            }
        }
        if let Some(vehicle_type) = &filter.vehicle_type {
            builder
                .push(" AND vehicle_type = ")
                .push_bind(vehicle_type.clone());
        }
        if let Some(batch_id) = filter.batch_id {
            builder.push(" AND batch_id = ").push_bind(batch_id);
        }
    }

    pub async fn list(
        &self,
        filter: &VehicleFilter,
        page: u32,
        limit: u32,
    ) -> AppResult<Vec<Vehicle>> {
        let mut builder = QueryBuilder::new("SELECT * FROM vehicles");
        Self::push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind((page.saturating_sub(1) as i64) * limit as i64);

        let vehicles = builder
            .build_query_as::<Vehicle>()
            .fetch_all(&self.pool)
            .await?;
        Ok(vehicles)
    }

    pub async fn count(&self, filter: &VehicleFilter) -> AppResult<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM vehicles");
        Self::push_filter(&mut builder, filter);

        let count: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    /// Mobile listing for Sub Seizers: only vehicles whose type is one of the
    /// user's assigned groups, projected down to the fields the app shows.
    pub async fn list_for_groups(
        &self,
        groups: &[String],
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> AppResult<Vec<VehicleAppView>> {
        let mut builder = QueryBuilder::new(
            "SELECT id, vehicle_no, chassis_no, engine_no, customer_name, vehicle_maker, \
             agency_name, agency_contact, vehicle_type FROM vehicles WHERE vehicle_type = ANY(",
        );
        builder.push_bind(groups.to_vec()).push(")");

        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (vehicle_no ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR chassis_no ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR engine_no ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind((page.saturating_sub(1) as i64) * limit as i64);

        let vehicles = builder
            .build_query_as::<VehicleAppView>()
            .fetch_all(&self.pool)
            .await?;
        Ok(vehicles)
    }

    pub async fn count_for_groups(
        &self,
        groups: &[String],
        search: Option<&str>,
    ) -> AppResult<i64> {
        let mut builder =
            QueryBuilder::new("SELECT COUNT(*) FROM vehicles WHERE vehicle_type = ANY(");
        builder.push_bind(groups.to_vec()).push(")");

        if let Some(search) = search {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (vehicle_no ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR chassis_no ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR engine_no ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        let count: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(vehicle)
    }

    /// Full-record replacement: every descriptive column is overwritten
    /// with the submitted value.
    pub async fn update(&self, id: Uuid, record: &CanonicalRecord) -> AppResult<Vehicle> {
        let mut builder = QueryBuilder::new("UPDATE vehicles SET updated_at = ");
        builder.push_bind(Utc::now());

        for (column, value) in RECORD_COLUMNS.iter().zip(record_values(record)) {
            builder
                .push(format!(", {column} = "))
                .push_bind(value.clone());
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *");

        let vehicle = builder
            .build_query_as::<Vehicle>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Vehicle not found".to_string()));
        }

        Ok(())
    }

    /// Removes every vehicle belonging to a batch; returns how many went.
    pub async fn delete_by_batch(&self, batch_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM vehicles WHERE batch_id = $1")
            .bind(batch_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Distinct vehicle types present in the table. User group assignments
    /// and the Sub Seizer visibility filter both key on `vehicle_type`, so
    /// the group picker and the type dropdown read the same column.
    pub async fn distinct_vehicle_types(&self) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(DISTINCT_VEHICLE_TYPES_SQL)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    pub async fn stats(&self) -> AppResult<VehicleStats> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(DISTINCT branch) FILTER (WHERE branch <> ''),
                COUNT(DISTINCT company_name) FILTER (WHERE company_name <> ''),
                COUNT(DISTINCT area) FILTER (WHERE area <> '')
            FROM vehicles
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(VehicleStats {
            total_vehicles: row.0,
            total_branches: row.1,
            total_companies: row.2,
            total_areas: row.3,
        })
    }

}

#[async_trait]
impl VehicleWriter for VehicleRepository {
    async fn insert_many(&self, vehicles: &[NewVehicle]) -> AppResult<u64> {
        if vehicles.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut builder = QueryBuilder::new(format!(
            "INSERT INTO vehicles (id, {}, uploaded_by, batch_id, created_at, updated_at) ",
            RECORD_COLUMNS.join(", ")
        ));

        builder.push_values(vehicles, |mut row, vehicle| {
            row.push_bind(Uuid::new_v4());
            for value in record_values(&vehicle.record) {
                row.push_bind(value.clone());
            }
            row.push_bind(vehicle.uploaded_by)
                .push_bind(vehicle.batch_id)
                .push_bind(now)
                .push_bind(now);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built_sql(filter: &VehicleFilter) -> String {
        let mut builder = QueryBuilder::new("SELECT * FROM vehicles");
        VehicleRepository::push_filter(&mut builder, filter);
        builder.sql().to_string()
    }

    #[test]
    fn field_filters_match_substrings_case_insensitively() {
        let filter = VehicleFilter {
            vehicle_no: Some("KA01".to_string()),
            chassis_no: Some("MA3".to_string()),
            customer_name: Some("kumar".to_string()),
            company_name: Some("finance".to_string()),
            branch: Some("hub".to_string()),
            area: Some("north".to_string()),
            vehicle_maker: Some("tata".to_string()),
            ..Default::default()
        };

        let sql = built_sql(&filter);
        for column in [
            "vehicle_no",
            "chassis_no",
            "customer_name",
            "company_name",
            "branch",
            "area",
            "vehicle_maker",
        ] {
            assert!(
                sql.contains(&format!("{column} ILIKE ")),
                "expected substring match on {column}: {sql}"
            );
            assert!(!sql.contains(&format!("{column} = ")), "{sql}");
        }
    }

    #[test]
    fn type_and_batch_filters_stay_exact() {
        let filter = VehicleFilter {
            vehicle_type: Some("Truck".to_string()),
            batch_id: Some(Uuid::new_v4()),
            ..Default::default()
        };

        let sql = built_sql(&filter);
        assert!(sql.contains("vehicle_type = "));
        assert!(sql.contains("batch_id = "));
        assert!(!sql.contains("vehicle_type ILIKE"));
    }

    #[test]
    fn distinct_types_query_reads_the_visibility_column() {
        assert!(DISTINCT_VEHICLE_TYPES_SQL.contains("DISTINCT vehicle_type"));
        assert!(!DISTINCT_VEHICLE_TYPES_SQL.contains("group_name"));
    }
}
