//! User persistence

use chrono::Utc;
use sqlx::{PgPool, QueryBuilder};
use uuid::Uuid;

use crate::models::{roles, User};
use crate::utils::errors::{AppError, AppResult};

/// Fields captured when creating an account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub password_hash: String,
    pub employee_id: String,
    pub mobile_no: String,
    pub role: String,
    pub i_card: Option<String>,
    pub groups: Vec<String>,
    pub created_by: Option<Uuid>,
}

/// Optional changes applied by an account update
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub full_name: Option<String>,
    pub mobile_no: Option<String>,
    pub role: Option<String>,
    pub i_card: Option<String>,
    pub groups: Option<Vec<String>>,
}

/// Listing filters for the admin panel
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

const USER_COLUMNS: &str = "id, full_name, username, password_hash, employee_id, mobile_no, \
     status, i_card, profile_image, role, groups, created_by, created_at, updated_at";

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (id, full_name, username, password_hash, employee_id, mobile_no,
                 status, i_card, profile_image, role, groups, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'Active', $7, NULL, $8, $9, $10, $11, $11)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.full_name)
        .bind(new.username.to_lowercase())
        .bind(new.password_hash)
        .bind(new.employee_id)
        .bind(new.mobile_no)
        .bind(new.i_card)
        .bind(new.role)
        .bind(new.groups)
        .bind(new.created_by)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username.to_lowercase())
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// App login lookup: Admin or Sub Seizer, by username or mobile number
    pub async fn find_app_user(&self, identifier: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE role IN ($1, $2) AND (username = $3 OR mobile_no = $4)
            "#
        ))
        .bind(roles::ADMIN)
        .bind(roles::SUB_SEIZER)
        .bind(identifier.to_lowercase())
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username.to_lowercase())
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    pub async fn employee_id_exists(&self, employee_id: &str) -> AppResult<bool> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE employee_id = $1)")
                .bind(employee_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    fn push_filter(builder: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &UserFilter) {
        // the admin panel never lists Super Admin accounts
        builder
            .push(" WHERE role IN (")
            .push_bind(roles::ADMIN.to_string())
            .push(", ")
            .push_bind(roles::SUB_SEIZER.to_string())
            .push(")");

        if let Some(role) = &filter.role {
            builder.push(" AND role = ").push_bind(role.clone());
        }
        if let Some(status) = &filter.status {
            builder.push(" AND status = ").push_bind(status.clone());
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            builder
                .push(" AND (full_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR username ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR employee_id ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    pub async fn list(&self, filter: &UserFilter, page: u32, limit: u32) -> AppResult<Vec<User>> {
        let mut builder = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
        Self::push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit as i64)
            .push(" OFFSET ")
            .push_bind((page.saturating_sub(1) as i64) * limit as i64);

        let users = builder.build_query_as::<User>().fetch_all(&self.pool).await?;
        Ok(users)
    }

    pub async fn count(&self, filter: &UserFilter) -> AppResult<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM users");
        Self::push_filter(&mut builder, filter);

        let count: (i64,) = builder.build_query_as().fetch_one(&self.pool).await?;
        Ok(count.0)
    }

    pub async fn count_all(&self) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    pub async fn update(&self, id: Uuid, changes: UserChanges) -> AppResult<User> {
        let mut builder = QueryBuilder::new("UPDATE users SET updated_at = ");
        builder.push_bind(Utc::now());

        if let Some(full_name) = changes.full_name {
            builder.push(", full_name = ").push_bind(full_name);
        }
        if let Some(mobile_no) = changes.mobile_no {
            builder.push(", mobile_no = ").push_bind(mobile_no);
        }
        if let Some(role) = changes.role {
            builder.push(", role = ").push_bind(role);
        }
        if let Some(i_card) = changes.i_card {
            builder.push(", i_card = ").push_bind(i_card);
        }
        if let Some(groups) = changes.groups {
            builder.push(", groups = ").push_bind(groups);
        }

        builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {USER_COLUMNS}"));

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    pub async fn update_status(&self, id: Uuid, status: &str) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET status = $1, updated_at = $2 WHERE id = $3 RETURNING {USER_COLUMNS}"
        ))
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    pub async fn update_profile_image(
        &self,
        id: Uuid,
        profile_image: Option<String>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET profile_image = $1, updated_at = $2 WHERE id = $3 RETURNING {USER_COLUMNS}"
        ))
        .bind(profile_image)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }
}
