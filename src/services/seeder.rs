//! First-run seeding

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::models::roles;
use crate::repositories::{NewUser, UserRepository};
use crate::utils::errors::AppResult;

/// Creates the initial Super Admin account when the users table is empty.
/// Subsequent startups are a no-op.
pub async fn seed_super_admin(pool: &PgPool, config: &EnvironmentConfig) -> AppResult<()> {
    let users = UserRepository::new(pool.clone());

    if users.count_all().await? > 0 {
        log::debug!("Users already present, skipping super admin seed");
        return Ok(());
    }

    let password_hash = bcrypt::hash(&config.seed_admin_password, bcrypt::DEFAULT_COST)?;

    let admin = users
        .create(NewUser {
            full_name: "Super Admin".to_string(),
            username: config.seed_admin_username.clone(),
            password_hash,
            employee_id: "1000".to_string(),
            mobile_no: String::new(),
            role: roles::SUPER_ADMIN.to_string(),
            i_card: None,
            groups: Vec::new(),
            created_by: None,
        })
        .await?;

    log::info!("👤 Seeded super admin account: {}", admin.username);
    Ok(())
}
