//! Environment configuration
//!
//! This module loads runtime configuration from environment variables.

use std::env;

use crate::ingest::IngestConfig;

/// Environment configuration
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub upload_dir: String,
    pub seed_admin_username: String,
    pub seed_admin_password: String,
    pub ingest: IngestConfig,
}

impl EnvironmentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()?;

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        // 24 hours unless overridden
        let jwt_expiration = env::var("JWT_EXPIRATION")
            .unwrap_or_else(|_| "86400".to_string())
            .parse()?;

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());

        let seed_admin_username =
            env::var("SEED_ADMIN_USERNAME").unwrap_or_else(|_| "superadmin".to_string());
        let seed_admin_password =
            env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "changeme123".to_string());

        let mut ingest = IngestConfig::default();
        if let Ok(size) = env::var("INSERT_BATCH_SIZE") {
            ingest.insert_batch_size = size.parse()?;
        }
        if let Ok(max) = env::var("MAX_RECORDS_PER_REQUEST") {
            ingest.max_records = max.parse()?;
        }
        if let Ok(window) = env::var("BATCH_MATCH_WINDOW_SECS") {
            ingest.batch_match_window = chrono::Duration::seconds(window.parse()?);
        }

        Ok(Self {
            port,
            host,
            database_url,
            jwt_secret,
            jwt_expiration,
            upload_dir,
            seed_admin_username,
            seed_admin_password,
            ingest,
        })
    }
}
