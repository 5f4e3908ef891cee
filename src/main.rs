mod config;
mod controllers;
mod database;
mod dto;
mod ingest;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use config::environment::EnvironmentConfig;
use config::file_store::FileStoreConfig;
use database::connection::{create_pool, mask_database_url};
use middleware::cors_middleware;
use services::file_store::GoogleDriveStore;
use services::seeder::seed_super_admin;
use services::FileStore;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("🚙 Repossession Records API");
    info!("===========================");

    let config = EnvironmentConfig::from_env()?;

    info!(
        "🗄️  Connecting to {}",
        mask_database_url(&config.database_url)
    );
    let pool = match create_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Database connection failed: {}", e);
            return Err(e);
        }
    };

    // Missing file-store credentials degrade the feature instead of
    // blocking startup: uploads then keep no external copy.
    let file_store: Option<Arc<dyn FileStore>> = match FileStoreConfig::from_env() {
        Ok(fs_config) => {
            info!("📁 File store configured for {}", fs_config.client_email);
            Some(Arc::new(GoogleDriveStore::new(fs_config)))
        }
        Err(e) => {
            warn!("📁 File store disabled: {}", e);
            None
        }
    };

    seed_super_admin(&pool, &config).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(pool, config, file_store);

    let app = Router::new()
        .nest("/api", routes::create_api_router(state.clone()))
        .layer(cors_middleware())
        .with_state(state);

    info!("🌐 Listening on http://{}", addr);
    info!("🔍 Endpoints:");
    info!("   POST   /api/auth/login - Panel login");
    info!("   GET    /api/auth/me - Current user");
    info!("   POST   /api/app/login - Mobile app login");
    info!("   POST   /api/users - Create user");
    info!("   GET    /api/users - List users");
    info!("   GET    /api/users/dashboard/summary - Dashboard numbers");
    info!("   POST   /api/vehicles/upload - Spreadsheet upload");
    info!("   POST   /api/vehicles/upload-data - Pre-parsed rows upload");
    info!("   GET    /api/vehicles - List vehicles");
    info!("   GET    /api/vehicles/app - Mobile vehicle listing");
    info!("   GET    /api/vehicles/batches - Upload batches");
    info!("   GET    /api/health - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
