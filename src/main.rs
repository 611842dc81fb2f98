use std::error::Error;

use medscope_api::{
    auth::api_keys::ApiKeyService, config::AppConfig, create_router, db,
    documents::spawn_expired_download_cleanup, AppState,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Medscope API - Starting...");

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    if let Some(key) = &config.bootstrap_api_key {
        if ApiKeyService::new(db_pool.clone()).bootstrap(key).await? {
            tracing::info!("Bootstrap API key registered");
        }
    }

    tokio::fs::create_dir_all(&config.storage_dir).await?;
    spawn_expired_download_cleanup(db_pool.clone(), config.cleanup_interval);

    let addr = config.bind_address();
    let app = create_router(AppState::new(db_pool, config));

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Medscope API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
