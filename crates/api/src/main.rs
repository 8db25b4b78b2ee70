//! Synchronization API service
//!
//! Port: 8080 (CINEHUB_SERVICE_PORT, falls back to PORT)

use anyhow::Context;
use cinehub_api::{
    start_server, CollectionRepository, InMemoryCollectionRepository, JwtVerifier,
    PostgresCollectionRepository,
};
use cinehub_core::{
    init_tracing, load_dotenv, AuthConfig, ConfigLoader, DatabaseConfig, DatabasePool,
    ServiceConfig,
};
use std::sync::Arc;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let service = ServiceConfig::from_env()?;
    service.validate()?;
    init_tracing("cinehub_api", &service.log_level, service.log_format)?;

    let auth = AuthConfig::from_env()?;
    auth.validate()?;

    info!("Starting CineHub API");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let repository: Arc<dyn CollectionRepository> = match DatabaseConfig::from_env() {
        Ok(db_config) => {
            db_config.validate()?;
            let pool = DatabasePool::new(&db_config)
                .await
                .context("Failed to connect to database")?;
            pool.migrate().await.context("Failed to run migrations")?;
            Arc::new(PostgresCollectionRepository::new(pool))
        }
        Err(_) => {
            warn!("No database configured, collections are kept in memory only");
            Arc::new(InMemoryCollectionRepository::new())
        }
    };

    start_server(&service, repository, JwtVerifier::from_config(&auth)).await?;

    info!("CineHub API shut down");
    Ok(())
}
