//! Builders for the user directory and its backing store.

use std::io;
use std::sync::Arc;

use mockable::DefaultClock;
use tracing::{info, warn};

use apid::domain::UserDirectoryService;
use apid::domain::ports::UserDirectory;
use apid::outbound::memory::InMemoryUserRepository;
use apid::outbound::persistence::{DbPool, DieselUserRepository, run_migrations};
use apid::settings::ServiceSettings;

/// Wire the user directory against PostgreSQL when a database URL is
/// configured, otherwise against the process-local store.
///
/// # Errors
/// Returns [`io::Error`] when migrations fail or the pool cannot be built.
pub async fn build_user_directory(settings: &ServiceSettings) -> io::Result<Arc<dyn UserDirectory>> {
    let clock = Arc::new(DefaultClock);
    let Some(pool_config) = settings.pool_config() else {
        warn!("APID_DATABASE_URL not set; users are kept in memory and lost on restart");
        return Ok(Arc::new(UserDirectoryService::new(
            Arc::new(InMemoryUserRepository::new()),
            clock,
        )));
    };

    run_migrations(pool_config.database_url())
        .await
        .map_err(io::Error::other)?;
    info!(
        max_size = pool_config.max_size(),
        "migrations applied; opening connection pool"
    );
    let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
    Ok(Arc::new(UserDirectoryService::new(
        Arc::new(DieselUserRepository::new(pool)),
        clock,
    )))
}
