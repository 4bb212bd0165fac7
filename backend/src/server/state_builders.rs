//! Builders for HTTP state ports.
//!
//! A configured `DATABASE_URL` selects the Diesel repositories (after
//! applying pending migrations); otherwise the in-memory repositories are
//! used and nothing survives a restart.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use resqlink::domain::ReportSubmissionService;
use resqlink::domain::ports::{DisasterReportRepository, UserRepository};
use resqlink::inbound::http::state::{HttpState, HttpStatePorts};
use resqlink::outbound::memory::{InMemoryDisasterReportRepository, InMemoryUserRepository};
use resqlink::outbound::persistence::{
    DbPool, DieselDisasterReportRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use resqlink::outbound::security::PasswordHashing;
use resqlink::outbound::storage::LocalPhotoStore;

use super::ServerConfig;

type Repositories = (Arc<dyn UserRepository>, Arc<dyn DisasterReportRepository>);

async fn build_repositories(config: &ServerConfig) -> io::Result<Repositories> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let hashing = PasswordHashing::default();

    let Some(database_url) = config.database_url.as_deref() else {
        warn!("DATABASE_URL not set; using in-memory repositories");
        return Ok((
            Arc::new(InMemoryUserRepository::new(hashing, clock.clone())),
            Arc::new(InMemoryDisasterReportRepository::new(clock)),
        ));
    };

    run_pending_migrations(database_url)
        .await
        .map_err(|err| io::Error::other(format!("database migration failed: {err}")))?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(|err| io::Error::other(format!("database pool setup failed: {err}")))?;
    info!("database migrations applied; using PostgreSQL repositories");

    Ok((
        Arc::new(DieselUserRepository::new(pool.clone(), hashing, clock)),
        Arc::new(DieselDisasterReportRepository::new(pool)),
    ))
}

/// Assemble the shared handler state from configuration.
///
/// # Errors
/// Fails when migrations cannot be applied, the pool cannot be built or the
/// upload directory cannot be opened.
pub(super) async fn build_http_state(config: &ServerConfig) -> io::Result<web::Data<HttpState>> {
    let (users, reports) = build_repositories(config).await?;
    let photos = Arc::new(LocalPhotoStore::open(&config.upload_dir).map_err(|err| {
        io::Error::other(format!(
            "failed to open upload directory {}: {err}",
            config.upload_dir.display()
        ))
    })?);
    let submissions =
        ReportSubmissionService::new(reports.clone(), photos.clone(), &config.public_base_url);

    let ports = HttpStatePorts {
        users,
        reports,
        submissions,
        photos,
    };
    Ok(web::Data::new(HttpState::new(ports, config.cookies)))
}
