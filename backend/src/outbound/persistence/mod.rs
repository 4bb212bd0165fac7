//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows (`models.rs`, `schema.rs`) and
//! domain types; neither rows nor Diesel errors escape this module. Queries
//! run on `diesel-async` connections checked out of a `bb8` pool.
//!
//! ```ignore
//! use resqlink::outbound::persistence::{DbPool, DieselDisasterReportRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/resqlink")).await?;
//! let reports = DieselDisasterReportRepository::new(pool);
//! ```

mod diesel_disaster_report_repository;
mod diesel_user_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_disaster_report_repository::DieselDisasterReportRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
