//! In-process repositories used when no database is configured and by the
//! integration test suite.
//!
//! They honour the same contracts as the Diesel adapters: unique emails,
//! hashed passwords, sliding session renewal and newest-first report lists.
//! State is lost on restart.

mod disaster_report_repository;
mod user_repository;

pub use disaster_report_repository::InMemoryDisasterReportRepository;
pub use user_repository::InMemoryUserRepository;

use std::sync::{Mutex, MutexGuard};

/// Lock `mutex`, mapping poisoning into the caller's error type.
fn lock<'a, T, E>(
    mutex: &'a Mutex<T>,
    poisoned: impl FnOnce(&'static str) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    mutex.lock().map_err(|_| poisoned("in-memory state lock poisoned"))
}
