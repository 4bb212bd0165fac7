//! Driven ports for the hexagonal boundary.
//!
//! Each port owns a typed error enum so inbound adapters map failures by
//! variant and never see storage-specific error shapes.

mod macros;
pub(crate) use macros::define_port_error;

mod disaster_report_repository;
mod photo_store;
mod user_repository;

#[cfg(test)]
pub use disaster_report_repository::MockDisasterReportRepository;
pub use disaster_report_repository::{DisasterReportRepository, DisasterReportRepositoryError};
#[cfg(test)]
pub use photo_store::{MockPhotoSource, MockPhotoUploader};
pub use photo_store::{PhotoSource, PhotoUploadError, PhotoUploader};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
