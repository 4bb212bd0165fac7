//! Shared HTTP adapter state.
//!
//! Handlers and the authentication gate receive this via `web::Data` so they
//! depend only on domain ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ReportSubmissionService;
use crate::domain::ports::{DisasterReportRepository, PhotoSource, UserRepository};

use super::cookie_config::CookieSettings;

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub reports: Arc<dyn DisasterReportRepository>,
    pub submissions: ReportSubmissionService,
    pub photos: Arc<dyn PhotoSource>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub reports: Arc<dyn DisasterReportRepository>,
    pub submissions: ReportSubmissionService,
    pub photos: Arc<dyn PhotoSource>,
    pub cookies: CookieSettings,
}

impl HttpState {
    pub fn new(ports: HttpStatePorts, cookies: CookieSettings) -> Self {
        let HttpStatePorts {
            users,
            reports,
            submissions,
            photos,
        } = ports;
        Self {
            users,
            reports,
            submissions,
            photos,
            cookies,
        }
    }
}
