//! Port for disaster report persistence.

use async_trait::async_trait;

use crate::domain::{
    DisasterReport, NewDisasterReport, ReporterId, ResponderAssignment, SetResponder,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by disaster report repository adapters.
    pub enum DisasterReportRepositoryError {
        /// The reporter has no reports to update.
        NotFound { reporter_id: String } => "no disaster reports for reporter {reporter_id}",
        /// Backing store could not be reached.
        Connection { message: String } => "disaster report repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "disaster report repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DisasterReportRepository: Send + Sync {
    /// Reports filed by one reporter, newest first. Empty when there are none.
    async fn list_by_reporter(
        &self,
        reporter_id: &ReporterId,
    ) -> Result<Vec<DisasterReport>, DisasterReportRepositoryError>;

    /// Every report, newest first.
    async fn list(&self) -> Result<Vec<DisasterReport>, DisasterReportRepositoryError>;

    async fn create(
        &self,
        report: &NewDisasterReport,
    ) -> Result<DisasterReport, DisasterReportRepositoryError>;

    /// Assign a responder to all reports of `assignment.reporter_id`.
    async fn set_responder(
        &self,
        assignment: &SetResponder,
    ) -> Result<ResponderAssignment, DisasterReportRepositoryError>;
}
