//! `DisasterReportRepository` backed by process memory.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{DisasterReportRepository, DisasterReportRepositoryError};
use crate::domain::{
    DisasterReport, NewDisasterReport, ReporterId, ResponderAssignment, SetResponder,
};

use super::lock;

pub struct InMemoryDisasterReportRepository {
    /// Insertion order; lists are served newest first.
    reports: Mutex<Vec<DisasterReport>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryDisasterReportRepository {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
            clock,
        }
    }
}

#[async_trait]
impl DisasterReportRepository for InMemoryDisasterReportRepository {
    async fn list_by_reporter(
        &self,
        reporter_id: &ReporterId,
    ) -> Result<Vec<DisasterReport>, DisasterReportRepositoryError> {
        let reports = lock(&self.reports, DisasterReportRepositoryError::query)?;
        Ok(reports
            .iter()
            .rev()
            .filter(|report| report.reporter_id.as_ref() == Some(reporter_id))
            .cloned()
            .collect())
    }

    async fn list(&self) -> Result<Vec<DisasterReport>, DisasterReportRepositoryError> {
        let reports = lock(&self.reports, DisasterReportRepositoryError::query)?;
        Ok(reports.iter().rev().cloned().collect())
    }

    async fn create(
        &self,
        report: &NewDisasterReport,
    ) -> Result<DisasterReport, DisasterReportRepositoryError> {
        let now = self.clock.utc();
        let created = DisasterReport {
            id: Uuid::new_v4(),
            reporter_id: report.reporter_id.clone(),
            name: report.name.clone(),
            status: report.status,
            raw_situation: report.raw_situation.clone(),
            photo_urls: report.photo_urls.clone(),
            responder_id: None,
            created_at: now,
            updated_at: now,
        };
        lock(&self.reports, DisasterReportRepositoryError::query)?.push(created.clone());
        Ok(created)
    }

    async fn set_responder(
        &self,
        assignment: &SetResponder,
    ) -> Result<ResponderAssignment, DisasterReportRepositoryError> {
        let now = self.clock.utc();
        let mut reports = lock(&self.reports, DisasterReportRepositoryError::query)?;
        let mut updated = 0_u64;
        for report in reports
            .iter_mut()
            .filter(|report| report.reporter_id.as_ref() == Some(&assignment.reporter_id))
        {
            report.responder_id = Some(assignment.responder_id);
            report.updated_at = now;
            updated += 1;
        }
        if updated == 0 {
            return Err(DisasterReportRepositoryError::not_found(
                assignment.reporter_id.as_str(),
            ));
        }
        Ok(ResponderAssignment {
            reporter_id: assignment.reporter_id.clone(),
            responder_id: assignment.responder_id,
            updated_reports: updated,
        })
    }
}
