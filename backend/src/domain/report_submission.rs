//! Report submission with attached photos.
//!
//! Photos are uploaded one at a time in submission order. The report is
//! persisted only once every upload succeeded. When an upload or the insert
//! fails, photos already stored for this submission are removed again so a
//! rejected report leaves no orphaned files behind.

use std::sync::Arc;

use tracing::warn;

use super::ports::{
    DisasterReportRepository, DisasterReportRepositoryError, PhotoUploadError, PhotoUploader,
};
use super::{DisasterReport, NewDisasterReport, PhotoUpload};

/// Failure of a report submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportSubmissionError {
    #[error("photo {index} upload failed: {source}")]
    Upload {
        index: usize,
        #[source]
        source: PhotoUploadError,
    },
    #[error("report insert failed: {0}")]
    Persist(#[from] DisasterReportRepositoryError),
}

/// Coordinates photo storage and report persistence.
#[derive(Clone)]
pub struct ReportSubmissionService {
    reports: Arc<dyn DisasterReportRepository>,
    uploader: Arc<dyn PhotoUploader>,
    base_url: String,
}

impl ReportSubmissionService {
    /// `base_url` prefixes every returned photo URL; a trailing `/` is dropped.
    pub fn new(
        reports: Arc<dyn DisasterReportRepository>,
        uploader: Arc<dyn PhotoUploader>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self {
            reports,
            uploader,
            base_url,
        }
    }

    pub async fn submit(
        &self,
        report: NewDisasterReport,
        photos: &[PhotoUpload],
    ) -> Result<DisasterReport, ReportSubmissionError> {
        let mut urls = Vec::with_capacity(photos.len());
        for (index, photo) in photos.iter().enumerate() {
            match self.uploader.upload(photo, &self.base_url).await {
                Ok(url) => urls.push(url),
                Err(source) => {
                    self.discard(&urls).await;
                    return Err(ReportSubmissionError::Upload { index, source });
                }
            }
        }

        let mut report = report;
        report.photo_urls.extend(urls.iter().cloned());
        match self.reports.create(&report).await {
            Ok(created) => Ok(created),
            Err(err) => {
                self.discard(&urls).await;
                Err(err.into())
            }
        }
    }

    async fn discard(&self, urls: &[String]) {
        for url in urls {
            if let Err(err) = self.uploader.remove(url).await {
                warn!(%url, error = %err, "failed to remove photo from abandoned submission");
            }
        }
    }
}
