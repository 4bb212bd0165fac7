//! Disaster reports filed by citizens and the responder assignment applied
//! to them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Maximum length of a reporter identifier.
pub const REPORTER_ID_MAX: usize = 64;
/// Maximum length of a report name.
pub const REPORT_NAME_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportValidationError {
    EmptyReporterId,
    ReporterIdTooLong { max: usize },
    EmptyName,
    NameTooLong { max: usize },
    UnknownStatus { value: String },
}

impl ReportValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyReporterId | Self::ReporterIdTooLong { .. } => "reporterId",
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::UnknownStatus { .. } => "status",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyReporterId | Self::EmptyName => "empty",
            Self::ReporterIdTooLong { .. } | Self::NameTooLong { .. } => "too_long",
            Self::UnknownStatus { .. } => "unknown_value",
        }
    }
}

impl fmt::Display for ReportValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReporterId => write!(f, "reporter id must not be empty"),
            Self::ReporterIdTooLong { max } => {
                write!(f, "reporter id must be at most {max} characters")
            }
            Self::EmptyName => write!(f, "report name must not be empty"),
            Self::NameTooLong { max } => write!(f, "report name must be at most {max} characters"),
            Self::UnknownStatus { value } => write!(f, "unknown citizen status `{value}`"),
        }
    }
}

impl std::error::Error for ReportValidationError {}

/// Identifier of whoever filed a report: a user id or an anonymous id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReporterId(String);

impl ReporterId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ReportValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ReportValidationError::EmptyReporterId);
        }
        if trimmed.chars().count() > REPORTER_ID_MAX {
            return Err(ReportValidationError::ReporterIdTooLong {
                max: REPORTER_ID_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Blank input means "no reporter" rather than an empty identity.
    pub fn optional(raw: Option<&str>) -> Result<Option<Self>, ReportValidationError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::new(value).map(Some),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ReporterId> for String {
    fn from(value: ReporterId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReporterId {
    type Error = ReportValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Condition a citizen reports for themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenStatus {
    Safe,
    AtRisk,
    InDanger,
    Injured,
    Missing,
}

impl CitizenStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::AtRisk => "at_risk",
            Self::InDanger => "in_danger",
            Self::Injured => "injured",
            Self::Missing => "missing",
        }
    }
}

impl fmt::Display for CitizenStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CitizenStatus {
    type Err = ReportValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(Self::Safe),
            "at_risk" => Ok(Self::AtRisk),
            "in_danger" => Ok(Self::InDanger),
            "injured" => Ok(Self::Injured),
            "missing" => Ok(Self::Missing),
            other => Err(ReportValidationError::UnknownStatus {
                value: other.to_owned(),
            }),
        }
    }
}

/// Stored report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterReport {
    pub id: Uuid,
    pub reporter_id: Option<ReporterId>,
    pub name: String,
    pub status: CitizenStatus,
    pub raw_situation: String,
    pub photo_urls: Vec<String>,
    pub responder_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated report submission.
///
/// ## Invariants
/// - `name` is trimmed, non-empty and at most [`REPORT_NAME_MAX`] characters.
/// - `photo_urls` keeps submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDisasterReport {
    pub reporter_id: Option<ReporterId>,
    pub name: String,
    pub status: CitizenStatus,
    pub raw_situation: String,
    pub photo_urls: Vec<String>,
}

impl NewDisasterReport {
    pub fn try_new(
        reporter_id: Option<ReporterId>,
        name: &str,
        status: CitizenStatus,
        raw_situation: impl Into<String>,
    ) -> Result<Self, ReportValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReportValidationError::EmptyName);
        }
        if name.chars().count() > REPORT_NAME_MAX {
            return Err(ReportValidationError::NameTooLong {
                max: REPORT_NAME_MAX,
            });
        }
        Ok(Self {
            reporter_id,
            name: name.to_owned(),
            status,
            raw_situation: raw_situation.into(),
            photo_urls: Vec::new(),
        })
    }

    pub fn with_photo_urls(mut self, photo_urls: Vec<String>) -> Self {
        self.photo_urls = photo_urls;
        self
    }
}

/// Request to assign a responder to every report of one reporter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResponder {
    pub reporter_id: ReporterId,
    pub responder_id: UserId,
}

/// Result of a responder assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponderAssignment {
    pub reporter_id: ReporterId,
    pub responder_id: UserId,
    pub updated_reports: u64,
}
