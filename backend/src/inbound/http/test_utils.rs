//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::web;
use chrono::{TimeZone, Utc};

use crate::domain::ports::{
    MockDisasterReportRepository, MockPhotoSource, MockPhotoUploader, MockUserRepository,
};
use crate::domain::{
    Email, Principal, ReportSubmissionService, Role, SessionPolicy, User, UserId,
    ValidatedSession,
};

use super::cookie_config::CookieSettings;
use super::state::{HttpState, HttpStatePorts};

pub(crate) const BASE_URL: &str = "http://resqlink.test";
pub(crate) const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

/// Mocks backing an [`HttpState`]; unset expectations fail loudly if hit.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub users: MockUserRepository,
    pub reports: MockDisasterReportRepository,
    pub uploader: MockPhotoUploader,
    pub photos: MockPhotoSource,
}

impl MockPorts {
    pub(crate) fn into_state(self) -> web::Data<HttpState> {
        let reports = Arc::new(self.reports);
        let submissions =
            ReportSubmissionService::new(reports.clone(), Arc::new(self.uploader), BASE_URL);
        let ports = HttpStatePorts {
            users: Arc::new(self.users),
            reports,
            submissions,
            photos: Arc::new(self.photos),
        };
        let cookies = CookieSettings {
            secure: false,
            ..CookieSettings::default()
        };
        web::Data::new(HttpState::new(ports, cookies))
    }
}

pub(crate) fn sample_user() -> User {
    let at = Utc
        .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
        .single()
        .expect("valid timestamp");
    User {
        id: UserId::new(USER_ID).expect("fixture id"),
        first_name: "Ada".to_owned(),
        middle_name: None,
        last_name: "Lovelace".to_owned(),
        email: Email::new("ada@example.com").expect("fixture email"),
        birth_date: at,
        role: Role::Citizen,
        status_update_frequency: 15,
        is_location_shared: true,
        created_at: at,
        updated_at: at,
    }
}

pub(crate) fn sample_session() -> ValidatedSession {
    let user = sample_user();
    ValidatedSession {
        principal: Principal::User(user.id),
        expires_at: SessionPolicy::default().expiry_from(user.created_at),
        user: Some(user),
    }
}
