//! HTTP inbound adapter exposing the REST API.
//!
//! [`configure`] registers every route on an actix `ServiceConfig`; the
//! server binary and the black-box tests share it so both see one route
//! table.

pub mod auth;
pub mod cookie_config;
pub mod disasters;
pub mod envelope;
pub mod error;
pub mod health;
pub mod json;
mod report_form;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod uploads;
pub mod users;

use actix_web::web;

pub use error::ApiResult;
pub use report_form::MAX_FORM_BYTES;

/// Versioned prefix of the JSON API.
pub const API_PREFIX: &str = "/api/v1";

/// Register the API scope and the photo route.
///
/// Callers supply [`state::HttpState`] (and, for probes,
/// [`health::HealthState`]) as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .service(users::sign_up)
            .service(users::sign_in)
            .service(users::sign_in_anonymous)
            .service(users::sign_out)
            .service(users::get_session)
            .service(disasters::list_disaster_reports)
            .service(disasters::list_disaster_reports_by_reporter)
            .service(disasters::create_disaster_report_json)
            .service(disasters::create_disaster_report)
            .service(disasters::set_responder),
    )
    .service(uploads::get_upload)
    .service(health::ready)
    .service(health::live);
}
