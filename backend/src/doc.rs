//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every HTTP endpoint from the inbound layer (auth, disaster
//!   reports, uploads, health)
//! - **Schemas**: domain type wrappers from
//!   [`crate::inbound::http::schemas`] plus the request bodies declared next
//!   to their handlers
//! - **Security**: session cookie authentication scheme
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::disasters::{CreateReportForm, CreateReportRequest, SetResponderRequest};
use crate::inbound::http::schemas::{
    AnonymousSignInEnvelope, AnonymousSignInSchema, CitizenStatusSchema, DisasterReportSchema,
    ErrorCodeSchema, ErrorSchema, MessageEnvelope, PrincipalKindSchema, PrincipalSchema,
    ReportEnvelope, ReportListEnvelope, ResponderAssignmentEnvelope, ResponderAssignmentSchema,
    RoleSchema, SessionEnvelope, SignInEnvelope, SignInOutcomeSchema, UserSchema,
    ValidatedSessionSchema,
};
use crate::inbound::http::users::{
    SignInAnonymousRequest, SignInRequest, SignOutRequest, SignUpRequest,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                crate::domain::SESSION_COOKIE_NAME,
                "Session cookie issued by POST /api/v1/auth/sign-in.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "ResQLink backend API",
        description = "Accounts, sessions and disaster reports for emergency coordination.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::sign_up,
        crate::inbound::http::users::sign_in,
        crate::inbound::http::users::sign_in_anonymous,
        crate::inbound::http::users::sign_out,
        crate::inbound::http::users::get_session,
        crate::inbound::http::disasters::list_disaster_reports,
        crate::inbound::http::disasters::list_disaster_reports_by_reporter,
        crate::inbound::http::disasters::create_disaster_report_json,
        crate::inbound::http::disasters::create_disaster_report,
        crate::inbound::http::disasters::set_responder,
        crate::inbound::http::uploads::get_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        UserSchema,
        RoleSchema,
        CitizenStatusSchema,
        DisasterReportSchema,
        PrincipalKindSchema,
        PrincipalSchema,
        ValidatedSessionSchema,
        SignInOutcomeSchema,
        AnonymousSignInSchema,
        ResponderAssignmentSchema,
        MessageEnvelope,
        SignInEnvelope,
        AnonymousSignInEnvelope,
        SessionEnvelope,
        ReportListEnvelope,
        ReportEnvelope,
        ResponderAssignmentEnvelope,
        SignUpRequest,
        SignInRequest,
        SignInAnonymousRequest,
        SignOutRequest,
        CreateReportRequest,
        CreateReportForm,
        SetResponderRequest,
    )),
    tags(
        (name = "auth", description = "Sign-up, sign-in and session lookup"),
        (name = "disaster-reports", description = "Reports filed by citizens and their responders"),
        (name = "uploads", description = "Photos attached to disaster reports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
