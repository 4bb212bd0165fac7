//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The `*Envelope` types document the `{ message, data }` success body for
//! each operation; they are never constructed.

#![expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing service is temporarily unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Invalid sign up request.")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "4f5c2b8e-0f0e-4c53-9d7a-8a1d6d5c3b21")]
    trace_id: Option<String>,
    /// Supplementary details, e.g. `{ "field": "email", "code": "empty" }`.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Role`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Role)]
pub enum RoleSchema {
    #[schema(rename = "citizen")]
    Citizen,
    #[schema(rename = "responder")]
    Responder,
}

/// OpenAPI schema for [`crate::domain::CitizenStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CitizenStatus)]
pub enum CitizenStatusSchema {
    #[schema(rename = "safe")]
    Safe,
    #[schema(rename = "at_risk")]
    AtRisk,
    #[schema(rename = "in_danger")]
    InDanger,
    #[schema(rename = "injured")]
    Injured,
    #[schema(rename = "missing")]
    Missing,
}

/// OpenAPI schema for [`crate::domain::User`]. Credentials are never exposed.
#[derive(ToSchema)]
#[schema(as = crate::domain::User, rename_all = "camelCase")]
pub struct UserSchema {
    #[schema(format = Uuid, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "Ada")]
    first_name: String,
    middle_name: Option<String>,
    #[schema(example = "Lovelace")]
    last_name: String,
    #[schema(example = "ada@example.com")]
    email: String,
    #[schema(format = DateTime)]
    birth_date: String,
    role: RoleSchema,
    /// Minutes between expected status updates.
    #[schema(example = 15)]
    status_update_frequency: u32,
    is_location_shared: bool,
    #[schema(format = DateTime)]
    created_at: String,
    #[schema(format = DateTime)]
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::DisasterReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DisasterReport, rename_all = "camelCase")]
pub struct DisasterReportSchema {
    #[schema(format = Uuid)]
    id: String,
    /// Absent for anonymous reports.
    reporter_id: Option<String>,
    #[schema(example = "Flooded basement")]
    name: String,
    status: CitizenStatusSchema,
    raw_situation: String,
    /// Public URLs, in submission order.
    photo_urls: Vec<String>,
    #[schema(format = Uuid)]
    responder_id: Option<String>,
    #[schema(format = DateTime)]
    created_at: String,
    #[schema(format = DateTime)]
    updated_at: String,
}

/// Discriminator of [`PrincipalSchema`].
#[derive(ToSchema)]
pub enum PrincipalKindSchema {
    #[schema(rename = "user")]
    User,
    #[schema(rename = "anonymous")]
    Anonymous,
}

/// OpenAPI schema for [`crate::domain::Principal`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Principal)]
pub struct PrincipalSchema {
    kind: PrincipalKindSchema,
    /// User id or anonymous id, per `kind`.
    id: String,
}

/// OpenAPI schema for [`crate::domain::ValidatedSession`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ValidatedSession, rename_all = "camelCase")]
pub struct ValidatedSessionSchema {
    principal: PrincipalSchema,
    #[schema(format = DateTime)]
    expires_at: String,
    /// Present for user sessions only.
    user: Option<UserSchema>,
}

/// OpenAPI schema for [`crate::domain::SignInOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SignInOutcome)]
pub struct SignInOutcomeSchema {
    user: UserSchema,
    /// Opaque session token, also set as the `session` cookie.
    token: String,
}

/// OpenAPI schema for [`crate::domain::AnonymousSignIn`].
#[derive(ToSchema)]
#[schema(as = crate::domain::AnonymousSignIn, rename_all = "camelCase")]
pub struct AnonymousSignInSchema {
    anonymous_id: String,
    token: String,
    #[schema(format = DateTime)]
    expires_at: String,
}

/// OpenAPI schema for [`crate::domain::ResponderAssignment`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ResponderAssignment, rename_all = "camelCase")]
pub struct ResponderAssignmentSchema {
    reporter_id: String,
    #[schema(format = Uuid)]
    responder_id: String,
    /// Number of reports now pointing at the responder.
    updated_reports: u64,
}

/// Success body without data.
#[derive(ToSchema)]
pub struct MessageEnvelope {
    #[schema(example = "Successfully signed up.")]
    message: String,
}

#[derive(ToSchema)]
pub struct SignInEnvelope {
    message: String,
    data: SignInOutcomeSchema,
}

#[derive(ToSchema)]
pub struct AnonymousSignInEnvelope {
    message: String,
    data: AnonymousSignInSchema,
}

#[derive(ToSchema)]
pub struct SessionEnvelope {
    message: String,
    data: ValidatedSessionSchema,
}

#[derive(ToSchema)]
pub struct ReportListEnvelope {
    message: String,
    data: Vec<DisasterReportSchema>,
}

#[derive(ToSchema)]
pub struct ReportEnvelope {
    message: String,
    data: DisasterReportSchema,
}

#[derive(ToSchema)]
pub struct ResponderAssignmentEnvelope {
    message: String,
    data: ResponderAssignmentSchema,
}
