//! Account and session handlers.
//!
//! ```text
//! POST /api/v1/auth/sign-up            {"email": ..., "password": ..., ...}
//! POST /api/v1/auth/sign-in            {"email": ..., "password": ...}
//! POST /api/v1/auth/sign-in/anonymous  {"anonymousId": ...}
//! POST /api/v1/auth/sign-out           {"id": ..., "token": ...}
//! GET  /api/v1/auth/session?token=...
//! ```
//!
//! Bodies are decoded from raw bytes so a malformed payload is answered with
//! the operation's own message and never reaches the repository.

use actix_web::{HttpRequest, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::UserRepositoryError;
use crate::domain::{
    AnonymousId, AnonymousSignIn, Error, LoginCredentials, NewUser, Role, SessionToken,
    SignInOutcome, SignUpParts, ValidatedSession,
};

use super::ApiResult;
use super::envelope::ApiResponse;
use super::json::{decode_json, invalid_field};
use super::schemas::ErrorSchema;
use super::state::HttpState;

/// Sign-up request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[schema(value_type = String, format = DateTime, example = "1990-04-01T00:00:00Z")]
    pub birth_date: DateTime<Utc>,
    #[schema(value_type = crate::inbound::http::schemas::RoleSchema)]
    pub role: Role,
    #[serde(default)]
    pub status_update_frequency: u32,
    #[serde(default)]
    pub is_location_shared: bool,
}

/// Sign-in request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Anonymous sign-in request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInAnonymousRequest {
    pub anonymous_id: String,
}

/// Sign-out request body. `id` is the user or anonymous id owning `token`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignOutRequest {
    pub id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct SessionQuery {
    #[serde(default)]
    token: String,
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = crate::inbound::http::schemas::MessageEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signUp",
    security([])
)]
#[post("/auth/sign-up")]
pub async fn sign_up(state: web::Data<HttpState>, body: web::Bytes) -> ApiResult<ApiResponse> {
    const OP: &str = "sign up";
    const INVALID: &str = "Invalid sign up request.";

    let request: SignUpRequest = decode_json(&body, OP, INVALID)?;
    let user = NewUser::try_from_parts(SignUpParts {
        email: &request.email,
        password: &request.password,
        first_name: &request.first_name,
        middle_name: request.middle_name.as_deref(),
        last_name: &request.last_name,
        birth_date: request.birth_date,
        role: request.role,
        status_update_frequency: request.status_update_frequency,
        is_location_shared: request.is_location_shared,
    })
    .map_err(|err| invalid_field(INVALID, OP, &err))?;

    state.users.sign_up(&user).await.map_err(|err| match err {
        UserRepositoryError::DuplicateEmail { ref email } => {
            Error::conflict(format!("User {email} already exists.")).with_context(OP, &err)
        }
        other => Error::internal("Failed to sign up.").with_context(OP, other),
    })?;

    Ok(ApiResponse::created("Successfully signed up."))
}

/// Verify credentials and open a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = crate::inbound::http::schemas::SignInEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Wrong password", body = ErrorSchema),
        (status = 404, description = "Unknown email", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signIn",
    security([])
)]
#[post("/auth/sign-in")]
pub async fn sign_in(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<ApiResponse<SignInOutcome>> {
    const OP: &str = "sign in";
    const INVALID: &str = "Invalid sign in request.";

    let request: SignInRequest = decode_json(&body, OP, INVALID)?;
    let credentials = LoginCredentials::try_from_parts(&request.email, &request.password)
        .map_err(|err| invalid_field(INVALID, OP, &err))?;

    let outcome = state
        .users
        .sign_in(&credentials)
        .await
        .map_err(|err| match err {
            UserRepositoryError::NotFound => {
                Error::not_found("Invalid credentials.").with_context(OP, err)
            }
            UserRepositoryError::InvalidPassword => {
                Error::unauthorized("Invalid password.").with_context(OP, err)
            }
            other => Error::internal("Failed to sign in.").with_context(OP, other),
        })?;

    let cookie = state.cookies.issue(&outcome.token);
    Ok(ApiResponse::ok("Successfully signed in.", outcome).with_cookie(cookie))
}

/// Open a session for a caller-chosen anonymous id. No secret is checked.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-in/anonymous",
    request_body = SignInAnonymousRequest,
    responses(
        (status = 200, description = "Signed in anonymously", body = crate::inbound::http::schemas::AnonymousSignInEnvelope,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signInAnonymous",
    security([])
)]
#[post("/auth/sign-in/anonymous")]
pub async fn sign_in_anonymous(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<ApiResponse<AnonymousSignIn>> {
    const OP: &str = "sign in anonymous";
    const INVALID: &str = "Invalid anonymous sign in request.";

    let request: SignInAnonymousRequest = decode_json(&body, OP, INVALID)?;
    let anonymous_id =
        AnonymousId::new(&request.anonymous_id).map_err(|err| invalid_field(INVALID, OP, &err))?;

    let signed_in = state
        .users
        .sign_in_anonymous(&anonymous_id)
        .await
        .map_err(|err| Error::internal("Failed to sign in as anonymous.").with_context(OP, err))?;

    let cookie = state.cookies.issue(&signed_in.token);
    Ok(ApiResponse::ok("Successfully signed in as anonymous.", signed_in).with_cookie(cookie))
}

/// Revoke a session.
///
/// Tokens that are unknown or not shaped like a session token are ignored.
#[utoipa::path(
    post,
    path = "/api/v1/auth/sign-out",
    request_body = SignOutRequest,
    responses(
        (status = 200, description = "Signed out", body = crate::inbound::http::schemas::MessageEnvelope),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "signOut",
    security([])
)]
#[post("/auth/sign-out")]
pub async fn sign_out(state: web::Data<HttpState>, body: web::Bytes) -> ApiResult<ApiResponse> {
    const OP: &str = "sign out";
    const INVALID: &str = "Invalid sign out request.";

    let request: SignOutRequest = decode_json(&body, OP, INVALID)?;
    match SessionToken::parse(&request.token) {
        Ok(token) => state
            .users
            .invalidate_session(&token, request.id.trim())
            .await
            .map_err(|err| Error::internal("Failed to sign out.").with_context(OP, err))?,
        Err(err) => debug!(error = %err, "ignoring malformed sign-out token"),
    }

    Ok(ApiResponse::ok_empty("Successfully signed out.").with_cookie(state.cookies.clear()))
}

/// Resolve a session token to its principal.
///
/// Unknown, revoked or expired tokens answer `401`; storage failures `500`.
#[utoipa::path(
    get,
    path = "/api/v1/auth/session",
    params(("token" = String, Query, description = "Session token")),
    responses(
        (status = 200, description = "Session details", body = crate::inbound::http::schemas::SessionEnvelope),
        (status = 401, description = "Invalid or expired session", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "getSession",
    security([])
)]
#[get("/auth/session")]
pub async fn get_session(
    state: web::Data<HttpState>,
    req: HttpRequest,
) -> ApiResult<ApiResponse<ValidatedSession>> {
    const OP: &str = "get session";
    const INVALID: &str = "Invalid or expired session.";

    let query = web::Query::<SessionQuery>::from_query(req.query_string())
        .map_err(|err| Error::unauthorized(INVALID).with_context(OP, err))?;
    let token = SessionToken::parse(query.token.trim())
        .map_err(|err| Error::unauthorized(INVALID).with_context(OP, err))?;

    let session = state
        .users
        .validate_session_token(&token)
        .await
        .map_err(|err| match err {
            UserRepositoryError::InvalidSession => {
                Error::unauthorized(INVALID).with_context(OP, err)
            }
            other => Error::internal("Failed to get user session.").with_context(OP, other),
        })?;

    Ok(ApiResponse::ok("Successfully fetched user session.", session))
}

#[cfg(test)]
mod tests;
