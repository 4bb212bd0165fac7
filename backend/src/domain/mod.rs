//! Domain primitives, aggregates and services.
//!
//! Types here are transport agnostic. Serde attributes describe the JSON
//! shape clients see; validation lives in the fallible constructors.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: error payload shared by every adapter.
//! - `TraceId`: per-request correlation id.
//! - Accounts (`User`, `NewUser`, `LoginCredentials`, `AnonymousId`) and
//!   sessions (`SessionToken`, `Principal`, `ValidatedSession`).
//! - Disaster reports (`DisasterReport`, `NewDisasterReport`, `SetResponder`)
//!   and the `ReportSubmissionService` that stores their photos.

pub mod auth;
pub mod disaster;
pub mod error;
pub mod photo;
pub mod ports;
pub mod report_submission;
pub mod session;
pub mod trace_id;
pub mod user;

pub use self::auth::{ANONYMOUS_ID_MAX, AnonymousId, LoginCredentials, LoginValidationError};
pub use self::disaster::{
    CitizenStatus, DisasterReport, NewDisasterReport, REPORT_NAME_MAX, REPORTER_ID_MAX,
    ReportValidationError, ReporterId, ResponderAssignment, SetResponder,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::photo::{PhotoUpload, StoredPhoto};
pub use self::report_submission::{ReportSubmissionError, ReportSubmissionService};
pub use self::session::{
    AnonymousSignIn, MalformedSessionToken, Principal, SESSION_COOKIE_NAME, SessionCheck,
    SessionId, SessionPolicy, SessionToken, SignInOutcome, ValidatedSession,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, Email, NAME_MAX, NewUser, Password, Role, SignUpParts, User, UserId,
    UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use resqlink::domain::{ApiResult, Error};
///
/// fn guarded() -> ApiResult<()> {
///     Err(Error::unauthorized("Unauthorized"))
/// }
/// assert!(guarded().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
