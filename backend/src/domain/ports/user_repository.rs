//! Port for account and session persistence.
//!
//! Adapters own password hashing and token issuance; callers only see the
//! validated domain values going in and the typed outcomes coming back.

use async_trait::async_trait;

use crate::domain::{
    AnonymousId, AnonymousSignIn, LoginCredentials, NewUser, SessionToken, SignInOutcome,
    ValidatedSession,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// No account matches the supplied email.
        NotFound => "no user matches the supplied credentials",
        /// The account exists but the password did not verify.
        InvalidPassword => "password verification failed",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "user {email} already exists",
        /// The token is unknown, expired or revoked.
        InvalidSession => "session is invalid or expired",
        /// Backing store could not be reached.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Register a new account.
    async fn sign_up(&self, user: &NewUser) -> Result<(), UserRepositoryError>;

    /// Verify credentials and open a session.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<SignInOutcome, UserRepositoryError>;

    /// Open a session for a caller-chosen anonymous identity.
    async fn sign_in_anonymous(
        &self,
        anonymous_id: &AnonymousId,
    ) -> Result<AnonymousSignIn, UserRepositoryError>;

    /// Revoke the session behind `token`.
    ///
    /// `subject` is the user or anonymous id the client claims the session
    /// belongs to; a mismatch is reported as [`UserRepositoryError::InvalidSession`].
    async fn invalidate_session(
        &self,
        token: &SessionToken,
        subject: &str,
    ) -> Result<(), UserRepositoryError>;

    /// Resolve a token to its live session, renewing it when close to expiry.
    async fn validate_session_token(
        &self,
        token: &SessionToken,
    ) -> Result<ValidatedSession, UserRepositoryError>;
}
