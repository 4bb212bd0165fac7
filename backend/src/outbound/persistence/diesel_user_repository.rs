//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Accounts live in `users`, sessions in `sessions`. Raw session tokens never
//! reach the database; rows are keyed by the token's SHA-256 fingerprint.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    AnonymousId, AnonymousSignIn, Email, LoginCredentials, NewUser, Principal, Role,
    SessionCheck, SessionId, SessionPolicy, SessionToken, SignInOutcome, User, UserId,
    ValidatedSession,
};
use crate::outbound::security::PasswordHashing;

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewSessionRow, NewUserRow, SessionRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{sessions, users};

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
    hashing: PasswordHashing,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool, hashing: PasswordHashing, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            hashing,
            clock,
            policy: SessionPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    async fn connection(
        &self,
    ) -> Result<
        diesel_async::pooled_connection::bb8::PooledConnection<'_, AsyncPgConnection>,
        UserRepositoryError,
    > {
        self.pool.get().await.map_err(pool_error)
    }

    async fn open_session(
        &self,
        conn: &mut AsyncPgConnection,
        principal: &Principal,
    ) -> Result<(SessionToken, chrono::DateTime<chrono::Utc>), UserRepositoryError> {
        let token = SessionToken::generate();
        let session_id = token.session_id();
        let expires_at = self.policy.expiry_from(self.clock.utc());
        let (user_id, anonymous_id) = match principal {
            Principal::User(id) => (Some(*id.as_uuid()), None),
            Principal::Anonymous(id) => (None, Some(id.as_str())),
        };

        diesel::insert_into(sessions::table)
            .values(&NewSessionRow {
                id: session_id.as_str(),
                user_id,
                anonymous_id,
                expires_at,
            })
            .execute(conn)
            .await
            .map_err(diesel_error)?;
        Ok((token, expires_at))
    }

    async fn delete_session(
        conn: &mut AsyncPgConnection,
        session_id: &SessionId,
    ) -> Result<(), UserRepositoryError> {
        diesel::delete(sessions::table.find(session_id.as_str()))
            .execute(conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Convert a database row to a domain `User`; the password hash stays behind.
fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let email = Email::new(&row.email)
        .map_err(|err| UserRepositoryError::query(format!("stored email: {err}")))?;
    let role = row
        .role
        .parse::<Role>()
        .map_err(|err| UserRepositoryError::query(format!("stored role: {err}")))?;
    let status_update_frequency = u32::try_from(row.status_update_frequency)
        .map_err(|_| UserRepositoryError::query("stored status update frequency is negative"))?;
    Ok(User {
        id: UserId::from_uuid(row.id),
        first_name: row.first_name,
        middle_name: row.middle_name,
        last_name: row.last_name,
        email,
        birth_date: row.birth_date,
        role,
        status_update_frequency,
        is_location_shared: row.is_location_shared,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn row_to_principal(row: &SessionRow) -> Result<Principal, UserRepositoryError> {
    match (row.user_id, row.anonymous_id.as_deref()) {
        (Some(id), None) => Ok(Principal::User(UserId::from_uuid(id))),
        (None, Some(anonymous)) => AnonymousId::new(anonymous)
            .map(Principal::Anonymous)
            .map_err(|err| UserRepositoryError::query(format!("stored anonymous id: {err}"))),
        _ => Err(UserRepositoryError::query(
            "session row must name exactly one principal",
        )),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn sign_up(&self, user: &NewUser) -> Result<(), UserRepositoryError> {
        let password_hash = self
            .hashing
            .hash(&user.password)
            .map_err(|err| UserRepositoryError::query(err.to_string()))?;
        let status_update_frequency = i32::try_from(user.status_update_frequency)
            .map_err(|_| UserRepositoryError::query("status update frequency out of range"))?;
        let mut conn = self.connection().await?;

        let row = NewUserRow {
            id: *UserId::random().as_uuid(),
            email: user.email.as_str(),
            password_hash: &password_hash,
            first_name: &user.first_name,
            middle_name: user.middle_name.as_deref(),
            last_name: &user.last_name,
            birth_date: user.birth_date,
            role: user.role.as_str(),
            status_update_frequency,
            is_location_shared: user.is_location_shared,
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserRepositoryError::duplicate_email(user.email.as_str())
                } else {
                    diesel_error(err)
                }
            })
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<SignInOutcome, UserRepositoryError> {
        let mut conn = self.connection().await?;
        let row: UserRow = users::table
            .filter(users::email.eq(credentials.email()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .ok_or_else(UserRepositoryError::not_found)?;

        let verified = self
            .hashing
            .verify(credentials.password(), &row.password_hash)
            .map_err(|err| UserRepositoryError::query(err.to_string()))?;
        if !verified {
            return Err(UserRepositoryError::invalid_password());
        }

        let user = row_to_user(row)?;
        let (token, _) = self
            .open_session(&mut conn, &Principal::User(user.id))
            .await?;
        Ok(SignInOutcome { user, token })
    }

    async fn sign_in_anonymous(
        &self,
        anonymous_id: &AnonymousId,
    ) -> Result<AnonymousSignIn, UserRepositoryError> {
        let mut conn = self.connection().await?;
        let principal = Principal::Anonymous(anonymous_id.clone());
        let (token, expires_at) = self.open_session(&mut conn, &principal).await?;
        Ok(AnonymousSignIn {
            anonymous_id: anonymous_id.clone(),
            token,
            expires_at,
        })
    }

    async fn invalidate_session(
        &self,
        token: &SessionToken,
        subject: &str,
    ) -> Result<(), UserRepositoryError> {
        let session_id = token.session_id();
        let mut conn = self.connection().await?;
        let row: Option<SessionRow> = sessions::table
            .find(session_id.as_str())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        let Some(row) = row else {
            debug!("sign-out for unknown session ignored");
            return Ok(());
        };
        if row_to_principal(&row)?.subject() != subject.trim() {
            return Err(UserRepositoryError::invalid_session());
        }
        Self::delete_session(&mut conn, &session_id).await
    }

    async fn validate_session_token(
        &self,
        token: &SessionToken,
    ) -> Result<ValidatedSession, UserRepositoryError> {
        let session_id = token.session_id();
        let mut conn = self.connection().await?;
        let row: SessionRow = sessions::table
            .find(session_id.as_str())
            .select(SessionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .ok_or_else(UserRepositoryError::invalid_session)?;

        let expires_at = match self.policy.check(row.expires_at, self.clock.utc()) {
            SessionCheck::Expired => {
                Self::delete_session(&mut conn, &session_id).await?;
                return Err(UserRepositoryError::invalid_session());
            }
            SessionCheck::Valid => row.expires_at,
            SessionCheck::Renew { expires_at } => {
                diesel::update(sessions::table.find(session_id.as_str()))
                    .set(sessions::expires_at.eq(expires_at))
                    .execute(&mut conn)
                    .await
                    .map_err(diesel_error)?;
                expires_at
            }
        };

        let principal = row_to_principal(&row)?;
        let user = match &principal {
            Principal::User(id) => {
                let user_row: UserRow = users::table
                    .find(*id.as_uuid())
                    .select(UserRow::as_select())
                    .first(&mut conn)
                    .await
                    .optional()
                    .map_err(diesel_error)?
                    .ok_or_else(UserRepositoryError::invalid_session)?;
                Some(row_to_user(user_row)?)
            }
            Principal::Anonymous(_) => None,
        };

        Ok(ValidatedSession {
            principal,
            expires_at,
            user,
        })
    }
}
