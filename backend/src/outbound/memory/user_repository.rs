//! `UserRepository` backed by process memory.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{
    AnonymousId, AnonymousSignIn, LoginCredentials, NewUser, Principal, SessionCheck,
    SessionPolicy, SessionToken, SignInOutcome, User, UserId, ValidatedSession,
};
use crate::outbound::security::PasswordHashing;

use super::lock;

struct StoredUser {
    user: User,
    password_hash: String,
}

struct StoredSession {
    principal: Principal,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    users: HashMap<UserId, StoredUser>,
    ids_by_email: HashMap<String, UserId>,
    /// Keyed by session id, never by raw token.
    sessions: HashMap<String, StoredSession>,
}

pub struct InMemoryUserRepository {
    state: Mutex<State>,
    hashing: PasswordHashing,
    clock: Arc<dyn Clock>,
    policy: SessionPolicy,
}

impl InMemoryUserRepository {
    pub fn new(hashing: PasswordHashing, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
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

    fn open_session(
        &self,
        state: &mut State,
        principal: Principal,
    ) -> (SessionToken, DateTime<Utc>) {
        let token = SessionToken::generate();
        let expires_at = self.policy.expiry_from(self.clock.utc());
        state.sessions.insert(
            token.session_id().as_str().to_owned(),
            StoredSession {
                principal,
                expires_at,
            },
        );
        (token, expires_at)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn sign_up(&self, user: &NewUser) -> Result<(), UserRepositoryError> {
        let password_hash = self
            .hashing
            .hash(&user.password)
            .map_err(|err| UserRepositoryError::query(err.to_string()))?;
        let now = self.clock.utc();

        let mut state = lock(&self.state, UserRepositoryError::query)?;
        let email = user.email.as_str().to_owned();
        if state.ids_by_email.contains_key(&email) {
            return Err(UserRepositoryError::duplicate_email(email));
        }

        let id = UserId::random();
        let stored = User {
            id,
            first_name: user.first_name.clone(),
            middle_name: user.middle_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            birth_date: user.birth_date,
            role: user.role,
            status_update_frequency: user.status_update_frequency,
            is_location_shared: user.is_location_shared,
            created_at: now,
            updated_at: now,
        };
        state.ids_by_email.insert(email, id);
        state.users.insert(
            id,
            StoredUser {
                user: stored,
                password_hash,
            },
        );
        Ok(())
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<SignInOutcome, UserRepositoryError> {
        let (user, password_hash) = {
            let state = lock(&self.state, UserRepositoryError::query)?;
            let stored = state
                .ids_by_email
                .get(credentials.email())
                .and_then(|id| state.users.get(id))
                .ok_or_else(UserRepositoryError::not_found)?;
            (stored.user.clone(), stored.password_hash.clone())
        };

        let verified = self
            .hashing
            .verify(credentials.password(), &password_hash)
            .map_err(|err| UserRepositoryError::query(err.to_string()))?;
        if !verified {
            return Err(UserRepositoryError::invalid_password());
        }

        let mut state = lock(&self.state, UserRepositoryError::query)?;
        let (token, _) = self.open_session(&mut state, Principal::User(user.id));
        Ok(SignInOutcome { user, token })
    }

    async fn sign_in_anonymous(
        &self,
        anonymous_id: &AnonymousId,
    ) -> Result<AnonymousSignIn, UserRepositoryError> {
        let mut state = lock(&self.state, UserRepositoryError::query)?;
        let (token, expires_at) =
            self.open_session(&mut state, Principal::Anonymous(anonymous_id.clone()));
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
        let mut state = lock(&self.state, UserRepositoryError::query)?;
        let key = token.session_id();
        match state.sessions.get(key.as_str()) {
            None => Ok(()),
            Some(session) if session.principal.subject() != subject.trim() => {
                Err(UserRepositoryError::invalid_session())
            }
            Some(_) => {
                state.sessions.remove(key.as_str());
                Ok(())
            }
        }
    }

    async fn validate_session_token(
        &self,
        token: &SessionToken,
    ) -> Result<ValidatedSession, UserRepositoryError> {
        let now = self.clock.utc();
        let mut state = lock(&self.state, UserRepositoryError::query)?;
        let key = token.session_id();

        let (principal, expires_at) = {
            let session = state
                .sessions
                .get_mut(key.as_str())
                .ok_or_else(UserRepositoryError::invalid_session)?;
            match self.policy.check(session.expires_at, now) {
                SessionCheck::Expired => (None, session.expires_at),
                SessionCheck::Valid => (Some(session.principal.clone()), session.expires_at),
                SessionCheck::Renew { expires_at } => {
                    session.expires_at = expires_at;
                    (Some(session.principal.clone()), expires_at)
                }
            }
        };
        let Some(principal) = principal else {
            state.sessions.remove(key.as_str());
            return Err(UserRepositoryError::invalid_session());
        };

        let user = match &principal {
            Principal::User(id) => Some(
                state
                    .users
                    .get(id)
                    .map(|stored| stored.user.clone())
                    .ok_or_else(UserRepositoryError::invalid_session)?,
            ),
            Principal::Anonymous(_) => None,
        };
        Ok(ValidatedSession {
            principal,
            expires_at,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, SignUpParts};
    use crate::test_support::MutableClock;
    use chrono::{Duration, TimeZone};
    use rstest::{fixture, rstest};

    struct Harness {
        repo: InMemoryUserRepository,
        clock: Arc<MutableClock>,
    }

    #[fixture]
    fn harness() -> Harness {
        let start = Utc
            .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let clock = Arc::new(MutableClock::new(start));
        let repo = InMemoryUserRepository::new(PasswordHashing::low_cost(), clock.clone());
        Harness { repo, clock }
    }

    fn new_user(email: &str) -> NewUser {
        NewUser::try_from_parts(SignUpParts {
            email,
            password: "hunter22",
            first_name: "Grace",
            middle_name: None,
            last_name: "Hopper",
            birth_date: Utc
                .with_ymd_and_hms(1990, 12, 9, 0, 0, 0)
                .single()
                .expect("valid timestamp"),
            role: Role::Responder,
            status_update_frequency: 30,
            is_location_shared: false,
        })
        .expect("valid sign up")
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively(harness: Harness) {
        harness.repo.sign_up(&new_user("grace@example.com")).await.expect("first");
        let err = harness
            .repo
            .sign_up(&new_user("Grace@Example.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(err, UserRepositoryError::duplicate_email("grace@example.com"));
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_distinguishes_unknown_email_from_bad_password(harness: Harness) {
        harness.repo.sign_up(&new_user("grace@example.com")).await.expect("sign up");

        let unknown = harness.repo.sign_in(&credentials("nobody@example.com", "x")).await;
        assert_eq!(unknown.expect_err("unknown"), UserRepositoryError::NotFound);

        let wrong = harness.repo.sign_in(&credentials("grace@example.com", "nope")).await;
        assert_eq!(wrong.expect_err("wrong"), UserRepositoryError::InvalidPassword);

        let outcome = harness
            .repo
            .sign_in(&credentials("grace@example.com", "hunter22"))
            .await
            .expect("sign in");
        assert_eq!(outcome.user.email.as_str(), "grace@example.com");
        assert_eq!(outcome.token.expose().len(), 40);
    }

    #[rstest]
    #[tokio::test]
    async fn sign_out_revokes_the_session(harness: Harness) {
        harness.repo.sign_up(&new_user("grace@example.com")).await.expect("sign up");
        let outcome = harness
            .repo
            .sign_in(&credentials("grace@example.com", "hunter22"))
            .await
            .expect("sign in");
        let subject = outcome.user.id.to_string();

        let session = harness.repo.validate_session_token(&outcome.token).await.expect("valid");
        assert_eq!(session.user.as_ref().map(|u| u.id), Some(outcome.user.id));

        harness
            .repo
            .invalidate_session(&outcome.token, &subject)
            .await
            .expect("sign out");
        let err = harness
            .repo
            .validate_session_token(&outcome.token)
            .await
            .expect_err("revoked");
        assert_eq!(err, UserRepositoryError::InvalidSession);
    }

    #[rstest]
    #[tokio::test]
    async fn sign_out_with_foreign_subject_keeps_the_session(harness: Harness) {
        let anon = AnonymousId::new("device-7").expect("valid id");
        let signed_in = harness.repo.sign_in_anonymous(&anon).await.expect("anonymous");

        let err = harness
            .repo
            .invalidate_session(&signed_in.token, "someone-else")
            .await
            .expect_err("mismatch");
        assert_eq!(err, UserRepositoryError::InvalidSession);
        assert!(harness.repo.validate_session_token(&signed_in.token).await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_token_signs_out_quietly(harness: Harness) {
        let token = SessionToken::generate();
        assert!(harness.repo.invalidate_session(&token, "anyone").await.is_ok());
    }

    #[rstest]
    #[tokio::test]
    async fn sessions_renew_inside_the_window_and_expire_after_it(harness: Harness) {
        let anon = AnonymousId::new("device-7").expect("valid id");
        let signed_in = harness.repo.sign_in_anonymous(&anon).await.expect("anonymous");
        let issued_expiry = signed_in.expires_at;

        harness.clock.advance_seconds(Duration::days(20).num_seconds());
        let renewed = harness
            .repo
            .validate_session_token(&signed_in.token)
            .await
            .expect("renewed");
        assert!(renewed.expires_at > issued_expiry);
        assert_eq!(renewed.principal, Principal::Anonymous(anon));
        assert!(renewed.user.is_none());

        harness.clock.advance_seconds(Duration::days(31).num_seconds());
        let err = harness
            .repo
            .validate_session_token(&signed_in.token)
            .await
            .expect_err("expired");
        assert_eq!(err, UserRepositoryError::InvalidSession);
    }
}
