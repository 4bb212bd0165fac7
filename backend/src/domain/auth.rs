//! Authentication inputs: login credentials and anonymous identities.
//!
//! Handlers build these from decoded payloads before talking to the
//! [`UserRepository`](crate::domain::ports::UserRepository) port.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::user::Password;

/// Maximum length of a caller-chosen anonymous identifier.
pub const ANONYMOUS_ID_MAX: usize = 128;

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Anonymous identifier was blank once trimmed.
    EmptyAnonymousId,
    /// Anonymous identifier exceeded [`ANONYMOUS_ID_MAX`] characters.
    AnonymousIdTooLong { max: usize },
}

impl LoginValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyEmail => "email",
            Self::EmptyPassword => "password",
            Self::EmptyAnonymousId | Self::AnonymousIdTooLong { .. } => "anonymousId",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::AnonymousIdTooLong { .. } => "too_long",
            _ => "empty",
        }
    }
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyAnonymousId => write!(f, "anonymous id must not be empty"),
            Self::AnonymousIdTooLong { max } => {
                write!(f, "anonymous id must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication adapters.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and non-empty. It is not checked for
///   shape: an unknown address is a lookup miss, not a malformed request.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use resqlink::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ada@Example.com ", "pw").expect("valid");
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Password,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        let password = Password::new(password).map_err(|_| LoginValidationError::EmptyPassword)?;
        Ok(Self {
            email: normalized.to_lowercase(),
            password,
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.expose()
    }
}

/// Caller-chosen identity for password-less sessions.
///
/// Any caller presenting an anonymous id receives a session for it; no
/// secret is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnonymousId(String);

impl AnonymousId {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, LoginValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LoginValidationError::EmptyAnonymousId);
        }
        if trimmed.chars().count() > ANONYMOUS_ID_MAX {
            return Err(LoginValidationError::AnonymousIdTooLong {
                max: ANONYMOUS_ID_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for AnonymousId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<AnonymousId> for String {
    fn from(value: AnonymousId) -> Self {
        value.0
    }
}

impl TryFrom<String> for AnonymousId {
    type Error = LoginValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn password_whitespace_is_preserved() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", "  pw  ")
            .expect("valid credentials");
        assert_eq!(creds.password(), "  pw  ");
    }

    #[rstest]
    #[case("   ", LoginValidationError::EmptyAnonymousId)]
    #[case(&"x".repeat(ANONYMOUS_ID_MAX + 1), LoginValidationError::AnonymousIdTooLong { max: ANONYMOUS_ID_MAX })]
    fn anonymous_id_bounds(#[case] raw: &str, #[case] expected: LoginValidationError) {
        assert_eq!(AnonymousId::new(raw), Err(expected));
    }

    #[rstest]
    fn anonymous_id_is_trimmed() {
        let id = AnonymousId::new("  device-42 ").expect("valid id");
        assert_eq!(id.as_str(), "device-42");
    }
}
