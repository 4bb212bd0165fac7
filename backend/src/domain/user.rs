//! Account model: identifiers, roles and the validated sign-up record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Maximum length of an email address.
pub const EMAIL_MAX: usize = 320;
/// Maximum length of each personal name part.
pub const NAME_MAX: usize = 100;

/// Validation failures raised while building user values from raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmptyPassword,
    EmptyFirstName,
    EmptyLastName,
    UnknownRole { value: String },
    TooLong { field: &'static str, max: usize },
}

impl UserValidationError {
    /// Name of the offending payload field, as spelled on the wire.
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyId | Self::InvalidId => "id",
            Self::EmptyEmail | Self::InvalidEmail => "email",
            Self::EmptyPassword => "password",
            Self::EmptyFirstName => "firstName",
            Self::EmptyLastName => "lastName",
            Self::UnknownRole { .. } => "role",
            Self::TooLong { field, .. } => field,
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyId
            | Self::EmptyEmail
            | Self::EmptyPassword
            | Self::EmptyFirstName
            | Self::EmptyLastName => "empty",
            Self::InvalidId | Self::InvalidEmail => "invalid_format",
            Self::UnknownRole { .. } => "unknown_value",
            Self::TooLong { .. } => "too_long",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::EmptyFirstName => write!(f, "first name must not be empty"),
            Self::EmptyLastName => write!(f, "last name must not be empty"),
            Self::UnknownRole { value } => write!(f, "unknown role `{value}`"),
            Self::TooLong { field, max } => write!(f, "{field} must be at most {max} characters"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Lower-cased email address with a single `@` separating non-empty parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let mut parts = trimmed.split('@');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty()
        );
        if !well_formed || trimmed.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        let lowered = trimmed.to_lowercase();
        within(&lowered, "email", EMAIL_MAX)?;
        Ok(Self(lowered))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Plain-text password held only long enough to hash or verify it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Whitespace is kept as typed; only the empty string is rejected.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    Responder,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Responder => "responder",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Self::Citizen),
            "responder" => Ok(Self::Responder),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Registered account as exposed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: Email,
    pub birth_date: DateTime<Utc>,
    pub role: Role,
    pub status_update_frequency: u32,
    pub is_location_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw sign-up input prior to validation.
#[derive(Debug, Clone)]
pub struct SignUpParts<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub middle_name: Option<&'a str>,
    pub last_name: &'a str,
    pub birth_date: DateTime<Utc>,
    pub role: Role,
    pub status_update_frequency: u32,
    pub is_location_shared: bool,
}

/// Validated account registration.
///
/// ## Invariants
/// - `first_name` and `last_name` are trimmed and non-empty.
/// - A blank `middle_name` is stored as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: Email,
    pub password: Password,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub birth_date: DateTime<Utc>,
    pub role: Role,
    pub status_update_frequency: u32,
    pub is_location_shared: bool,
}

impl NewUser {
    pub fn try_from_parts(parts: SignUpParts<'_>) -> Result<Self, UserValidationError> {
        let email = Email::new(parts.email)?;
        let password = Password::new(parts.password)?;
        let first_name = non_blank(parts.first_name, UserValidationError::EmptyFirstName)?;
        within(&first_name, "firstName", NAME_MAX)?;
        let last_name = non_blank(parts.last_name, UserValidationError::EmptyLastName)?;
        within(&last_name, "lastName", NAME_MAX)?;
        let middle_name = parts
            .middle_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| within(name, "middleName", NAME_MAX).map(|()| name.to_owned()))
            .transpose()?;

        Ok(Self {
            email,
            password,
            first_name,
            middle_name,
            last_name,
            birth_date: parts.birth_date,
            role: parts.role,
            status_update_frequency: parts.status_update_frequency,
            is_location_shared: parts.is_location_shared,
        })
    }
}

fn non_blank(raw: &str, err: UserValidationError) -> Result<String, UserValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(err);
    }
    Ok(trimmed.to_owned())
}

fn within(value: &str, field: &'static str, max: usize) -> Result<(), UserValidationError> {
    if value.chars().count() > max {
        return Err(UserValidationError::TooLong { field, max });
    }
    Ok(())
}
