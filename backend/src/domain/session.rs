//! Session tokens, principals and the renewal policy.
//!
//! A token is 20 random bytes rendered as lowercase hex. Storage only ever
//! sees the SHA-256 fingerprint of the token ([`SessionId`]), so a leaked
//! sessions table cannot be replayed.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::auth::AnonymousId;
use super::user::{User, UserId};

const TOKEN_BYTES: usize = 20;

/// Cookie carrying the session token.
pub const SESSION_COOKIE_NAME: &str = "session";

/// Raised when a presented token cannot possibly be one we issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedSessionToken;

impl fmt::Display for MalformedSessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session token must be {} lowercase hex characters", TOKEN_BYTES * 2)
    }
}

impl std::error::Error for MalformedSessionToken {}

/// Opaque bearer credential handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Mint a fresh token from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Accept a client-presented token, rejecting anything of the wrong shape.
    pub fn parse(raw: &str) -> Result<Self, MalformedSessionToken> {
        let well_formed = raw.len() == TOKEN_BYTES * 2
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(MalformedSessionToken);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Storage key for this token.
    pub fn session_id(&self) -> SessionId {
        SessionId(hex::encode(Sha256::digest(self.0.as_bytes())))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

impl Serialize for SessionToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SessionToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// SHA-256 fingerprint of a [`SessionToken`], hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Rehydrate a fingerprint read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Whoever a session speaks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Principal {
    User(UserId),
    Anonymous(AnonymousId),
}

impl Principal {
    /// Identifier string as supplied on sign-out.
    pub fn subject(&self) -> String {
        match self {
            Self::User(id) => id.to_string(),
            Self::Anonymous(id) => id.to_string(),
        }
    }
}

/// Session lifetime and sliding renewal window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub lifetime: Duration,
    pub renew_within: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(30),
            renew_within: Duration::days(15),
        }
    }
}

/// What validation should do with a stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    Expired,
    Valid,
    Renew { expires_at: DateTime<Utc> },
}

impl SessionPolicy {
    pub fn expiry_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.lifetime
    }

    pub fn check(&self, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> SessionCheck {
        if now >= expires_at {
            SessionCheck::Expired
        } else if expires_at - now < self.renew_within {
            SessionCheck::Renew {
                expires_at: self.expiry_from(now),
            }
        } else {
            SessionCheck::Valid
        }
    }
}

/// Outcome of a successful token validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedSession {
    pub principal: Principal,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Payload returned by password sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignInOutcome {
    pub user: User,
    pub token: SessionToken,
}

/// Payload returned by anonymous sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousSignIn {
    pub anonymous_id: AnonymousId,
    pub token: SessionToken,
    pub expires_at: DateTime<Utc>,
}
