//! Credential handling shared by the user repository adapters.

mod password;

pub use password::{PasswordHashError, PasswordHashing};
