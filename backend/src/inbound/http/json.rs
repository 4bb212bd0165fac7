//! Request body decoding.
//!
//! Handlers take the raw body and decode it here so each operation answers a
//! malformed payload with its own fixed message, before any port is called.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::Error;

/// Decode `body` as JSON, mapping failure to `400` with `message`.
pub(crate) fn decode_json<T: DeserializeOwned>(
    body: &[u8],
    operation: &'static str,
    message: &'static str,
) -> Result<T, Error> {
    serde_json::from_slice(body)
        .map_err(|err| Error::invalid_request(message).with_context(operation, err))
}

/// Validation failure that names the offending field.
pub(crate) trait FieldViolation: std::fmt::Display {
    fn field(&self) -> &'static str;
    fn code(&self) -> &'static str;
}

macro_rules! impl_field_violation {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldViolation for $ty {
                fn field(&self) -> &'static str {
                    <$ty>::field(self)
                }

                fn code(&self) -> &'static str {
                    <$ty>::code(self)
                }
            }
        )*
    };
}

impl_field_violation!(
    crate::domain::UserValidationError,
    crate::domain::LoginValidationError,
    crate::domain::ReportValidationError,
);

/// `400` carrying `{field, code}` details for a rejected value.
pub(crate) fn invalid_field(
    message: &'static str,
    operation: &'static str,
    violation: &impl FieldViolation,
) -> Error {
    Error::invalid_request(message)
        .with_details(json!({ "field": violation.field(), "code": violation.code() }))
        .with_context(operation, violation)
}
