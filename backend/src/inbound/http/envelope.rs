//! Success envelope shared by every handler.
//!
//! The body is always `{"message": ..., "data"?: ...}`; the status code
//! travels alongside and is applied when the value is turned into a response.

use actix_web::body::BoxBody;
use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;

#[derive(Serialize)]
struct EnvelopeBody<'a, T> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
}

/// Successful handler outcome.
///
/// # Examples
/// ```
/// use actix_web::http::StatusCode;
/// use resqlink::inbound::http::envelope::ApiResponse;
///
/// let response = ApiResponse::created("Successfully signed up.");
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert!(response.data().is_none());
/// ```
#[derive(Debug)]
pub struct ApiResponse<T = ()> {
    status: StatusCode,
    message: &'static str,
    data: Option<T>,
    cookie: Option<Cookie<'static>>,
}

impl ApiResponse<()> {
    /// `201 Created` without a payload.
    pub fn created(message: &'static str) -> Self {
        Self::new(StatusCode::CREATED, message, None)
    }

    /// `200 OK` without a payload.
    pub fn ok_empty(message: &'static str) -> Self {
        Self::new(StatusCode::OK, message, None)
    }
}

impl<T> ApiResponse<T> {
    fn new(status: StatusCode, message: &'static str, data: Option<T>) -> Self {
        Self {
            status,
            message,
            data,
            cookie: None,
        }
    }

    /// `200 OK` carrying `data`.
    pub fn ok(message: &'static str, data: T) -> Self {
        Self::new(StatusCode::OK, message, Some(data))
    }

    /// `201 Created` carrying `data`.
    pub fn created_with(message: &'static str, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, Some(data))
    }

    /// Attach a `Set-Cookie` header to the response.
    pub fn with_cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookie = Some(cookie);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        self.message
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}

impl<T: Serialize> Responder for ApiResponse<T> {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        let mut builder = HttpResponse::build(self.status);
        if let Some(cookie) = self.cookie {
            builder.cookie(cookie);
        }
        builder.json(EnvelopeBody {
            message: self.message,
            data: self.data.as_ref(),
        })
    }
}
