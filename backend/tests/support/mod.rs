//! Shared HTTP helpers for the black-box API suites.
//!
//! Every request is served by a fresh app over the same [`TestBackend`]
//! state, so accounts and reports persist across calls within one test.

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::test::{self as actix_test, TestRequest};
use actix_web::{App, web};
use resqlink::Trace;
use resqlink::domain::{SESSION_COOKIE_NAME, TRACE_ID_HEADER};
use resqlink::inbound::http::configure;
use resqlink::inbound::http::health::HealthState;
use resqlink::test_support::app::TestBackend;
use serde_json::{Value, json};

pub const BOUNDARY: &str = "resqlink-it-boundary";
pub const PASSWORD: &str = "correct horse battery staple";

/// Captured response.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookie: Option<String>,
    pub trace_id: Option<String>,
}

pub async fn send(backend: &TestBackend, req: TestRequest) -> Reply {
    let app = actix_test::init_service(
        App::new()
            .app_data(backend.state.clone())
            .app_data(web::Data::new(HealthState::new()))
            .wrap(Trace)
            .configure(configure),
    )
    .await;
    let res = actix_test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let header_value = |name| {
        res.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    let set_cookie = header_value(header::SET_COOKIE);
    let trace_id = header_value(header::HeaderName::from_static(TRACE_ID_HEADER));
    let bytes = actix_test::read_body(res).await;
    Reply {
        status,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        set_cookie,
        trace_id,
    }
}

pub fn post_json(uri: &str, body: &Value) -> TestRequest {
    TestRequest::post().uri(uri).set_json(body)
}

pub fn sign_up_body(email: &str, role: &str) -> Value {
    json!({
        "email": email,
        "password": PASSWORD,
        "firstName": "Grace",
        "lastName": "Hopper",
        "birthDate": "1990-04-01T00:00:00Z",
        "role": role,
        "statusUpdateFrequency": 30,
        "isLocationShared": true,
    })
}

/// Account credentials plus the session issued on sign-in.
pub struct SignedIn {
    pub user_id: String,
    pub token: String,
}

impl SignedIn {
    pub fn cookie_header(&self) -> (header::HeaderName, String) {
        (header::COOKIE, format!("{SESSION_COOKIE_NAME}={}", self.token))
    }
}

pub async fn sign_up_and_in(backend: &TestBackend, email: &str, role: &str) -> SignedIn {
    let created = send(
        backend,
        post_json("/api/v1/auth/sign-up", &sign_up_body(email, role)),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);

    let signed_in = send(
        backend,
        post_json(
            "/api/v1/auth/sign-in",
            &json!({ "email": email, "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(signed_in.status, StatusCode::OK, "{}", signed_in.body);
    SignedIn {
        user_id: signed_in.body["data"]["user"]["id"]
            .as_str()
            .expect("user id")
            .to_owned(),
        token: signed_in.body["data"]["token"]
            .as_str()
            .expect("token")
            .to_owned(),
    }
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    Photo {
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

pub fn multipart_request(parts: &[Part<'_>]) -> TestRequest {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::Photo {
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"photos\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    TestRequest::post()
        .uri("/api/v1/disaster-reports")
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}
