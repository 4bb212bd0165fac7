//! Account and session scenarios over the full route table.

// Helpers are shared with the report suites; not every one is used here.
#[allow(dead_code)]
mod support;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use resqlink::test_support::app::TestBackend;
use rstest::rstest;
use serde_json::json;

use support::{PASSWORD, post_json, send, sign_up_and_in, sign_up_body};

#[actix_web::test]
async fn sign_up_then_duplicate_is_a_conflict() {
    let backend = TestBackend::new();
    let body = sign_up_body("grace@example.com", "citizen");

    let first = send(&backend, post_json("/api/v1/auth/sign-up", &body)).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["message"], "Successfully signed up.");

    let again = send(&backend, post_json("/api/v1/auth/sign-up", &body)).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.body["code"], "conflict");
    assert_eq!(
        again.body["message"],
        "User grace@example.com already exists."
    );
}

#[actix_web::test]
async fn emails_differing_only_in_case_collide() {
    let backend = TestBackend::new();
    let first = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-up",
            &sign_up_body("grace@example.com", "citizen"),
        ),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);

    let again = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-up",
            &sign_up_body("Grace@Example.com", "citizen"),
        ),
    )
    .await;
    assert_eq!(again.status, StatusCode::CONFLICT);
}

#[rstest]
#[case::first_name("firstName", 101)]
#[case::last_name("lastName", 101)]
#[case::middle_name("middleName", 101)]
#[case::email("email", 321)]
#[actix_web::test]
async fn over_long_sign_up_fields_are_rejected(#[case] field: &str, #[case] len: usize) {
    let backend = TestBackend::new();
    let mut body = sign_up_body("grace@example.com", "citizen");
    body[field] = if field == "email" {
        json!(format!("{}@example.com", "g".repeat(len - "@example.com".len())))
    } else {
        json!("x".repeat(len))
    };

    let reply = send(&backend, post_json("/api/v1/auth/sign-up", &body)).await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["details"], json!({ "field": field, "code": "too_long" }));

    let retry = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-up",
            &sign_up_body("grace@example.com", "citizen"),
        ),
    )
    .await;
    assert_eq!(retry.status, StatusCode::CREATED);
}

#[rstest]
#[case::truncated(r#"{"email": "grace@example.com", "pass"#)]
#[case::not_json("email=grace@example.com")]
#[case::unknown_role(
    r#"{"email":"g@example.com","password":"pw","firstName":"G","lastName":"H","birthDate":"1990-04-01T00:00:00Z","role":"admin"}"#
)]
#[actix_web::test]
async fn malformed_sign_up_is_a_bad_request(#[case] payload: &'static str) {
    let backend = TestBackend::new();
    let reply = send(
        &backend,
        TestRequest::post()
            .uri("/api/v1/auth/sign-up")
            .insert_header(("content-type", "application/json"))
            .set_payload(payload),
    )
    .await;

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "invalid_request");
    assert!(reply.trace_id.is_some());
}

#[actix_web::test]
async fn sign_in_distinguishes_unknown_email_from_wrong_password() {
    let backend = TestBackend::new();
    let signed_in = sign_up_and_in(&backend, "ada@example.com", "responder").await;
    assert_eq!(signed_in.token.len(), 40);

    let unknown = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-in",
            &json!({ "email": "nobody@example.com", "password": PASSWORD }),
        ),
    )
    .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let wrong = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-in",
            &json!({ "email": "ada@example.com", "password": "not it" }),
        ),
    )
    .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn sign_in_sets_the_session_cookie_and_hides_the_password() {
    let backend = TestBackend::new();
    send(
        &backend,
        post_json(
            "/api/v1/auth/sign-up",
            &sign_up_body("ada@example.com", "citizen"),
        ),
    )
    .await;

    let reply = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-in",
            &json!({ "email": "ada@example.com", "password": PASSWORD }),
        ),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    let cookie = reply.set_cookie.expect("session cookie");
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    let user = &reply.body["data"]["user"];
    assert_eq!(user["email"], "ada@example.com");
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
}

#[actix_web::test]
async fn session_lookup_resolves_the_signed_in_user() {
    let backend = TestBackend::new();
    let signed_in = sign_up_and_in(&backend, "ada@example.com", "citizen").await;

    let reply = send(
        &backend,
        TestRequest::get().uri(&format!("/api/v1/auth/session?token={}", signed_in.token)),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["principal"]["kind"], "user");
    assert_eq!(reply.body["data"]["principal"]["id"], signed_in.user_id.as_str());
    assert_eq!(reply.body["data"]["user"]["email"], "ada@example.com");
}

#[actix_web::test]
async fn signed_out_tokens_no_longer_resolve_or_pass_the_gate() {
    let backend = TestBackend::new();
    let signed_in = sign_up_and_in(&backend, "ada@example.com", "citizen").await;

    let out = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-out",
            &json!({ "id": signed_in.user_id, "token": signed_in.token }),
        ),
    )
    .await;
    assert_eq!(out.status, StatusCode::OK);
    assert_eq!(out.body["message"], "Successfully signed out.");

    let lookup = send(
        &backend,
        TestRequest::get().uri(&format!("/api/v1/auth/session?token={}", signed_in.token)),
    )
    .await;
    assert_eq!(lookup.status, StatusCode::UNAUTHORIZED);

    let gated = send(
        &backend,
        TestRequest::get()
            .uri("/api/v1/disaster-reports")
            .insert_header(signed_in.cookie_header()),
    )
    .await;
    assert_eq!(gated.status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn anonymous_sessions_carry_the_caller_id() {
    let backend = TestBackend::new();
    let reply = send(
        &backend,
        post_json(
            "/api/v1/auth/sign-in/anonymous",
            &json!({ "anonymousId": "device-7f3a" }),
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["anonymousId"], "device-7f3a");
    let token = reply.body["data"]["token"].as_str().expect("token");

    let lookup = send(
        &backend,
        TestRequest::get().uri(&format!("/api/v1/auth/session?token={token}")),
    )
    .await;
    assert_eq!(lookup.status, StatusCode::OK);
    assert_eq!(lookup.body["data"]["principal"]["kind"], "anonymous");
    assert_eq!(lookup.body["data"]["principal"]["id"], "device-7f3a");
    assert!(lookup.body["data"].get("user").is_none());
}

#[rstest]
#[case::unknown("0123456789abcdef0123456789abcdef01234567")]
#[case::malformed("not-a-token")]
#[case::missing("")]
#[actix_web::test]
async fn unresolvable_tokens_are_unauthorised(#[case] token: &'static str) {
    let backend = TestBackend::new();
    let reply = send(
        &backend,
        TestRequest::get().uri(&format!("/api/v1/auth/session?token={token}")),
    )
    .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["code"], "unauthorized");
}
