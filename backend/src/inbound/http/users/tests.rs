//! Tests for account and session handlers.

use super::*;
use crate::domain::SessionPolicy;
use crate::inbound::http::test_utils::{MockPorts, sample_session, sample_user};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::cookie::Cookie;
use actix_web::{App, test as actix_test};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn sign_up_body() -> Value {
    json!({
        "email": "Ada@Example.com",
        "password": "correct horse",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "birthDate": "1990-04-01T00:00:00Z",
        "role": "citizen",
        "statusUpdateFrequency": 30,
        "isLocationShared": true
    })
}

async fn app(
    ports: MockPorts,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    actix_test::init_service(
        App::new().app_data(ports.into_state()).service(
            web::scope("/api/v1")
                .service(sign_up)
                .service(sign_in)
                .service(sign_in_anonymous)
                .service(sign_out)
                .service(get_session),
        ),
    )
    .await
}

struct Reply {
    status: StatusCode,
    body: Value,
    cookies: Vec<Cookie<'static>>,
}

impl Reply {
    fn session_cookie(&self) -> Option<&Cookie<'static>> {
        self.cookies.iter().find(|c| c.name() == "session")
    }
}

async fn post_raw(ports: MockPorts, uri: &str, body: &[u8]) -> Reply {
    let service = app(ports).await;
    let req = actix_test::TestRequest::post()
        .uri(uri)
        .insert_header(("content-type", "application/json"))
        .set_payload(body.to_vec())
        .to_request();
    let res = actix_test::call_service(&service, req).await;
    let status = res.status();
    let cookies = res.response().cookies().map(|c| c.into_owned()).collect();
    let bytes = actix_test::read_body(res).await;
    Reply {
        status,
        body: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        cookies,
    }
}

async fn post_json(ports: MockPorts, uri: &str, body: &Value) -> Reply {
    post_raw(ports, uri, body.to_string().as_bytes()).await
}

#[rstest]
#[actix_web::test]
async fn sign_up_returns_created_without_data(sign_up_body: Value) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_sign_up()
        .withf(|user| user.email.as_str() == "ada@example.com" && user.role == Role::Citizen)
        .times(1)
        .returning(|_| Ok(()));

    let Reply { status, body, .. } = post_json(ports, "/api/v1/auth/sign-up", &sign_up_body).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"message": "Successfully signed up."}));
}

#[rstest]
#[actix_web::test]
async fn duplicate_email_is_a_conflict_naming_the_email(sign_up_body: Value) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_sign_up()
        .times(1)
        .returning(|user| Err(UserRepositoryError::duplicate_email(user.email.as_str())));

    let Reply { status, body, .. } = post_json(ports, "/api/v1/auth/sign-up", &sign_up_body).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User ada@example.com already exists.");
    assert_eq!(body["code"], "conflict");
}

#[rstest]
#[actix_web::test]
async fn truncated_sign_up_never_reaches_repository() {
    let mut ports = MockPorts::default();
    ports.users.expect_sign_up().times(0);

    let Reply { status, body, .. } =
        post_raw(ports, "/api/v1/auth/sign-up", br#"{"email": "ada@exa"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid sign up request.");
}

#[rstest]
#[case("role", json!("admin"))]
#[case("birthDate", json!("yesterday"))]
#[actix_web::test]
async fn unknown_enum_or_date_is_a_decode_failure(
    mut sign_up_body: Value,
    #[case] field: &str,
    #[case] value: Value,
) {
    sign_up_body[field] = value;
    let mut ports = MockPorts::default();
    ports.users.expect_sign_up().times(0);

    let Reply { status, .. } = post_json(ports, "/api/v1/auth/sign-up", &sign_up_body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[case("email", json!("not-an-email"), "email", "invalid_format")]
#[case("password", json!(""), "password", "empty")]
#[case("firstName", json!("   "), "firstName", "empty")]
#[actix_web::test]
async fn invalid_fields_carry_details(
    mut sign_up_body: Value,
    #[case] field: &str,
    #[case] value: Value,
    #[case] expected_field: &str,
    #[case] expected_code: &str,
) {
    sign_up_body[field] = value;
    let mut ports = MockPorts::default();
    ports.users.expect_sign_up().times(0);

    let Reply { status, body, .. } = post_json(ports, "/api/v1/auth/sign-up", &sign_up_body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"], json!({"field": expected_field, "code": expected_code}));
}

#[rstest]
#[actix_web::test]
async fn other_sign_up_failures_are_internal(sign_up_body: Value) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_sign_up()
        .returning(|_| Err(UserRepositoryError::connection("database is down")));

    let Reply { status, body, .. } = post_json(ports, "/api/v1/auth/sign-up", &sign_up_body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to sign up.");
    assert!(!body.to_string().contains("database is down"));
}

#[rstest]
#[actix_web::test]
async fn sign_in_returns_user_token_and_cookie() {
    let token = SessionToken::generate();
    let issued = token.clone();
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_sign_in()
        .withf(|creds| creds.email() == "ada@example.com" && creds.password() == "pw")
        .times(1)
        .returning(move |_| {
            Ok(SignInOutcome {
                user: sample_user(),
                token: issued.clone(),
            })
        });

    let reply = post_json(
        ports,
        "/api/v1/auth/sign-in",
        &json!({"email": "ada@example.com", "password": "pw"}),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["message"], "Successfully signed in.");
    assert_eq!(reply.body["data"]["token"], token.expose());
    assert_eq!(reply.body["data"]["user"]["email"], "ada@example.com");
    let cookie = reply.session_cookie().expect("session cookie issued");
    assert_eq!(cookie.value(), token.expose());
    assert_eq!(cookie.http_only(), Some(true));
}

#[rstest]
#[case(UserRepositoryError::not_found(), StatusCode::NOT_FOUND, "Invalid credentials.")]
#[case(UserRepositoryError::invalid_password(), StatusCode::UNAUTHORIZED, "Invalid password.")]
#[case(UserRepositoryError::query("timeout"), StatusCode::INTERNAL_SERVER_ERROR, "Failed to sign in.")]
#[actix_web::test]
async fn sign_in_failures_map_by_kind(
    #[case] failure: UserRepositoryError,
    #[case] expected_status: StatusCode,
    #[case] expected_message: &str,
) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_sign_in()
        .times(1)
        .returning(move |_| Err(failure.clone()));

    let reply = post_json(
        ports,
        "/api/v1/auth/sign-in",
        &json!({"email": "ada@example.com", "password": "pw"}),
    )
    .await;

    assert_eq!(reply.status, expected_status);
    assert_eq!(reply.body["message"], expected_message);
    assert!(reply.session_cookie().is_none());
}

#[rstest]
#[actix_web::test]
async fn sign_in_with_blank_email_is_rejected() {
    let mut ports = MockPorts::default();
    ports.users.expect_sign_in().times(0);

    let Reply { status, body, .. } = post_json(
        ports,
        "/api/v1/auth/sign-in",
        &json!({"email": "  ", "password": "pw"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid sign in request.");
}

#[rstest]
#[actix_web::test]
async fn anonymous_sign_in_issues_a_session() {
    let token = SessionToken::generate();
    let issued = token.clone();
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_sign_in_anonymous()
        .withf(|id| id.as_str() == "device-7")
        .times(1)
        .returning(move |id| {
            Ok(AnonymousSignIn {
                anonymous_id: id.clone(),
                token: issued.clone(),
                expires_at: SessionPolicy::default().expiry_from(Utc::now()),
            })
        });

    let reply = post_json(
        ports,
        "/api/v1/auth/sign-in/anonymous",
        &json!({"anonymousId": " device-7 "}),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["data"]["anonymousId"], "device-7");
    assert!(reply.session_cookie().is_some());
}

#[rstest]
#[actix_web::test]
async fn anonymous_sign_in_failure_is_internal() {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_sign_in_anonymous()
        .returning(|_| Err(UserRepositoryError::connection("refused")));

    let Reply { status, body, .. } = post_json(
        ports,
        "/api/v1/auth/sign-in/anonymous",
        &json!({"anonymousId": "device-7"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to sign in as anonymous.");
}

#[rstest]
#[actix_web::test]
async fn sign_out_clears_the_cookie() {
    let token = SessionToken::generate();
    let expected = token.clone();
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_invalidate_session()
        .withf(move |presented, subject| *presented == expected && subject == "user-1")
        .times(1)
        .returning(|_, _| Ok(()));

    let reply = post_json(
        ports,
        "/api/v1/auth/sign-out",
        &json!({"id": "user-1", "token": token.expose()}),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"message": "Successfully signed out."}));
    let cookie = reply.session_cookie().expect("removal cookie");
    assert_eq!(cookie.value(), "");
}

#[rstest]
#[actix_web::test]
async fn sign_out_failure_is_internal() {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_invalidate_session()
        .returning(|_, _| Err(UserRepositoryError::invalid_session()));

    let Reply { status, body, .. } = post_json(
        ports,
        "/api/v1/auth/sign-out",
        &json!({"id": "user-1", "token": SessionToken::generate().expose()}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to sign out.");
}

#[rstest]
#[case("abc")]
#[case("")]
#[case("zz0123456789abcdef0123456789abcdef012345")]
#[actix_web::test]
async fn sign_out_with_malformed_token_succeeds_without_lookup(#[case] token: &str) {
    let mut ports = MockPorts::default();
    ports.users.expect_invalidate_session().times(0);

    let reply = post_json(
        ports,
        "/api/v1/auth/sign-out",
        &json!({"id": "user-1", "token": token}),
    )
    .await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"message": "Successfully signed out."}));
    assert!(reply.session_cookie().is_some());
}

async fn get_session_with(ports: MockPorts, query: &str) -> (StatusCode, Value) {
    let service = app(ports).await;
    let req = actix_test::TestRequest::get()
        .uri(&format!("/api/v1/auth/session{query}"))
        .to_request();
    let res = actix_test::call_service(&service, req).await;
    let status = res.status();
    let body = actix_test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[rstest]
#[actix_web::test]
async fn get_session_returns_principal_and_user() {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_validate_session_token()
        .times(1)
        .returning(|_| Ok(sample_session()));
    let token = SessionToken::generate();

    let (status, body) = get_session_with(ports, &format!("?token={}", token.expose())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["principal"]["kind"], "user");
    assert_eq!(body["data"]["user"]["firstName"], "Ada");
}

#[rstest]
#[case("")]
#[case("?token=")]
#[case("?token=nothex")]
#[actix_web::test]
async fn get_session_rejects_missing_or_malformed_tokens(#[case] query: &str) {
    let mut ports = MockPorts::default();
    ports.users.expect_validate_session_token().times(0);

    let (status, _) = get_session_with(ports, query).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case(UserRepositoryError::invalid_session(), StatusCode::UNAUTHORIZED)]
#[case(UserRepositoryError::connection("refused"), StatusCode::INTERNAL_SERVER_ERROR)]
#[actix_web::test]
async fn get_session_separates_invalid_from_internal(
    #[case] failure: UserRepositoryError,
    #[case] expected: StatusCode,
) {
    let mut ports = MockPorts::default();
    ports
        .users
        .expect_validate_session_token()
        .returning(move |_| Err(failure.clone()));
    let token = SessionToken::generate();

    let (status, _) = get_session_with(ports, &format!("?token={}", token.expose())).await;

    assert_eq!(status, expected);
}
