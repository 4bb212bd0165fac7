//! Session authentication gate.
//!
//! [`RequireSession`] wraps protected routes. It reads the `session` cookie,
//! validates the token through the user repository and stores the resulting
//! [`ValidatedSession`] in request extensions. Handlers pick it up with the
//! [`AuthenticatedSession`] extractor instead of validating again. Requests
//! without a valid session are answered with `401` before the handler runs.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{FromRequest, HttpMessage, HttpRequest, ResponseError, web};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::{Error, SESSION_COOKIE_NAME, SessionToken, ValidatedSession};

use super::state::HttpState;

const UNAUTHORIZED: &str = "Unauthorized";
const OPERATION: &str = "require session";

/// Middleware factory guarding routes behind a valid session cookie.
///
/// # Examples
/// ```
/// use actix_web::{get, HttpResponse};
/// use resqlink::inbound::http::auth::RequireSession;
///
/// #[get("/private", wrap = "RequireSession")]
/// async fn private() -> HttpResponse {
///     HttpResponse::Ok().finish()
/// }
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RequireSession;

impl<S, B> Transform<S, ServiceRequest> for RequireSession
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequireSessionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireSessionMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Service wrapper produced by [`RequireSession`].
pub struct RequireSessionMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireSessionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            match validate(&req).await {
                Ok(session) => {
                    req.extensions_mut().insert(session);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(err) => {
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

async fn validate(req: &ServiceRequest) -> Result<ValidatedSession, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| {
            Error::internal("Internal server error")
                .with_context(OPERATION, "HTTP state is not registered")
        })?;
    let cookie = req.cookie(SESSION_COOKIE_NAME).ok_or_else(|| {
        Error::unauthorized(UNAUTHORIZED).with_context(OPERATION, "missing session cookie")
    })?;
    let token = SessionToken::parse(cookie.value())
        .map_err(|err| Error::unauthorized(UNAUTHORIZED).with_context(OPERATION, err))?;
    state
        .users
        .validate_session_token(&token)
        .await
        .map_err(|err| Error::unauthorized(UNAUTHORIZED).with_context(OPERATION, err))
}

/// The session resolved by [`RequireSession`] for the current request.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession(pub ValidatedSession);

impl FromRequest for AuthenticatedSession {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let session = req.extensions().get::<ValidatedSession>().cloned();
        ready(session.map(Self).ok_or_else(|| {
            Error::unauthorized(UNAUTHORIZED)
                .with_context(OPERATION, "route is not wrapped by RequireSession")
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::ports::UserRepositoryError;
    use crate::inbound::http::test_utils::{MockPorts, USER_ID, sample_session};
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use rstest::rstest;

    async fn call(
        ports: MockPorts,
        cookie: Option<&str>,
    ) -> (StatusCode, usize, actix_web::web::Bytes) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handler_calls = calls.clone();
        let app = test::init_service(
            App::new().app_data(ports.into_state()).service(
                web::resource("/private").wrap(RequireSession).route(web::get().to(
                    move |session: AuthenticatedSession| {
                        let handler_calls = handler_calls.clone();
                        async move {
                            handler_calls.fetch_add(1, Ordering::SeqCst);
                            HttpResponse::Ok().body(session.0.principal.subject())
                        }
                    },
                )),
            ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/private");
        if let Some(value) = cookie {
            req = req.cookie(Cookie::new(SESSION_COOKIE_NAME, value.to_owned()));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = test::read_body(res).await;
        (status, calls.load(Ordering::SeqCst), body)
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_cookie_short_circuits_before_handler() {
        let mut ports = MockPorts::default();
        ports.users.expect_validate_session_token().times(0);

        let (status, calls, _) = call(ports, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(calls, 0);
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_cookie_is_rejected_without_lookup() {
        let mut ports = MockPorts::default();
        ports.users.expect_validate_session_token().times(0);

        let (status, calls, _) = call(ports, Some("not-a-token")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(calls, 0);
    }

    #[rstest]
    #[case(UserRepositoryError::invalid_session())]
    #[case(UserRepositoryError::connection("pool exhausted"))]
    #[actix_web::test]
    async fn failed_validation_is_unauthorized(#[case] failure: UserRepositoryError) {
        let mut ports = MockPorts::default();
        ports
            .users
            .expect_validate_session_token()
            .times(1)
            .returning(move |_| Err(failure.clone()));

        let token = SessionToken::generate();
        let (status, calls, body) = call(ports, Some(token.expose())).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(calls, 0);
        let value: serde_json::Value = serde_json::from_slice(&body).expect("JSON error body");
        assert_eq!(value["message"], UNAUTHORIZED);
    }

    #[rstest]
    #[actix_web::test]
    async fn valid_session_is_injected_for_the_handler() {
        let token = SessionToken::generate();
        let expected = token.clone();
        let mut ports = MockPorts::default();
        ports
            .users
            .expect_validate_session_token()
            .withf(move |presented| *presented == expected)
            .times(1)
            .returning(|_| Ok(sample_session()));

        let (status, calls, body) = call(ports, Some(token.expose())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls, 1);
        assert_eq!(body, USER_ID.as_bytes());
    }

    #[rstest]
    #[actix_web::test]
    async fn extractor_without_gate_is_unauthorized() {
        let app = test::init_service(App::new().route(
            "/open",
            web::get().to(|_: AuthenticatedSession| async { HttpResponse::Ok().finish() }),
        ))
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/open").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
