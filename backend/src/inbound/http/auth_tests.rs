//! Tests for account HTTP handlers.

use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

use super::*;
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::test_utils::{memory_state, session_cookie, test_session_middleware};

fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api/v1")
                .service(register)
                .service(login)
                .service(logout)
                .service(get_profile)
                .service(update_profile),
        )
}

fn ada(password: &str) -> Value {
    json!({ "name": "Ada Lovelace", "email": "ada@example.com", "password": password })
}

async fn body_json(response: actix_web::dev::ServiceResponse) -> Value {
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("json body")
}

#[actix_web::test]
async fn register_starts_a_session() {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(ada("secret1"))
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response);
    let created = body_json(response).await;
    assert_eq!(created.get("role").and_then(Value::as_str), Some("student"));
    assert_eq!(created.get("enrolledCourses"), Some(&json!([])));

    let profile = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(profile.status(), StatusCode::OK);
    let profile = body_json(profile).await;
    assert_eq!(profile.get("id"), created.get("id"));
    assert_eq!(
        profile.get("email").and_then(Value::as_str),
        Some("ada@example.com")
    );
    assert_eq!(profile.get("enrolledCourses"), Some(&json!([])));
}

#[rstest]
#[case(json!({ "email": "ada@example.com", "password": "secret1" }), "name")]
#[case(json!({ "name": "Ada", "email": "not-an-email", "password": "secret1" }), "email")]
#[case(json!({ "name": "Ada", "email": "ada@example.com", "password": "abc" }), "password")]
#[case(
    json!({ "name": "Ada", "email": "ada@example.com", "password": "secret1", "role": "admin" }),
    "role"
)]
#[case(
    json!({ "name": "Ada", "email": "ada@example.com", "password": "secret1", "role": "wizard" }),
    "role"
)]
#[actix_web::test]
async fn register_rejects_invalid_input(#[case] payload: Value, #[case] field: &str) {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some(field)
    );
}

#[actix_web::test]
async fn duplicate_email_is_a_business_rule_violation() {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    let register_ada = || {
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(ada("secret1"))
            .to_request()
    };

    let first = actix_test::call_service(&app, register_ada()).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let second = actix_test::call_service(&app, register_ada()).await;

    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(second).await;
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("email_taken")
    );
}

#[rstest]
#[case("ada@example.com", "wrong-password")]
#[case("nobody@example.com", "secret1")]
#[actix_web::test]
async fn login_failures_are_indistinguishable(#[case] email: &str, #[case] password: &str) {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(ada("secret1"))
            .to_request(),
    )
    .await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("invalid credentials")
    );
}

#[actix_web::test]
async fn login_then_update_profile() {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(ada("secret1"))
            .to_request(),
    )
    .await;

    let login_response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "ada@example.com", "password": "secret1" }))
            .to_request(),
    )
    .await;
    assert_eq!(login_response.status(), StatusCode::OK);
    let cookie = session_cookie(&login_response);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/auth/profile")
            .cookie(cookie)
            .set_json(json!({ "bio": "Analyst of engines" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body.get("bio").and_then(Value::as_str),
        Some("Analyst of engines")
    );
    assert_eq!(body.get("name").and_then(Value::as_str), Some("Ada Lovelace"));
}

#[actix_web::test]
async fn profile_update_rejects_protected_fields() {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;
    let registered = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(ada("secret1"))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&registered);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::put()
            .uri("/api/v1/auth/profile")
            .cookie(cookie)
            .set_json(json!({ "role": "admin" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn profile_requires_a_session() {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/auth/profile")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let (state, _store) = memory_state();
    let app = actix_test::init_service(test_app(state)).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/auth/logout")
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
