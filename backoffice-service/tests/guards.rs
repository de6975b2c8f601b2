//! Guard and auth-middleware behavior over minimal routers. The permission
//! and role guards get claims injected as a request extension; the customer
//! middleware tests run the real token decode path.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::{Extension, Json, Router};
use backoffice_service::config::Environment;
use backoffice_service::middleware::auth::{customer_auth_middleware, AuthCustomer};
use backoffice_service::middleware::guards::{self, PermissionGuard};
use backoffice_service::role_set;
use backoffice_service::services::{EmployeeClaims, TokenLifetime};
use common::{body_json, empty_request, set_cookie_header, test_state};
use serde_json::json;
use tower::util::ServiceExt;

fn claims(role_id: i32) -> EmployeeClaims {
    EmployeeClaims {
        employee_id: 1,
        username: "jdoe".to_string(),
        role_id,
        department_id: 2,
        iat: 0,
        exp: i64::MAX,
    }
}

async fn ok_handler() -> &'static str {
    "ok"
}

#[tokio::test]
async fn require_role_allows_listed_role() {
    let app = Router::new()
        .route("/guarded", get(ok_handler))
        .layer(from_fn_with_state(role_set(&[1, 2]), guards::require_role))
        .layer(Extension(claims(2)));

    let response = app
        .oneshot(empty_request("GET", "/guarded"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn require_role_denies_unlisted_role() {
    let app = Router::new()
        .route("/guarded", get(ok_handler))
        .layer(from_fn_with_state(role_set(&[1, 2]), guards::require_role))
        .layer(Extension(claims(9)));

    let response = app
        .oneshot(empty_request("GET", "/guarded"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Access denied"));
}

#[tokio::test]
async fn require_role_without_claims_is_unauthorized() {
    let app = Router::new()
        .route("/guarded", get(ok_handler))
        .layer(from_fn_with_state(role_set(&[1]), guards::require_role));

    let response = app
        .oneshot(empty_request("GET", "/guarded"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Authentication required"));
}

async fn customer_whoami(AuthCustomer(claims): AuthCustomer) -> Json<serde_json::Value> {
    Json(json!({ "customer_id": claims.customer_id, "username": claims.username }))
}

fn customer_app() -> (backoffice_service::AppState, Router) {
    let state = test_state(Environment::Dev);
    let app = Router::new()
        .route("/customer-only", get(customer_whoami))
        .layer(from_fn_with_state(state.clone(), customer_auth_middleware));
    (state, app)
}

fn cookie_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, format!("token={}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn customer_auth_admits_customer_token() {
    let (state, app) = customer_app();
    let token = state
        .tokens
        .issue_customer(7, "buyer", "buyer@example.com", TokenLifetime::Session)
        .unwrap();

    let response = app
        .oneshot(cookie_request("/customer-only", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["customer_id"], json!(7));
    assert_eq!(body["username"], json!("buyer"));
}

#[tokio::test]
async fn customer_auth_rejects_employee_token_and_clears_cookie() {
    let (state, app) = customer_app();
    let token = state
        .tokens
        .issue_employee(1, "jdoe", 1, 2, TokenLifetime::Session)
        .unwrap();

    let response = app
        .oneshot(cookie_request("/customer-only", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let cookie = set_cookie_header(&response).unwrap();
    assert!(cookie.contains("Max-Age=0"));
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn customer_auth_without_credential_is_unauthorized() {
    let (_state, app) = customer_app();

    let response = app
        .oneshot(empty_request("GET", "/customer-only"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], json!("Authentication required"));
}

#[tokio::test]
async fn permission_guard_without_claims_is_unauthorized() {
    // No claims in extensions, so the guard answers before touching the
    // (unreachable) database.
    let state = test_state(Environment::Dev);
    let app = Router::new()
        .route("/guarded", get(ok_handler))
        .layer(from_fn_with_state(
            PermissionGuard::require(state, "quotes_manage"),
            guards::permission_middleware,
        ));

    let response = app
        .oneshot(empty_request("GET", "/guarded"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn permission_guard_surfaces_lookup_failure_as_server_error() {
    // Claims present but the lazy pool points at nothing listening, so the
    // grant lookup fails. That must become a 500, never a silent deny.
    let state = test_state(Environment::Dev);
    let app = Router::new()
        .route("/guarded", get(ok_handler))
        .layer(from_fn_with_state(
            PermissionGuard::require(state, "quotes_manage"),
            guards::permission_middleware,
        ))
        .layer(Extension(claims(1)));

    let response = app
        .oneshot(empty_request("GET", "/guarded"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
