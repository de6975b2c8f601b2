//! Session endpoints: login, refresh, logout, and the current-principal view.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use service_core::error::AppError;

use crate::dtos::{LoginKind, LoginRequest};
use crate::services::auth::LoginSuccess;
use crate::services::error::ServiceError;
use crate::services::token::Principal;
use crate::utils::cookie::{clear_session_cookie, extract_token, session_cookie};
use crate::utils::validation::ValidatedJson;
use crate::AppState;

fn login_response(state: &AppState, success: LoginSuccess) -> Response {
    match success {
        LoginSuccess::Employee {
            profile,
            permissions,
            token,
            remember,
        } => {
            let jar = CookieJar::new().add(session_cookie(&state.config, token, remember));
            (
                StatusCode::OK,
                jar,
                Json(json!({
                    "success": true,
                    "message": "Login successful",
                    "data": {
                        "kind": "employee",
                        "user": profile,
                        "permissions": permissions,
                    }
                })),
            )
                .into_response()
        }
        LoginSuccess::Customer {
            profile,
            token,
            remember,
        } => {
            let jar = CookieJar::new().add(session_cookie(&state.config, token, remember));
            (
                StatusCode::OK,
                jar,
                Json(json!({
                    "success": true,
                    "message": "Login successful",
                    "data": {
                        "kind": "customer",
                        "user": profile,
                    }
                })),
            )
                .into_response()
        }
    }
}

/// A rejected login also clears whatever session cookie the client still
/// holds, so a stale credential does not outlive a failed re-authentication.
/// Gating rejections (403) leave the cookie alone.
fn login_error(state: &AppState, err: ServiceError) -> Response {
    let response = AppError::from(err).into_response();
    if response.status() == StatusCode::UNAUTHORIZED {
        let jar = CookieJar::new().add(clear_session_cookie(&state.config));
        return (jar, response).into_response();
    }
    response
}

/// Unified login. Tries the kind named in the request, or employee first and
/// customer second when no kind is given.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session cookie set"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account not approved or not verified"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Response {
    match state.auth.login(&request).await {
        Ok(success) => login_response(&state, success),
        Err(err) => login_error(&state, err),
    }
}

/// Employee-only login; no customer fallback.
#[utoipa::path(
    post,
    path = "/api/auth/employee/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session cookie set"),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn employee_login(
    State(state): State<AppState>,
    ValidatedJson(mut request): ValidatedJson<LoginRequest>,
) -> Response {
    request.kind = Some(LoginKind::Employee);
    match state.auth.login(&request).await {
        Ok(success) => login_response(&state, success),
        Err(err) => login_error(&state, err),
    }
}

/// Customer-only login; no employee fallback.
#[utoipa::path(
    post,
    path = "/api/auth/customer/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated; session cookie set"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account not approved or not verified"),
    ),
    tag = "auth"
)]
pub async fn customer_login(
    State(state): State<AppState>,
    ValidatedJson(mut request): ValidatedJson<LoginRequest>,
) -> Response {
    request.kind = Some(LoginKind::Customer);
    match state.auth.login(&request).await {
        Ok(success) => login_response(&state, success),
        Err(err) => login_error(&state, err),
    }
}

/// Re-issue the current credential with a fresh session-length expiry. A
/// remember-class credential comes back session-class; refresh never extends
/// the long lifetime.
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    responses(
        (status = 200, description = "New session credential issued"),
        (status = 401, description = "Missing, invalid, or expired credential"),
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Response {
    let cleared = CookieJar::new().add(clear_session_cookie(&state.config));

    let Some(token) = extract_token(&jar, &headers) else {
        return (
            StatusCode::UNAUTHORIZED,
            cleared,
            Json(json!({ "success": false, "message": "Authentication required" })),
        )
            .into_response();
    };

    match state.tokens.refresh(&token) {
        Ok(new_token) => {
            let jar = CookieJar::new().add(session_cookie(&state.config, new_token, false));
            (
                StatusCode::OK,
                jar,
                Json(json!({ "success": true, "message": "Session refreshed" })),
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            cleared,
            Json(json!({ "success": false, "message": "Invalid or expired token" })),
        )
            .into_response(),
    }
}

/// Clear the session cookie. Succeeds whether or not a session existed.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cleared")),
    tag = "auth"
)]
pub async fn logout(State(state): State<AppState>) -> Response {
    let jar = CookieJar::new().add(clear_session_cookie(&state.config));
    (
        StatusCode::OK,
        jar,
        Json(json!({ "success": true, "message": "Logged out" })),
    )
        .into_response()
}

/// Current principal, resolved from the credential without the caller saying
/// which kind it is. A valid token whose backing row is gone yields 404 and
/// clears the cookie.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current principal"),
        (status = 401, description = "Missing or invalid credential"),
        (status = 404, description = "Principal no longer exists"),
    ),
    tag = "auth"
)]
pub async fn me(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let cleared = CookieJar::new().add(clear_session_cookie(&state.config));

    let Some(token) = extract_token(&jar, &headers) else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            cleared,
            Json(json!({ "success": false, "message": "Authentication required" })),
        )
            .into_response());
    };

    let principal = match state.tokens.resolve(&token) {
        Ok(principal) => principal,
        Err(_) => {
            return Ok((
                StatusCode::UNAUTHORIZED,
                cleared,
                Json(json!({ "success": false, "message": "Invalid or expired token" })),
            )
                .into_response());
        }
    };

    let body = match principal {
        Principal::Employee(c) => match state.auth.employee_profile(c.employee_id).await? {
            Some(profile) => {
                let permissions = state
                    .permissions
                    .snapshot(profile.employee_id, profile.department_id, &profile.department)
                    .await?;
                json!({
                    "success": true,
                    "message": "OK",
                    "data": { "kind": "employee", "user": profile, "permissions": permissions }
                })
            }
            None => return Ok(stale_principal(cleared)),
        },
        Principal::Customer(c) => match state.auth.customer_profile(c.customer_id).await? {
            Some(profile) => json!({
                "success": true,
                "message": "OK",
                "data": { "kind": "customer", "user": profile }
            }),
            None => return Ok(stale_principal(cleared)),
        },
    };

    Ok((StatusCode::OK, Json(body)).into_response())
}

fn stale_principal(cleared: CookieJar) -> Response {
    (
        StatusCode::NOT_FOUND,
        cleared,
        Json(json!({ "success": false, "message": "Account not found" })),
    )
        .into_response()
}
