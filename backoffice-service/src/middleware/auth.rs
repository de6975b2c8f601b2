//! Session authentication middleware and the extractors handlers use to get
//! at the verified claims.
//!
//! A rejected credential clears the session cookie in the same response, so
//! browsers holding an expired or forged cookie stop resending it.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use serde_json::json;

use crate::services::token::{CustomerClaims, EmployeeClaims};
use crate::utils::cookie::{clear_session_cookie, extract_token};
use crate::AppState;

fn unauthorized(state: &AppState, message: &str) -> Response {
    let jar = CookieJar::new().add(clear_session_cookie(&state.config));
    (
        StatusCode::UNAUTHORIZED,
        jar,
        Json(json!({ "success": false, "message": message })),
    )
        .into_response()
}

/// Require a valid staff credential; stores [`EmployeeClaims`] in request
/// extensions for the extractors below.
pub async fn employee_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&jar, request.headers()) else {
        return unauthorized(&state, "Authentication required");
    };

    match state.tokens.decode_employee(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(_) => unauthorized(&state, "Invalid or expired token"),
    }
}

/// Require a valid customer credential.
pub async fn customer_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = extract_token(&jar, request.headers()) else {
        return unauthorized(&state, "Authentication required");
    };

    match state.tokens.decode_customer(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(_) => unauthorized(&state, "Invalid or expired token"),
    }
}

/// Extractor for the staff claims placed by [`employee_auth_middleware`].
pub struct AuthEmployee(pub EmployeeClaims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthEmployee {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<EmployeeClaims>()
            .cloned()
            .map(AuthEmployee)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "success": false, "message": "Authentication required" })),
                )
                    .into_response()
            })
    }
}

/// Extractor for the customer claims placed by [`customer_auth_middleware`].
pub struct AuthCustomer(pub CustomerClaims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthCustomer {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CustomerClaims>()
            .cloned()
            .map(AuthCustomer)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "success": false, "message": "Authentication required" })),
                )
                    .into_response()
            })
    }
}
