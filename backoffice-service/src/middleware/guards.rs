//! Authorization guards layered inside the employee auth middleware.
//!
//! Both guards read the [`EmployeeClaims`] that `employee_auth_middleware`
//! put in request extensions; a missing claim means the guard was layered
//! outside authentication, which is answered with 401 rather than a panic.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

use crate::services::error::ServiceError;
use crate::services::token::EmployeeClaims;
use crate::AppState;

fn authentication_required() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": "Authentication required" })),
    )
        .into_response()
}

fn access_denied() -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "success": false, "message": "Access denied" })),
    )
        .into_response()
}

/// Allow only employees whose role id is in `allowed`. Layer with
/// `from_fn_with_state` and the role set as the state.
pub async fn require_role(
    State(allowed): State<Arc<HashSet<i32>>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(claims) = request.extensions().get::<EmployeeClaims>() else {
        return authentication_required();
    };

    if !allowed.contains(&claims.role_id) {
        return access_denied();
    }

    next.run(request).await
}

/// Permission-key guard. `require` resolves the key through the grant tables
/// only; `admin_or` lets admin-department members through without a lookup.
#[derive(Clone)]
pub struct PermissionGuard {
    state: AppState,
    key: &'static str,
    admin_bypass: bool,
}

impl PermissionGuard {
    pub fn require(state: AppState, key: &'static str) -> Self {
        Self {
            state,
            key,
            admin_bypass: false,
        }
    }

    pub fn admin_or(state: AppState, key: &'static str) -> Self {
        Self {
            state,
            key,
            admin_bypass: true,
        }
    }

    pub async fn handle(&self, request: Request, next: Next) -> Response {
        let Some(claims) = request.extensions().get::<EmployeeClaims>().cloned() else {
            return authentication_required();
        };

        let decision = if self.admin_bypass {
            self.state
                .permissions
                .check_admin_or_permission(claims.employee_id, claims.department_id, self.key)
                .await
        } else {
            self.state
                .permissions
                .check(claims.employee_id, claims.department_id, self.key)
                .await
        };

        match decision {
            Ok(decision) if decision.allowed => next.run(request).await,
            Ok(_) => access_denied(),
            Err(e) => error_response(e),
        }
    }
}

/// Middleware entry point; layer with `from_fn_with_state` and the guard as
/// the state.
pub async fn permission_middleware(
    State(guard): State<PermissionGuard>,
    request: Request,
    next: Next,
) -> Response {
    guard.handle(request, next).await
}

fn error_response(err: ServiceError) -> Response {
    service_core::error::AppError::from(err).into_response()
}
