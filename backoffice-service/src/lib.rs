pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, Request},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::rate_limit::{ip_rate_limit_middleware, IpRateLimiter};
use service_core::middleware::security_headers::security_headers_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{BackofficeConfig, Environment, SwaggerMode};
use crate::middleware::guards::PermissionGuard;
use crate::services::{AdminService, AuthService, PermissionService, TokenService};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::login,
        handlers::auth::employee_login,
        handlers::auth::customer_login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::admin::list_employees,
        handlers::admin::create_employee,
        handlers::admin::update_employee,
        handlers::admin::delete_employee,
        handlers::admin::employee_permissions,
        handlers::admin::set_employee_permission,
        handlers::admin::clear_employee_permission,
        handlers::admin::department_permissions,
        handlers::admin::set_department_permission,
        handlers::admin::list_roles,
        handlers::admin::list_departments,
        handlers::admin::list_customers,
        handlers::admin::get_customer,
        handlers::admin::pending_registrations,
        handlers::admin::approve_registration,
    ),
    components(
        schemas(
            dtos::auth::LoginRequest,
            dtos::auth::LoginKind,
            dtos::admin::CreateEmployeeRequest,
            dtos::admin::UpdateEmployeeRequest,
            dtos::admin::SetPermissionRequest,
            models::EmployeeProfile,
            models::EmployeeListItem,
            models::CustomerProfile,
            models::PendingRegistration,
            models::Department,
            models::Role,
            services::permission::PermissionDecision,
            services::permission::DecisionSource,
        )
    ),
    tags(
        (name = "auth", description = "Session and credential management"),
        (name = "admin", description = "Employee, permission, and registration administration"),
        (name = "observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: BackofficeConfig,
    pub db: sqlx::PgPool,
    pub tokens: TokenService,
    pub auth: AuthService,
    pub permissions: PermissionService,
    pub admin: AdminService,
    pub login_rate_limiter: IpRateLimiter,
    pub ip_rate_limiter: IpRateLimiter,
}

pub fn build_router(state: AppState) -> Router {
    // Login endpoints share one tighter rate limit than the rest of the API.
    let login_limiter = state.login_rate_limiter.clone();
    let login_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/employee/login",
            post(handlers::auth::employee_login),
        )
        .route(
            "/api/auth/customer/login",
            post(handlers::auth::customer_login),
        )
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    let session_routes = Router::new()
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/profile", get(handlers::auth::me));

    // Admin surface: employee auth outermost, then a permission guard per
    // route group.
    let employee_admin = Router::new()
        .route(
            "/api/admin/users/employees",
            get(handlers::admin::list_employees).post(handlers::admin::create_employee),
        )
        .route(
            "/api/admin/users/employees/:id",
            put(handlers::admin::update_employee).delete(handlers::admin::delete_employee),
        )
        .route(
            "/api/admin/users/employees/:id/permissions",
            get(handlers::admin::employee_permissions)
                .put(handlers::admin::set_employee_permission),
        )
        .route(
            "/api/admin/users/employees/:id/permissions/:key",
            delete(handlers::admin::clear_employee_permission),
        )
        .route(
            "/api/admin/departments/:id/permissions",
            get(handlers::admin::department_permissions)
                .put(handlers::admin::set_department_permission),
        )
        .layer(from_fn_with_state(
            PermissionGuard::admin_or(state.clone(), "permissions_manage"),
            middleware::guards::permission_middleware,
        ));

    let customer_admin = Router::new()
        .route(
            "/api/admin/users/customers",
            get(handlers::admin::list_customers),
        )
        .route(
            "/api/admin/users/customers/:id",
            get(handlers::admin::get_customer),
        )
        .layer(from_fn_with_state(
            PermissionGuard::admin_or(state.clone(), "customers_manage"),
            middleware::guards::permission_middleware,
        ));

    let registration_admin = Router::new()
        .route(
            "/api/admin/registrations/pending",
            get(handlers::admin::pending_registrations),
        )
        .route(
            "/api/admin/registrations/:id/approve",
            post(handlers::admin::approve_registration),
        )
        .layer(from_fn_with_state(
            PermissionGuard::admin_or(state.clone(), "account_requests_manage"),
            middleware::guards::permission_middleware,
        ));

    let lookup_admin = Router::new()
        .route("/api/admin/roles", get(handlers::admin::list_roles))
        .route(
            "/api/admin/departments",
            get(handlers::admin::list_departments),
        );

    let admin_routes = Router::new()
        .merge(employee_admin)
        .merge(customer_admin)
        .merge(registration_admin)
        .merge(lookup_admin)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth::employee_auth_middleware,
        ));

    let mut app = Router::new().route("/health", get(health_check));

    let swagger_enabled = match state.config.environment {
        Environment::Dev => true,
        Environment::Prod => state.config.swagger.enabled == SwaggerMode::Public,
    };
    if swagger_enabled {
        app = app.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    }

    let ip_limiter = state.ip_rate_limiter.clone();
    let cors_origins: Vec<HeaderValue> = state
        .config
        .security
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::error!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    app.merge(login_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .with_state(state)
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            // Session cookies cross origins, so credentials must be allowed
            // and origins listed exactly.
            CorsLayer::new()
                .allow_origin(cors_origins)
                .allow_credentials(true)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Database unreachable")
    ),
    tag = "observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    db::health_check(&state.db).await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "OK",
        "data": {
            "service": state.config.service_name,
            "version": state.config.service_version,
        }
    })))
}

/// Role ids allowed through [`middleware::guards::require_role`]; kept here so
/// router construction stays declarative.
pub fn role_set(ids: &[i32]) -> Arc<HashSet<i32>> {
    Arc::new(ids.iter().copied().collect())
}
