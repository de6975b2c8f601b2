//! Admin surface: employee CRUD, permission grants, lookup tables, and the
//! customer approval flow. Every route here sits behind employee auth plus a
//! permission guard, wired up in the router.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use service_core::error::AppError;

use crate::dtos::{CreateEmployeeRequest, SetPermissionRequest, UpdateEmployeeRequest};
use crate::middleware::auth::AuthEmployee;
use crate::models::GrantSubject;
use crate::utils::validation::ValidatedJson;
use crate::AppState;

fn ok(message: &str, data: serde_json::Value) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": message, "data": data })),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/api/admin/users/employees",
    responses((status = 200, description = "All employees with role and department names")),
    tag = "admin"
)]
pub async fn list_employees(State(state): State<AppState>) -> Result<Response, AppError> {
    let employees = state.admin.list_employees().await?;
    Ok(ok("OK", json!(employees)))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created"),
        (status = 422, description = "Validation failed"),
    ),
    tag = "admin"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateEmployeeRequest>,
) -> Result<Response, AppError> {
    let employee_id = state.admin.create_employee(&request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Employee created",
            "data": { "employee_id": employee_id }
        })),
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/users/employees/{id}",
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 404, description = "No such employee"),
    ),
    tag = "admin"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateEmployeeRequest>,
) -> Result<Response, AppError> {
    if !state.admin.update_employee(id, &request).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Employee not found")));
    }
    Ok(ok("Employee updated", json!({ "employee_id": id })))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/employees/{id}",
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 404, description = "No such employee"),
    ),
    tag = "admin"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    if !state.admin.delete_employee(id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("Employee not found")));
    }
    Ok(ok("Employee deleted", json!({ "employee_id": id })))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/employees/{id}/permissions",
    responses((status = 200, description = "Employee's override grant rows")),
    tag = "admin"
)]
pub async fn employee_permissions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let grants = state.permissions.employee_grants(id).await?;
    Ok(ok("OK", json!(grants)))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/employees/{id}/permissions",
    request_body = SetPermissionRequest,
    responses((status = 200, description = "Override grant upserted")),
    tag = "admin"
)]
pub async fn set_employee_permission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SetPermissionRequest>,
) -> Result<Response, AppError> {
    state
        .permissions
        .set_grant(
            GrantSubject::Employee(id),
            &request.permission_key,
            request.allowed,
        )
        .await?;
    Ok(ok("Permission updated", json!(null)))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/employees/{id}/permissions/{key}",
    responses(
        (status = 200, description = "Override removed; department default applies"),
        (status = 404, description = "No override existed"),
    ),
    tag = "admin"
)]
pub async fn clear_employee_permission(
    State(state): State<AppState>,
    Path((id, key)): Path<(i32, String)>,
) -> Result<Response, AppError> {
    if !state.permissions.clear_override(id, &key).await? {
        return Err(AppError::NotFound(anyhow::anyhow!("No such override")));
    }
    Ok(ok("Override removed", json!(null)))
}

#[utoipa::path(
    get,
    path = "/api/admin/departments/{id}/permissions",
    responses((status = 200, description = "Department's default grant rows")),
    tag = "admin"
)]
pub async fn department_permissions(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let grants = state.permissions.department_grants(id).await?;
    Ok(ok("OK", json!(grants)))
}

#[utoipa::path(
    put,
    path = "/api/admin/departments/{id}/permissions",
    request_body = SetPermissionRequest,
    responses((status = 200, description = "Department default upserted")),
    tag = "admin"
)]
pub async fn set_department_permission(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<SetPermissionRequest>,
) -> Result<Response, AppError> {
    state
        .permissions
        .set_grant(
            GrantSubject::Department(id),
            &request.permission_key,
            request.allowed,
        )
        .await?;
    Ok(ok("Permission updated", json!(null)))
}

#[utoipa::path(
    get,
    path = "/api/admin/roles",
    responses((status = 200, description = "All roles")),
    tag = "admin"
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Response, AppError> {
    let roles = state.admin.list_roles().await?;
    Ok(ok("OK", json!(roles)))
}

#[utoipa::path(
    get,
    path = "/api/admin/departments",
    responses((status = 200, description = "All departments")),
    tag = "admin"
)]
pub async fn list_departments(State(state): State<AppState>) -> Result<Response, AppError> {
    let departments = state.admin.list_departments().await?;
    Ok(ok("OK", json!(departments)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/customers",
    responses((status = 200, description = "All customer accounts")),
    tag = "admin"
)]
pub async fn list_customers(State(state): State<AppState>) -> Result<Response, AppError> {
    let customers = state.admin.list_customers().await?;
    Ok(ok("OK", json!(customers)))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/customers/{id}",
    responses(
        (status = 200, description = "One customer account"),
        (status = 404, description = "No such customer"),
    ),
    tag = "admin"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    match state.admin.get_customer(id).await? {
        Some(customer) => Ok(ok("OK", json!(customer))),
        None => Err(AppError::NotFound(anyhow::anyhow!("Customer not found"))),
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/registrations/pending",
    responses((status = 200, description = "Registrations awaiting approval")),
    tag = "admin"
)]
pub async fn pending_registrations(State(state): State<AppState>) -> Result<Response, AppError> {
    let pending = state.admin.pending_registrations().await?;
    Ok(ok("OK", json!(pending)))
}

#[utoipa::path(
    post,
    path = "/api/admin/registrations/{id}/approve",
    responses(
        (status = 200, description = "Registration approved"),
        (status = 404, description = "No pending registration with that id"),
    ),
    tag = "admin"
)]
pub async fn approve_registration(
    State(state): State<AppState>,
    AuthEmployee(claims): AuthEmployee,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    if !state
        .admin
        .approve_registration(id, claims.employee_id)
        .await?
    {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "No pending registration found"
        )));
    }
    Ok(ok("Registration approved", json!({ "customer_id": id })))
}
