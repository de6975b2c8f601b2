//! Staff (employee) records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Full employee row, including the password hash. Never serialized; the
/// profile types below are what leaves the service.
#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub employee_id: i32,
    pub firstname: String,
    pub lastname: String,
    pub middlename: Option<String>,
    pub role_id: i32,
    pub department_id: i32,
    pub username: String,
    pub password: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee joined with its department name, safe for API responses.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EmployeeProfile {
    pub employee_id: i32,
    pub firstname: String,
    pub lastname: String,
    pub middlename: Option<String>,
    pub role_id: i32,
    pub department_id: i32,
    pub department: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row shape for the admin employee listing (role and department names may be
/// missing when the referenced row was deleted).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct EmployeeListItem {
    pub employee_id: i32,
    pub firstname: String,
    pub lastname: String,
    pub middlename: Option<String>,
    pub username: String,
    pub email: String,
    pub role_id: i32,
    pub role_name: Option<String>,
    pub department_id: i32,
    pub dept_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
