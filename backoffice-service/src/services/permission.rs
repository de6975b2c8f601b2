//! Per-employee permission resolution.
//!
//! Precedence: an employee-level override beats the department default,
//! which beats the implicit deny. Members of the admin department skip
//! the lookup entirely.

use serde::Serialize;
use sqlx::PgPool;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::{GrantSubject, PermissionGrantRow, PERMISSION_KEYS};
use crate::services::error::ServiceError;

/// Which rule produced the decision; returned alongside the verdict so the
/// admin UI can show where an employee's access comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    /// Admin department bypass.
    Admin,
    /// Employee-level override row.
    Override,
    /// Department default row.
    Department,
    /// No row either way.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PermissionDecision {
    pub allowed: bool,
    pub source: DecisionSource,
}

impl PermissionDecision {
    pub const ADMIN: Self = Self {
        allowed: true,
        source: DecisionSource::Admin,
    };

    /// Fold the two optional grant rows into a verdict. Pure so the
    /// precedence rule can be tested without a database.
    pub fn merge(override_allowed: Option<bool>, department_allowed: Option<bool>) -> Self {
        match (override_allowed, department_allowed) {
            (Some(allowed), _) => Self {
                allowed,
                source: DecisionSource::Override,
            },
            (None, Some(allowed)) => Self {
                allowed,
                source: DecisionSource::Department,
            },
            (None, None) => Self {
                allowed: false,
                source: DecisionSource::None,
            },
        }
    }
}

/// Case-insensitive match on the department name. Renaming the department
/// away from "admin" silently revokes the bypass.
pub fn is_admin_department(dept_name: &str) -> bool {
    dept_name.eq_ignore_ascii_case("admin")
}

#[derive(Clone)]
pub struct PermissionService {
    pool: PgPool,
}

impl PermissionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Name of the employee's department, if any. Used by the guards to apply
    /// the admin bypass before touching grant rows.
    pub async fn department_name(&self, department_id: i32) -> Result<Option<String>, ServiceError> {
        let name = sqlx::query_scalar::<_, String>(
            "SELECT dept_name FROM department WHERE dept_id = $1",
        )
        .bind(department_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ServiceError::PermissionCheckFailed)?;

        Ok(name)
    }

    /// Resolve one permission key for one employee. Lookup failure is an
    /// error, never a deny.
    pub async fn check(
        &self,
        employee_id: i32,
        department_id: i32,
        permission_key: &str,
    ) -> Result<PermissionDecision, ServiceError> {
        let row = sqlx::query_as::<_, (Option<bool>, Option<bool>)>(
            r#"
            SELECT
                (SELECT allowed FROM employee_permission
                 WHERE employee_id = $1 AND permission_key = $3),
                (SELECT allowed FROM department_permission
                 WHERE department_id = $2 AND permission_key = $3)
            "#,
        )
        .bind(employee_id)
        .bind(department_id)
        .bind(permission_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(employee_id, department_id, permission_key, error = %e, "grant lookup failed");
            ServiceError::PermissionCheckFailed(e)
        })?;

        Ok(PermissionDecision::merge(row.0, row.1))
    }

    /// Resolve with the admin bypass applied first: members of the admin
    /// department get an allow with `admin` provenance before any grant row
    /// is consulted, so even an explicit denying override cannot lock an
    /// admin out. Everyone else falls through to [`Self::check`].
    pub async fn check_admin_or_permission(
        &self,
        employee_id: i32,
        department_id: i32,
        permission_key: &str,
    ) -> Result<PermissionDecision, ServiceError> {
        if let Some(name) = self.department_name(department_id).await? {
            if is_admin_department(&name) {
                return Ok(PermissionDecision::ADMIN);
            }
        }

        self.check(employee_id, department_id, permission_key).await
    }

    /// Effective allow/deny for every known key, as handed to the frontend at
    /// login. Admin departments get a blanket allow map.
    pub async fn snapshot(
        &self,
        employee_id: i32,
        department_id: i32,
        dept_name: &str,
    ) -> Result<BTreeMap<String, bool>, ServiceError> {
        if is_admin_department(dept_name) {
            return Ok(PERMISSION_KEYS
                .iter()
                .map(|k| (k.to_string(), true))
                .collect());
        }

        let rows = sqlx::query_as::<_, (String, Option<bool>, Option<bool>)>(
            r#"
            SELECT
                k.permission_key,
                ep.allowed,
                dp.allowed
            FROM unnest($3::text[]) AS k(permission_key)
            LEFT JOIN employee_permission ep
                ON ep.employee_id = $1 AND ep.permission_key = k.permission_key
            LEFT JOIN department_permission dp
                ON dp.department_id = $2 AND dp.permission_key = k.permission_key
            "#,
        )
        .bind(employee_id)
        .bind(department_id)
        .bind(
            PERMISSION_KEYS
                .iter()
                .map(|k| k.to_string())
                .collect::<Vec<String>>(),
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::PermissionCheckFailed)?;

        Ok(rows
            .into_iter()
            .map(|(key, ov, dept)| {
                let decision = PermissionDecision::merge(ov, dept);
                (key, decision.allowed)
            })
            .collect())
    }

    /// Upsert one grant row for an employee or a department.
    pub async fn set_grant(
        &self,
        subject: GrantSubject,
        permission_key: &str,
        allowed: bool,
    ) -> Result<(), ServiceError> {
        match subject {
            GrantSubject::Employee(employee_id) => {
                sqlx::query(
                    r#"
                    INSERT INTO employee_permission (employee_id, permission_key, allowed)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (employee_id, permission_key)
                    DO UPDATE SET allowed = EXCLUDED.allowed, updated_at = NOW()
                    "#,
                )
                .bind(employee_id)
                .bind(permission_key)
                .bind(allowed)
                .execute(&self.pool)
                .await?;
            }
            GrantSubject::Department(department_id) => {
                sqlx::query(
                    r#"
                    INSERT INTO department_permission (department_id, permission_key, allowed)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (department_id, permission_key)
                    DO UPDATE SET allowed = EXCLUDED.allowed, updated_at = NOW()
                    "#,
                )
                .bind(department_id)
                .bind(permission_key)
                .bind(allowed)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }

    /// Remove an employee-level override so the department default applies
    /// again.
    pub async fn clear_override(
        &self,
        employee_id: i32,
        permission_key: &str,
    ) -> Result<bool, ServiceError> {
        let result = sqlx::query(
            "DELETE FROM employee_permission WHERE employee_id = $1 AND permission_key = $2",
        )
        .bind(employee_id)
        .bind(permission_key)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All grant rows for one employee (their overrides only).
    pub async fn employee_grants(
        &self,
        employee_id: i32,
    ) -> Result<Vec<PermissionGrantRow>, ServiceError> {
        let rows = sqlx::query_as::<_, PermissionGrantRow>(
            r#"
            SELECT permission_key, allowed
            FROM employee_permission
            WHERE employee_id = $1
            ORDER BY permission_key
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// All default grant rows for one department.
    pub async fn department_grants(
        &self,
        department_id: i32,
    ) -> Result<Vec<PermissionGrantRow>, ServiceError> {
        let rows = sqlx::query_as::<_, PermissionGrantRow>(
            r#"
            SELECT permission_key, allowed
            FROM department_permission
            WHERE department_id = $1
            ORDER BY permission_key
            "#,
        )
        .bind(department_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
