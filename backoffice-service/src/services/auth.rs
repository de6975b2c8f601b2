//! Login orchestration for the two principal kinds.
//!
//! A login request either names its kind or lets the orchestrator try
//! employees first and fall back to customers. The fallback must not leak
//! which table matched: whatever the employee attempt failed on, the
//! response reflects only the customer path's outcome.

use sqlx::PgPool;
use std::collections::BTreeMap;

use crate::dtos::{LoginKind, LoginRequest};
use crate::models::{Customer, CustomerProfile, Employee, EmployeeProfile};
use crate::services::error::ServiceError;
use crate::services::permission::PermissionService;
use crate::services::token::{TokenLifetime, TokenService};
use crate::utils::password::{verify_password, Password, PasswordHashString};

/// Outcome of a successful login. The token goes into the cookie, never the
/// body; the employee variant also carries the permission snapshot handed to
/// the frontend.
#[derive(Debug)]
pub enum LoginSuccess {
    Employee {
        profile: EmployeeProfile,
        permissions: BTreeMap<String, bool>,
        token: String,
        remember: bool,
    },
    Customer {
        profile: CustomerProfile,
        token: String,
        remember: bool,
    },
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    tokens: TokenService,
    permissions: PermissionService,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: TokenService, permissions: PermissionService) -> Self {
        Self {
            pool,
            tokens,
            permissions,
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginSuccess, ServiceError> {
        match request.kind {
            Some(LoginKind::Employee) => self.login_employee(request).await,
            Some(LoginKind::Customer) => self.login_customer(request).await,
            None => {
                // Employee first. Any failure on that path is swallowed and
                // the customer path's verdict is the one surfaced, so a
                // probing client cannot tell which table a username lives in.
                match self.login_employee(request).await {
                    Ok(success) => Ok(success),
                    Err(_) => self.login_customer(request).await,
                }
            }
        }
    }

    pub async fn login_employee(
        &self,
        request: &LoginRequest,
    ) -> Result<LoginSuccess, ServiceError> {
        // Login accepts username or email, case-insensitively.
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employee WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
        )
        .bind(&request.username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

        check_password(&request.password, &employee.password)?;

        let dept_name = self
            .permissions
            .department_name(employee.department_id)
            .await?
            .unwrap_or_default();

        let permissions = self
            .permissions
            .snapshot(employee.employee_id, employee.department_id, &dept_name)
            .await?;

        let token = self.tokens.issue_employee(
            employee.employee_id,
            &employee.username,
            employee.role_id,
            employee.department_id,
            lifetime(request.remember),
        )?;

        self.touch_employee(employee.employee_id);

        Ok(LoginSuccess::Employee {
            profile: EmployeeProfile {
                employee_id: employee.employee_id,
                firstname: employee.firstname,
                lastname: employee.lastname,
                middlename: employee.middlename,
                role_id: employee.role_id,
                department_id: employee.department_id,
                department: dept_name,
                username: employee.username,
                email: employee.email,
                created_at: employee.created_at,
                updated_at: employee.updated_at,
            },
            permissions,
            token,
            remember: request.remember,
        })
    }

    pub async fn login_customer(
        &self,
        request: &LoginRequest,
    ) -> Result<LoginSuccess, ServiceError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customer_user WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
        )
        .bind(&request.username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

        check_password(&request.password, &customer.password)?;

        // Gating order: password first, then approval, then verification.
        if !customer.approved {
            return Err(ServiceError::AccountNotApproved);
        }
        if customer.verification_status != "approved" {
            return Err(ServiceError::AccountNotVerified);
        }

        let token = self.tokens.issue_customer(
            customer.customer_id,
            &customer.username,
            &customer.email,
            lifetime(request.remember),
        )?;

        self.touch_customer(customer.customer_id);

        Ok(LoginSuccess::Customer {
            profile: CustomerProfile::from(customer),
            token,
            remember: request.remember,
        })
    }

    /// Current employee profile for an authenticated session. `None` when the
    /// backing row has been deleted since the token was issued.
    pub async fn employee_profile(
        &self,
        employee_id: i32,
    ) -> Result<Option<EmployeeProfile>, ServiceError> {
        let profile = sqlx::query_as::<_, EmployeeProfile>(
            r#"
            SELECT e.employee_id, e.firstname, e.lastname, e.middlename,
                   e.role_id, e.department_id,
                   COALESCE(d.dept_name, '') AS department,
                   e.username, e.email, e.created_at, e.updated_at
            FROM employee e
            LEFT JOIN department d ON d.dept_id = e.department_id
            WHERE e.employee_id = $1
            "#,
        )
        .bind(employee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Current customer profile for an authenticated session.
    pub async fn customer_profile(
        &self,
        customer_id: i32,
    ) -> Result<Option<CustomerProfile>, ServiceError> {
        let profile = sqlx::query_as::<_, CustomerProfile>(
            r#"
            SELECT customer_id, first_name, last_name, middle_name, company_name,
                   email, phone, username, verification_status, approved, created_at
            FROM customer_user
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    fn touch_employee(&self, employee_id: i32) {
        let pool = self.pool.clone();
        // Best effort; a failed touch must not fail the login.
        tokio::spawn(async move {
            if let Err(e) =
                sqlx::query("UPDATE employee SET updated_at = NOW() WHERE employee_id = $1")
                    .bind(employee_id)
                    .execute(&pool)
                    .await
            {
                tracing::warn!(employee_id, error = %e, "failed to touch employee record");
            }
        });
    }

    fn touch_customer(&self, customer_id: i32) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            if let Err(e) =
                sqlx::query("UPDATE customer_user SET updated_at = NOW() WHERE customer_id = $1")
                    .bind(customer_id)
                    .execute(&pool)
                    .await
            {
                tracing::warn!(customer_id, error = %e, "failed to touch customer record");
            }
        });
    }
}

fn lifetime(remember: bool) -> TokenLifetime {
    if remember {
        TokenLifetime::Remember
    } else {
        TokenLifetime::Session
    }
}

fn check_password(candidate: &str, stored_hash: &str) -> Result<(), ServiceError> {
    let password = Password::new(candidate.to_string());
    let hash = PasswordHashString::new(stored_hash.to_string());
    verify_password(&password, &hash).map_err(|_| ServiceError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::password::hash_password;

    #[test]
    fn lifetime_follows_remember_flag() {
        assert_eq!(lifetime(false), TokenLifetime::Session);
        assert_eq!(lifetime(true), TokenLifetime::Remember);
    }

    #[test]
    fn check_password_maps_mismatch_to_invalid_credentials() {
        let hash = hash_password(&Password::new("secret-pw".to_string())).unwrap();

        assert!(check_password("secret-pw", hash.as_str()).is_ok());
        assert!(matches!(
            check_password("other-pw", hash.as_str()),
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            check_password("secret-pw", "corrupt-hash"),
            Err(ServiceError::InvalidCredentials)
        ));
    }
}
