//! Queries behind the admin surface: employee CRUD, lookup tables, and the
//! customer approval flow.

use sqlx::PgPool;

use crate::dtos::{CreateEmployeeRequest, UpdateEmployeeRequest};
use crate::models::{CustomerProfile, Department, EmployeeListItem, PendingRegistration, Role};
use crate::services::error::ServiceError;
use crate::utils::password::{hash_password, Password};

#[derive(Clone)]
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_employees(&self) -> Result<Vec<EmployeeListItem>, ServiceError> {
        let rows = sqlx::query_as::<_, EmployeeListItem>(
            r#"
            SELECT e.employee_id, e.firstname, e.lastname, e.middlename,
                   e.username, e.email,
                   e.role_id, r.role_name,
                   e.department_id, d.dept_name,
                   e.created_at, e.updated_at
            FROM employee e
            LEFT JOIN roles r ON r.role_id = e.role_id
            LEFT JOIN department d ON d.dept_id = e.department_id
            ORDER BY e.employee_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn create_employee(
        &self,
        request: &CreateEmployeeRequest,
    ) -> Result<i32, ServiceError> {
        let hash = hash_password(&Password::new(request.password.clone()))?;

        let employee_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO employee
                (firstname, lastname, middlename, role_id, department_id,
                 username, password, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING employee_id
            "#,
        )
        .bind(&request.firstname)
        .bind(&request.lastname)
        .bind(&request.middlename)
        .bind(request.role_id)
        .bind(request.department_id)
        .bind(&request.username)
        .bind(hash.into_string())
        .bind(&request.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(employee_id)
    }

    /// Partial update; omitted fields keep their current value. A supplied
    /// password is re-hashed before storage.
    pub async fn update_employee(
        &self,
        employee_id: i32,
        request: &UpdateEmployeeRequest,
    ) -> Result<bool, ServiceError> {
        let password_hash = match &request.password {
            Some(pw) => Some(hash_password(&Password::new(pw.clone()))?),
            None => None,
        };

        let result = sqlx::query(
            r#"
            UPDATE employee SET
                firstname = COALESCE($2, firstname),
                lastname = COALESCE($3, lastname),
                middlename = COALESCE($4, middlename),
                email = COALESCE($5, email),
                password = COALESCE($6, password),
                role_id = COALESCE($7, role_id),
                department_id = COALESCE($8, department_id),
                updated_at = NOW()
            WHERE employee_id = $1
            "#,
        )
        .bind(employee_id)
        .bind(&request.firstname)
        .bind(&request.lastname)
        .bind(&request.middlename)
        .bind(&request.email)
        .bind(password_hash.as_ref().map(|h| h.as_str().to_string()))
        .bind(request.role_id)
        .bind(request.department_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_employee(&self, employee_id: i32) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM employee WHERE employee_id = $1")
            .bind(employee_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, ServiceError> {
        let rows =
            sqlx::query_as::<_, Role>("SELECT role_id, role_name FROM roles ORDER BY role_id")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, ServiceError> {
        let rows = sqlx::query_as::<_, Department>(
            "SELECT dept_id, dept_name FROM department ORDER BY dept_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_customers(&self) -> Result<Vec<CustomerProfile>, ServiceError> {
        let rows = sqlx::query_as::<_, CustomerProfile>(
            r#"
            SELECT customer_id, first_name, last_name, middle_name, company_name,
                   email, phone, username, verification_status, approved, created_at
            FROM customer_user
            ORDER BY customer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_customer(
        &self,
        customer_id: i32,
    ) -> Result<Option<CustomerProfile>, ServiceError> {
        let row = sqlx::query_as::<_, CustomerProfile>(
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

        Ok(row)
    }

    pub async fn pending_registrations(&self) -> Result<Vec<PendingRegistration>, ServiceError> {
        let rows = sqlx::query_as::<_, PendingRegistration>(
            r#"
            SELECT customer_id, first_name, last_name, middle_name, company_name,
                   email, phone, landline, username, verification_status, approved,
                   created_at
            FROM customer_user
            WHERE approved = false
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Approve a pending registration, recording who approved it.
    pub async fn approve_registration(
        &self,
        customer_id: i32,
        approved_by: i32,
    ) -> Result<bool, ServiceError> {
        let result = sqlx::query(
            r#"
            UPDATE customer_user SET
                approved = true,
                verification_status = 'approved',
                verified_at = NOW(),
                verified_by = $2,
                updated_at = NOW()
            WHERE customer_id = $1 AND approved = false
            "#,
        )
        .bind(customer_id)
        .bind(approved_by)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
