//! External account-holder (customer) records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Full customer row, including the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub landline: Option<String>,
    pub username: String,
    pub password: String,
    pub verification_status: String,
    pub approved: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub verified_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer shape safe for API responses.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CustomerProfile {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub username: String,
    pub verification_status: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Customer> for CustomerProfile {
    fn from(c: Customer) -> Self {
        Self {
            customer_id: c.customer_id,
            first_name: c.first_name,
            last_name: c.last_name,
            middle_name: c.middle_name,
            company_name: c.company_name,
            email: c.email,
            phone: c.phone,
            username: c.username,
            verification_status: c.verification_status,
            approved: c.approved,
            created_at: c.created_at,
        }
    }
}

/// Registration awaiting administrative approval.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct PendingRegistration {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub company_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub landline: Option<String>,
    pub username: String,
    pub verification_status: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}
