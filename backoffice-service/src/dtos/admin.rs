use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::PERMISSION_KEYS;

fn validate_permission_key(key: &str) -> Result<(), ValidationError> {
    if PERMISSION_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_permission_key")
            .with_message("unknown permission key".into()))
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "firstname is required"))]
    pub firstname: String,

    #[validate(length(min = 1, max = 100, message = "lastname is required"))]
    pub lastname: String,

    pub middlename: Option<String>,

    #[validate(email(message = "valid email is required"))]
    pub email: String,

    #[validate(length(min = 3, max = 50, message = "username must be 3-50 characters"))]
    pub username: String,

    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,

    pub role_id: i32,
    pub department_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 100, message = "firstname must not be empty"))]
    pub firstname: Option<String>,

    #[validate(length(min = 1, max = 100, message = "lastname must not be empty"))]
    pub lastname: Option<String>,

    pub middlename: Option<String>,

    #[validate(email(message = "valid email is required"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,

    pub role_id: Option<i32>,
    pub department_id: Option<i32>,
}

/// Grant upsert body; the subject (employee or department) comes from the
/// route path.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetPermissionRequest {
    #[validate(custom(function = validate_permission_key))]
    pub permission_key: String,

    pub allowed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_permission_key_passes() {
        let req = SetPermissionRequest {
            permission_key: "quotes_manage".to_string(),
            allowed: true,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn unknown_permission_key_fails() {
        let req = SetPermissionRequest {
            permission_key: "does_not_exist".to_string(),
            allowed: true,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn short_password_fails_on_create() {
        let req = CreateEmployeeRequest {
            firstname: "Jane".to_string(),
            lastname: "Doe".to_string(),
            middlename: None,
            email: "jane@example.com".to_string(),
            username: "jdoe".to_string(),
            password: "short".to_string(),
            role_id: 1,
            department_id: 1,
        };
        assert!(req.validate().is_err());
    }
}
