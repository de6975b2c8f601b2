pub mod auth;
pub mod guards;

pub use auth::{customer_auth_middleware, employee_auth_middleware, AuthCustomer, AuthEmployee};
pub use guards::{require_role, PermissionGuard};
