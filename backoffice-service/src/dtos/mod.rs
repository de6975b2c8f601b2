pub mod admin;
pub mod auth;

pub use admin::{CreateEmployeeRequest, SetPermissionRequest, UpdateEmployeeRequest};
pub use auth::{LoginKind, LoginRequest};
