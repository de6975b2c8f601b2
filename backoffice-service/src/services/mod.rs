pub mod admin;
pub mod auth;
pub mod error;
pub mod permission;
pub mod token;

pub use admin::AdminService;
pub use auth::{AuthService, LoginSuccess};
pub use error::ServiceError;
pub use permission::{DecisionSource, PermissionDecision, PermissionService};
pub use token::{CustomerClaims, EmployeeClaims, Principal, TokenLifetime, TokenService};
