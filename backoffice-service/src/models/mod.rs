pub mod customer;
pub mod department;
pub mod employee;
pub mod permission;

pub use customer::{Customer, CustomerProfile, PendingRegistration};
pub use department::{Department, Role};
pub use employee::{Employee, EmployeeListItem, EmployeeProfile};
pub use permission::{GrantSubject, PermissionGrantRow, PERMISSION_KEYS};
