//! Permission grant rows.
//!
//! A grant is either an *override* scoped to one employee or a *default*
//! scoped to a whole department. At most one row exists per
//! `(subject, permission_key)` pair; absence of both rows means deny.

use serde::Serialize;
use sqlx::FromRow;

/// The permission keys the admin surface manages. The resolver itself treats
/// keys as opaque strings, so an unknown key simply resolves to deny.
pub const PERMISSION_KEYS: &[&str] = &[
    "machines_manage",
    "machines_add",
    "manuals_manage",
    "brochures_manage",
    "products_manage",
    "tracking_manage",
    "account_requests_manage",
    "parts_requests_manage",
    "quotes_manage",
    "customers_manage",
    "permissions_manage",
];

/// Subject of a grant upsert: one employee (override) or one department
/// (default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantSubject {
    Employee(i32),
    Department(i32),
}

/// Key/value pair as read back from either grant table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PermissionGrantRow {
    pub permission_key: String,
    pub allowed: bool,
}
