use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Department {
    pub dept_id: i32,
    pub dept_name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Role {
    pub role_id: i32,
    pub role_name: String,
}
