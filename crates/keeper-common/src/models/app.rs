//! Application (token-signing tenant) — read-mostly table.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct App {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub secret: String,
}
