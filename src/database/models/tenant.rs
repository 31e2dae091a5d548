use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub tenant_id: i64,
    pub name: String,
    pub tenant_type_id: Option<i16>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub active: bool,
    pub created_by_id: Option<i64>,
    pub created_dt: DateTime<Utc>,
    pub last_updated_dt: DateTime<Utc>,
}
