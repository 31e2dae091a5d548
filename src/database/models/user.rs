use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub tenant_id: Option<i64>,
    pub user_type_id: i16,
    pub user_name: String,
    // Hash only; never serialized into responses
    #[serde(skip_serializing, default)]
    pub password: String,
    pub email_id: String,
    pub user_status_id: Option<i16>,
    pub active: bool,
    pub created_by_id: Option<i64>,
    pub created_dt: DateTime<Utc>,
    pub last_access: Option<DateTime<Utc>>,
    pub last_updated_dt: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_never_serialized() {
        let user = User {
            user_id: 1,
            tenant_id: Some(1),
            user_type_id: 4,
            user_name: "jane".to_string(),
            password: "$2b$12$hash".to_string(),
            email_id: "jane@example.com".to_string(),
            user_status_id: Some(1),
            active: true,
            created_by_id: None,
            created_dt: Utc::now(),
            last_access: None,
            last_updated_dt: Utc::now(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["email_id"], "jane@example.com");
    }
}
