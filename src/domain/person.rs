use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One real person (§3 "Person"). `(name, disambiguation_key)` is unique.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct PersonRow {
    pub id: i64,
    pub name: String,
    pub clean_name: String,
    pub tel: Option<String>,
    pub email: Option<String>,
    pub disambiguation_key: i32,
    #[sqlx(json)]
    pub attributes: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
