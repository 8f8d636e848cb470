use super::GroupId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshEntry {
    pub id: String,
    pub group_id: GroupId,
    pub action: String,
    /// Snapshot version current after the action, if any
    pub version: Option<u64>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
