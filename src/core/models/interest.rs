use super::GroupId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Proof of one consumer's interest in a group's live updates. Handed out by
/// `acquire` and given back, once, to `release`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct InterestHandle {
    pub group_id: GroupId,
    pub id: u64,
}
