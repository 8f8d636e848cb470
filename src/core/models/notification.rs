use super::{GroupId, TransactionId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Payload delivered by the push channel.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Notification {
    pub subscription_type: String,
    #[serde(default)]
    pub transaction_id: Option<TransactionId>,
    pub element_id: GroupId,
}
