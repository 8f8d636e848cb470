pub mod in_memory;

use crate::core::errors::TransportError;
use crate::core::models::{GroupId, Notification};
use async_trait::async_trait;
use std::sync::Arc;

pub type NotificationHandler = Arc<dyn Fn(Notification) + Send + Sync>;

/// Push notifications keyed by (entity kind, element id).
#[async_trait]
pub trait PushChannel: Send + Sync {
    async fn subscribe(&self, kind: &str, group_id: GroupId, handler: NotificationHandler)
    -> Result<(), TransportError>;
    async fn unsubscribe(&self, kind: &str, group_id: GroupId) -> Result<(), TransportError>;
}
