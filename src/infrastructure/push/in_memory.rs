use crate::core::errors::{Operation, TransportError};
use crate::core::models::{GroupId, Notification};
use crate::infrastructure::push::{NotificationHandler, PushChannel};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Loopback push channel: `publish` hands a notification to every handler.
///
/// Like a websocket, delivery is not filtered by key; receivers are expected
/// to check `subscription_type` and `element_id` themselves.
#[derive(Clone, Default)]
pub struct InMemoryPushChannel {
    handlers: Arc<RwLock<HashMap<(String, GroupId), NotificationHandler>>>,
    rejecting: Arc<AtomicBool>,
}

impl InMemoryPushChannel {
    pub fn new() -> Self {
        InMemoryPushChannel::default()
    }

    /// Delivers a notification; returns how many handlers received it.
    pub async fn publish(&self, notification: Notification) -> usize {
        let handlers: Vec<NotificationHandler> = self.handlers.read().await.values().cloned().collect();
        debug!(
            "Delivering {} notification for element {} to {} handlers",
            notification.subscription_type,
            notification.element_id,
            handlers.len()
        );
        for handler in &handlers {
            handler(notification.clone());
        }
        handlers.len()
    }

    /// Makes subscribe and unsubscribe fail with a transport error.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    pub async fn is_subscribed(&self, kind: &str, group_id: GroupId) -> bool {
        self.handlers.read().await.contains_key(&(kind.to_string(), group_id))
    }

    fn check_accepting(&self, operation: Operation, group_id: GroupId) -> Result<(), TransportError> {
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(TransportError::new(operation, group_id, "push channel rejected request"));
        }
        Ok(())
    }
}

#[async_trait]
impl PushChannel for InMemoryPushChannel {
    async fn subscribe(
        &self,
        kind: &str,
        group_id: GroupId,
        handler: NotificationHandler,
    ) -> Result<(), TransportError> {
        self.check_accepting(Operation::Subscribe, group_id)?;
        self.handlers.write().await.insert((kind.to_string(), group_id), handler);
        Ok(())
    }

    async fn unsubscribe(&self, kind: &str, group_id: GroupId) -> Result<(), TransportError> {
        self.check_accepting(Operation::Unsubscribe, group_id)?;
        self.handlers.write().await.remove(&(kind.to_string(), group_id));
        Ok(())
    }
}
