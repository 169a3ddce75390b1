use crate::domain::{ChatId, Subscriber};
use crate::store::{StoreError, SubscriberStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// Process-local `SubscriberStore`. Nothing survives a restart.
#[derive(Default)]
pub struct InMemorySubscriberStore {
    chats: Mutex<BTreeMap<ChatId, Subscriber>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    async fn add(&self, chat_id: ChatId) -> Result<Subscriber, StoreError> {
        let mut chats = self.chats.lock().await;
        if chats.contains_key(&chat_id) {
            return Err(StoreError::Conflict(chat_id));
        }
        let subscriber = Subscriber {
            chat_id,
            created_at: Utc::now(),
        };
        chats.insert(chat_id, subscriber.clone());
        Ok(subscriber)
    }

    async fn remove(&self, chat_id: ChatId) -> Result<bool, StoreError> {
        Ok(self.chats.lock().await.remove(&chat_id).is_some())
    }

    async fn get(&self, chat_id: ChatId) -> Result<Subscriber, StoreError> {
        self.chats
            .lock()
            .await
            .get(&chat_id)
            .cloned()
            .ok_or(StoreError::NotFound(chat_id))
    }

    async fn list(&self) -> Result<Vec<Subscriber>, StoreError> {
        let mut subscribers: Vec<Subscriber> =
            self.chats.lock().await.values().cloned().collect();
        subscribers.sort_by_key(|subscriber| subscriber.created_at);
        Ok(subscribers)
    }
}
