mod memory;
mod postgres;

use crate::domain::{ChatId, Subscriber};
use crate::routes::error_chain_fmt;
use async_trait::async_trait;
pub use memory::InMemorySubscriberStore;
pub use postgres::{PgPool, PgSubscriberStore};

/// Durable set of subscribed chats.
///
/// Each call is its own transaction. Implementations must tolerate concurrent
/// callers; uniqueness of `chat_id` is enforced here and nowhere else.
#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Fails with `StoreError::Conflict` when the chat is already subscribed.
    async fn add(&self, chat_id: ChatId) -> Result<Subscriber, StoreError>;

    /// `false` when there was nothing to remove.
    async fn remove(&self, chat_id: ChatId) -> Result<bool, StoreError>;

    /// Fails with `StoreError::NotFound` for unknown chats.
    async fn get(&self, chat_id: ChatId) -> Result<Subscriber, StoreError>;

    /// All subscribers, oldest first.
    async fn list(&self) -> Result<Vec<Subscriber>, StoreError>;
}

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("Chat {0} is already subscribed.")]
    Conflict(ChatId),
    #[error("Chat {0} is not subscribed.")]
    NotFound(ChatId),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
