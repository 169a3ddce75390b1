mod client;
mod types;

use crate::content_api::UpstreamError;
use crate::domain::ChatId;
use async_trait::async_trait;
pub use client::TelegramClient;
pub use types::*;

/// Outbound side of the bot platform.
///
/// Payloads are passed through untouched, length limits are the platform's business.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn check_identity(&self) -> Result<BotIdentity, UpstreamError>;

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), UpstreamError>;

    async fn send_photo(
        &self,
        chat_id: ChatId,
        image_url: &str,
        caption: &str,
    ) -> Result<(), UpstreamError>;

    async fn set_webhook(&self, url: &str) -> Result<(), UpstreamError>;
}
