use crate::content_api::UpstreamError;
use crate::domain::ChatId;
use crate::routes::error_chain_fmt;
use crate::telegram::Messenger;
use std::sync::Arc;

/// Picks text or photo delivery for one message to one chat.
pub struct Dispatcher {
    messenger: Arc<dyn Messenger>,
}

impl Dispatcher {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// With an image the text goes out as the photo caption.
    #[tracing::instrument(name = "Dispatch a message", skip(self, text))]
    pub async fn dispatch(
        &self,
        chat_id: ChatId,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let sent = match image_url {
            None => self.messenger.send_text(chat_id, text).await,
            Some(image_url) => self.messenger.send_photo(chat_id, image_url, text).await,
        };
        sent.map_err(|source| DeliveryError { chat_id, source })
    }
}

#[derive(thiserror::Error)]
#[error("Failed to deliver a message to chat {chat_id}.")]
pub struct DeliveryError {
    pub chat_id: ChatId,
    #[source]
    pub source: UpstreamError,
}

impl std::fmt::Debug for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
