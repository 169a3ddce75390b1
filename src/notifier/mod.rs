mod aggregator;
mod dispatcher;
mod formatter;

pub use aggregator::{AggregationError, Aggregator};
pub use dispatcher::{DeliveryError, Dispatcher};
pub use formatter::{format, DATES_LABEL};

use crate::domain::ChatId;
use crate::routes::error_chain_fmt;
use crate::store::{StoreError, SubscriberStore};
use futures::StreamExt;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// The collect, format, deliver pipeline.
///
/// One run collects and formats once, then delivers every item to every
/// recipient. A failed send is counted and logged; it never stops the run.
/// At most `max_concurrent_sends` sends are in flight at any time.
pub struct Notifier {
    aggregator: Aggregator,
    dispatcher: Arc<Dispatcher>,
    store: Arc<dyn SubscriberStore>,
    max_concurrent_sends: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub items: usize,
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl Notifier {
    pub fn new(
        aggregator: Aggregator,
        dispatcher: Arc<Dispatcher>,
        store: Arc<dyn SubscriberStore>,
        max_concurrent_sends: NonZeroUsize,
    ) -> Self {
        Self {
            aggregator,
            dispatcher,
            store,
            max_concurrent_sends: max_concurrent_sends.get(),
        }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// The daily digest: every subscribed chat gets the same items.
    #[tracing::instrument(name = "Broadcast to all subscribers", skip(self))]
    pub async fn broadcast_to_subscribers(&self) -> Result<BroadcastReport, BroadcastError> {
        let recipients: Vec<ChatId> = self
            .store
            .list()
            .await?
            .into_iter()
            .map(|subscriber| subscriber.chat_id)
            .collect();
        if recipients.is_empty() {
            tracing::info!("No subscribed chats, nothing to broadcast");
            return Ok(BroadcastReport::default());
        }
        self.broadcast(&recipients).await
    }

    /// On-demand digest for a single chat.
    #[tracing::instrument(name = "Notify a single chat", skip(self))]
    pub async fn notify_chat(&self, chat_id: ChatId) -> Result<BroadcastReport, BroadcastError> {
        self.broadcast(&[chat_id]).await
    }

    #[tracing::instrument(name = "Broadcast notifications", skip(self, recipients), fields(recipients = recipients.len()))]
    pub async fn broadcast(&self, recipients: &[ChatId]) -> Result<BroadcastReport, BroadcastError> {
        let mut report = BroadcastReport {
            recipients: recipients.len(),
            ..BroadcastReport::default()
        };
        if recipients.is_empty() {
            return Ok(report);
        }

        let items = self.aggregator.collect().await?;
        report.items = items.len();

        for item in &items {
            let text = format(item);
            let image_url = item.image.as_deref();
            let outcomes: Vec<_> = futures::stream::iter(recipients.iter().copied())
                .map(|chat_id| self.dispatcher.dispatch(chat_id, &text, image_url))
                .buffer_unordered(self.max_concurrent_sends)
                .collect()
                .await;
            for outcome in outcomes {
                match outcome {
                    Ok(()) => report.delivered += 1,
                    Err(error) => {
                        tracing::warn!(
                            error.cause_chain = ?error,
                            chat_id = %error.chat_id,
                            "Skipping a chat for this notification",
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            items = report.items,
            delivered = report.delivered,
            failed = report.failed,
            "Broadcast finished"
        );
        Ok(report)
    }
}

#[derive(thiserror::Error)]
pub enum BroadcastError {
    #[error("Failed to list the subscribed chats.")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

impl std::fmt::Debug for BroadcastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
