use crate::domain::ChatId;
use crate::notifier::{Dispatcher, Notifier};
use crate::routes::error_chain_fmt;
use crate::store::{StoreError, SubscriberStore};
use std::sync::Arc;

pub const SUBSCRIBED_REPLY: &str =
    "Вы подписались на ежедневную рассылку событий. Вот что происходит в городе сейчас:";
pub const ALREADY_SUBSCRIBED_REPLY: &str = "Вы уже подписаны на рассылку.";
pub const UNSUBSCRIBED_REPLY: &str = "Вы отписались от рассылки.";
pub const NOT_SUBSCRIBED_REPLY: &str = "Вы не подписаны на рассылку.";
pub const NOTIFY_FAILED_REPLY: &str = "Не удалось получить события, попробуйте позже.";
pub const HELP_REPLY: &str = "/start - подписаться на ежедневную рассылку\n\
                              /delete - отписаться от рассылки\n\
                              /event - получить подборку событий прямо сейчас\n\
                              /help - список команд";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Delete,
    Event,
    Help,
}

impl Command {
    /// Only the first word counts; a `@botname` suffix from group chats is ignored.
    pub fn parse(text: &str) -> Option<Command> {
        let word = text.split_whitespace().next()?;
        let command = word.split('@').next()?;
        match command {
            "/start" => Some(Command::Start),
            "/delete" => Some(Command::Delete),
            "/event" => Some(Command::Event),
            "/help" => Some(Command::Help),
            _ => None,
        }
    }
}

/// Whether a chat is in the store. Never cached: read fresh on every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Subscribed,
    Unsubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Subscribe,
    AlreadySubscribed,
    Unsubscribe,
    NotSubscribed,
    Notify,
    Help,
}

impl SubscriptionState {
    pub fn on(self, command: Command) -> Transition {
        use SubscriptionState::*;
        match (self, command) {
            (Unsubscribed, Command::Start) => Transition::Subscribe,
            (Subscribed, Command::Start) => Transition::AlreadySubscribed,
            (Subscribed, Command::Delete) => Transition::Unsubscribe,
            (Unsubscribed, Command::Delete) => Transition::NotSubscribed,
            (_, Command::Event) => Transition::Notify,
            (_, Command::Help) => Transition::Help,
        }
    }
}

/// Runs chat commands against the store and answers through the dispatcher.
pub struct CommandHandler {
    store: Arc<dyn SubscriberStore>,
    notifier: Arc<Notifier>,
    dispatcher: Arc<Dispatcher>,
}

impl CommandHandler {
    pub fn new(
        store: Arc<dyn SubscriberStore>,
        notifier: Arc<Notifier>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            store,
            notifier,
            dispatcher,
        }
    }

    /// `Ok(None)` for text that is not a known command; such messages get no reply.
    #[tracing::instrument(name = "Handle a chat command", skip(self, text))]
    pub async fn handle(
        &self,
        chat_id: ChatId,
        text: &str,
    ) -> Result<Option<Transition>, CommandError> {
        let command = match Command::parse(text) {
            Some(command) => command,
            None => return Ok(None),
        };

        let transition = self.state_of(chat_id).await?.on(command);
        let applied = match transition {
            Transition::Subscribe => self.subscribe(chat_id).await?,
            Transition::AlreadySubscribed => {
                self.reply(chat_id, ALREADY_SUBSCRIBED_REPLY).await;
                transition
            }
            Transition::Unsubscribe => self.unsubscribe(chat_id).await?,
            Transition::NotSubscribed => {
                self.reply(chat_id, NOT_SUBSCRIBED_REPLY).await;
                transition
            }
            Transition::Notify => {
                self.notify(chat_id).await;
                transition
            }
            Transition::Help => {
                self.reply(chat_id, HELP_REPLY).await;
                transition
            }
        };
        Ok(Some(applied))
    }

    async fn state_of(&self, chat_id: ChatId) -> Result<SubscriptionState, StoreError> {
        match self.store.get(chat_id).await {
            Ok(_) => Ok(SubscriptionState::Subscribed),
            Err(StoreError::NotFound(_)) => Ok(SubscriptionState::Unsubscribed),
            Err(e) => Err(e),
        }
    }

    // Two `/start` racing past `state_of` are settled by the store's uniqueness check.
    async fn subscribe(&self, chat_id: ChatId) -> Result<Transition, StoreError> {
        match self.store.add(chat_id).await {
            Ok(_) => {
                tracing::info!(%chat_id, "Chat subscribed");
                self.reply(chat_id, SUBSCRIBED_REPLY).await;
                self.notify(chat_id).await;
                Ok(Transition::Subscribe)
            }
            Err(StoreError::Conflict(_)) => {
                self.reply(chat_id, ALREADY_SUBSCRIBED_REPLY).await;
                Ok(Transition::AlreadySubscribed)
            }
            Err(e) => Err(e),
        }
    }

    async fn unsubscribe(&self, chat_id: ChatId) -> Result<Transition, StoreError> {
        if self.store.remove(chat_id).await? {
            tracing::info!(%chat_id, "Chat unsubscribed");
            self.reply(chat_id, UNSUBSCRIBED_REPLY).await;
            Ok(Transition::Unsubscribe)
        } else {
            self.reply(chat_id, NOT_SUBSCRIBED_REPLY).await;
            Ok(Transition::NotSubscribed)
        }
    }

    async fn notify(&self, chat_id: ChatId) {
        if let Err(error) = self.notifier.notify_chat(chat_id).await {
            tracing::error!(error.cause_chain = ?error, %chat_id, "On-demand notification failed");
            self.reply(chat_id, NOTIFY_FAILED_REPLY).await;
        }
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(error) = self.dispatcher.dispatch(chat_id, text, None).await {
            tracing::warn!(error.cause_chain = ?error, "Failed to reply to a command");
        }
    }
}

#[derive(thiserror::Error)]
pub enum CommandError {
    #[error("Failed to read or update the subscription.")]
    Store(#[from] StoreError),
}

impl std::fmt::Debug for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
