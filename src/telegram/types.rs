use crate::domain::ChatId;

/// Inbound webhook payload. Only the parts the command layer reads are modelled.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: Option<i64>,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Chat {
    pub id: ChatId,
}

impl Update {
    /// `(chat, text)` when the update is a text message; `None` for anything else.
    pub fn command(&self) -> Option<(ChatId, &str)> {
        let message = self.message.as_ref()?;
        let text = message.text.as_deref()?;
        Some((message.chat.id, text))
    }
}

/// `getMe` result.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct BotIdentity {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Envelope of every Bot API answer.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct SendMessage<'a> {
    pub chat_id: ChatId,
    pub text: &'a str,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct SendPhoto<'a> {
    pub chat_id: ChatId,
    pub photo: &'a str,
    pub caption: &'a str,
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct SetWebhook<'a> {
    pub url: &'a str,
}
