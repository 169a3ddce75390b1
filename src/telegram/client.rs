use crate::configuration::TelegramSettings;
use crate::content_api::UpstreamError;
use crate::domain::ChatId;
use crate::telegram::{ApiResponse, BotIdentity, Messenger, SendMessage, SendPhoto, SetWebhook};
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;

/// `Messenger` over the Telegram Bot API.
pub struct TelegramClient {
    http_client: reqwest::Client,
    bot_url: Secret<String>,
}

impl TelegramClient {
    pub fn new(http_client: reqwest::Client, settings: &TelegramSettings) -> Self {
        Self {
            http_client,
            bot_url: settings.bot_url(),
        }
    }

    // Carries the token: reqwest errors built from it are stripped with `without_url`.
    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url.expose_secret(), method)
    }

    /// Turn a Bot API answer into its `result`.
    ///
    /// The platform reports failures as `ok: false` with a description, usually
    /// alongside a 4xx status, so the envelope is read before the status.
    async fn read_response<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<Option<T>, UpstreamError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: method.to_string(),
                source: source.without_url(),
            })?;

        let envelope: ApiResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(UpstreamError::Status {
                    endpoint: method.to_string(),
                    status,
                })
            }
            Err(source) => {
                return Err(UpstreamError::Malformed {
                    endpoint: method.to_string(),
                    source,
                })
            }
        };

        if !envelope.ok {
            return Err(UpstreamError::Rejected {
                endpoint: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("status {}", status)),
            });
        }
        if !status.is_success() {
            return Err(UpstreamError::Status {
                endpoint: method.to_string(),
                status,
            });
        }
        Ok(envelope.result)
    }

    async fn post<P, T>(&self, method: &str, payload: &P) -> Result<Option<T>, UpstreamError>
    where
        P: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: method.to_string(),
                source: source.without_url(),
            })?;
        Self::read_response(method, response).await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    #[tracing::instrument(name = "Check bot identity", skip(self))]
    async fn check_identity(&self) -> Result<BotIdentity, UpstreamError> {
        let response = self
            .http_client
            .get(self.method_url("getMe"))
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                endpoint: "getMe".to_string(),
                source: source.without_url(),
            })?;
        Self::read_response::<BotIdentity>("getMe", response)
            .await?
            .ok_or_else(|| UpstreamError::Rejected {
                endpoint: "getMe".to_string(),
                description: "the answer carried no bot identity".to_string(),
            })
    }

    #[tracing::instrument(name = "Send a text message", skip(self, text))]
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), UpstreamError> {
        self.post::<_, serde_json::Value>("sendMessage", &SendMessage { chat_id, text })
            .await
            .map(|_| ())
    }

    #[tracing::instrument(name = "Send a photo", skip(self, caption))]
    async fn send_photo(
        &self,
        chat_id: ChatId,
        image_url: &str,
        caption: &str,
    ) -> Result<(), UpstreamError> {
        let payload = SendPhoto {
            chat_id,
            photo: image_url,
            caption,
        };
        self.post::<_, serde_json::Value>("sendPhoto", &payload)
            .await
            .map(|_| ())
    }

    #[tracing::instrument(name = "Register the webhook", skip(self))]
    async fn set_webhook(&self, url: &str) -> Result<(), UpstreamError> {
        self.post::<_, serde_json::Value>("setWebhook", &SetWebhook { url })
            .await
            .map(|_| ())
    }
}
