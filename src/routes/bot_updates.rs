use crate::commands::CommandHandler;
use crate::routes::error_chain_fmt;
use crate::telegram::Update;
use anyhow::Context;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::{json, Json, Value};
use rocket::{Request, State};
use std::sync::Arc;
use uuid::Uuid;

#[derive(serde::Serialize)]
pub struct WebhookAck {
    ok: bool,
}

/// Bot platform updates land here. Updates that are not text messages are acknowledged
/// and dropped.
#[tracing::instrument(
    name = "Handling a bot update",
    skip(update, commands),
    fields(
        request_id = %Uuid::new_v4(),
        chat_id = tracing::field::Empty
    )
)]
#[post("/webhook", data = "<update>")]
pub async fn webhook(
    update: Json<Update>,
    commands: &State<Arc<CommandHandler>>,
) -> Result<Json<WebhookAck>, WebhookError> {
    let (chat_id, text) = match update.command() {
        Some(command) => command,
        None => return Ok(Json(WebhookAck { ok: true })),
    };
    tracing::Span::current().record("chat_id", &tracing::field::display(chat_id));

    commands
        .handle(chat_id, text)
        .await
        .context("Failed to handle a chat command.")?;
    Ok(Json(WebhookAck { ok: true }))
}

#[derive(thiserror::Error)]
pub enum WebhookError {
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl<'r> Responder<'r, 'static> for WebhookError {
    fn respond_to(self, request: &'r Request<'_>) -> rocket::response::Result<'static> {
        tracing::error!("WebhookError: {:?}", self);
        let body: Value = json!({ "ok": false, "error": self.to_string() });
        (Status::InternalServerError, body).respond_to(request)
    }
}
