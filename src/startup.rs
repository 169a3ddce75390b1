use crate::catchers::*;
use crate::commands::CommandHandler;
use crate::configuration::Settings;
use crate::content_api::{ContentApi, KudaGoClient};
use crate::notifier::{Aggregator, Dispatcher, Notifier};
use crate::routes::*;
use crate::scheduler::DailyDigest;
use crate::store::{PgSubscriberStore, SubscriberStore};
use crate::telegram::{Messenger, TelegramClient};
use anyhow::{anyhow, Context};
use rocket::{Config, Ignite, Rocket};
use std::sync::Arc;

/// The outside world, as seen by the application.
pub struct Services {
    pub content: Arc<dyn ContentApi>,
    pub messenger: Arc<dyn Messenger>,
    pub store: Arc<dyn SubscriberStore>,
}

impl Services {
    /// Real clients sharing one HTTP connection pool, plus the Postgres store.
    ///
    /// Pending migrations are applied before returning.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.http_client.timeout())
            .build()
            .context("Failed to build the HTTP client.")?;

        let store = PgSubscriberStore::connect_lazy(&settings.database);
        store.migrate().await?;

        Ok(Self {
            content: Arc::new(KudaGoClient::new(
                http_client.clone(),
                &settings.content_api,
            )),
            messenger: Arc::new(TelegramClient::new(http_client, &settings.telegram)),
            store: Arc::new(store),
        })
    }

    /// Make sure the bot token works and, if configured, point the bot at our webhook.
    #[tracing::instrument(name = "Announce the bot", skip(self, settings))]
    pub async fn announce(&self, settings: &Settings) -> anyhow::Result<()> {
        let identity = self
            .messenger
            .check_identity()
            .await
            .context("The bot token was rejected.")?;
        tracing::info!(
            bot_id = identity.id,
            bot_username = ?identity.username,
            "Bot identity confirmed"
        );

        if settings.application.register_webhook {
            let url = settings.application.webhook_url();
            self.messenger
                .set_webhook(&url)
                .await
                .context("Failed to register the webhook.")?;
            tracing::info!(%url, "Webhook registered");
        }
        Ok(())
    }
}

pub struct Application {
    pub server: Rocket<Ignite>,
}

impl Application {
    pub async fn build(settings: &Settings, services: Services) -> anyhow::Result<Self> {
        let Services {
            content,
            messenger,
            store,
        } = services;

        let dispatcher = Arc::new(Dispatcher::new(messenger));
        let notifier = Arc::new(Notifier::new(
            Aggregator::new(content.clone()),
            dispatcher.clone(),
            store.clone(),
            settings.telegram.max_concurrent_sends,
        ));
        let commands = Arc::new(CommandHandler::new(store, notifier.clone(), dispatcher));

        let config = Config {
            port: settings.application.port.unwrap_or(0),
            address: settings.application.host,
            ..Config::default()
        };
        let mut rocket = rocket::custom(config)
            .manage(content)
            .manage(notifier.clone())
            .manage(commands)
            .mount(
                "/",
                routes![
                    index,
                    health,
                    webhook,
                    events,
                    places,
                    collections,
                    movies,
                    news,
                    collect
                ],
            )
            .register(
                "/",
                catchers![unprocessable_entity_to_bad_request, internal_error],
            );

        if settings.scheduler.enabled {
            let schedule = settings.scheduler.schedule().map_err(|e| anyhow!(e))?;
            rocket = rocket.attach(DailyDigest::new(notifier, schedule));
        }

        let server = rocket
            .ignite()
            .await
            .context("Failed to ignite the web server.")?;
        Ok(Self { server })
    }
}
