use event_notifier::configuration::get_configuration;
use event_notifier::startup::{Application, Services};
use event_notifier::telemetry::{get_subscriber, init_subscriber};

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("event_notifier".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    let services = Services::from_settings(&configuration).await?;
    services.announce(&configuration).await?;

    let application = Application::build(&configuration, services).await?;
    application.server.launch().await?;
    Ok(())
}
