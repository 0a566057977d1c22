mod telemetry;

use kopilka_api::Application;
use kopilka_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("kopilka".into(), "info".into());
    init_subscriber(subscriber)?;

    let context = setup_context().await?;

    let app = Application::new(context).await?;
    tracing::info!("Kopilka is listening on port {}", app.port());
    app.start().await?;
    Ok(())
}
