use kopilka_api::Application;
use kopilka_infra::{Config, InMemoryNotifier, KopilkaContext};
use kopilka_sdk::KopilkaSDK;
use std::sync::Arc;

pub struct TestApp {
    pub config: Config,
    pub address: String,
    pub notifier: Arc<InMemoryNotifier>,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, KopilkaSDK) {
    let mut ctx = KopilkaContext::create_inmemory();
    ctx.config.port = 0; // Random port
    let notifier = Arc::new(InMemoryNotifier::new());
    ctx.notifier = notifier.clone();
    ctx.repos
        .categories
        .seed_defaults()
        .await
        .expect("Failed to seed categories.");

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = KopilkaSDK::new(address.clone(), config.api_secret_key.clone());
    let app = TestApp {
        config,
        address,
        notifier,
    };
    (app, sdk)
}
