mod config;
mod queue;
mod repos;
mod services;
mod system;

pub use config::{parse_cron_seconds, Config, ScanTrigger};
pub use queue::{
    with_timeout, ClaimedJob, IJobQueue, InMemoryJobQueue, PostgresJobQueue, QueueError,
    SubmitOutcome,
};
pub use repos::{ICategoryRepo, IEventRepo, IExpenseRepo, IUserRepo, Repos};
pub use services::*;
use sqlx::migrate::MigrateError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;
use tracing::info;

#[derive(Clone)]
pub struct KopilkaContext {
    pub repos: Repos,
    pub queue: Arc<dyn IJobQueue>,
    pub notifier: Arc<dyn INotifier>,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

impl KopilkaContext {
    async fn create_postgres(connection_string: &str, config: Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(config.io_timeout)
            .connect(connection_string)
            .await?;
        run_migration(&pool).await?;

        Ok(Self {
            repos: Repos::create_postgres(pool.clone()),
            queue: Arc::new(PostgresJobQueue::new(pool)),
            notifier: create_notifier(&config),
            config,
            sys: Arc::new(RealSys {}),
        })
    }

    /// Context without any external services, messages are recorded in memory
    pub fn create_inmemory() -> Self {
        Self::inmemory(Config::new())
    }

    fn inmemory(config: Config) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            queue: Arc::new(InMemoryJobQueue::new()),
            notifier: Arc::new(InMemoryNotifier::new()),
            config,
            sys: Arc::new(RealSys {}),
        }
    }
}

fn create_notifier(config: &Config) -> Arc<dyn INotifier> {
    match &config.telegram_bot_token {
        Some(token) => Arc::new(TelegramNotifier::new(token.clone(), config.io_timeout)),
        None => Arc::new(LogNotifier {}),
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<KopilkaContext> {
    let config = Config::new();
    let ctx = match get_psql_connection_string() {
        Some(connection_string) => {
            info!("Using the postgres store and job queue");
            KopilkaContext::create_postgres(&connection_string, config).await?
        }
        None => {
            info!("DATABASE_URL is not set, using the in-memory store and job queue");
            let mut ctx = KopilkaContext::inmemory(config);
            ctx.notifier = create_notifier(&ctx.config);
            ctx
        }
    };

    let seeded = ctx.repos.categories.seed_defaults().await?;
    if seeded > 0 {
        info!("Seeded {} default categories", seeded);
    }
    Ok(ctx)
}

fn get_psql_connection_string() -> Option<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .ok()
        .filter(|url| !url.is_empty())
}

pub async fn run_migration(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(pool).await
}
