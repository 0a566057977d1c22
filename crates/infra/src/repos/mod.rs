mod category;
mod event;
mod expense;
mod shared;
mod user;

pub use category::ICategoryRepo;
use category::{InMemoryCategoryRepo, PostgresCategoryRepo};
pub use event::IEventRepo;
use event::{InMemoryEventRepo, PostgresEventRepo};
pub use expense::IExpenseRepo;
use expense::{InMemoryExpenseRepo, PostgresExpenseRepo};
use sqlx::PgPool;
use std::sync::Arc;
pub(crate) use shared::inmemory_repo::lock;
pub use user::IUserRepo;
use user::{InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub categories: Arc<dyn ICategoryRepo>,
    pub expenses: Arc<dyn IExpenseRepo>,
}

impl Repos {
    pub fn create_postgres(pool: PgPool) -> Self {
        Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepo::new(pool.clone())),
            expenses: Arc::new(PostgresExpenseRepo::new(pool)),
        }
    }

    pub fn create_inmemory() -> Self {
        let categories = Arc::new(InMemoryCategoryRepo::new());
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
            expenses: Arc::new(InMemoryExpenseRepo::new(categories.clone())),
            categories,
        }
    }
}
