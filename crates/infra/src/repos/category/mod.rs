mod inmemory;
mod postgres;

pub use inmemory::InMemoryCategoryRepo;
use kopilka_domain::Category;
pub use postgres::PostgresCategoryRepo;

#[async_trait::async_trait]
pub trait ICategoryRepo: Send + Sync {
    async fn insert(&self, category: &Category) -> anyhow::Result<Category>;
    async fn find_all(&self) -> anyhow::Result<Vec<Category>>;
    /// Category with the given alias, or the fallback category when no alias matches
    async fn find_by_alias(&self, alias: &str) -> anyhow::Result<Option<Category>>;
    /// Stores the default catalogue when there are no categories yet.
    /// Returns how many categories were added.
    async fn seed_defaults(&self) -> anyhow::Result<usize>;
}
