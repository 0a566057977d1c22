mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
use kopilka_domain::{User, ID};
pub use postgres::PostgresUserRepo;

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<User>;
    async fn find(&self, user_id: ID) -> anyhow::Result<Option<User>>;
    async fn find_by_telegram_id(&self, telegram_id: i64) -> anyhow::Result<Option<User>>;
    /// Returns the user with the telegram id of `user`, storing `user` if there is none
    async fn get_or_create(&self, user: &User) -> anyhow::Result<User>;
}

#[cfg(test)]
mod tests {
    use crate::KopilkaContext;
    use kopilka_domain::User;

    #[tokio::test]
    async fn get_or_create_is_keyed_by_telegram_id() {
        let ctx = KopilkaContext::create_inmemory();
        let user = User::new(555, 777, "Ivan".into(), None);

        let created = ctx.repos.users.get_or_create(&user).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.telegram_id, 555);

        let other_chat = User::new(555, 888, "Ivan".into(), Some("Petrov".into()));
        let existing = ctx.repos.users.get_or_create(&other_chat).await.unwrap();
        assert_eq!(existing, created);

        assert_eq!(
            ctx.repos.users.find_by_telegram_id(555).await.unwrap(),
            Some(created.clone())
        );
        assert_eq!(ctx.repos.users.find(created.id).await.unwrap(), Some(created));
        assert!(ctx.repos.users.find_by_telegram_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_telegram_id() {
        let ctx = KopilkaContext::create_inmemory();
        let user = User::new(1, 1, "Anna".into(), None);
        assert!(ctx.repos.users.insert(&user).await.is_ok());
        assert!(ctx.repos.users.insert(&user).await.is_err());
    }
}
