use super::IUserRepo;
use crate::repos::shared::inmemory_repo::*;
use kopilka_domain::{User, ID};
use std::sync::Mutex;

pub struct InMemoryUserRepo {
    users: Mutex<Vec<User>>,
    ids: IdSequence,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            ids: IdSequence::new(),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<User> {
        let mut users = lock(&self.users);
        if users.iter().any(|u| u.telegram_id == user.telegram_id) {
            anyhow::bail!("User with telegram id {} already exists", user.telegram_id);
        }
        let mut user = user.clone();
        user.id = self.ids.next();
        users.push(user.clone());
        Ok(user)
    }

    async fn find(&self, user_id: ID) -> anyhow::Result<Option<User>> {
        Ok(find(user_id, &self.users))
    }

    async fn find_by_telegram_id(&self, telegram_id: i64) -> anyhow::Result<Option<User>> {
        Ok(find_first_by(&self.users, |u| u.telegram_id == telegram_id))
    }

    async fn get_or_create(&self, user: &User) -> anyhow::Result<User> {
        let mut users = lock(&self.users);
        if let Some(existing) = users.iter().find(|u| u.telegram_id == user.telegram_id) {
            return Ok(existing.clone());
        }
        let mut user = user.clone();
        user.id = self.ids.next();
        users.push(user.clone());
        Ok(user)
    }
}
