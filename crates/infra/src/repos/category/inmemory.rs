use super::ICategoryRepo;
use crate::repos::shared::inmemory_repo::*;
use kopilka_domain::{default_categories, resolve_category, Category};
use std::sync::Mutex;

pub struct InMemoryCategoryRepo {
    categories: Mutex<Vec<Category>>,
    ids: IdSequence,
}

impl InMemoryCategoryRepo {
    pub fn new() -> Self {
        Self {
            categories: Mutex::new(Vec::new()),
            ids: IdSequence::new(),
        }
    }

    pub(crate) fn names(&self) -> Vec<(i64, String)> {
        lock(&self.categories)
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect()
    }
}

#[async_trait::async_trait]
impl ICategoryRepo for InMemoryCategoryRepo {
    async fn insert(&self, category: &Category) -> anyhow::Result<Category> {
        let mut categories = lock(&self.categories);
        if categories.iter().any(|c| c.codename == category.codename) {
            anyhow::bail!("Category {} already exists", category.codename);
        }
        let mut category = category.clone();
        category.id = self.ids.next();
        categories.push(category.clone());
        Ok(category)
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Category>> {
        Ok(find_by(&self.categories, |_| true))
    }

    async fn find_by_alias(&self, alias: &str) -> anyhow::Result<Option<Category>> {
        let categories = lock(&self.categories);
        Ok(resolve_category(&categories, alias).cloned())
    }

    async fn seed_defaults(&self) -> anyhow::Result<usize> {
        let mut categories = lock(&self.categories);
        if !categories.is_empty() {
            return Ok(0);
        }
        for mut category in default_categories() {
            category.id = self.ids.next();
            categories.push(category);
        }
        Ok(categories.len())
    }
}
