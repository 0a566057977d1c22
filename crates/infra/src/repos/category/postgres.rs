use super::ICategoryRepo;
use kopilka_domain::{default_categories, Category, FALLBACK_CATEGORY_ALIAS};
use sqlx::{FromRow, PgPool};
use tracing::info;

pub struct PostgresCategoryRepo {
    pool: PgPool,
}

impl PostgresCategoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CategoryRaw {
    id: i64,
    codename: String,
    name: String,
    aliases: Vec<String>,
    is_base_expense: bool,
}

impl From<CategoryRaw> for Category {
    fn from(raw: CategoryRaw) -> Self {
        Self {
            id: raw.id,
            codename: raw.codename,
            name: raw.name,
            aliases: raw.aliases,
            is_base_expense: raw.is_base_expense,
        }
    }
}

impl PostgresCategoryRepo {
    async fn find_by_exact_alias(&self, alias: &str) -> anyhow::Result<Option<Category>> {
        let row: Option<CategoryRaw> = sqlx::query_as(
            r#"
            SELECT * FROM categories AS c
            WHERE $1 = ANY(c.aliases)
            ORDER BY c.id
            LIMIT 1
            "#,
        )
        .bind(alias)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|c| c.into()))
    }
}

#[async_trait::async_trait]
impl ICategoryRepo for PostgresCategoryRepo {
    async fn insert(&self, category: &Category) -> anyhow::Result<Category> {
        let row: CategoryRaw = sqlx::query_as(
            r#"
            INSERT INTO categories(codename, name, aliases, is_base_expense)
            VALUES($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&category.codename)
        .bind(&category.name)
        .bind(&category.aliases)
        .bind(category.is_base_expense)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find_all(&self) -> anyhow::Result<Vec<Category>> {
        let rows: Vec<CategoryRaw> = sqlx::query_as(
            r#"
            SELECT * FROM categories
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|c| c.into()).collect())
    }

    async fn find_by_alias(&self, alias: &str) -> anyhow::Result<Option<Category>> {
        let alias = alias.trim().to_lowercase();
        match self.find_by_exact_alias(&alias).await? {
            Some(category) => Ok(Some(category)),
            None => self.find_by_exact_alias(FALLBACK_CATEGORY_ALIAS).await,
        }
    }

    async fn seed_defaults(&self) -> anyhow::Result<usize> {
        let mut tx = self.pool.begin().await?;
        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(0);
        }

        let mut added = 0;
        for category in default_categories() {
            let result = sqlx::query(
                r#"
                INSERT INTO categories(codename, name, aliases, is_base_expense)
                VALUES($1, $2, $3, $4)
                ON CONFLICT (codename) DO NOTHING
                "#,
            )
            .bind(&category.codename)
            .bind(&category.name)
            .bind(&category.aliases)
            .bind(category.is_base_expense)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() > 0 {
                info!("Added category {}", category.name);
                added += 1;
            }
        }
        tx.commit().await?;

        Ok(added)
    }
}
