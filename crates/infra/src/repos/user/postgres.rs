use super::IUserRepo;
use kopilka_domain::{User, ID};
use sqlx::{FromRow, PgPool};

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRaw {
    id: i64,
    telegram_id: i64,
    chat_id: i64,
    name: String,
    lastname: Option<String>,
    is_active: bool,
}

impl From<UserRaw> for User {
    fn from(raw: UserRaw) -> Self {
        Self {
            id: raw.id,
            telegram_id: raw.telegram_id,
            chat_id: raw.chat_id,
            name: raw.name,
            lastname: raw.lastname,
            is_active: raw.is_active,
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for PostgresUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<User> {
        let row: UserRaw = sqlx::query_as(
            r#"
            INSERT INTO users(telegram_id, chat_id, name, lastname, is_active)
            VALUES($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user.telegram_id)
        .bind(user.chat_id)
        .bind(&user.name)
        .bind(&user.lastname)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn find(&self, user_id: ID) -> anyhow::Result<Option<User>> {
        let row: Option<UserRaw> = sqlx::query_as(
            r#"
            SELECT * FROM users AS u
            WHERE u.id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|u| u.into()))
    }

    async fn find_by_telegram_id(&self, telegram_id: i64) -> anyhow::Result<Option<User>> {
        let row: Option<UserRaw> = sqlx::query_as(
            r#"
            SELECT * FROM users AS u
            WHERE u.telegram_id = $1
            "#,
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|u| u.into()))
    }

    async fn get_or_create(&self, user: &User) -> anyhow::Result<User> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let row: UserRaw = sqlx::query_as(
            r#"
            INSERT INTO users(telegram_id, chat_id, name, lastname, is_active)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT (telegram_id) DO UPDATE SET telegram_id = EXCLUDED.telegram_id
            RETURNING *
            "#,
        )
        .bind(user.telegram_id)
        .bind(user.chat_id)
        .bind(&user.name)
        .bind(&user.lastname)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}
