use super::IExpenseRepo;
use chrono::{DateTime, Utc};
use kopilka_domain::{sort_statistics, Expense, ExpenseStatistic, ExpenseWithCategory, ID};
use sqlx::{FromRow, PgPool};

pub struct PostgresExpenseRepo {
    pool: PgPool,
}

impl PostgresExpenseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ExpenseRaw {
    id: i64,
    user_id: i64,
    category_id: i64,
    amount: i64,
    description: Option<String>,
    created: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ExpenseWithCategoryRaw {
    #[sqlx(flatten)]
    expense: ExpenseRaw,
    category_name: String,
}

#[derive(Debug, FromRow)]
struct ExpenseStatisticRaw {
    category_name: String,
    amount: i64,
}

impl From<ExpenseRaw> for Expense {
    fn from(raw: ExpenseRaw) -> Self {
        Self {
            id: raw.id,
            user_id: raw.user_id,
            category_id: raw.category_id,
            amount: raw.amount,
            description: raw.description,
            created: raw.created,
        }
    }
}

#[async_trait::async_trait]
impl IExpenseRepo for PostgresExpenseRepo {
    async fn insert(&self, expense: &Expense) -> anyhow::Result<Expense> {
        let row: ExpenseRaw = sqlx::query_as(
            r#"
            INSERT INTO expenses(user_id, category_id, amount, description, created)
            VALUES($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(expense.user_id)
        .bind(expense.category_id)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(expense.created)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_for_user(&self, expense_id: ID, user_id: ID) -> anyhow::Result<Option<Expense>> {
        let row: Option<ExpenseRaw> = sqlx::query_as(
            r#"
            DELETE FROM expenses AS e
            WHERE e.id = $1 AND e.user_id = $2
            RETURNING *
            "#,
        )
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|e| e.into()))
    }

    async fn find_recent_for_user(
        &self,
        user_id: ID,
        limit: usize,
    ) -> anyhow::Result<Vec<ExpenseWithCategory>> {
        let rows: Vec<ExpenseWithCategoryRaw> = sqlx::query_as(
            r#"
            SELECT e.*, c.name AS category_name FROM expenses AS e
            INNER JOIN categories AS c ON c.id = e.category_id
            WHERE e.user_id = $1
            ORDER BY e.id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ExpenseWithCategory {
                expense: row.expense.into(),
                category_name: row.category_name,
            })
            .collect())
    }

    async fn sum_by_category_for_user(
        &self,
        user_id: ID,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ExpenseStatistic>> {
        let rows: Vec<ExpenseStatisticRaw> = sqlx::query_as(
            r#"
            SELECT c.name AS category_name, SUM(e.amount)::BIGINT AS amount FROM expenses AS e
            INNER JOIN categories AS c ON c.id = e.category_id
            WHERE e.user_id = $1 AND e.created BETWEEN $2 AND $3
            GROUP BY c.name
            "#,
        )
        .bind(user_id)
        .bind(since)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        let mut stats: Vec<_> = rows
            .into_iter()
            .map(|row| ExpenseStatistic {
                category_name: row.category_name,
                amount: row.amount,
            })
            .collect();
        sort_statistics(&mut stats);
        Ok(stats)
    }
}
