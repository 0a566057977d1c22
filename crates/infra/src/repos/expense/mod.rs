mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
pub use inmemory::InMemoryExpenseRepo;
use kopilka_domain::{Expense, ExpenseStatistic, ExpenseWithCategory, ID};
pub use postgres::PostgresExpenseRepo;

#[async_trait::async_trait]
pub trait IExpenseRepo: Send + Sync {
    async fn insert(&self, expense: &Expense) -> anyhow::Result<Expense>;
    /// Deletes the expense only if it belongs to `user_id`
    async fn delete_for_user(&self, expense_id: ID, user_id: ID) -> anyhow::Result<Option<Expense>>;
    /// Most recently added expenses first
    async fn find_recent_for_user(
        &self,
        user_id: ID,
        limit: usize,
    ) -> anyhow::Result<Vec<ExpenseWithCategory>>;
    /// Per category totals of expenses created in `[since, until]`, largest first
    async fn sum_by_category_for_user(
        &self,
        user_id: ID,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ExpenseStatistic>>;
}

#[cfg(test)]
mod tests {
    use crate::KopilkaContext;
    use chrono::{Duration, TimeZone, Utc};
    use kopilka_domain::{Expense, ExpenseStatistic};

    async fn setup() -> (KopilkaContext, i64, i64) {
        let ctx = KopilkaContext::create_inmemory();
        ctx.repos.categories.seed_defaults().await.unwrap();
        let cafe = ctx.repos.categories.find_by_alias("кафе").await.unwrap().unwrap();
        let home = ctx.repos.categories.find_by_alias("дом").await.unwrap().unwrap();
        (ctx, cafe.id, home.id)
    }

    fn expense(user_id: i64, category_id: i64, amount: i64, day: u32) -> Expense {
        Expense {
            id: 0,
            user_id,
            category_id,
            amount,
            description: None,
            created: Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn recent_expenses_are_newest_first() {
        let (ctx, cafe, home) = setup().await;
        for (i, category) in [cafe, home, cafe].iter().enumerate() {
            ctx.repos
                .expenses
                .insert(&expense(1, *category, 100 * (i as i64 + 1), 1))
                .await
                .unwrap();
        }
        ctx.repos.expenses.insert(&expense(2, cafe, 999, 1)).await.unwrap();

        let recent = ctx.repos.expenses.find_recent_for_user(1, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].expense.amount, 300);
        assert_eq!(recent[0].category_name, "кафе");
        assert_eq!(recent[1].expense.amount, 200);
        assert_eq!(recent[1].category_name, "дом");
    }

    #[tokio::test]
    async fn sums_by_category_inside_period() {
        let (ctx, cafe, home) = setup().await;
        ctx.repos.expenses.insert(&expense(1, cafe, 100, 2)).await.unwrap();
        ctx.repos.expenses.insert(&expense(1, cafe, 150, 3)).await.unwrap();
        ctx.repos.expenses.insert(&expense(1, home, 500, 3)).await.unwrap();
        ctx.repos.expenses.insert(&expense(1, home, 700, 20)).await.unwrap();
        ctx.repos.expenses.insert(&expense(2, home, 10000, 3)).await.unwrap();

        let since = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let until = since + Duration::days(10);
        let stats = ctx
            .repos
            .expenses
            .sum_by_category_for_user(1, since, until)
            .await
            .unwrap();
        assert_eq!(
            stats,
            vec![
                ExpenseStatistic {
                    category_name: "дом".into(),
                    amount: 500
                },
                ExpenseStatistic {
                    category_name: "кафе".into(),
                    amount: 250
                },
            ]
        );
    }

    #[tokio::test]
    async fn only_owner_can_delete() {
        let (ctx, cafe, _) = setup().await;
        let e = ctx.repos.expenses.insert(&expense(1, cafe, 100, 2)).await.unwrap();
        assert!(ctx.repos.expenses.delete_for_user(e.id, 2).await.unwrap().is_none());
        assert_eq!(
            ctx.repos.expenses.delete_for_user(e.id, 1).await.unwrap(),
            Some(e)
        );
        assert!(ctx.repos.expenses.find_recent_for_user(1, 10).await.unwrap().is_empty());
    }
}
