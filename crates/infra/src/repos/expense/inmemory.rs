use super::IExpenseRepo;
use crate::repos::{category::InMemoryCategoryRepo, shared::inmemory_repo::*};
use chrono::{DateTime, Utc};
use kopilka_domain::{sort_statistics, Expense, ExpenseStatistic, ExpenseWithCategory, ID};
use std::{collections::HashMap, sync::Arc, sync::Mutex};

pub struct InMemoryExpenseRepo {
    expenses: Mutex<Vec<Expense>>,
    ids: IdSequence,
    categories: Arc<InMemoryCategoryRepo>,
}

impl InMemoryExpenseRepo {
    pub fn new(categories: Arc<InMemoryCategoryRepo>) -> Self {
        Self {
            expenses: Mutex::new(Vec::new()),
            ids: IdSequence::new(),
            categories,
        }
    }

    fn category_names(&self) -> HashMap<ID, String> {
        self.categories.names().into_iter().collect()
    }
}

#[async_trait::async_trait]
impl IExpenseRepo for InMemoryExpenseRepo {
    async fn insert(&self, expense: &Expense) -> anyhow::Result<Expense> {
        let mut expense = expense.clone();
        expense.id = self.ids.next();
        insert(&expense, &self.expenses);
        Ok(expense)
    }

    async fn delete_for_user(&self, expense_id: ID, user_id: ID) -> anyhow::Result<Option<Expense>> {
        Ok(delete_first_by(&self.expenses, |e| {
            e.id == expense_id && e.user_id == user_id
        }))
    }

    async fn find_recent_for_user(
        &self,
        user_id: ID,
        limit: usize,
    ) -> anyhow::Result<Vec<ExpenseWithCategory>> {
        let names = self.category_names();
        let mut expenses = find_by(&self.expenses, |e| e.user_id == user_id);
        expenses.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(expenses
            .into_iter()
            .take(limit)
            .map(|expense| ExpenseWithCategory {
                category_name: names.get(&expense.category_id).cloned().unwrap_or_default(),
                expense,
            })
            .collect())
    }

    async fn sum_by_category_for_user(
        &self,
        user_id: ID,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> anyhow::Result<Vec<ExpenseStatistic>> {
        let names = self.category_names();
        let mut totals: HashMap<String, i64> = HashMap::new();
        for e in find_by(&self.expenses, |e| {
            e.user_id == user_id && e.created >= since && e.created <= until
        }) {
            let name = names.get(&e.category_id).cloned().unwrap_or_default();
            *totals.entry(name).or_default() += e.amount;
        }

        let mut stats: Vec<_> = totals
            .into_iter()
            .map(|(category_name, amount)| ExpenseStatistic {
                category_name,
                amount,
            })
            .collect();
        sort_statistics(&mut stats);
        Ok(stats)
    }
}
