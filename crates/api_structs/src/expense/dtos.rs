use chrono::{DateTime, Utc};
use kopilka_domain::{ExpenseStatistic, ExpenseWithCategory, Kopecks, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDTO {
    pub id: ID,
    pub user_id: ID,
    pub category_id: ID,
    pub category_name: String,
    /// In kopecks
    pub amount: Kopecks,
    pub description: Option<String>,
    pub created: DateTime<Utc>,
}

impl ExpenseDTO {
    pub fn new(e: ExpenseWithCategory) -> Self {
        Self {
            id: e.expense.id,
            user_id: e.expense.user_id,
            category_id: e.expense.category_id,
            category_name: e.category_name,
            amount: e.expense.amount,
            description: e.expense.description,
            created: e.expense.created,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStatisticDTO {
    pub category_name: String,
    pub amount: Kopecks,
}

impl ExpenseStatisticDTO {
    pub fn new(stat: ExpenseStatistic) -> Self {
        Self {
            category_name: stat.category_name,
            amount: stat.amount,
        }
    }
}
