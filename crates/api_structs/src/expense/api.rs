use crate::dtos::{ExpenseDTO, ExpenseStatisticDTO};
use chrono::{DateTime, Utc};
use kopilka_domain::{ExpenseWithCategory, Kopecks, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseResponse {
    pub expense: ExpenseDTO,
}

impl ExpenseResponse {
    pub fn new(expense: ExpenseWithCategory) -> Self {
        Self {
            expense: ExpenseDTO::new(expense),
        }
    }
}

pub mod add_expense {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub telegram_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// In kopecks
        pub amount: Kopecks,
        /// Any alias of a category, unknown aliases are booked as "прочее"
        pub category: String,
        #[serde(default)]
        pub description: Option<String>,
    }

    pub type APIResponse = ExpenseResponse;
}

pub mod get_top_expenses {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub telegram_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QueryParams {
        pub limit: Option<usize>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub expenses: Vec<ExpenseDTO>,
    }

    impl APIResponse {
        pub fn new(expenses: Vec<ExpenseWithCategory>) -> Self {
            Self {
                expenses: expenses.into_iter().map(ExpenseDTO::new).collect(),
            }
        }
    }
}

pub mod delete_expense {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub telegram_id: i64,
        pub expense_id: ID,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub expense_id: ID,
    }
}

pub mod get_expense_statistics {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub telegram_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct QueryParams {
        /// Number of months before the current one to include
        pub months: Option<u32>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub since: DateTime<Utc>,
        pub until: DateTime<Utc>,
        pub statistics: Vec<ExpenseStatisticDTO>,
        pub total: Kopecks,
    }
}
