use crate::{APIResponse, BaseClient};
use kopilka_api_structs::*;
use kopilka_domain::{Kopecks, ID};
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ExpenseClient {
    base: Arc<BaseClient>,
}

pub struct AddExpenseInput {
    pub telegram_id: i64,
    pub amount: Kopecks,
    pub category: String,
    pub description: Option<String>,
}

impl ExpenseClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn add(&self, input: AddExpenseInput) -> APIResponse<add_expense::APIResponse> {
        let body = add_expense::RequestBody {
            amount: input.amount,
            category: input.category,
            description: input.description,
        };
        self.base
            .post(
                body,
                format!("user/{}/expenses", input.telegram_id),
                StatusCode::CREATED,
            )
            .await
    }

    pub async fn top(
        &self,
        telegram_id: i64,
        limit: Option<usize>,
    ) -> APIResponse<get_top_expenses::APIResponse> {
        let query = match limit {
            Some(limit) => format!("?limit={}", limit),
            None => String::new(),
        };
        self.base
            .get(
                format!("user/{}/expenses{}", telegram_id, query),
                StatusCode::OK,
            )
            .await
    }

    pub async fn delete(
        &self,
        telegram_id: i64,
        expense_id: ID,
    ) -> APIResponse<delete_expense::APIResponse> {
        self.base
            .delete(
                format!("user/{}/expenses/{}", telegram_id, expense_id),
                StatusCode::OK,
            )
            .await
    }

    pub async fn statistics(
        &self,
        telegram_id: i64,
        months: u32,
    ) -> APIResponse<get_expense_statistics::APIResponse> {
        self.base
            .get(
                format!("user/{}/statistics?months={}", telegram_id, months),
                StatusCode::OK,
            )
            .await
    }
}
