use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use kopilka_api_structs::delete_expense::*;
use kopilka_domain::{Expense, ID};
use kopilka_infra::KopilkaContext;

pub async fn delete_expense_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let usecase = DeleteExpenseUseCase {
        user_id: user.id,
        expense_id: path_params.expense_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|expense| {
            HttpResponse::Ok().json(APIResponse {
                expense_id: expense.id,
            })
        })
        .map_err(KopilkaError::from)
}

#[derive(Debug)]
pub struct DeleteExpenseUseCase {
    pub user_id: ID,
    pub expense_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for KopilkaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(expense_id) => Self::NotFound(format!(
                "The expense with id: {}, was not found.",
                expense_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteExpenseUseCase {
    type Response = Expense;

    type Errors = UseCaseError;

    const NAME: &'static str = "DeleteExpense";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        match ctx
            .repos
            .expenses
            .delete_for_user(self.expense_id, self.user_id)
            .await
        {
            Ok(Some(expense)) => Ok(expense),
            Ok(None) => Err(UseCaseError::NotFound(self.expense_id)),
            Err(_) => Err(UseCaseError::StorageError),
        }
    }
}
