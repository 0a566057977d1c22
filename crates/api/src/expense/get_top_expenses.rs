use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use kopilka_api_structs::get_top_expenses::*;
use kopilka_domain::{ExpenseWithCategory, ID};
use kopilka_infra::KopilkaContext;

pub const DEFAULT_TOP_EXPENSES: usize = 10;
const MAX_TOP_EXPENSES: usize = 100;

pub async fn get_top_expenses_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let usecase = GetTopExpensesUseCase {
        user_id: user.id,
        limit: query_params.limit.unwrap_or(DEFAULT_TOP_EXPENSES),
    };

    execute(usecase, &ctx)
        .await
        .map(|expenses| HttpResponse::Ok().json(APIResponse::new(expenses)))
        .map_err(KopilkaError::from)
}

/// The latest expenses of a user, newest first
#[derive(Debug)]
pub struct GetTopExpensesUseCase {
    pub user_id: ID,
    pub limit: usize,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    StorageError,
}

impl From<UseCaseError> for KopilkaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetTopExpensesUseCase {
    type Response = Vec<ExpenseWithCategory>;

    type Errors = UseCaseError;

    const NAME: &'static str = "GetTopExpenses";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        let limit = self.limit.clamp(1, MAX_TOP_EXPENSES);
        ctx.repos
            .expenses
            .find_recent_for_user(self.user_id, limit)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
