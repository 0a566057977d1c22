use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use kopilka_api_structs::{dtos::ExpenseStatisticDTO, get_expense_statistics::*};
use kopilka_domain::{date::start_of_month, ExpenseStatistic, Kopecks, ID};
use kopilka_infra::KopilkaContext;

const MAX_MONTHS_BACK: u32 = 24;

pub async fn get_expense_statistics_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    query_params: web::Query<QueryParams>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let usecase = GetExpenseStatisticsUseCase {
        user_id: user.id,
        months_back: query_params.months.unwrap_or(0),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse {
                since: res.since,
                until: res.until,
                total: res.total(),
                statistics: res
                    .statistics
                    .into_iter()
                    .map(ExpenseStatisticDTO::new)
                    .collect(),
            })
        })
        .map_err(KopilkaError::from)
}

/// Per category totals from the start of the current local month, or of the
/// month `months_back` months earlier, until now
#[derive(Debug)]
pub struct GetExpenseStatisticsUseCase {
    pub user_id: ID,
    pub months_back: u32,
}

#[derive(Debug, PartialEq)]
pub struct UseCaseRes {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
    /// Largest amount first
    pub statistics: Vec<ExpenseStatistic>,
}

impl UseCaseRes {
    pub fn total(&self) -> Kopecks {
        self.statistics.iter().map(|s| s.amount).sum()
    }
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidMonths(u32),
    StorageError,
}

impl From<UseCaseError> for KopilkaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidMonths(months) => Self::BadClientData(format!(
                "Invalid months: {}, at most {} months back are supported",
                months, MAX_MONTHS_BACK
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExpenseStatisticsUseCase {
    type Response = UseCaseRes;

    type Errors = UseCaseError;

    const NAME: &'static str = "GetExpenseStatistics";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        if self.months_back > MAX_MONTHS_BACK {
            return Err(UseCaseError::InvalidMonths(self.months_back));
        }

        let until = ctx.sys.now();
        let since = start_of_month(until, self.months_back, &ctx.config.timezone);
        let statistics = ctx
            .repos
            .expenses
            .sum_by_category_for_user(self.user_id, since, until)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(UseCaseRes {
            since,
            until,
            statistics,
        })
    }
}
