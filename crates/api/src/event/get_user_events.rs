use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use kopilka_api_structs::get_user_events::*;
use kopilka_domain::{Event, ID};
use kopilka_infra::KopilkaContext;

pub async fn get_user_events_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let usecase = GetUserEventsUseCase { user_id: user.id };

    execute(usecase, &ctx)
        .await
        .map(|events| HttpResponse::Ok().json(APIResponse::new(events)))
        .map_err(KopilkaError::from)
}

/// Upcoming events of a user, soonest first
#[derive(Debug)]
pub struct GetUserEventsUseCase {
    pub user_id: ID,
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
impl UseCase for GetUserEventsUseCase {
    type Response = Vec<Event>;

    type Errors = UseCaseError;

    const NAME: &'static str = "GetUserEvents";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        ctx.repos
            .events
            .find_by_user(self.user_id)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
