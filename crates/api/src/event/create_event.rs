use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use kopilka_api_structs::create_event::*;
use kopilka_domain::{Event, RepeatInterval, DEFAULT_MESSAGE_COUNT, ID, MAX_MESSAGE_COUNT};
use kopilka_infra::KopilkaContext;

pub async fn create_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let body = body.0;
    let usecase = CreateEventUseCase {
        user_id: user.id,
        description: body.description,
        event_datetime: body.event_datetime,
        repeat_interval: body.repeat_interval,
        message_count: body.message_count.unwrap_or(DEFAULT_MESSAGE_COUNT),
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Created().json(APIResponse::new(event)))
        .map_err(KopilkaError::from)
}

#[derive(Debug)]
pub struct CreateEventUseCase {
    pub user_id: ID,
    pub description: String,
    pub event_datetime: DateTime<Utc>,
    pub repeat_interval: Option<RepeatInterval>,
    pub message_count: i32,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    EmptyDescription,
    InvalidMessageCount(i32),
    StorageError,
}

impl From<UseCaseError> for KopilkaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::EmptyDescription => {
                Self::BadClientData("The event description can not be empty".into())
            }
            UseCaseError::InvalidMessageCount(count) => Self::BadClientData(format!(
                "Invalid message count: {}, it must be between 1 and {}",
                count, MAX_MESSAGE_COUNT
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = Event;

    type Errors = UseCaseError;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(UseCaseError::EmptyDescription);
        }
        if !Event::is_valid_message_count(self.message_count) {
            return Err(UseCaseError::InvalidMessageCount(self.message_count));
        }

        let event = Event::new(
            self.user_id,
            description.to_string(),
            self.event_datetime,
            self.repeat_interval,
            self.message_count,
            ctx.sys.now(),
        );

        ctx.repos
            .events
            .insert(&event)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
