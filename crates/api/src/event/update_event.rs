use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use kopilka_api_structs::update_event::*;
use kopilka_domain::{Event, RepeatInterval, ID, MAX_MESSAGE_COUNT};
use kopilka_infra::KopilkaContext;

pub async fn update_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let body = body.0;
    let usecase = UpdateEventUseCase {
        user_id: user.id,
        event_id: path_params.event_id,
        description: body.description,
        event_datetime: body.event_datetime,
        repeat_interval: body.repeat_interval,
        message_count: body.message_count,
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(APIResponse::new(event)))
        .map_err(KopilkaError::from)
}

/// Replaces the description and the schedule of an event owned by `user_id`.
/// A missing `repeat_interval` turns the event into a one-shot reminder and a
/// missing `message_count` keeps the current one.
#[derive(Debug)]
pub struct UpdateEventUseCase {
    pub user_id: ID,
    pub event_id: ID,
    pub description: String,
    pub event_datetime: DateTime<Utc>,
    pub repeat_interval: Option<RepeatInterval>,
    pub message_count: Option<i32>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    EmptyDescription,
    InvalidMessageCount(i32),
    StorageError,
}

impl From<UseCaseError> for KopilkaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(event_id) => Self::NotFound(format!(
                "The event with id: {}, was not found.",
                event_id
            )),
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
impl UseCase for UpdateEventUseCase {
    type Response = Event;

    type Errors = UseCaseError;

    const NAME: &'static str = "UpdateEvent";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(UseCaseError::EmptyDescription);
        }
        if let Some(count) = self.message_count {
            if !Event::is_valid_message_count(count) {
                return Err(UseCaseError::InvalidMessageCount(count));
            }
        }

        let mut event = match ctx.repos.events.find(self.event_id).await {
            Ok(Some(event)) if event.user_id == self.user_id => event,
            Ok(_) => return Err(UseCaseError::NotFound(self.event_id)),
            Err(_) => return Err(UseCaseError::StorageError),
        };

        event.description = description.to_string();
        event.event_datetime = self.event_datetime;
        event.repeat_interval = self.repeat_interval;
        if let Some(count) = self.message_count {
            event.message_count = count;
        }
        event.updated = ctx.sys.now();

        ctx.repos
            .events
            .save(&event)
            .await
            .map(|_| event)
            .map_err(|_| UseCaseError::StorageError)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{Duration, TimeZone};
    use kopilka_domain::User;

    struct TestContext {
        ctx: KopilkaContext,
        user: User,
        event: Event,
    }

    async fn setup() -> TestContext {
        let ctx = KopilkaContext::create_inmemory();
        let user = ctx
            .repos
            .users
            .insert(&User::new(1000, 2000, "Anna".into(), None))
            .await
            .unwrap();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap();
        let event = Event::new(
            user.id,
            "Оплатить интернет".into(),
            at,
            Some(RepeatInterval::Monthly),
            3,
            at - Duration::days(3),
        );
        let event = ctx.repos.events.insert(&event).await.unwrap();

        TestContext { ctx, user, event }
    }

    #[actix_web::main]
    #[test]
    async fn replaces_description_and_schedule() {
        let TestContext { ctx, user, event } = setup().await;

        let new_datetime = event.event_datetime + Duration::days(2);
        let mut usecase = UpdateEventUseCase {
            user_id: user.id,
            event_id: event.id,
            description: "Оплатить свет".into(),
            event_datetime: new_datetime,
            repeat_interval: None,
            message_count: None,
        };
        let updated = usecase.execute(&ctx).await.unwrap();

        assert_eq!(updated.description, "Оплатить свет");
        assert_eq!(updated.event_datetime, new_datetime);
        assert_eq!(updated.repeat_interval, None);
        assert_eq!(updated.message_count, 3);
        assert_eq!(
            ctx.repos.events.find(event.id).await.unwrap(),
            Some(updated)
        );
    }

    #[actix_web::main]
    #[test]
    async fn only_the_owner_can_update() {
        let TestContext { ctx, event, .. } = setup().await;
        let other = ctx
            .repos
            .users
            .insert(&User::new(1001, 2001, "Boris".into(), None))
            .await
            .unwrap();

        let mut usecase = UpdateEventUseCase {
            user_id: other.id,
            event_id: event.id,
            description: "Чужое".into(),
            event_datetime: event.event_datetime,
            repeat_interval: None,
            message_count: Some(5),
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(event.id))
        );
        assert_eq!(ctx.repos.events.find(event.id).await.unwrap(), Some(event));
    }
}
