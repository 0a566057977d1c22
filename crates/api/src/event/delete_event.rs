use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use kopilka_api_structs::delete_event::*;
use kopilka_domain::{Event, ID};
use kopilka_infra::KopilkaContext;

pub async fn delete_event_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let usecase = DeleteEventUseCase {
        user_id: user.id,
        event_id: path_params.event_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Ok().json(APIResponse::new(event)))
        .map_err(KopilkaError::from)
}

/// Deletes an event owned by `user_id`. Reminder messages that were already
/// handed to the job queue are still delivered.
#[derive(Debug)]
pub struct DeleteEventUseCase {
    pub user_id: ID,
    pub event_id: ID,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    NotFound(ID),
    StorageError,
}

impl From<UseCaseError> for KopilkaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(event_id) => Self::NotFound(format!(
                "The event with id: {}, was not found.",
                event_id
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for DeleteEventUseCase {
    type Response = Event;

    type Errors = UseCaseError;

    const NAME: &'static str = "DeleteEvent";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        let event = match ctx.repos.events.find(self.event_id).await {
            Ok(Some(event)) if event.user_id == self.user_id => event,
            Ok(_) => return Err(UseCaseError::NotFound(self.event_id)),
            Err(_) => return Err(UseCaseError::StorageError),
        };

        match ctx.repos.events.delete(event.id).await {
            Ok(Some(deleted)) => Ok(deleted),
            // Removed by a scan pass in the meantime
            Ok(None) => Err(UseCaseError::NotFound(self.event_id)),
            Err(_) => Err(UseCaseError::StorageError),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use kopilka_domain::User;

    #[actix_web::main]
    #[test]
    async fn deletes_only_own_events() {
        let ctx = KopilkaContext::create_inmemory();
        let owner = ctx
            .repos
            .users
            .insert(&User::new(1000, 2000, "Anna".into(), None))
            .await
            .unwrap();
        let other = ctx
            .repos
            .users
            .insert(&User::new(1001, 2001, "Boris".into(), None))
            .await
            .unwrap();
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 6, 0, 0).unwrap();
        let event = ctx
            .repos
            .events
            .insert(&Event::new(owner.id, "Позвонить маме".into(), at, None, 1, at))
            .await
            .unwrap();

        let mut usecase = DeleteEventUseCase {
            user_id: other.id,
            event_id: event.id,
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(event.id))
        );

        let mut usecase = DeleteEventUseCase {
            user_id: owner.id,
            event_id: event.id,
        };
        assert_eq!(usecase.execute(&ctx).await, Ok(event.clone()));
        assert!(ctx.repos.events.find(event.id).await.unwrap().is_none());
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(event.id))
        );
    }
}
