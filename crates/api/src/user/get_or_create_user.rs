use crate::shared::usecase::{execute, UseCase};
use crate::{error::KopilkaError, shared::auth::protect_api_route};
use actix_web::{web, HttpRequest, HttpResponse};
use kopilka_api_structs::get_or_create_user::*;
use kopilka_domain::User;
use kopilka_infra::KopilkaContext;

pub async fn get_or_create_user_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;

    let body = body.0;
    let usecase = GetOrCreateUserUseCase {
        telegram_id: body.telegram_id,
        chat_id: body.chat_id,
        name: body.name,
        lastname: body.lastname,
    };

    execute(usecase, &ctx)
        .await
        .map(|user| HttpResponse::Ok().json(APIResponse::new(user)))
        .map_err(KopilkaError::from)
}

/// Registers a chat user the first time they talk to the bot. An existing user
/// is returned as it is.
#[derive(Debug)]
pub struct GetOrCreateUserUseCase {
    pub telegram_id: i64,
    pub chat_id: i64,
    pub name: String,
    pub lastname: Option<String>,
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
impl UseCase for GetOrCreateUserUseCase {
    type Response = User;
    type Errors = UseCaseError;

    const NAME: &'static str = "GetOrCreateUser";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        let user = User::new(
            self.telegram_id,
            self.chat_id,
            self.name.clone(),
            self.lastname.clone(),
        );

        ctx.repos
            .users
            .get_or_create(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)
    }
}
