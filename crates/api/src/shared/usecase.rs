use kopilka_infra::KopilkaContext;
use std::fmt::Debug;
use tracing::error;

#[async_trait::async_trait(?Send)]
pub trait UseCase: Debug {
    type Response;
    type Errors: Debug;

    const NAME: &'static str;

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors>;
}

#[tracing::instrument(name = "UseCase executed", skip(usecase, ctx), fields(usecase = %U::NAME))]
pub async fn execute<U>(mut usecase: U, ctx: &KopilkaContext) -> Result<U::Response, U::Errors>
where
    U: UseCase,
{
    let res = usecase.execute(ctx).await;

    if let Err(e) = &res {
        error!("Use case error: {:?}", e);
    }

    res
}
