use crate::error::KopilkaError;
use crate::shared::{
    auth::{find_user_by_telegram_id, protect_api_route},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use kopilka_api_structs::add_expense::*;
use kopilka_domain::{Expense, ExpenseWithCategory, Kopecks, ID};
use kopilka_infra::KopilkaContext;

pub async fn add_expense_controller(
    http_req: HttpRequest,
    path_params: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<KopilkaContext>,
) -> Result<HttpResponse, KopilkaError> {
    protect_api_route(&http_req, &ctx)?;
    let user = find_user_by_telegram_id(path_params.telegram_id, &ctx).await?;

    let body = body.0;
    let usecase = AddExpenseUseCase {
        user_id: user.id,
        amount: body.amount,
        category_alias: body.category,
        description: body.description,
    };

    execute(usecase, &ctx)
        .await
        .map(|expense| HttpResponse::Created().json(APIResponse::new(expense)))
        .map_err(KopilkaError::from)
}

/// Books an expense on the category selected by `category_alias`. Unknown
/// aliases are booked on the fallback category.
#[derive(Debug)]
pub struct AddExpenseUseCase {
    pub user_id: ID,
    pub amount: Kopecks,
    pub category_alias: String,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum UseCaseError {
    InvalidAmount(Kopecks),
    NoCategory(String),
    StorageError,
}

impl From<UseCaseError> for KopilkaError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidAmount(amount) => Self::BadClientData(format!(
                "Invalid amount: {}, it must be a positive number of kopecks",
                amount
            )),
            UseCaseError::NoCategory(alias) => Self::BadClientData(format!(
                "No category found for: {}",
                alias
            )),
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for AddExpenseUseCase {
    type Response = ExpenseWithCategory;

    type Errors = UseCaseError;

    const NAME: &'static str = "AddExpense";

    async fn execute(&mut self, ctx: &KopilkaContext) -> Result<Self::Response, Self::Errors> {
        if self.amount <= 0 {
            return Err(UseCaseError::InvalidAmount(self.amount));
        }

        let category = match ctx.repos.categories.find_by_alias(&self.category_alias).await {
            Ok(Some(category)) => category,
            Ok(None) => return Err(UseCaseError::NoCategory(self.category_alias.clone())),
            Err(_) => return Err(UseCaseError::StorageError),
        };

        let expense = Expense {
            id: Default::default(),
            user_id: self.user_id,
            category_id: category.id,
            amount: self.amount,
            description: self
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created: ctx.sys.now(),
        };

        let expense = ctx
            .repos
            .expenses
            .insert(&expense)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(ExpenseWithCategory {
            expense,
            category_name: category.name,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    async fn setup() -> KopilkaContext {
        let ctx = KopilkaContext::create_inmemory();
        ctx.repos.categories.seed_defaults().await.unwrap();
        ctx
    }

    #[actix_web::main]
    #[test]
    async fn books_on_the_aliased_category() {
        let ctx = setup().await;

        let mut usecase = AddExpenseUseCase {
            user_id: 1,
            amount: 35000,
            category_alias: "Шаурма".into(),
            description: Some(" у метро ".into()),
        };
        let res = usecase.execute(&ctx).await.unwrap();

        assert_eq!(res.category_name, "кафе");
        assert_eq!(res.expense.amount, 35000);
        assert_eq!(res.expense.description, Some("у метро".into()));
        let recent = ctx.repos.expenses.find_recent_for_user(1, 10).await.unwrap();
        assert_eq!(recent, vec![res]);
    }

    #[actix_web::main]
    #[test]
    async fn unknown_aliases_fall_back_to_other() {
        let ctx = setup().await;

        let mut usecase = AddExpenseUseCase {
            user_id: 1,
            amount: 100,
            category_alias: "носки".into(),
            description: None,
        };
        let res = usecase.execute(&ctx).await.unwrap();

        assert_eq!(res.category_name, "прочее");
    }

    #[actix_web::main]
    #[test]
    async fn rejects_non_positive_amounts() {
        let ctx = setup().await;

        let mut usecase = AddExpenseUseCase {
            user_id: 1,
            amount: 0,
            category_alias: "кафе".into(),
            description: None,
        };
        assert_eq!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::InvalidAmount(0))
        );
    }
}
