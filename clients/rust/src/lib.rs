mod base;
mod event;
mod expense;
mod status;
mod user;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIErrorVariant, APIResponse};
use event::EventClient;
pub use event::{CreateEventInput, UpdateEventInput};
use expense::ExpenseClient;
pub use expense::AddExpenseInput;
pub use kopilka_api_structs::dtos::*;
pub use kopilka_domain::{RepeatInterval, ID};
use status::StatusClient;
use std::sync::Arc;
use user::UserClient;
pub use user::GetOrCreateUserInput;

// Domain
pub use kopilka_api_structs::dtos::EventDTO as Event;
pub use kopilka_api_structs::dtos::ExpenseDTO as Expense;
pub use kopilka_api_structs::dtos::ExpenseStatisticDTO as ExpenseStatistic;
pub use kopilka_api_structs::dtos::UserDTO as User;

/// Kopilka Server SDK
///
/// The SDK contains methods for interacting with the Kopilka server
/// API. Every request carries the api key of the server.
#[derive(Clone)]
pub struct KopilkaSDK {
    pub event: EventClient,
    pub expense: ExpenseClient,
    pub status: StatusClient,
    pub user: UserClient,
}

impl KopilkaSDK {
    pub fn new<T: Into<String>>(address: String, api_key: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_api_key(api_key.into());
        let base = Arc::new(base);
        let event = EventClient::new(base.clone());
        let expense = ExpenseClient::new(base.clone());
        let status = StatusClient::new(base.clone());
        let user = UserClient::new(base);

        Self {
            event,
            expense,
            status,
            user,
        }
    }
}
