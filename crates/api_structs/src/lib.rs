mod event;
mod expense;
mod status;
mod telegram;
mod user;

pub mod dtos {
    pub use crate::event::dtos::*;
    pub use crate::expense::dtos::*;
    pub use crate::user::dtos::*;
}

pub use crate::event::api::*;
pub use crate::expense::api::*;
pub use crate::status::api::*;
pub use crate::telegram::api::*;
pub use crate::user::api::*;
