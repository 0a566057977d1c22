mod category;
pub mod date;
mod event;
mod expense;
mod notification;
mod shared;
mod user;

pub use category::{
    default_categories, resolve_category, Category, FALLBACK_CATEGORY_ALIAS,
};
pub use event::{Event, EventAdvance, DEFAULT_MESSAGE_COUNT, MAX_MESSAGE_COUNT};
pub use expense::{
    format_amount, parse_amount, sort_statistics, Expense, ExpenseMessage, ExpenseParseError,
    ExpenseStatistic, ExpenseWithCategory, Kopecks,
};
pub use notification::{
    reminder_text, DedupKey, InvalidDedupKeyError, NotificationJob, REMINDER_LABEL,
    SEND_REMINDER_JOB,
};
pub use shared::entity::{Entity, ID};
pub use shared::recurrence::{next_occurrence, RecurrenceError, RepeatInterval};
pub use user::User;
