use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use kopilka_domain::{
    date::{format_local_datetime, parse_local_datetime},
    Event, RepeatInterval, DEFAULT_MESSAGE_COUNT, ID, MAX_MESSAGE_COUNT,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

pub const START_COMMAND: &str = "/start";
pub const CANCEL_COMMAND: &str = "/cancel";

pub const MENU_REMINDERS: &str = "Напоминания";
pub const MENU_ADD_REMINDER: &str = "Добавить напоминание";
pub const MENU_LIST_REMINDERS: &str = "Посмотреть напоминания";
pub const MENU_DELETE_REMINDER: &str = "Удалить напоминание";
pub const MENU_EDIT_REMINDER: &str = "Редактировать напоминание";
pub const MENU_STATISTICS: &str = "Статистика";
pub const MENU_STATISTICS_THREE_MONTHS: &str = "Статистика за три месяца";
pub const MENU_RECENT_EXPENSES: &str = "Последние расходы";
pub const MENU_DELETE_EXPENSE: &str = "Удалить расход";

const SKIP: &str = "Пропустить";
const YES: &str = "да";
const NO: &str = "нет";

pub const MAIN_KEYBOARD: &[&[&str]] = &[
    &[MENU_REMINDERS],
    &[MENU_STATISTICS, MENU_STATISTICS_THREE_MONTHS],
    &[MENU_RECENT_EXPENSES, MENU_DELETE_EXPENSE],
];

pub const REMINDER_KEYBOARD: &[&[&str]] = &[
    &[MENU_ADD_REMINDER],
    &[MENU_LIST_REMINDERS],
    &[MENU_DELETE_REMINDER],
    &[MENU_EDIT_REMINDER],
];

const INTERVAL_KEYBOARD: &[&[&str]] = &[
    &["ежедневно"],
    &["еженедельно"],
    &["ежемесячно"],
    &["раз в полгода"],
    &["ежегодно"],
    &[SKIP],
];

const CONFIRM_KEYBOARD: &[&[&str]] = &[&[YES, NO]];

const SKIP_KEYBOARD: &[&[&str]] = &[&[SKIP]];

/// A reminder being put together in a dialog
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub description: String,
    pub event_datetime: DateTime<Utc>,
    pub repeat_interval: Option<RepeatInterval>,
    /// `None` keeps the current count when editing
    pub message_count: Option<i32>,
}

impl EventDraft {
    fn describe(&self, tz: &Tz) -> String {
        let mut text = format!(
            "Событие:\n🗓️ Описание: {}\n⏰ Дата/время: {}\n🔄 Интервал: {}",
            self.description,
            format_local_datetime(&self.event_datetime, tz),
            interval_label(self.repeat_interval)
        );
        if let Some(count) = self.message_count {
            text.push_str(&format!("\n🔢 Количество сообщений: {}", count));
        }
        text
    }
}

pub fn interval_label(interval: Option<RepeatInterval>) -> &'static str {
    match interval {
        Some(interval) => interval.label(),
        None => "однократное",
    }
}

/// Where a chat is in a conversation with the bot
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DialogState {
    #[default]
    Idle,
    AwaitDescription,
    AwaitDateTime {
        description: String,
    },
    AwaitInterval {
        description: String,
        event_datetime: DateTime<Utc>,
    },
    AwaitMessageCount {
        description: String,
        event_datetime: DateTime<Utc>,
        repeat_interval: Option<RepeatInterval>,
    },
    AwaitConfirm(EventDraft),
    EditAwaitEventId,
    EditAwaitDescription {
        event_id: ID,
    },
    EditAwaitDateTime {
        event_id: ID,
        description: String,
    },
    EditAwaitInterval {
        event_id: ID,
        description: String,
        event_datetime: DateTime<Utc>,
    },
    EditAwaitConfirm {
        event_id: ID,
        draft: EventDraft,
    },
    DeleteAwaitEventId,
    DeleteExpenseAwaitId,
}

/// Questions the bot asks while a dialog is running
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Description,
    NewDescription,
    DateTime,
    InvalidDateTime,
    Interval,
    InvalidInterval,
    MessageCount,
    InvalidMessageCount,
    ConfirmEvent(EventDraft),
    ConfirmEdit(EventDraft),
    InvalidConfirmation,
    EventIdToEdit,
    EventIdToDelete,
    InvalidEventId,
    ExpenseIdToDelete,
    InvalidExpenseId,
}

impl Prompt {
    pub fn text(&self, tz: &Tz) -> String {
        match self {
            Self::Description => "Введите описание события:".into(),
            Self::NewDescription => "Введите новое описание события:".into(),
            Self::DateTime => "Введите дату и время напоминания (формат YYYY-MM-DD HH:MM):".into(),
            Self::InvalidDateTime => "Неверный формат даты или времени! Пожалуйста, повторите ввод (формат YYYY-MM-DD HH:MM):".into(),
            Self::Interval => "Введите интервал повторения:".into(),
            Self::InvalidInterval => "Неизвестный интервал. Выберите интервал на клавиатуре:".into(),
            Self::MessageCount => format!(
                "Введите количество сообщений (число от 1 до {}) для напоминания, по умолчанию будет {}:",
                MAX_MESSAGE_COUNT, DEFAULT_MESSAGE_COUNT
            ),
            Self::InvalidMessageCount => format!(
                "Некорректное количество напоминаний, введите число от 1 до {}:",
                MAX_MESSAGE_COUNT
            ),
            Self::ConfirmEvent(draft) => format!(
                "{}\nПодтвердите добавление события (да/нет):",
                draft.describe(tz)
            ),
            Self::ConfirmEdit(draft) => format!(
                "{}\nПодтвердите изменение события (да/нет):",
                draft.describe(tz)
            ),
            Self::InvalidConfirmation => "Ответьте «да» или «нет»:".into(),
            Self::EventIdToEdit => "Введите id события для редактирования:".into(),
            Self::EventIdToDelete => "Введите id события для удаления:".into(),
            Self::InvalidEventId => "Пожалуйста, введите корректный ID напоминания.".into(),
            Self::ExpenseIdToDelete => "Введите ID траты, которую хотите удалить.".into(),
            Self::InvalidExpenseId => "Пожалуйста, введите корректный ID траты.".into(),
        }
    }

    /// `None` removes the reply keyboard
    pub fn keyboard(&self) -> Option<&'static [&'static [&'static str]]> {
        match self {
            Self::Interval | Self::InvalidInterval => Some(INTERVAL_KEYBOARD),
            Self::MessageCount | Self::InvalidMessageCount => Some(SKIP_KEYBOARD),
            Self::ConfirmEvent(_) | Self::ConfirmEdit(_) | Self::InvalidConfirmation => {
                Some(CONFIRM_KEYBOARD)
            }
            _ => None,
        }
    }
}

/// What the bot has to do in reaction to a message
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Greet,
    Cancel,
    ShowReminderMenu,
    Ask(Prompt),
    ListEvents,
    /// Lists the events of the user and asks the prompt. Without events the
    /// dialog ends.
    ListEventsAndAsk(Prompt),
    CreateEvent(EventDraft),
    UpdateEvent { event_id: ID, draft: EventDraft },
    DeleteEvent(ID),
    Aborted,
    AddExpense(String),
    ShowStatistics { months_back: u32 },
    ShowRecentExpenses,
    ListExpensesAndAsk(Prompt),
    DeleteExpense(ID),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next: DialogState,
    pub action: Action,
}

impl Transition {
    fn to(next: DialogState, action: Action) -> Self {
        Self { next, action }
    }

    fn idle(action: Action) -> Self {
        Self::to(DialogState::Idle, action)
    }
}

fn parse_id(input: &str) -> Option<ID> {
    input.trim().parse::<ID>().ok().filter(|id| *id > 0)
}

fn is_skip(input: &str) -> bool {
    input.trim().to_lowercase() == SKIP.to_lowercase()
}

fn parse_interval(input: &str) -> Option<Option<RepeatInterval>> {
    if is_skip(input) {
        return Some(None);
    }
    input.parse::<RepeatInterval>().ok().map(Some)
}

fn parse_message_count(input: &str) -> Option<i32> {
    if is_skip(input) || input.trim().is_empty() {
        return Some(DEFAULT_MESSAGE_COUNT);
    }
    input
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|count| Event::is_valid_message_count(*count))
}

enum Confirmation {
    Yes,
    No,
    Unknown,
}

fn parse_confirmation(input: &str) -> Confirmation {
    match input.trim().to_lowercase().as_str() {
        YES => Confirmation::Yes,
        NO => Confirmation::No,
        _ => Confirmation::Unknown,
    }
}

fn non_empty(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

impl DialogState {
    /// Moves the dialog forward by one message. Input a state does not accept
    /// keeps the dialog where it is and asks again.
    pub fn on_input(self, input: &str, tz: &Tz) -> Transition {
        use DialogState::*;

        match input.trim() {
            START_COMMAND => return Transition::idle(Action::Greet),
            CANCEL_COMMAND => return Transition::idle(Action::Cancel),
            _ => (),
        }

        match self {
            Idle => Self::on_idle_input(input),
            AwaitDescription => match non_empty(input) {
                Some(description) => Transition::to(
                    AwaitDateTime { description },
                    Action::Ask(Prompt::DateTime),
                ),
                None => Transition::to(AwaitDescription, Action::Ask(Prompt::Description)),
            },
            AwaitDateTime { description } => match parse_local_datetime(input, tz) {
                Some(event_datetime) => Transition::to(
                    AwaitInterval {
                        description,
                        event_datetime,
                    },
                    Action::Ask(Prompt::Interval),
                ),
                None => Transition::to(
                    AwaitDateTime { description },
                    Action::Ask(Prompt::InvalidDateTime),
                ),
            },
            AwaitInterval {
                description,
                event_datetime,
            } => match parse_interval(input) {
                Some(repeat_interval) => Transition::to(
                    AwaitMessageCount {
                        description,
                        event_datetime,
                        repeat_interval,
                    },
                    Action::Ask(Prompt::MessageCount),
                ),
                None => Transition::to(
                    AwaitInterval {
                        description,
                        event_datetime,
                    },
                    Action::Ask(Prompt::InvalidInterval),
                ),
            },
            AwaitMessageCount {
                description,
                event_datetime,
                repeat_interval,
            } => match parse_message_count(input) {
                Some(count) => {
                    let draft = EventDraft {
                        description,
                        event_datetime,
                        repeat_interval,
                        message_count: Some(count),
                    };
                    Transition::to(
                        AwaitConfirm(draft.clone()),
                        Action::Ask(Prompt::ConfirmEvent(draft)),
                    )
                }
                None => Transition::to(
                    AwaitMessageCount {
                        description,
                        event_datetime,
                        repeat_interval,
                    },
                    Action::Ask(Prompt::InvalidMessageCount),
                ),
            },
            AwaitConfirm(draft) => match parse_confirmation(input) {
                Confirmation::Yes => Transition::idle(Action::CreateEvent(draft)),
                Confirmation::No => Transition::idle(Action::Aborted),
                Confirmation::Unknown => {
                    Transition::to(AwaitConfirm(draft), Action::Ask(Prompt::InvalidConfirmation))
                }
            },
            EditAwaitEventId => match parse_id(input) {
                Some(event_id) => Transition::to(
                    EditAwaitDescription { event_id },
                    Action::Ask(Prompt::NewDescription),
                ),
                None => Transition::to(EditAwaitEventId, Action::Ask(Prompt::InvalidEventId)),
            },
            EditAwaitDescription { event_id } => match non_empty(input) {
                Some(description) => Transition::to(
                    EditAwaitDateTime {
                        event_id,
                        description,
                    },
                    Action::Ask(Prompt::DateTime),
                ),
                None => Transition::to(
                    EditAwaitDescription { event_id },
                    Action::Ask(Prompt::NewDescription),
                ),
            },
            EditAwaitDateTime {
                event_id,
                description,
            } => match parse_local_datetime(input, tz) {
                Some(event_datetime) => Transition::to(
                    EditAwaitInterval {
                        event_id,
                        description,
                        event_datetime,
                    },
                    Action::Ask(Prompt::Interval),
                ),
                None => Transition::to(
                    EditAwaitDateTime {
                        event_id,
                        description,
                    },
                    Action::Ask(Prompt::InvalidDateTime),
                ),
            },
            EditAwaitInterval {
                event_id,
                description,
                event_datetime,
            } => match parse_interval(input) {
                Some(repeat_interval) => {
                    let draft = EventDraft {
                        description,
                        event_datetime,
                        repeat_interval,
                        message_count: None,
                    };
                    Transition::to(
                        EditAwaitConfirm {
                            event_id,
                            draft: draft.clone(),
                        },
                        Action::Ask(Prompt::ConfirmEdit(draft)),
                    )
                }
                None => Transition::to(
                    EditAwaitInterval {
                        event_id,
                        description,
                        event_datetime,
                    },
                    Action::Ask(Prompt::InvalidInterval),
                ),
            },
            EditAwaitConfirm { event_id, draft } => match parse_confirmation(input) {
                Confirmation::Yes => Transition::idle(Action::UpdateEvent { event_id, draft }),
                Confirmation::No => Transition::idle(Action::Aborted),
                Confirmation::Unknown => Transition::to(
                    EditAwaitConfirm { event_id, draft },
                    Action::Ask(Prompt::InvalidConfirmation),
                ),
            },
            DeleteAwaitEventId => match parse_id(input) {
                Some(event_id) => Transition::idle(Action::DeleteEvent(event_id)),
                None => Transition::to(DeleteAwaitEventId, Action::Ask(Prompt::InvalidEventId)),
            },
            DeleteExpenseAwaitId => match parse_id(input) {
                Some(expense_id) => Transition::idle(Action::DeleteExpense(expense_id)),
                None => Transition::to(
                    DeleteExpenseAwaitId,
                    Action::Ask(Prompt::InvalidExpenseId),
                ),
            },
        }
    }

    fn on_idle_input(input: &str) -> Transition {
        match input.trim() {
            MENU_REMINDERS => Transition::idle(Action::ShowReminderMenu),
            MENU_ADD_REMINDER => Transition::to(
                DialogState::AwaitDescription,
                Action::Ask(Prompt::Description),
            ),
            MENU_LIST_REMINDERS => Transition::idle(Action::ListEvents),
            MENU_DELETE_REMINDER => Transition::to(
                DialogState::DeleteAwaitEventId,
                Action::ListEventsAndAsk(Prompt::EventIdToDelete),
            ),
            MENU_EDIT_REMINDER => Transition::to(
                DialogState::EditAwaitEventId,
                Action::ListEventsAndAsk(Prompt::EventIdToEdit),
            ),
            MENU_STATISTICS => Transition::idle(Action::ShowStatistics { months_back: 0 }),
            MENU_STATISTICS_THREE_MONTHS => {
                Transition::idle(Action::ShowStatistics { months_back: 2 })
            }
            MENU_RECENT_EXPENSES => Transition::idle(Action::ShowRecentExpenses),
            MENU_DELETE_EXPENSE => Transition::to(
                DialogState::DeleteExpenseAwaitId,
                Action::ListExpensesAndAsk(Prompt::ExpenseIdToDelete),
            ),
            other => Transition::idle(Action::AddExpense(other.to_string())),
        }
    }
}

/// Dialog states of all chats, chats without an entry are idle
#[derive(Default)]
pub struct DialogStore {
    states: Mutex<HashMap<i64, DialogState>>,
    chat_locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

impl DialogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes the updates of one chat. Must be held from `take` until the
    /// matching `set`, otherwise a concurrent update reads `Idle`.
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .chat_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(chat_id)
            .or_default()
            .clone();
        lock.lock_owned().await
    }

    pub fn take(&self, chat_id: i64) -> DialogState {
        self.states
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&chat_id)
            .unwrap_or_default()
    }

    pub fn set(&self, chat_id: i64, state: DialogState) {
        let mut states = self.states.lock().unwrap_or_else(PoisonError::into_inner);
        if state == DialogState::Idle {
            states.remove(&chat_id);
        } else {
            states.insert(chat_id, state);
        }
    }
}
