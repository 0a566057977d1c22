use super::dialog::{
    interval_label, Action, DialogStore, Prompt, MAIN_KEYBOARD, REMINDER_KEYBOARD,
};
use crate::error::KopilkaError;
use crate::event::{
    create_event::CreateEventUseCase, delete_event::DeleteEventUseCase,
    get_user_events::GetUserEventsUseCase, update_event::UpdateEventUseCase,
};
use crate::expense::{
    add_expense::AddExpenseUseCase,
    delete_expense::DeleteExpenseUseCase,
    get_expense_statistics::GetExpenseStatisticsUseCase,
    get_top_expenses::{GetTopExpensesUseCase, DEFAULT_TOP_EXPENSES},
};
use crate::shared::{auth::protect_telegram_route, usecase::execute};
use crate::user::get_or_create_user::GetOrCreateUserUseCase;
use actix_web::{web, HttpRequest, HttpResponse};
use chrono_tz::Tz;
use kopilka_api_structs::telegram_webhook::*;
use kopilka_domain::{
    date::format_local_datetime, format_amount, Event, ExpenseMessage, ExpenseWithCategory, User,
    DEFAULT_MESSAGE_COUNT,
};
use kopilka_infra::{KopilkaContext, OutgoingMessage};
use tracing::{error, info};

const ERROR_REPLY: &str = "Произошла ошибка. Попробуйте позже. ❌";
const NO_EVENTS_REPLY: &str = "У вас нет запланированных событий. 📋";
const NO_EXPENSES_REPLY: &str = "У вас пока нет расходов.";
const EXPENSE_HINT: &str =
    "Чтобы добавить расход, напишите сумму и категорию, например: 350 кафе обед";

pub async fn telegram_webhook_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<KopilkaContext>,
    dialogs: web::Data<DialogStore>,
) -> Result<HttpResponse, KopilkaError> {
    protect_telegram_route(&http_req, &ctx)?;

    let handled = match body.0.message {
        Some(message) => handle_message(message, &ctx, &dialogs).await,
        None => false,
    };

    // Telegram redelivers updates that were not answered with a 2xx, so
    // failures are only reported to the chat
    Ok(HttpResponse::Ok().json(APIResponse { handled }))
}

/// Feeds a chat message through the dialog of its chat and sends the replies.
/// Returns `false` for messages the bot does not react to.
pub async fn handle_message(
    message: TelegramMessage,
    ctx: &KopilkaContext,
    dialogs: &DialogStore,
) -> bool {
    let (text, from) = match (message.text, message.from) {
        (Some(text), Some(from)) => (text, from),
        _ => return false,
    };
    let chat_id = message.chat.id;

    let usecase = GetOrCreateUserUseCase {
        telegram_id: from.id,
        chat_id,
        name: from.first_name,
        lastname: from.last_name,
    };
    let user = match execute(usecase, ctx).await {
        Ok(user) => user,
        Err(_) => {
            send(ctx, vec![OutgoingMessage::text(chat_id, ERROR_REPLY)]).await;
            return true;
        }
    };

    let tz = ctx.config.timezone;
    let _chat_guard = dialogs.lock_chat(chat_id).await;
    let transition = dialogs.take(chat_id).on_input(&text, &tz);
    let mut next = transition.next;

    let replies = match perform(transition.action, &user, chat_id, ctx).await {
        Ok(Reply::Continue(replies)) => replies,
        Ok(Reply::End(replies)) => {
            next = Default::default();
            replies
        }
        Err(_) => {
            next = Default::default();
            vec![OutgoingMessage::text(chat_id, ERROR_REPLY).with_keyboard(MAIN_KEYBOARD)]
        }
    };

    dialogs.set(chat_id, next);
    send(ctx, replies).await;
    true
}

enum Reply {
    /// The dialog goes on in the state chosen by the transition
    Continue(Vec<OutgoingMessage>),
    /// The dialog is over, whatever the transition said
    End(Vec<OutgoingMessage>),
}

/// A failed use case, it has already been logged
struct ActionFailed;

fn failed<E>(_: E) -> ActionFailed {
    ActionFailed
}

fn ask(chat_id: i64, prompt: &Prompt, tz: &Tz) -> OutgoingMessage {
    let message = OutgoingMessage::text(chat_id, prompt.text(tz));
    match prompt.keyboard() {
        Some(keyboard) => message.with_keyboard(keyboard),
        None => message,
    }
}

fn menu(chat_id: i64, text: impl Into<String>) -> OutgoingMessage {
    OutgoingMessage::text(chat_id, text).with_keyboard(MAIN_KEYBOARD)
}

pub fn format_event_list(events: &[Event], tz: &Tz) -> String {
    events
        .iter()
        .map(|e| {
            format!(
                "📅 ID:{}\nОписание: {}\nВремя события: {}\nПовтор: {}\n",
                e.id,
                e.description,
                format_local_datetime(&e.event_datetime, tz),
                interval_label(e.repeat_interval)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_expense_list(expenses: &[ExpenseWithCategory], tz: &Tz) -> String {
    expenses
        .iter()
        .map(|e| {
            format!(
                "Трата {}:\n\tКатегория: {}\n\tОписание: {}\n\tСумма: {}\n\tДата и время: {}\n",
                e.expense.id,
                e.category_name,
                e.expense.description.as_deref().unwrap_or(""),
                format_amount(e.expense.amount),
                format_local_datetime(&e.expense.created, tz)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn user_events(user: &User, ctx: &KopilkaContext) -> Result<Vec<Event>, ActionFailed> {
    execute(GetUserEventsUseCase { user_id: user.id }, ctx)
        .await
        .map_err(failed)
}

async fn user_expenses(
    user: &User,
    ctx: &KopilkaContext,
) -> Result<Vec<ExpenseWithCategory>, ActionFailed> {
    let usecase = GetTopExpensesUseCase {
        user_id: user.id,
        limit: DEFAULT_TOP_EXPENSES,
    };
    execute(usecase, ctx).await.map_err(failed)
}

async fn perform(
    action: Action,
    user: &User,
    chat_id: i64,
    ctx: &KopilkaContext,
) -> Result<Reply, ActionFailed> {
    let tz = ctx.config.timezone;

    let reply = match action {
        Action::Greet => Reply::End(vec![menu(
            chat_id,
            format!("Привет, {}\nЯ бот-помощник, выбери действие.", user.name),
        )]),
        Action::Cancel => Reply::End(vec![menu(chat_id, "Действие отменено")]),
        Action::ShowReminderMenu => Reply::End(vec![OutgoingMessage::text(
            chat_id,
            "Выбери действие:",
        )
        .with_keyboard(REMINDER_KEYBOARD)]),
        Action::Ask(prompt) => Reply::Continue(vec![ask(chat_id, &prompt, &tz)]),
        Action::ListEvents => {
            let events = user_events(user, ctx).await?;
            let text = if events.is_empty() {
                NO_EVENTS_REPLY.to_string()
            } else {
                format_event_list(&events, &tz)
            };
            Reply::End(vec![menu(chat_id, text)])
        }
        Action::ListEventsAndAsk(prompt) => {
            let events = user_events(user, ctx).await?;
            if events.is_empty() {
                Reply::End(vec![menu(chat_id, NO_EVENTS_REPLY)])
            } else {
                Reply::Continue(vec![
                    OutgoingMessage::text(chat_id, format_event_list(&events, &tz)),
                    ask(chat_id, &prompt, &tz),
                ])
            }
        }
        Action::CreateEvent(draft) => {
            let usecase = CreateEventUseCase {
                user_id: user.id,
                description: draft.description,
                event_datetime: draft.event_datetime,
                repeat_interval: draft.repeat_interval,
                message_count: draft.message_count.unwrap_or(DEFAULT_MESSAGE_COUNT),
            };
            let event = execute(usecase, ctx).await.map_err(failed)?;
            Reply::End(vec![menu(
                chat_id,
                format!(
                    "Событие успешно добавлено! ✅\n📅 {}\n⏰ {}",
                    event.description,
                    format_local_datetime(&event.event_datetime, &tz)
                ),
            )])
        }
        Action::UpdateEvent { event_id, draft } => {
            let usecase = UpdateEventUseCase {
                user_id: user.id,
                event_id,
                description: draft.description,
                event_datetime: draft.event_datetime,
                repeat_interval: draft.repeat_interval,
                message_count: draft.message_count,
            };
            let text = match execute(usecase, ctx).await {
                Ok(_) => format!("Событие с ID={} успешно обновлено! ✅", event_id),
                Err(_) => format!("Событие с ID={} не обновлено. ❌", event_id),
            };
            Reply::End(vec![menu(chat_id, text)])
        }
        Action::DeleteEvent(event_id) => {
            let usecase = DeleteEventUseCase {
                user_id: user.id,
                event_id,
            };
            let text = match execute(usecase, ctx).await {
                Ok(_) => format!("Событие с ID={} успешно удалено. ✅", event_id),
                Err(_) => format!("Событие с ID={} не найдено. ❌", event_id),
            };
            Reply::End(vec![menu(chat_id, text)])
        }
        Action::Aborted => Reply::End(vec![menu(chat_id, "Действие отменено. ❌")]),
        Action::AddExpense(text) => add_expense(&text, user, chat_id, ctx).await?,
        Action::ShowStatistics { months_back } => {
            let usecase = GetExpenseStatisticsUseCase {
                user_id: user.id,
                months_back,
            };
            let res = execute(usecase, ctx).await.map_err(failed)?;
            let mut text = format!(
                "Расходы с {}:\n",
                res.since.with_timezone(&tz).format("%Y-%m-%d")
            );
            for stat in &res.statistics {
                text.push_str(&format!(
                    "{}: {}\n",
                    stat.category_name,
                    format_amount(stat.amount)
                ));
            }
            text.push_str(&format!("Итого: {}", format_amount(res.total())));
            Reply::End(vec![menu(chat_id, text)])
        }
        Action::ShowRecentExpenses => {
            let expenses = user_expenses(user, ctx).await?;
            let text = if expenses.is_empty() {
                NO_EXPENSES_REPLY.to_string()
            } else {
                format!(
                    "Последние {} трат:\n\n{}",
                    expenses.len(),
                    format_expense_list(&expenses, &tz)
                )
            };
            Reply::End(vec![menu(chat_id, text)])
        }
        Action::ListExpensesAndAsk(prompt) => {
            let expenses = user_expenses(user, ctx).await?;
            if expenses.is_empty() {
                Reply::End(vec![menu(chat_id, NO_EXPENSES_REPLY)])
            } else {
                Reply::Continue(vec![
                    OutgoingMessage::text(chat_id, format_expense_list(&expenses, &tz)),
                    ask(chat_id, &prompt, &tz),
                ])
            }
        }
        Action::DeleteExpense(expense_id) => {
            let usecase = DeleteExpenseUseCase {
                user_id: user.id,
                expense_id,
            };
            let text = match execute(usecase, ctx).await {
                Ok(_) => format!("Расход {} успешно удалён.", expense_id),
                Err(_) => format!("Расход {} не найден.", expense_id),
            };
            Reply::End(vec![menu(chat_id, text)])
        }
    };

    Ok(reply)
}

async fn add_expense(
    text: &str,
    user: &User,
    chat_id: i64,
    ctx: &KopilkaContext,
) -> Result<Reply, ActionFailed> {
    let categories = ctx.repos.categories.find_all().await.map_err(|e| {
        error!("Could not load categories: {:?}", e);
        ActionFailed
    })?;

    let parsed = match ExpenseMessage::parse(text, &categories) {
        Ok(parsed) => parsed,
        Err(e) => {
            info!("Chat {} sent text that is not an expense: {}", chat_id, e);
            return Ok(Reply::End(vec![menu(chat_id, EXPENSE_HINT)]));
        }
    };

    let usecase = AddExpenseUseCase {
        user_id: user.id,
        amount: parsed.amount,
        category_alias: parsed.category_alias,
        description: parsed.description,
    };
    let booked = execute(usecase, ctx).await.map_err(failed)?;

    Ok(Reply::End(vec![menu(
        chat_id,
        format!(
            "Добавлены траты 🛒:\nСумма: {}\nКатегория: {}",
            format_amount(booked.expense.amount),
            booked.category_name
        ),
    )]))
}

async fn send(ctx: &KopilkaContext, replies: Vec<OutgoingMessage>) {
    for reply in replies {
        if let Err(e) = ctx.notifier.send_message(&reply).await {
            error!("Could not reply to chat {}: {}", reply.chat_id, e);
        }
    }
}
