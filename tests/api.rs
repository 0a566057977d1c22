mod helpers;

use chrono::{Duration, TimeZone, Utc};
use helpers::setup::spawn_app;
use kopilka_sdk::{
    AddExpenseInput, CreateEventInput, GetOrCreateUserInput, KopilkaSDK, RepeatInterval,
    UpdateEventInput,
};

const TELEGRAM_ID: i64 = 1000;

async fn create_user(sdk: &KopilkaSDK) {
    sdk.user
        .get_or_create(GetOrCreateUserInput {
            telegram_id: TELEGRAM_ID,
            chat_id: 2000,
            name: "Anna".into(),
            lastname: None,
        })
        .await
        .expect("Expected to create user");
}

#[actix_web::main]
#[test]
async fn test_status_ok() {
    let (_, sdk) = spawn_app().await;
    assert!(sdk.status.check_health().await.is_ok());
}

#[actix_web::main]
#[test]
async fn test_requires_api_key() {
    let (app, _) = spawn_app().await;
    let sdk = KopilkaSDK::new(app.address, "wrong key");
    let res = sdk
        .user
        .get_or_create(GetOrCreateUserInput {
            telegram_id: TELEGRAM_ID,
            chat_id: 2000,
            name: "Anna".into(),
            lastname: None,
        })
        .await;
    assert!(res.is_err());
}

#[actix_web::main]
#[test]
async fn test_get_or_create_user() {
    let (_, sdk) = spawn_app().await;
    let input = || GetOrCreateUserInput {
        telegram_id: TELEGRAM_ID,
        chat_id: 2000,
        name: "Anna".into(),
        lastname: Some("Petrova".into()),
    };

    let first = sdk.user.get_or_create(input()).await.unwrap().user;
    let second = sdk.user.get_or_create(input()).await.unwrap().user;
    assert_eq!(first, second);
    assert_eq!(first.telegram_id, TELEGRAM_ID);
}

#[actix_web::main]
#[test]
async fn test_event_crud() {
    let (_, sdk) = spawn_app().await;
    create_user(&sdk).await;
    let event_datetime = Utc::now() + Duration::days(3);

    let event = sdk
        .event
        .create(CreateEventInput {
            telegram_id: TELEGRAM_ID,
            description: "Оплатить интернет".into(),
            event_datetime,
            repeat_interval: Some(RepeatInterval::Monthly),
            message_count: None,
        })
        .await
        .expect("Expected to create event")
        .event;
    assert_eq!(event.message_count, 3);

    let events = sdk.event.get_all(TELEGRAM_ID).await.unwrap().events;
    assert_eq!(events, vec![event.clone()]);

    let updated = sdk
        .event
        .update(UpdateEventInput {
            telegram_id: TELEGRAM_ID,
            event_id: event.id,
            description: "Оплатить телефон".into(),
            event_datetime,
            repeat_interval: None,
            message_count: Some(1),
        })
        .await
        .expect("Expected to update event")
        .event;
    assert_eq!(updated.description, "Оплатить телефон");
    assert_eq!(updated.repeat_interval, None);
    assert_eq!(updated.message_count, 1);

    assert!(sdk.event.delete(TELEGRAM_ID, event.id).await.is_ok());
    assert!(sdk.event.delete(TELEGRAM_ID, event.id).await.is_err());
    assert!(sdk.event.get_all(TELEGRAM_ID).await.unwrap().events.is_empty());
}

#[actix_web::main]
#[test]
async fn test_rejects_invalid_events() {
    let (_, sdk) = spawn_app().await;
    create_user(&sdk).await;

    let res = sdk
        .event
        .create(CreateEventInput {
            telegram_id: TELEGRAM_ID,
            description: "Оплатить интернет".into(),
            event_datetime: Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap(),
            repeat_interval: None,
            message_count: Some(0),
        })
        .await;
    assert!(res.is_err());

    // Unknown user
    let res = sdk.event.get_all(TELEGRAM_ID + 1).await;
    assert!(res.is_err());
}

#[actix_web::main]
#[test]
async fn test_expenses() {
    let (_, sdk) = spawn_app().await;
    create_user(&sdk).await;

    let expense = |amount, category: &str| AddExpenseInput {
        telegram_id: TELEGRAM_ID,
        amount,
        category: category.into(),
        description: None,
    };
    let cafe = sdk
        .expense
        .add(expense(35050, "шаурма"))
        .await
        .expect("Expected to add expense")
        .expense;
    assert_eq!(cafe.category_name, "кафе");
    let other = sdk
        .expense
        .add(expense(10000, "носки"))
        .await
        .unwrap()
        .expense;
    assert_eq!(other.category_name, "прочее");
    assert!(sdk.expense.add(expense(0, "кафе")).await.is_err());

    let top = sdk.expense.top(TELEGRAM_ID, Some(1)).await.unwrap().expenses;
    assert_eq!(top.len(), 1);

    let stats = sdk.expense.statistics(TELEGRAM_ID, 0).await.unwrap();
    assert_eq!(stats.total, 45050);
    assert_eq!(stats.statistics[0].category_name, "кафе");

    let deleted = sdk.expense.delete(TELEGRAM_ID, cafe.id).await.unwrap();
    assert_eq!(deleted.expense_id, cafe.id);
    let stats = sdk.expense.statistics(TELEGRAM_ID, 0).await.unwrap();
    assert_eq!(stats.total, 10000);
}

#[actix_web::main]
#[test]
async fn test_telegram_webhook() {
    let (app, _) = spawn_app().await;
    let url = format!("{}/api/v1/telegram/webhook", app.address);
    let update = serde_json::json!({
        "update_id": 1,
        "message": {
            "message_id": 1,
            "from": { "id": TELEGRAM_ID, "first_name": "Anna" },
            "chat": { "id": 2000 },
            "text": "/start"
        }
    });
    let client = reqwest::Client::new();

    let res = client.post(&url).json(&update).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .post(&url)
        .header(
            "X-Telegram-Bot-Api-Secret-Token",
            &app.config.telegram_webhook_secret,
        )
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["handled"], true);

    let replies = app.notifier.sent();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].chat_id, 2000);
    assert!(replies[0].text.starts_with("Привет, Anna"));
}
