use super::IEventRepo;
use chrono::{DateTime, Utc};
use kopilka_domain::{Event, EventAdvance, RecurrenceError, ID};
use sqlx::{FromRow, PgPool};
use tracing::error;

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    id: i64,
    user_id: i64,
    description: String,
    event_datetime: DateTime<Utc>,
    repeat_interval: Option<String>,
    message_count: i32,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl TryFrom<EventRaw> for Event {
    type Error = RecurrenceError;

    fn try_from(raw: EventRaw) -> Result<Self, Self::Error> {
        Ok(Event {
            id: raw.id,
            user_id: raw.user_id,
            description: raw.description,
            event_datetime: raw.event_datetime,
            repeat_interval: raw.repeat_interval.map(|i| i.parse()).transpose()?,
            message_count: raw.message_count,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

/// Rows with an unknown interval are left in the table untouched and reported
fn into_events(rows: Vec<EventRaw>) -> Vec<Event> {
    rows.into_iter()
        .filter_map(|raw| {
            let event_id = raw.id;
            match Event::try_from(raw) {
                Ok(event) => Some(event),
                Err(e) => {
                    error!("Skipping event {}: {}", event_id, e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn insert(&self, e: &Event) -> anyhow::Result<Event> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO events(
                user_id,
                description,
                event_datetime,
                repeat_interval,
                message_count,
                created,
                updated
            )
            VALUES($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(e.user_id)
        .bind(&e.description)
        .bind(e.event_datetime)
        .bind(e.repeat_interval.map(|i| i.code()))
        .bind(e.message_count)
        .bind(e.created)
        .bind(e.updated)
        .fetch_one(&self.pool)
        .await?;

        let mut event = e.clone();
        event.id = id;
        Ok(event)
    }

    async fn save(&self, e: &Event) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE events SET
                description = $2,
                event_datetime = $3,
                repeat_interval = $4,
                message_count = $5,
                updated = $6
            WHERE id = $1
            "#,
        )
        .bind(e.id)
        .bind(&e.description)
        .bind(e.event_datetime)
        .bind(e.repeat_interval.map(|i| i.code()))
        .bind(e.message_count)
        .bind(e.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, event_id: ID) -> anyhow::Result<Option<Event>> {
        let row: Option<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events AS e
            WHERE e.id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(into_events(row.into_iter().collect()).pop())
    }

    async fn find_by_user(&self, user_id: ID) -> anyhow::Result<Vec<Event>> {
        let rows: Vec<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events AS e
            WHERE e.user_id = $1
            ORDER BY e.event_datetime
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(into_events(rows))
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Event>> {
        let rows: Vec<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM events AS e
            WHERE e.event_datetime BETWEEN $1 AND $2
            ORDER BY e.event_datetime
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(into_events(rows))
    }

    async fn delete(&self, event_id: ID) -> anyhow::Result<Option<Event>> {
        let row: Option<EventRaw> = sqlx::query_as(
            r#"
            DELETE FROM events AS e
            WHERE e.id = $1
            RETURNING *
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(into_events(row.into_iter().collect()).pop())
    }

    async fn advance_or_delete(&self, changes: &[EventAdvance]) -> anyhow::Result<usize> {
        let mut tx = self.pool.begin().await?;
        let mut applied = 0;
        for change in changes {
            let result = match change.next {
                Some(next) => {
                    sqlx::query(
                        r#"
                        UPDATE events SET event_datetime = $3, updated = now()
                        WHERE id = $1 AND event_datetime = $2
                        "#,
                    )
                    .bind(change.event_id)
                    .bind(change.expected)
                    .bind(next)
                    .execute(&mut *tx)
                    .await?
                }
                None => {
                    sqlx::query(
                        r#"
                        DELETE FROM events
                        WHERE id = $1 AND event_datetime = $2
                        "#,
                    )
                    .bind(change.event_id)
                    .bind(change.expected)
                    .execute(&mut *tx)
                    .await?
                }
            };
            applied += result.rows_affected() as usize;
        }
        tx.commit().await?;

        Ok(applied)
    }
}
