use crate::domain::{
    models::event::{attach_interests, Event, EventChanges, InterestRow},
    ports::EventRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn fetch_event(conn: &mut PgConnection, id: &str) -> Result<Option<Event>, AppError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    let Some(mut event) = event else {
        return Ok(None);
    };

    event.interested_users = sqlx::query_scalar::<_, String>(
        "SELECT user_id FROM event_interests WHERE event_id = $1 ORDER BY id ASC",
    )
        .bind(id)
        .fetch_all(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    Ok(Some(event))
}

#[async_trait]
impl EventRepository for PostgresEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let mut created = sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (id, title, description, date, venue, created_by, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#
        )
            .bind(&event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.date)
            .bind(&event.venue)
            .bind(&event.created_by)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        created.interested_users = Vec::new();
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        fetch_event(&mut *conn, id).await
    }

    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let mut events = sqlx::query_as::<_, Event>(
            "SELECT * FROM events ORDER BY date ASC, created_at ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let interests = sqlx::query_as::<_, InterestRow>(
            "SELECT event_id, user_id FROM event_interests ORDER BY id ASC",
        )
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        attach_interests(&mut events, interests);
        Ok(events)
    }

    async fn update(&self, id: &str, changes: &EventChanges) -> Result<Option<Event>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let result = sqlx::query(
            r#"UPDATE events SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                date = COALESCE($3, date),
                venue = COALESCE($4, venue),
                updated_at = $5
               WHERE id = $6"#
        )
            .bind(changes.title.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.date)
            .bind(changes.venue.as_deref())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let updated = fetch_event(&mut *tx, id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        // event_interests rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE date < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    async fn toggle_interest(&self, event_id: &str, user_id: &str) -> Result<Option<Event>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // Toggles of the same (event, alumni) pair run one after another, so each sees the previous result.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || ':' || $2))")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        // Remove the membership if it exists, otherwise add it.
        sqlx::query(
            r#"WITH removed AS (
                   DELETE FROM event_interests WHERE event_id = $1 AND user_id = $2 RETURNING id
               )
               INSERT INTO event_interests (event_id, user_id, created_at)
               SELECT $1, $2, $3
               WHERE NOT EXISTS (SELECT 1 FROM removed)
                 AND EXISTS (SELECT 1 FROM events WHERE id = $1)
               ON CONFLICT (event_id, user_id) DO NOTHING"#
        )
            .bind(event_id)
            .bind(user_id)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let event = fetch_event(&mut *tx, event_id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(event)
    }
}
