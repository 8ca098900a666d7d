use crate::domain::{
    models::event::{attach_interests, Event, EventChanges, InterestRow},
    ports::EventRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn fetch_event(conn: &mut SqliteConnection, id: &str) -> Result<Option<Event>, AppError> {
    let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    let Some(mut event) = event else {
        return Ok(None);
    };

    event.interested_users = sqlx::query_scalar::<_, String>(
        "SELECT user_id FROM event_interests WHERE event_id = ? ORDER BY id ASC",
    )
        .bind(id)
        .fetch_all(&mut *conn)
        .await
        .map_err(AppError::Database)?;

    Ok(Some(event))
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, event: &Event) -> Result<Event, AppError> {
        let mut created = sqlx::query_as::<_, Event>(
            r#"INSERT INTO events (id, title, description, date, venue, created_by, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
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
            "SELECT * FROM events ORDER BY date ASC, rowid ASC",
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
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                date = COALESCE(?, date),
                venue = COALESCE(?, venue),
                updated_at = ?
               WHERE id = ?"#
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
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM event_interests WHERE event_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM event_interests WHERE event_id IN (SELECT id FROM events WHERE date < ?)")
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        let result = sqlx::query("DELETE FROM events WHERE date < ?")
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn toggle_interest(&self, event_id: &str, user_id: &str) -> Result<Option<Event>, AppError> {
        // The DELETE takes the write lock up front; the toggle is serialized against other writers.
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let removed = sqlx::query("DELETE FROM event_interests WHERE event_id = ? AND user_id = ?")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .rows_affected();

        if removed == 0 {
            let inserted = sqlx::query(
                r#"INSERT INTO event_interests (event_id, user_id, created_at)
                   SELECT ?, ?, ? WHERE EXISTS (SELECT 1 FROM events WHERE id = ?)"#
            )
                .bind(event_id)
                .bind(user_id)
                .bind(Utc::now())
                .bind(event_id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?
                .rows_affected();

            if inserted == 0 {
                tx.rollback().await.map_err(AppError::Database)?;
                return Ok(None);
            }
        }

        let event = fetch_event(&mut *tx, event_id).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(event)
    }
}
