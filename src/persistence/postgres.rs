//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{ListingRow, StoredEvent};
use crate::domain::Listing;
use crate::error::DirectoryError;

/// PostgreSQL-backed listing store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct ListingStore {
    pool: PgPool,
}

impl ListingStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `listings` and `listing_events` tables when absent.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::PersistenceError`] on database failure.
    pub async fn init_schema(&self) -> Result<(), DirectoryError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS listings (\
                 listing_id UUID PRIMARY KEY,\
                 kind TEXT NOT NULL,\
                 name TEXT NOT NULL,\
                 city TEXT NOT NULL,\
                 data JSONB NOT NULL,\
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT now()\
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS listing_events (\
                 id BIGSERIAL PRIMARY KEY,\
                 listing_id UUID NOT NULL,\
                 event_type TEXT NOT NULL,\
                 payload JSONB NOT NULL,\
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now()\
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Upserts a listing row from the in-memory record.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::PersistenceError`] on database failure
    /// or if the listing cannot be serialized.
    pub async fn upsert_listing(&self, listing: &Listing) -> Result<(), DirectoryError> {
        let data = serde_json::to_value(listing)
            .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        sqlx::query(
            "INSERT INTO listings (listing_id, kind, name, city, data, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (listing_id) DO UPDATE SET \
                 kind = EXCLUDED.kind, \
                 name = EXCLUDED.name, \
                 city = EXCLUDED.city, \
                 data = EXCLUDED.data, \
                 updated_at = EXCLUDED.updated_at",
        )
        .bind(listing.listing_id.as_uuid())
        .bind(listing.kind.as_str())
        .bind(&listing.name)
        .bind(&listing.city)
        .bind(&data)
        .bind(listing.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        Ok(())
    }

    /// Deletes a listing row.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::PersistenceError`] on database failure.
    pub async fn delete_listing(&self, listing_id: Uuid) -> Result<(), DirectoryError> {
        sqlx::query("DELETE FROM listings WHERE listing_id = $1")
            .bind(listing_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;
        Ok(())
    }

    /// Loads every stored listing.
    ///
    /// Rows whose JSONB no longer deserializes are skipped with a warning
    /// rather than failing the whole load.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::PersistenceError`] on database failure.
    pub async fn load_listings(&self) -> Result<Vec<Listing>, DirectoryError> {
        let rows = sqlx::query_as::<_, (Uuid, String, String, String, serde_json::Value, DateTime<Utc>)>(
            "SELECT listing_id, kind, name, city, data, updated_at \
             FROM listings ORDER BY updated_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        let mut listings = Vec::with_capacity(rows.len());
        for (listing_id, kind, name, city, data, updated_at) in rows {
            let row = ListingRow {
                listing_id,
                kind,
                name,
                city,
                data,
                updated_at,
            };
            match serde_json::from_value::<Listing>(row.data) {
                Ok(listing) => listings.push(listing),
                Err(e) => {
                    tracing::warn!(listing_id = %row.listing_id, error = %e, "skipping undecodable listing row");
                }
            }
        }
        Ok(listings)
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::PersistenceError`] on database failure.
    pub async fn save_event(
        &self,
        listing_id: Uuid,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, DirectoryError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO listing_events (listing_id, event_type, payload) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(listing_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Loads events after the given timestamp, optionally filtered by
    /// listing ID.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::PersistenceError`] on database failure.
    pub async fn load_events_after(
        &self,
        after: DateTime<Utc>,
        listing_id: Option<Uuid>,
    ) -> Result<Vec<StoredEvent>, DirectoryError> {
        let rows = if let Some(lid) = listing_id {
            sqlx::query_as::<_, (i64, Uuid, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, listing_id, event_type, payload, created_at FROM listing_events \
                 WHERE created_at > $1 AND listing_id = $2 ORDER BY created_at ASC",
            )
            .bind(after)
            .bind(lid)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, (i64, Uuid, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, listing_id, event_type, payload, created_at FROM listing_events \
                 WHERE created_at > $1 ORDER BY created_at ASC",
            )
            .bind(after)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, listing_id, event_type, payload, created_at)| StoredEvent {
                    id,
                    listing_id,
                    event_type,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes event-log rows older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`DirectoryError::PersistenceError`] on database failure.
    pub async fn delete_old_events(&self, before_days: u64) -> Result<u64, DirectoryError> {
        let cutoff =
            Utc::now() - chrono::Duration::days(i64::try_from(before_days).unwrap_or(i64::MAX));

        let result = sqlx::query("DELETE FROM listing_events WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DirectoryError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
