//! Event-driven mirroring of registry mutations into PostgreSQL.
//!
//! A single background task subscribes to the [`EventBus`] and writes each
//! mutation through to the [`ListingStore`]: created and updated listings
//! are upserted, removals are deleted, and (when enabled) every event is
//! appended to the event log. Persistence failures are logged and the task
//! keeps running — the in-memory registry stays authoritative.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::ListingStore;
use crate::domain::{EventBus, ListingEvent, ListingRegistry};

/// Runs the mirror loop until the event bus closes.
///
/// Spawn this once at startup when persistence is enabled.
pub async fn run_mirror(
    store: ListingStore,
    registry: Arc<ListingRegistry>,
    event_bus: EventBus,
    event_log_enabled: bool,
) {
    let mut rx = event_bus.subscribe();
    loop {
        match rx.recv().await {
            Ok(event) => {
                mirror_event(&store, &registry, &event, event_log_enabled).await;
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(lagged = n, "persistence mirror lagged behind event bus");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
    tracing::debug!("persistence mirror stopped");
}

/// Writes one event through to the store.
async fn mirror_event(
    store: &ListingStore,
    registry: &Arc<ListingRegistry>,
    event: &ListingEvent,
    event_log_enabled: bool,
) {
    let listing_id = event.listing_id();

    match event {
        ListingEvent::ListingCreated { .. }
        | ListingEvent::ListingUpdated { .. }
        | ListingEvent::ScheduleAnnounced { .. } => {
            // Re-read the current record; the event only carries a summary.
            match registry.get(listing_id).await {
                Ok(entry_lock) => {
                    let listing = entry_lock.read().await.clone();
                    if let Err(e) = store.upsert_listing(&listing).await {
                        tracing::error!(%listing_id, error = %e, "failed to mirror listing");
                    }
                }
                Err(_) => {
                    // Removed again before the mirror caught up; the
                    // removal event will handle the row.
                    tracing::debug!(%listing_id, "listing gone before mirror write");
                }
            }
        }
        ListingEvent::ListingRemoved { .. } => {
            if let Err(e) = store.delete_listing(*listing_id.as_uuid()).await {
                tracing::error!(%listing_id, error = %e, "failed to delete mirrored listing");
            }
        }
    }

    if event_log_enabled {
        let payload = serde_json::to_value(event).unwrap_or_default();
        if let Err(e) = store
            .save_event(*listing_id.as_uuid(), event.event_type_str(), &payload)
            .await
        {
            tracing::error!(%listing_id, error = %e, "failed to append event log");
        }
    }
}
