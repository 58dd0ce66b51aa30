//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::ListingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Listing service for all business logic.
    pub listing_service: Arc<ListingService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}
