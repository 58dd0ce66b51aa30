//! Domain layer: listing records, identity, registry, and the event system.
//!
//! This module contains the server-side domain model including listing
//! identity, the listing aggregate with its scheduling metadata, the event
//! bus for broadcasting state changes, and the listing registry for
//! concurrent in-memory storage.

pub mod event_bus;
pub mod listing;
pub mod listing_event;
pub mod listing_id;
pub mod listing_registry;

pub use event_bus::EventBus;
pub use listing::{Listing, ListingKind, ScheduleSegment};
pub use listing_event::ListingEvent;
pub use listing_id::ListingId;
pub use listing_registry::ListingRegistry;
