//! Service layer: listing orchestration.

pub mod listing_service;

pub use listing_service::{ListingDraft, ListingFilter, ListingPatch, ListingService};
