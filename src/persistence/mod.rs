//! Persistence layer: PostgreSQL listing rows and domain-event log.
//!
//! The registry is the source of truth at runtime; PostgreSQL mirrors it
//! for durability. On startup every stored listing is loaded into the
//! registry, and from then on a background task subscribes to the event
//! bus and writes each mutation through. The concrete implementation uses
//! `sqlx::PgPool` for async PostgreSQL access.

pub mod mirror;
pub mod models;
pub mod postgres;

pub use postgres::ListingStore;
