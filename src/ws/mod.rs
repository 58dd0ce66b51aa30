//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams listing domain events to
//! subscribed clients; the admin dashboard uses it to refresh live as
//! listings change.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
