//! # tenbyten-directory
//!
//! REST API and WebSocket backend for the Tenbyten vintage-market and
//! consignment-shop directory.
//!
//! This crate provides the HTTP interface for browsing, filtering, and
//! administering directory listings. All schedule mathematics — "is this
//! listing active on date D?", "what is its next active date?" — are
//! delegated to the pure [`schedule`] module; the rest of the service is a
//! coordination layer.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── ListingService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── ListingRegistry (domain/)
//!     ├── Schedule evaluator (schedule/)
//!     │
//!     └── PostgreSQL Persistence (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod schedule;
pub mod service;
pub mod ws;
