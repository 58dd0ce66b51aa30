//! Data Transfer Objects for REST request/response serialization.
//!
//! Date fields arrive as strings and are parsed leniently at this boundary:
//! an unparseable date is treated as "no constraint" rather than rejected,
//! so imperfect legacy data never hides a listing.

pub mod common_dto;
pub mod listing_dto;
pub mod schedule_dto;

pub use common_dto::*;
pub use listing_dto::*;
pub use schedule_dto::*;
