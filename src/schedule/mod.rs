//! Schedule evaluation core: recurrence model, pattern parsing, and the
//! active-date predicate.
//!
//! This module is the computational heart of the directory. Everything in it
//! is pure and synchronous: no I/O, no shared state, callable freely from
//! any number of request handlers. The rest of the service is a coordination
//! layer around these functions.

pub mod evaluator;
pub mod recurrence;

pub use evaluator::{Schedule, parse_date_lenient};
pub use recurrence::{MonthWeek, Recurrence, WeekdaySet};
