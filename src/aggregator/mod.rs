//! Conditions aggregation.
//!
//! Joins the marine and weather sources with the moon phase into one
//! published [`Snapshot`](crate::models::Snapshot).

pub mod clock;
pub mod conditions;
pub mod merge;

pub use clock::{Clock, SystemClock};
pub use conditions::ConditionsAggregator;
pub use merge::{extract_marine, extract_weather, merge};
