//! Sea and weather conditions for a single fixed location.
//!
//! The [`aggregator::ConditionsAggregator`] joins an Open-Meteo marine
//! forecast, an Open-Meteo weather forecast and an offline moon phase
//! calculation into one immutable [`models::Snapshot`].

pub mod aggregator;
pub mod astro;
pub mod cli;
pub mod config;
pub mod models;
pub mod report;
pub mod sources;
