//! Astronomical calculations.
//!
//! Everything here is pure: no I/O and no wall clock, only the calendar
//! date passed in.

pub mod moon;

pub use moon::{julian_day, moon_age, phase_for, MoonPhase};
