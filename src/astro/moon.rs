//! Lunar phase from a calendar date.
//!
//! The phase is derived from the moon's age in the synodic cycle, counted
//! from the new moon of 2000-01-06. The result only depends on the year,
//! month and day of the date.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of the synodic month in days.
pub const SYNODIC_MONTH: f64 = 29.53;

/// Julian Day of a known new moon (2000-01-06 00:00).
const REFERENCE_NEW_MOON_JD: f64 = 2451549.5;

/// Upper bounds (exclusive, in days of age) of each phase, in cycle order.
/// Ages at or past the last bound wrap back to `New`.
const PHASE_BOUNDS: [(f64, MoonPhase); 8] = [
    (1.84566, MoonPhase::New),
    (5.53699, MoonPhase::WaxingCrescent),
    (9.22831, MoonPhase::FirstQuarter),
    (12.91963, MoonPhase::WaxingGibbous),
    (16.61096, MoonPhase::Full),
    (20.30228, MoonPhase::WaningGibbous),
    (23.99361, MoonPhase::LastQuarter),
    (27.68493, MoonPhase::WaningCrescent),
];

/// One of the eight named lunar phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// All phases in cycle order, starting at `New`.
    pub const ALL: [MoonPhase; 8] = [
        MoonPhase::New,
        MoonPhase::WaxingCrescent,
        MoonPhase::FirstQuarter,
        MoonPhase::WaxingGibbous,
        MoonPhase::Full,
        MoonPhase::WaningGibbous,
        MoonPhase::LastQuarter,
        MoonPhase::WaningCrescent,
    ];

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            MoonPhase::New => "New Moon",
            MoonPhase::WaxingCrescent => "Waxing Crescent",
            MoonPhase::FirstQuarter => "First Quarter",
            MoonPhase::WaxingGibbous => "Waxing Gibbous",
            MoonPhase::Full => "Full Moon",
            MoonPhase::WaningGibbous => "Waning Gibbous",
            MoonPhase::LastQuarter => "Last Quarter",
            MoonPhase::WaningCrescent => "Waning Crescent",
        }
    }

    /// Returns an emoji representation of the phase.
    pub fn glyph(&self) -> &'static str {
        match self {
            MoonPhase::New => "🌑",
            MoonPhase::WaxingCrescent => "🌒",
            MoonPhase::FirstQuarter => "🌓",
            MoonPhase::WaxingGibbous => "🌔",
            MoonPhase::Full => "🌕",
            MoonPhase::WaningGibbous => "🌖",
            MoonPhase::LastQuarter => "🌗",
            MoonPhase::WaningCrescent => "🌘",
        }
    }

    /// The phase that follows this one in the cycle.
    pub fn next(&self) -> MoonPhase {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Julian Day at 00:00 of a civil calendar date.
///
/// January and February count as months 13 and 14 of the previous year.
pub fn julian_day(date: NaiveDate) -> f64 {
    let (mut year, mut month) = (date.year() as f64, date.month() as f64);
    let day = date.day() as f64;

    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }

    let a = (year / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();

    (365.25 * (year + 4716.0)).floor() + (30.6001 * (month + 1.0)).floor() + day + b - 1524.5
}

/// Age of the moon in days, in `[0, SYNODIC_MONTH)`.
pub fn moon_age(date: NaiveDate) -> f64 {
    let days = julian_day(date) - REFERENCE_NEW_MOON_JD;
    let cycles = days / SYNODIC_MONTH;
    let fraction = cycles - cycles.floor();
    fraction * SYNODIC_MONTH
}

/// Lunar phase for a calendar date.
pub fn phase_for(date: NaiveDate) -> MoonPhase {
    let age = moon_age(date);

    PHASE_BOUNDS
        .iter()
        .find(|(bound, _)| age < *bound)
        .map(|(_, phase)| *phase)
        .unwrap_or(MoonPhase::New)
}
