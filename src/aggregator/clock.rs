//! Source of the local "now".

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Provides the local civil time readings are keyed to.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The system clock read in the deployment's configured timezone.
///
/// The forecasts are requested in the same zone, so the hour and date
/// this yields line up with the hourly series and the daily almanac
/// regardless of the host's own timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    zone: Tz,
}

impl SystemClock {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Wall-clock time in this zone at a given instant.
    pub fn local_at(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.zone).naive_local()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::America::Bahia)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        self.local_at(Utc::now())
    }
}
