//! The conditions aggregator: fetch lifecycle and the published snapshot.

use super::clock::{Clock, SystemClock};
use super::merge::merge;
use crate::astro::phase_for;
use crate::models::{Coordinate, FetchState, Snapshot};
use crate::sources::{MarineSource, WeatherSource};
use anyhow::Result;
use chrono_tz::Tz;
use futures::future::{self, FusedFuture, FutureExt};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Owns both sources and the single published snapshot slot.
///
/// Every call to [`refresh`](Self::refresh) is an activation with its own
/// generation number. Only the most recently started activation may
/// publish, so a slow older activation can never overwrite a newer one.
pub struct ConditionsAggregator<M, W, C = SystemClock> {
    coordinate: Coordinate,
    marine: M,
    weather: W,
    clock: C,
    generation: AtomicU64,
    published: watch::Sender<Arc<Snapshot>>,
}

impl<M: MarineSource, W: WeatherSource> ConditionsAggregator<M, W, SystemClock> {
    /// Aggregator keyed to the system clock in `zone`.
    pub fn new(coordinate: Coordinate, zone: Tz, marine: M, weather: W) -> Self {
        Self::with_clock(coordinate, marine, weather, SystemClock::new(zone))
    }
}

impl<M: MarineSource, W: WeatherSource, C: Clock> ConditionsAggregator<M, W, C> {
    pub fn with_clock(coordinate: Coordinate, marine: M, weather: W, clock: C) -> Self {
        let (published, _) = watch::channel(Arc::new(Snapshot::loading(clock.now())));

        Self {
            coordinate,
            marine,
            weather,
            clock,
            generation: AtomicU64::new(0),
            published,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Arc<Snapshot> {
        self.published.borrow().clone()
    }

    /// Watch published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.published.subscribe()
    }

    /// Run one activation and return the snapshot it produced.
    ///
    /// Publishes `Loading` right away, then the settled snapshot once both
    /// sources have answered. If another activation started in the
    /// meantime the settled snapshot is returned but not published.
    pub async fn refresh(&self) -> Arc<Snapshot> {
        let activation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            "Refreshing conditions at {} (activation {})",
            self.coordinate, activation
        );

        self.publish(activation, Arc::new(Snapshot::loading(self.clock.now())));

        let (marine, weather) = future::join(
            self.marine.fetch_wave_heights(self.coordinate),
            self.weather.fetch_current(self.coordinate),
        )
        .await;

        let now = self.clock.now();
        let snapshot = Arc::new(merge(marine, weather, now, phase_for(now.date())));

        if self.publish(activation, Arc::clone(&snapshot)) {
            info!(
                "Activation {} published: {}",
                activation, snapshot.fetch_state
            );
        } else {
            warn!(
                "Discarding result of activation {}: superseded by a newer refresh",
                activation
            );
        }

        snapshot
    }

    /// Refresh every `interval` until `shutdown` resolves.
    ///
    /// Each settled snapshot that gets published is handed to `emit`. A tick
    /// that arrives while the previous refresh is still running is skipped.
    /// `shutdown` is polled for the whole run, including while a refresh is
    /// in flight; the in-flight refresh is dropped when it fires.
    pub async fn watch<S, F>(&self, interval: Duration, shutdown: S, mut emit: F) -> Result<()>
    where
        S: Future,
        F: FnMut(&Snapshot) -> Result<()>,
    {
        let mut updates = self.subscribe();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        tokio::pin!(shutdown);
        let in_flight = self.refresh().fuse();
        tokio::pin!(in_flight);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Watch stopped");
                    return Ok(());
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        return Ok(());
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    if snapshot.fetch_state != FetchState::Loading {
                        emit(&snapshot)?;
                    }
                }
                _ = &mut in_flight, if !in_flight.is_terminated() => {}
                _ = ticker.tick() => {
                    if in_flight.is_terminated() {
                        in_flight.set(self.refresh().fuse());
                    } else {
                        debug!("Refresh still running, skipping tick");
                    }
                }
            }
        }
    }

    /// Replace the published snapshot if `activation` is still the latest.
    ///
    /// The generation check runs under the channel's write lock.
    fn publish(&self, activation: u64, snapshot: Arc<Snapshot>) -> bool {
        self.published.send_if_modified(|slot| {
            let latest = self.generation.load(Ordering::SeqCst);
            if latest != activation {
                debug!("Activation {} is stale (latest is {})", activation, latest);
                return false;
            }
            *slot = snapshot;
            true
        })
    }
}
