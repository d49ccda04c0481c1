//! Controller: resolve location, fetch, format.

use chrono::{DateTime, Local, TimeZone};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::{
    alert::Alert,
    fetch::WeatherFetcher,
    format::format_weather,
    location::{DeviceLocator, LocationResolver, LocationSource},
    model::WeatherView,
};

/// How a single dashboard cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ready(WeatherView),
    /// A newer cycle started while this one was fetching; its result is dropped.
    Superseded,
    /// The cycle stopped early; an alert has been raised.
    Failed,
}

/// Runs dashboard cycles. A newer cycle replaces any older one still in flight.
#[derive(Debug)]
pub struct Dashboard<L> {
    resolver: LocationResolver<L>,
    fetcher: WeatherFetcher,
    generation: AtomicU64,
}

impl<L: DeviceLocator> Dashboard<L> {
    pub fn new(resolver: LocationResolver<L>, fetcher: WeatherFetcher) -> Self {
        Self {
            resolver,
            fetcher,
            generation: AtomicU64::new(0),
        }
    }

    pub async fn run(&self, source: LocationSource, alert: &dyn Alert) -> Outcome {
        self.run_at(source, alert, Local::now()).await
    }

    /// Like [`Dashboard::run`] with an explicit "now" deciding which day is today.
    pub async fn run_at<Tz: TimeZone>(
        &self,
        source: LocationSource,
        alert: &dyn Alert,
        now: DateTime<Tz>,
    ) -> Outcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let Some(query) = self.resolver.resolve(source, alert).await else {
            return Outcome::Failed;
        };

        let fetched = self.fetcher.fetch(&query).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "dropping superseded weather cycle");
            return Outcome::Superseded;
        }

        let view = fetched.and_then(|payload| format_weather(&payload, &now));
        match view {
            Ok(view) => Outcome::Ready(view),
            Err(err) => {
                warn!(error = %err, ?query, "weather cycle failed");
                alert.alert("");
                Outcome::Failed
            }
        }
    }
}
