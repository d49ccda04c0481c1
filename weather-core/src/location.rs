//! Location resolution: device geolocation first, IP geolocation as fallback.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{info, warn};

use crate::{
    alert::Alert,
    error::{GeolocationError, WeatherError},
    fetch::get_json,
    model::{Coordinates, LocationQuery, PlaceQuery},
};

pub const IP_LOOKUP_URL: &str = "https://ipapi.co/json/";

/// Source of the device's own position.
#[async_trait]
pub trait DeviceLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, GeolocationError>;
}

/// What the controller should resolve a location from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSource {
    /// Device geolocation, falling back to IP geolocation.
    Auto,
    /// A city picked from suggestions or typed in.
    Search(PlaceQuery),
}

#[derive(Debug, Deserialize)]
struct IpLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug)]
pub struct LocationResolver<L> {
    locator: L,
    ip_lookup: String,
    http: Client,
}

impl<L: DeviceLocator> LocationResolver<L> {
    pub fn new(locator: L) -> Self {
        Self::with_ip_lookup(locator, IP_LOOKUP_URL)
    }

    pub fn with_ip_lookup(locator: L, ip_lookup: impl Into<String>) -> Self {
        Self {
            locator,
            ip_lookup: ip_lookup.into(),
            http: Client::new(),
        }
    }

    /// Resolve `source` into something the weather fetcher can query.
    ///
    /// Returns `None` after raising an alert when every option failed.
    pub async fn resolve(&self, source: LocationSource, alert: &dyn Alert) -> Option<LocationQuery> {
        match source {
            LocationSource::Search(place) => Some(LocationQuery::Place(place)),
            LocationSource::Auto => self.locate(alert).await.map(LocationQuery::Coords),
        }
    }

    async fn locate(&self, alert: &dyn Alert) -> Option<Coordinates> {
        match self.locator.locate().await {
            Ok(coords) => {
                info!(lat = coords.latitude, lon = coords.longitude, "device location");
                return Some(coords);
            }
            Err(err) => {
                info!(code = err.code(), error = %err, "device geolocation failed; trying IP lookup");
                alert.alert(err.fallback_message());
            }
        }

        match self.ip_locate().await {
            Ok(coords) => {
                info!(lat = coords.latitude, lon = coords.longitude, "IP location");
                Some(coords)
            }
            Err(err) => {
                warn!(error = %err, "IP geolocation failed");
                alert.alert("");
                None
            }
        }
    }

    pub async fn ip_locate(&self) -> Result<Coordinates, WeatherError> {
        let url =
            Url::parse(&self.ip_lookup).map_err(|e| WeatherError::InvalidUrl(e.to_string()))?;
        let found: IpLocation = get_json(&self.http, url).await?;

        Ok(Coordinates {
            latitude: found.latitude,
            longitude: found.longitude,
        })
    }
}

/// A locator that always reports the same answer.
#[derive(Debug, Clone)]
pub struct FixedLocator(pub Result<Coordinates, GeolocationError>);

#[async_trait]
impl DeviceLocator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, GeolocationError> {
        self.0.clone()
    }
}
