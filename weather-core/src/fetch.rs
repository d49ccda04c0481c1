use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::Config,
    error::{WeatherError, truncate_body},
    model::{CurrentPayload, ForecastPayload, LocationQuery, WeatherPayload},
};

pub const OPENWEATHER_BASE: &str = "https://api.openweathermap.org/data/2.5";

/// The current-conditions and forecast URLs of one request cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUrls {
    pub current: Url,
    pub forecast: Url,
}

impl RequestUrls {
    pub fn build(base: &str, query: &LocationQuery, api_key: &str) -> Result<Self, WeatherError> {
        let mut params: Vec<(&str, String)> = match query {
            LocationQuery::Coords(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            LocationQuery::Place(p) if p.country_code.is_empty() => vec![("q", p.city.clone())],
            LocationQuery::Place(p) => vec![("q", format!("{},{}", p.city, p.country_code))],
        };
        params.push(("appid", api_key.to_string()));

        let base = base.trim_end_matches('/');
        let endpoint = |name: &str| {
            Url::parse_with_params(&format!("{base}/{name}"), &params)
                .map_err(|e| WeatherError::InvalidUrl(e.to_string()))
        };

        Ok(Self {
            current: endpoint("weather")?,
            forecast: endpoint("forecast")?,
        })
    }
}

/// GET a URL and decode its JSON body, mapping failures onto [`WeatherError`].
pub(crate) async fn get_json<T: DeserializeOwned>(http: &Client, url: Url) -> Result<T, WeatherError> {
    // query strings may carry credentials
    debug!(host = url.host_str().unwrap_or_default(), path = url.path(), "GET");

    let res = http.get(url.clone()).send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        let mut shown = url;
        shown.set_query(None);
        return Err(WeatherError::Status {
            url: shown.to_string(),
            status,
            body: truncate_body(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

/// OpenWeatherMap client that pulls current conditions and the 5-day forecast.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    api_key: String,
    base: String,
    http: Client,
}

impl WeatherFetcher {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, OPENWEATHER_BASE)
    }

    pub fn with_base_url(api_key: String, base: impl Into<String>) -> Self {
        Self {
            api_key,
            base: base.into(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config
            .openweather_api_key()
            .ok_or(WeatherError::MissingCredentials("openweather"))?;

        Ok(Self::new(api_key.to_owned()))
    }

    pub fn request_urls(&self, query: &LocationQuery) -> Result<RequestUrls, WeatherError> {
        RequestUrls::build(&self.base, query, &self.api_key)
    }

    /// Fetch both payloads concurrently; either failure fails the pair.
    pub async fn fetch(&self, query: &LocationQuery) -> Result<WeatherPayload, WeatherError> {
        let urls = self.request_urls(query)?;

        let (current, forecast) = tokio::try_join!(
            get_json::<CurrentPayload>(&self.http, urls.current),
            get_json::<ForecastPayload>(&self.http, urls.forecast),
        )?;

        Ok(WeatherPayload { current, forecast })
    }
}
