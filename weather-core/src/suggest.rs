//! City autocomplete backed by the HERE geocoder suggestion API.

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Config,
    error::WeatherError,
    fetch::get_json,
};

pub const HERE_SUGGEST_BASE: &str = "https://autocomplete.geocoder.api.here.com/6.2";

/// Inputs this short never trigger a lookup.
const MIN_QUERY_CHARS: usize = 3;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestAddress {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    #[serde(default)]
    pub address: SuggestAddress,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub match_level: Option<String>,
}

impl Suggestion {
    /// Option text for city-level matches, e.g. `"Paris, France - FR"`.
    pub fn option_text(&self) -> Option<String> {
        if self.match_level.as_deref() != Some("city") {
            return None;
        }
        let city = self.address.city.as_deref()?;
        let country = self.address.country.as_deref().unwrap_or_default();
        let code = self.country_code.as_deref().unwrap_or_default();

        Some(format!("{city}, {country} - {code}"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

impl SuggestResponse {
    pub fn city_options(&self) -> Vec<String> {
        self.suggestions.iter().filter_map(Suggestion::option_text).collect()
    }
}

/// Whether a keystroke should trigger a suggestion lookup.
///
/// Short inputs are skipped, as is an input that already equals the only
/// option on offer (the user just picked it).
pub fn should_fetch(input: &str, current_options: &[String]) -> bool {
    if input.chars().count() < MIN_QUERY_CHARS {
        return false;
    }
    !matches!(current_options, [only] if only == input)
}

#[derive(Debug, Clone)]
pub struct SuggestClient {
    app_id: String,
    app_code: String,
    base: String,
    http: Client,
}

impl SuggestClient {
    pub fn new(app_id: String, app_code: String) -> Self {
        Self::with_base_url(app_id, app_code, HERE_SUGGEST_BASE)
    }

    pub fn with_base_url(app_id: String, app_code: String, base: impl Into<String>) -> Self {
        Self {
            app_id,
            app_code,
            base: base.into(),
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let here = config
            .here
            .as_ref()
            .ok_or(WeatherError::MissingCredentials("here"))?;

        Ok(Self::new(here.app_id.clone(), here.app_code.clone()))
    }

    pub fn request_url(&self, text: &str) -> Result<Url, WeatherError> {
        Url::parse_with_params(
            &format!("{}/suggest.json", self.base.trim_end_matches('/')),
            &[
                ("query", text),
                ("resultType", "areas"),
                ("language", "en"),
                ("app_id", self.app_id.as_str()),
                ("app_code", self.app_code.as_str()),
            ],
        )
        .map_err(|e| WeatherError::InvalidUrl(e.to_string()))
    }

    pub async fn try_suggest(&self, text: &str) -> Result<Vec<String>, WeatherError> {
        let url = self.request_url(text)?;
        let response: SuggestResponse = get_json(&self.http, url).await?;
        Ok(response.city_options())
    }

    /// City options for `text`; lookup failures yield an empty list.
    pub async fn suggest(&self, text: &str) -> Vec<String> {
        match self.try_suggest(text).await {
            Ok(options) => options,
            Err(err) => {
                debug!(error = %err, "suggestion lookup failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_match_renders_option_text() {
        let response: SuggestResponse = serde_json::from_value(serde_json::json!({
            "suggestions": [
                {
                    "label": "France, Paris",
                    "address": {"city": "Paris", "country": "France"},
                    "countryCode": "FR",
                    "matchLevel": "city"
                },
                {
                    "address": {"country": "France", "county": "Paris"},
                    "countryCode": "FR",
                    "matchLevel": "county"
                }
            ]
        }))
        .expect("valid response");

        assert_eq!(response.city_options(), vec!["Paris, France - FR".to_string()]);
    }

    #[test]
    fn city_match_without_city_name_is_skipped() {
        let s = Suggestion {
            address: SuggestAddress::default(),
            country_code: Some("FR".into()),
            match_level: Some("city".into()),
        };
        assert!(s.option_text().is_none());
    }

    #[test]
    fn empty_response_has_no_options() {
        let response: SuggestResponse = serde_json::from_str("{}").expect("valid response");
        assert!(response.city_options().is_empty());
    }

    #[test]
    fn should_fetch_rules() {
        assert!(!should_fetch("", &[]));
        assert!(!should_fetch("Pa", &[]));
        assert!(should_fetch("Par", &[]));

        let picked = vec!["Paris, France - FR".to_string()];
        assert!(!should_fetch("Paris, France - FR", &picked));
        assert!(should_fetch("Paris, Fr", &picked));

        let several = vec!["Paris, France - FR".to_string(), "Paris, United States - US".to_string()];
        assert!(should_fetch("Paris, France - FR", &several));
    }

    #[test]
    fn request_url_carries_all_params() {
        let client = SuggestClient::new("ID".into(), "CODE".into());
        let url = client.request_url("san fr").expect("valid url");

        assert_eq!(url.path(), "/6.2/suggest.json");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs[0], ("query".to_string(), "san fr".to_string()));
        assert!(pairs.contains(&("resultType".to_string(), "areas".to_string())));
        assert!(pairs.contains(&("language".to_string(), "en".to_string())));
        assert!(pairs.contains(&("app_code".to_string(), "CODE".to_string())));
    }

    #[test]
    fn from_config_requires_here_credentials() {
        let err = SuggestClient::from_config(&Config::default()).unwrap_err();
        assert!(matches!(err, WeatherError::MissingCredentials("here")));
    }
}
