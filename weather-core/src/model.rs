use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A city plus ISO country code, used instead of coordinates after a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceQuery {
    pub city: String,
    pub country_code: String,
}

impl PlaceQuery {
    pub fn new(city: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country_code: country_code.into(),
        }
    }

    /// Parse suggestion text of the form `"Paris, France - FR"`.
    ///
    /// Typed input is accepted too: `"London, GB"` or a bare `"Oslo"`.
    pub fn parse_suggestion(text: &str) -> Option<Self> {
        let text = text.trim();
        let (place, code) = match text.rsplit_once(" - ") {
            Some((place, code)) => (place, code.trim().to_string()),
            None => {
                let tail = text.split_once(',').map(|(_, tail)| tail.trim());
                let code = tail
                    .filter(|t| t.len() == 2 && t.chars().all(|c| c.is_ascii_alphabetic()))
                    .map(str::to_ascii_uppercase)
                    .unwrap_or_default();
                (text, code)
            }
        };

        let city = place.split(',').next().unwrap_or(place).trim();
        if city.is_empty() {
            return None;
        }

        Some(Self::new(city, code))
    }
}

/// Result of location resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coords(Coordinates),
    Place(PlaceQuery),
}

impl From<Coordinates> for LocationQuery {
    fn from(value: Coordinates) -> Self {
        LocationQuery::Coords(value)
    }
}

impl From<PlaceQuery> for LocationQuery {
    fn from(value: PlaceQuery) -> Self {
        LocationQuery::Place(value)
    }
}

// Raw OpenWeatherMap payloads. Only the fields the dashboard reads.

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub humidity: u8,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub temp_max: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWind {
    pub speed: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwCondition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwSys {
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentPayload {
    pub name: String,
    pub sys: OwSys,
    pub main: OwMain,
    pub wind: OwWind,
    pub weather: Vec<OwCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastEntry {
    pub dt: i64,
    pub dt_txt: String,
    pub main: OwMain,
    pub wind: OwWind,
    pub weather: Vec<OwCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastEntry>,
}

/// Both payloads of one request cycle.
#[derive(Debug, Clone)]
pub struct WeatherPayload {
    pub current: CurrentPayload,
    pub forecast: ForecastPayload,
}

// View model.

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Temperature {
    pub celsius: f64,
    pub fahrenheit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub area: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentView {
    pub location: Place,
    pub temperature: Temperature,
    pub high: Option<Temperature>,
    pub low: Option<Temperature>,
    pub humidity: u8,
    pub description: String,
    pub wind_speed: f64,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastView {
    pub weekday: String,
    pub date: String,
    pub temperature: Temperature,
    pub humidity: u8,
    pub description: String,
    pub wind_speed: f64,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherView {
    pub current: CurrentView,
    pub forecast: Vec<ForecastView>,
}
