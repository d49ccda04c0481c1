//! Pure conversions from raw payloads to the render-ready view model.

use chrono::{DateTime, Datelike, TimeZone};

use crate::{
    error::WeatherError,
    forecast::select_noon_forecasts,
    model::{
        CurrentPayload, CurrentView, ForecastPayload, ForecastView, OwCondition, Place,
        Temperature, WeatherPayload, WeatherView,
    },
};

const ICON_BASE: &str = "https://openweathermap.org/img/w";

const WEEKDAYS: [&str; 7] = ["Sun.", "Mon.", "Tue.", "Wed.", "Thu.", "Fri.", "Sat."];

fn round1(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // no "-0" in the output
    if rounded == 0.0 { 0.0 } else { rounded }
}

pub fn celsius(kelvin: f64) -> f64 {
    round1(kelvin - 273.15)
}

pub fn fahrenheit(kelvin: f64) -> f64 {
    round1(kelvin * 9.0 / 5.0 - 459.67)
}

pub fn temperature(kelvin: f64) -> Temperature {
    Temperature {
        celsius: celsius(kelvin),
        fahrenheit: fahrenheit(kelvin),
    }
}

/// Uppercase the first character of every space-separated word.
pub fn upper_first(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if matches!(day % 100, 11..=13) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

pub fn ordinal(day: u32) -> String {
    format!("{day}{}", ordinal_suffix(day))
}

/// Weekday label and ordinal date for a Unix timestamp, e.g. `("Mon.", "3rd")`.
pub fn day_date<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<(String, String)> {
    let at = DateTime::from_timestamp(timestamp, 0)?.with_timezone(tz);
    let weekday = WEEKDAYS[at.weekday().num_days_from_sunday() as usize];

    Some((weekday.to_string(), ordinal(at.day())))
}

pub fn icon_url(icon: &str) -> String {
    format!("{ICON_BASE}/{icon}.png")
}

fn first_condition<'a>(
    conditions: &'a [OwCondition],
    what: &str,
) -> Result<&'a OwCondition, WeatherError> {
    conditions
        .first()
        .ok_or_else(|| WeatherError::MalformedPayload(format!("{what} has no weather entry")))
}

pub fn format_current(payload: &CurrentPayload) -> Result<CurrentView, WeatherError> {
    let condition = first_condition(&payload.weather, "current weather")?;

    Ok(CurrentView {
        location: Place {
            area: payload.name.clone(),
            country: payload.sys.country.clone(),
        },
        temperature: temperature(payload.main.temp),
        high: payload.main.temp_max.map(temperature),
        low: payload.main.temp_min.map(temperature),
        humidity: payload.main.humidity,
        description: upper_first(&condition.description),
        wind_speed: payload.wind.speed,
        icon_url: icon_url(&condition.icon),
    })
}

pub fn format_forecast<Tz: TimeZone>(
    payload: &ForecastPayload,
    now: &DateTime<Tz>,
) -> Result<Vec<ForecastView>, WeatherError> {
    let tz = now.timezone();

    select_noon_forecasts(&payload.list, now)
        .into_iter()
        .map(|entry| {
            let condition = first_condition(&entry.weather, &entry.dt_txt)?;
            let (weekday, date) = day_date(entry.dt, &tz).ok_or_else(|| {
                WeatherError::MalformedPayload(format!("timestamp {} out of range", entry.dt))
            })?;

            Ok(ForecastView {
                weekday,
                date,
                temperature: temperature(entry.main.temp),
                humidity: entry.main.humidity,
                description: upper_first(&condition.description),
                wind_speed: entry.wind.speed,
                icon_url: icon_url(&condition.icon),
            })
        })
        .collect()
}

pub fn format_weather<Tz: TimeZone>(
    payload: &WeatherPayload,
    now: &DateTime<Tz>,
) -> Result<WeatherView, WeatherError> {
    Ok(WeatherView {
        current: format_current(&payload.current)?,
        forecast: format_forecast(&payload.forecast, now)?,
    })
}
