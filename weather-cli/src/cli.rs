use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Text};
use std::{io, time::Duration};
use tracing::info;
use weather_core::{
    Config, Coordinates, Dashboard, FixedLocator, GeolocationError, LocationResolver,
    LocationSource, Outcome, PlaceQuery, ServiceId, SuggestClient, WeatherFetcher,
};

use crate::{
    render::{Console, ErrorBanner, ViewContext},
    search::{CityCompleter, prompt_city},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Terminal weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store credentials for a service ("openweather" or "here").
    Configure {
        service: String,
    },

    /// Show current weather and a three-day forecast.
    ///
    /// Without --city the location comes from this device (--lat/--lon or the
    /// configured [device] position), falling back to IP geolocation.
    Show {
        /// City name, e.g. "Paris".
        #[arg(long)]
        city: Option<String>,

        /// Two-letter country code for --city, e.g. "FR".
        #[arg(long, requires = "city")]
        country: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Refuse device geolocation and go straight to the IP lookup.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        no_geolocation: bool,
    },

    /// Search cities interactively, with suggestions while typing.
    Search,
}

impl Cli {
    pub async fn run(self, console: Console) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { service } => configure(ServiceId::try_from(service.as_str())?),
            Command::Show {
                city,
                country,
                lat,
                lon,
                no_geolocation,
            } => {
                let config = Config::load()?;
                let pinned = lat.zip(lon).map(|(latitude, longitude)| Coordinates {
                    latitude,
                    longitude,
                });
                let locator = device_locator(pinned.or(config.device), no_geolocation);
                let source = match city {
                    Some(city) => LocationSource::Search(PlaceQuery::new(city, country.unwrap_or_default())),
                    None => LocationSource::Auto,
                };
                show(&config, &console, locator, source).await
            }
            Command::Search => search(&Config::load()?, &console).await,
        }
    }
}

fn device_locator(position: Option<Coordinates>, refused: bool) -> FixedLocator {
    let answer = match position {
        _ if refused => Err(GeolocationError::PermissionDenied),
        Some(coords) => Ok(coords),
        None => Err(GeolocationError::Unsupported),
    };
    FixedLocator(answer)
}

fn dashboard(config: &Config, locator: FixedLocator) -> anyhow::Result<Dashboard<FixedLocator>> {
    let fetcher = WeatherFetcher::from_config(config)?;
    Ok(Dashboard::new(LocationResolver::new(locator), fetcher))
}

fn banner(config: &Config, console: &Console) -> ErrorBanner {
    ErrorBanner::new(Duration::from_millis(config.banner_delay_ms), console.clone())
}

async fn show(
    config: &Config,
    console: &Console,
    locator: FixedLocator,
    source: LocationSource,
) -> anyhow::Result<()> {
    let dashboard = dashboard(config, locator)?;
    let banner = banner(config, console);
    let mut view = ViewContext::default();

    console.show_loading()?;
    let outcome = dashboard.run(source, &banner).await;
    console.hide_loading()?;

    if let Outcome::Ready(weather) = outcome {
        view.show(&weather);
        view.flush(&mut io::stdout().lock())?;
    }
    Ok(())
}

async fn search(config: &Config, console: &Console) -> anyhow::Result<()> {
    let dashboard = dashboard(config, device_locator(None, true))?;
    let banner = banner(config, console);
    let mut view = ViewContext::default();

    let suggestions = match SuggestClient::from_config(config) {
        Ok(client) => Some(client),
        Err(err) => {
            info!(error = %err, "city suggestions disabled");
            None
        }
    };
    let runtime = tokio::runtime::Handle::current();

    loop {
        let completer = CityCompleter::new(suggestions.clone(), runtime.clone());
        let picked = tokio::task::spawn_blocking(move || prompt_city(completer))
            .await
            .context("City prompt panicked")??;

        let Some(place) = picked else {
            return Ok(());
        };

        if let Outcome::Ready(weather) = dashboard.run(LocationSource::Search(place), &banner).await {
            view.show(&weather);
            view.flush(&mut io::stdout().lock())?;
        }
    }
}

fn configure(service: ServiceId) -> anyhow::Result<()> {
    let mut config = Config::load_file()?;

    match service {
        ServiceId::OpenWeather => {
            let api_key = Password::new("OpenWeatherMap API key:")
                .without_confirmation()
                .prompt()?;
            if api_key.trim().is_empty() {
                bail!("API key must not be empty");
            }
            config.set_openweather_api_key(api_key.trim().to_string());
        }
        ServiceId::Here => {
            let app_id = Text::new("HERE app_id:").prompt()?;
            let app_code = Password::new("HERE app_code:")
                .without_confirmation()
                .prompt()?;
            if app_id.trim().is_empty() || app_code.trim().is_empty() {
                bail!("app_id and app_code must not be empty");
            }
            config.set_here_credentials(app_id.trim().to_string(), app_code.trim().to_string());
        }
    }

    config.save()?;
    println!(
        "Saved {service} credentials to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refusal_wins_over_position() {
        let here = Coordinates {
            latitude: 1.0,
            longitude: 2.0,
        };
        assert_eq!(
            device_locator(Some(here), true).0,
            Err(GeolocationError::PermissionDenied)
        );
        assert_eq!(device_locator(Some(here), false).0, Ok(here));
        assert_eq!(
            device_locator(None, false).0,
            Err(GeolocationError::Unsupported)
        );
    }

    #[test]
    fn parses_show_with_city() {
        let cli = Cli::try_parse_from(["weather", "show", "--city", "Paris", "--country", "FR"])
            .expect("valid args");
        match cli.command {
            Command::Show { city, country, .. } => {
                assert_eq!(city.as_deref(), Some("Paris"));
                assert_eq!(country.as_deref(), Some("FR"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn negative_coordinates_parse() {
        let cli = Cli::try_parse_from(["weather", "show", "--lat", "-33.9", "--lon", "151.2"])
            .expect("valid args");
        match cli.command {
            Command::Show { lat, lon, .. } => {
                assert_eq!(lat, Some(-33.9));
                assert_eq!(lon, Some(151.2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn lat_requires_lon() {
        assert!(Cli::try_parse_from(["weather", "show", "--lat", "10"]).is_err());
    }

    #[test]
    fn country_requires_city() {
        assert!(Cli::try_parse_from(["weather", "show", "--country", "FR"]).is_err());
    }
}
