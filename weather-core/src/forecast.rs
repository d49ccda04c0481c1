use chrono::{DateTime, TimeZone};

use crate::model::ForecastEntry;

/// How many forecast days the dashboard shows.
pub const FORECAST_DAYS: usize = 3;

const NOON_MARKER: &str = "12:00:00";

/// Pick the noon sample of each upcoming day, skipping today.
///
/// `now` supplies both "today" and the time zone in which an entry's
/// calendar day is judged. Source order is kept and the result is cut to
/// [`FORECAST_DAYS`]; a short or empty list simply yields fewer entries.
pub fn select_noon_forecasts<'a, Tz: TimeZone>(
    list: &'a [ForecastEntry],
    now: &DateTime<Tz>,
) -> Vec<&'a ForecastEntry> {
    let today = now.date_naive();
    let tz = now.timezone();

    list.iter()
        .filter(|entry| {
            let Some(at) = DateTime::from_timestamp(entry.dt, 0) else {
                return false;
            };
            at.with_timezone(&tz).date_naive() != today && entry.dt_txt.contains(NOON_MARKER)
        })
        .take(FORECAST_DAYS)
        .collect()
}
