//! Terminal rendering: weather panels, the error banner and the loading line.

use std::{
    io::{self, IsTerminal, Write},
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use weather_core::{Alert, CurrentView, ForecastView, Temperature, WeatherView, alert_text};

/// A block of lines built off-screen and attached to a container in one go.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    lines: Vec<String>,
}

impl Fragment {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

/// A fixed target area of the dashboard.
#[derive(Debug)]
pub struct Container {
    title: &'static str,
    children: Vec<Fragment>,
}

impl Container {
    pub fn new(title: &'static str) -> Self {
        Self {
            title,
            children: Vec::new(),
        }
    }

    pub fn attach(&mut self, fragment: Fragment) {
        self.children.push(fragment);
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The whole container as one string, so it can be written at once.
    pub fn render(&self) -> String {
        let mut out = format!("== {} ==\n", self.title);
        for line in self.children.iter().flat_map(|f| f.lines()) {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// The containers every render call draws into.
#[derive(Debug)]
pub struct ViewContext {
    pub current: Container,
    pub forecast: Container,
}

impl Default for ViewContext {
    fn default() -> Self {
        Self {
            current: Container::new("Now"),
            forecast: Container::new("Next days"),
        }
    }
}

impl ViewContext {
    /// Replace whatever is shown with `view`.
    pub fn show(&mut self, view: &WeatherView) {
        self.current.clear();
        self.forecast.clear();
        self.current.attach(current_fragment(&view.current));
        self.forecast.attach(forecast_fragment(&view.forecast));
    }

    pub fn flush<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for container in [&self.current, &self.forecast] {
            if !container.is_empty() {
                out.write_all(container.render().as_bytes())?;
            }
        }
        out.flush()
    }
}

fn temp_text(t: &Temperature) -> String {
    format!("{}°C | {}°F", t.celsius, t.fahrenheit)
}

pub fn current_fragment(view: &CurrentView) -> Fragment {
    let mut fragment = Fragment::default();
    fragment.push(format!("{} - {}", view.location.area, view.location.country));
    fragment.push(temp_text(&view.temperature));
    if let (Some(high), Some(low)) = (&view.high, &view.low) {
        fragment.push(format!("High {}  Low {}", temp_text(high), temp_text(low)));
    }
    fragment.push(view.description.clone());
    fragment.push(format!("Wind speed: {}m/s", view.wind_speed));
    fragment.push(format!("Relative Humidity: {}%", view.humidity));
    fragment.push(format!("Icon: {}", view.icon_url));
    fragment
}

pub fn forecast_fragment(days: &[ForecastView]) -> Fragment {
    let mut fragment = Fragment::default();
    for (i, day) in days.iter().enumerate() {
        if i > 0 {
            fragment.push("");
        }
        fragment.push(format!("{} {}", day.weekday, day.date));
        fragment.push(format!("  {}", temp_text(&day.temperature)));
        fragment.push(format!("  {}", day.description));
        fragment.push(format!("  Wind Speed: {}m/s", day.wind_speed));
        fragment.push(format!("  Relative Humidity: {}%", day.humidity));
        fragment.push(format!("  Icon: {}", day.icon_url));
    }
    fragment
}

const LOADING_TEXT: &str = "Loading weather...";
const CLEAR_LINE: &[u8] = b"\r\x1b[2K";

#[derive(Debug)]
struct ConsoleState<W> {
    out: W,
    tty: bool,
    loading: bool,
    mid_line: bool,
}

/// Shared status stream (stderr) for the loading line, the banner and logs.
///
/// While loading, every complete line written through it first clears the
/// loading text and then redraws it underneath, so the indicator stays on
/// the last line until [`Console::hide_loading`]. Off a terminal there is
/// no loading line and no escape codes.
#[derive(Debug)]
pub struct Console<W = io::Stderr> {
    state: Arc<Mutex<ConsoleState<W>>>,
}

impl<W> Clone for Console<W> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl Console {
    pub fn stderr() -> Self {
        let tty = io::stderr().is_terminal();
        Self::new(io::stderr(), tty)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, tty: bool) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConsoleState {
                out,
                tty,
                loading: false,
                mid_line: false,
            })),
        }
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, ConsoleState<W>>> {
        self.state
            .lock()
            .map_err(|_| io::Error::other("console lock poisoned"))
    }

    pub fn show_loading(&self) -> io::Result<()> {
        let mut state = self.lock()?;
        if !state.tty || state.loading {
            return Ok(());
        }
        if !state.mid_line {
            state.out.write_all(LOADING_TEXT.as_bytes())?;
        }
        state.loading = true;
        state.out.flush()
    }

    pub fn hide_loading(&self) -> io::Result<()> {
        let mut state = self.lock()?;
        if !state.loading {
            return Ok(());
        }
        state.loading = false;
        if !state.mid_line {
            state.out.write_all(CLEAR_LINE)?;
        }
        state.out.flush()
    }

    #[cfg(test)]
    fn with_output<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        match self.state.lock() {
            Ok(state) => f(&state.out),
            Err(poisoned) => f(&poisoned.into_inner().out),
        }
    }
}

impl<W: Write> Write for Console<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut state = self.lock()?;
        let redraw = state.loading;

        if redraw && !state.mid_line {
            state.out.write_all(CLEAR_LINE)?;
        }
        state.out.write_all(buf)?;
        state.mid_line = !buf.ends_with(b"\n");
        if redraw && !state.mid_line {
            state.out.write_all(LOADING_TEXT.as_bytes())?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.out.flush()
    }
}

/// Single transient error banner.
///
/// A message is shown only while no banner is up; a banner counts as gone
/// once `delay` has elapsed since it was shown.
#[derive(Debug)]
pub struct ErrorBanner<W = Console> {
    delay: Duration,
    shown_at: Mutex<Option<Instant>>,
    out: Mutex<W>,
}

impl<W: Write> ErrorBanner<W> {
    pub fn new(delay: Duration, out: W) -> Self {
        Self {
            delay,
            shown_at: Mutex::new(None),
            out: Mutex::new(out),
        }
    }

    /// Show `message` unless a banner is already up. Returns whether it was shown.
    pub fn show(&self, message: &str) -> bool {
        let Ok(mut shown_at) = self.shown_at.lock() else {
            return false;
        };
        if shown_at.is_some_and(|at| at.elapsed() < self.delay) {
            return false;
        }
        *shown_at = Some(Instant::now());

        if let Ok(mut out) = self.out.lock() {
            // nowhere left to report a failing stderr
            let _ = writeln!(out, "! {}", alert_text(message));
            let _ = out.flush();
        }
        true
    }

    #[cfg(test)]
    fn is_visible(&self) -> bool {
        self.shown_at
            .lock()
            .map(|at| at.is_some_and(|at| at.elapsed() < self.delay))
            .unwrap_or(false)
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> Alert for ErrorBanner<W> {
    fn alert(&self, message: &str) {
        self.show(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{GENERIC_ALERT, model::Place};

    fn temp(celsius: f64, fahrenheit: f64) -> Temperature {
        Temperature {
            celsius,
            fahrenheit,
        }
    }

    fn sample_view() -> WeatherView {
        WeatherView {
            current: CurrentView {
                location: Place {
                    area: "Paris".into(),
                    country: "FR".into(),
                },
                temperature: temp(26.9, 80.3),
                high: Some(temp(28.0, 82.4)),
                low: Some(temp(25.0, 77.0)),
                humidity: 40,
                description: "Light Rain".into(),
                wind_speed: 3.6,
                icon_url: "https://openweathermap.org/img/w/10d.png".into(),
            },
            forecast: vec![
                ForecastView {
                    weekday: "Mon.".into(),
                    date: "11th".into(),
                    temperature: temp(10.0, 50.0),
                    humidity: 70,
                    description: "Broken Clouds".into(),
                    wind_speed: 5.0,
                    icon_url: "https://openweathermap.org/img/w/04d.png".into(),
                },
                ForecastView {
                    weekday: "Tue.".into(),
                    date: "12th".into(),
                    temperature: temp(11.5, 52.7),
                    humidity: 65,
                    description: "Clear Sky".into(),
                    wind_speed: 2.1,
                    icon_url: "https://openweathermap.org/img/w/01d.png".into(),
                },
            ],
        }
    }

    #[test]
    fn current_fragment_lines() {
        let fragment = current_fragment(&sample_view().current);

        assert_eq!(
            fragment.lines(),
            &[
                "Paris - FR",
                "26.9°C | 80.3°F",
                "High 28°C | 82.4°F  Low 25°C | 77°F",
                "Light Rain",
                "Wind speed: 3.6m/s",
                "Relative Humidity: 40%",
                "Icon: https://openweathermap.org/img/w/10d.png",
            ]
        );
    }

    #[test]
    fn forecast_fragment_has_block_per_day() {
        let fragment = forecast_fragment(&sample_view().forecast);

        assert_eq!(fragment.lines()[0], "Mon. 11th");
        assert!(fragment.lines().contains(&"Tue. 12th".to_string()));
        assert!(fragment.lines().contains(&"  11.5°C | 52.7°F".to_string()));
        assert_eq!(fragment.lines().iter().filter(|l| l.is_empty()).count(), 1);
    }

    #[test]
    fn show_replaces_previous_content() {
        let mut ctx = ViewContext::default();
        ctx.show(&sample_view());
        ctx.show(&sample_view());

        let mut out = Vec::new();
        ctx.flush(&mut out).expect("writes to a Vec");
        let text = String::from_utf8(out).expect("utf-8");

        assert_eq!(text.matches("Paris - FR").count(), 1);
        assert!(text.starts_with("== Now ==\n"));
        assert!(text.contains("== Next days ==\n"));
    }

    #[test]
    fn empty_context_writes_nothing() {
        let ctx = ViewContext::default();
        let mut out = Vec::new();
        ctx.flush(&mut out).expect("writes to a Vec");
        assert!(out.is_empty());
    }

    #[test]
    fn banner_shows_once_while_visible() {
        let banner = ErrorBanner::new(Duration::from_secs(60), Vec::new());

        assert!(banner.show("Geolocation blocked. Using IP address instead."));
        assert!(!banner.show("second"));
        assert!(banner.is_visible());

        let text = String::from_utf8(banner.into_inner()).expect("utf-8");
        assert_eq!(text, "! Geolocation blocked. Using IP address instead.\n");
    }

    #[test]
    fn banner_reappears_after_delay() {
        let banner = ErrorBanner::new(Duration::ZERO, Vec::new());

        banner.alert("");
        banner.alert("again");

        let text = String::from_utf8(banner.into_inner()).expect("utf-8");
        assert_eq!(text, format!("! {GENERIC_ALERT}\n! again\n"));
    }

    /// Lines as a terminal would finally show them: everything before the
    /// last line clear on a line is gone.
    fn visible_lines(raw: &[u8]) -> Vec<String> {
        let text = String::from_utf8_lossy(raw).into_owned();
        let clear = String::from_utf8_lossy(CLEAR_LINE).into_owned();
        text.split('\n')
            .map(|line| line.rsplit(clear.as_str()).next().unwrap_or(line).to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }

    #[test]
    fn loading_line_is_gone_after_banner_mid_load() {
        let console = Console::new(Vec::new(), true);
        let banner = ErrorBanner::new(Duration::from_secs(60), console.clone());

        console.show_loading().expect("writes to a Vec");
        banner.alert("Geolocation not supported. Using IP address instead.");
        console.hide_loading().expect("writes to a Vec");

        let lines = console.with_output(|out| visible_lines(out));
        assert_eq!(
            lines,
            vec!["! Geolocation not supported. Using IP address instead.".to_string()]
        );
    }

    #[test]
    fn loading_survives_log_lines_until_hidden() {
        let console = Console::new(Vec::new(), true);
        let mut log = console.clone();

        console.show_loading().expect("writes to a Vec");
        log.write_all(b"WARN partial ").expect("writes to a Vec");
        log.write_all(b"line\n").expect("writes to a Vec");

        let while_loading = console.with_output(|out| visible_lines(out));
        assert_eq!(while_loading, vec!["WARN partial line", LOADING_TEXT]);

        console.hide_loading().expect("writes to a Vec");
        let after = console.with_output(|out| visible_lines(out));
        assert_eq!(after, vec!["WARN partial line"]);
    }

    #[test]
    fn no_loading_line_or_escapes_off_terminal() {
        let console = Console::new(Vec::new(), false);
        let banner = ErrorBanner::new(Duration::from_secs(60), console.clone());

        console.show_loading().expect("writes to a Vec");
        banner.alert("");
        console.hide_loading().expect("writes to a Vec");

        let raw = console.with_output(|out| String::from_utf8_lossy(out).into_owned());
        assert_eq!(raw, format!("! {GENERIC_ALERT}\n"));
    }
}
