use thiserror::Error;

/// Failures of the weather pipeline (IP lookup, weather fetch, formatting).
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse response JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error(
        "No credentials configured for '{0}'.\n\
         Hint: run `weather configure {0}` and enter your key."
    )]
    MissingCredentials(&'static str),
}

/// Why the device could not report a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation permission denied")]
    PermissionDenied,

    #[error("Geolocation not supported")]
    Unsupported,

    #[error("Geolocation unavailable: {0}")]
    Unavailable(String),
}

impl GeolocationError {
    /// Numeric code in the usual position-error numbering.
    pub fn code(&self) -> u8 {
        match self {
            GeolocationError::PermissionDenied => 1,
            GeolocationError::Unsupported => 2,
            GeolocationError::Unavailable(_) => 3,
        }
    }

    /// Banner text announcing the IP fallback, empty for codes without one.
    pub fn fallback_message(&self) -> &'static str {
        match self.code() {
            1 => "Geolocation blocked. Using IP address instead.",
            2 => "Geolocation not supported. Using IP address instead.",
            _ => "",
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geolocation_codes_and_messages() {
        assert_eq!(GeolocationError::PermissionDenied.code(), 1);
        assert_eq!(GeolocationError::Unsupported.code(), 2);
        assert!(
            GeolocationError::PermissionDenied
                .fallback_message()
                .contains("blocked")
        );
        assert!(
            GeolocationError::Unsupported
                .fallback_message()
                .contains("not supported")
        );
        assert_eq!(
            GeolocationError::Unavailable("timeout".into()).fallback_message(),
            ""
        );
    }

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("oops"), "oops");

        let long = "x".repeat(250);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.len(), 203);
    }

    #[test]
    fn missing_credentials_hint() {
        let msg = WeatherError::MissingCredentials("openweather").to_string();
        assert!(msg.contains("weather configure openweather"));
    }
}
