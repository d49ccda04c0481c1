/// Text shown when a failure has no specific message.
pub const GENERIC_ALERT: &str = "Oh no! Something went wrong!";

/// Sink for transient, user-visible error messages.
///
/// Implementations decide how (and whether) to show the message; callers
/// never wait on it. An empty message stands for [`GENERIC_ALERT`].
pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

/// The text to display for `message`.
pub fn alert_text(message: &str) -> &str {
    if message.trim().is_empty() {
        GENERIC_ALERT
    } else {
        message
    }
}
