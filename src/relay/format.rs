//! Message formatting
//!
//! Pure constructors for outgoing chat payloads. Inputs are taken verbatim.

use crate::gateway::{ChatMessage, LocationMessage};

/// Map link prefix used when none is configured
pub const DEFAULT_MAPS_BASE_URL: &str = "https://google.com/maps?q=";

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Build a text message stamped with the current time
pub fn generate_message(sender: impl Into<String>, text: impl Into<String>) -> ChatMessage {
    ChatMessage {
        sender: sender.into(),
        text: text.into(),
        created_at: now_millis(),
    }
}

/// Build a location message stamped with the current time
pub fn generate_location_message(
    sender: impl Into<String>,
    url: impl Into<String>,
) -> LocationMessage {
    LocationMessage {
        sender: sender.into(),
        url: url.into(),
        created_at: now_millis(),
    }
}

/// Map link for a coordinate pair
pub fn location_url(base: &str, latitude: f64, longitude: f64) -> String {
    format!("{}{},{}", base, latitude, longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_message() {
        let before = chrono::Utc::now().timestamp_millis();
        let msg = generate_message("Bob", "hi");
        let after = chrono::Utc::now().timestamp_millis();

        assert_eq!(msg.sender, "Bob");
        assert_eq!(msg.text, "hi");
        assert!(msg.created_at >= before && msg.created_at <= after);
    }

    #[test]
    fn test_generate_message_accepts_anything() {
        let msg = generate_message("", "   <b>raw</b>   ");
        assert_eq!(msg.sender, "");
        assert_eq!(msg.text, "   <b>raw</b>   ");
    }

    #[test]
    fn test_generate_location_message() {
        let msg = generate_location_message("Alice", "https://example.com/map");
        assert_eq!(msg.sender, "Alice");
        assert_eq!(msg.url, "https://example.com/map");
        assert!(msg.created_at > 0);
    }

    #[test]
    fn test_location_url() {
        assert_eq!(
            location_url(DEFAULT_MAPS_BASE_URL, 51.5, -0.12),
            "https://google.com/maps?q=51.5,-0.12"
        );
        assert_eq!(
            location_url(DEFAULT_MAPS_BASE_URL, 10.0, 20.0),
            "https://google.com/maps?q=10,20"
        );
    }
}
