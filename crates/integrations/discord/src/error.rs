use archivist_provider::PlatformError;
use thiserror::Error;

/// Errors specific to the Discord client.
///
/// These are internal errors that get converted into [`PlatformError`] at the
/// [`Platform`](archivist_provider::Platform) boundary.
#[derive(Debug, Error)]
pub enum DiscordError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Discord API returned an error response.
    #[error("Discord API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// A payload could not be encoded or a response could not be decoded.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The API answered HTTP 429 (Too Many Requests).
    #[error("rate limited by Discord")]
    RateLimited,
}

impl From<DiscordError> for PlatformError {
    fn from(err: DiscordError) -> Self {
        match err {
            DiscordError::Http(e) if e.is_decode() => PlatformError::Serialization(e.to_string()),
            DiscordError::Http(e) => PlatformError::Connection(e.to_string()),
            DiscordError::Api { status, body } => PlatformError::Api { status, body },
            DiscordError::InvalidPayload(msg) => PlatformError::Serialization(msg),
            DiscordError::RateLimited => PlatformError::RateLimited,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_status() {
        let err: PlatformError = DiscordError::Api {
            status: 500,
            body: "oops".into(),
        }
        .into();
        assert_eq!(err.status(), Some(500));
        assert!(matches!(err, PlatformError::Api { .. }));
    }

    #[test]
    fn rate_limited_maps_to_rate_limited() {
        let err: PlatformError = DiscordError::RateLimited.into();
        assert!(matches!(err, PlatformError::RateLimited));
    }

    #[test]
    fn invalid_payload_maps_to_serialization() {
        let err: PlatformError = DiscordError::InvalidPayload("bad".into()).into();
        assert!(matches!(err, PlatformError::Serialization(_)));
    }

    #[test]
    fn error_display() {
        let err = DiscordError::Api {
            status: 404,
            body: "Unknown Channel".into(),
        };
        assert_eq!(err.to_string(), "Discord API error 404: Unknown Channel");
    }
}
