use thiserror::Error;

/// Errors returned by an upstream platform client.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform answered with a non-success HTTP status.
    #[error("API error {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// A network or transport-level error occurred.
    #[error("connection error: {0}")]
    Connection(String),

    /// The platform rejected the request due to rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// A response could not be decoded or a request could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl PlatformError {
    /// The HTTP status carried by this error, if the platform answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited => Some(429),
            Self::Connection(_) | Self::Serialization(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_exposed_for_http_failures() {
        let err = PlatformError::Api {
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(PlatformError::RateLimited.status(), Some(429));
        assert_eq!(PlatformError::Connection("reset".into()).status(), None);
    }

    #[test]
    fn error_display() {
        let err = PlatformError::Api {
            status: 403,
            body: "Missing Access".into(),
        };
        assert_eq!(err.to_string(), "API error 403: Missing Access");
        assert_eq!(PlatformError::RateLimited.to_string(), "rate limited");
    }
}
