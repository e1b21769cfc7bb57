use std::time::Duration;

use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum RankError {
    /// An error occurred with the WebSocket connection to the bridge gateway.
    #[error("WebSocket error: {0}")]
    Websocket(Box<tokio_tungstenite::tungstenite::Error>),

    /// A provided URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The session reported that it could not start.
    #[error("session startup failed: {0}")]
    SessionStartup(String),

    /// The session was terminated while requests were still outstanding.
    #[error("session terminated before the request completed")]
    SessionTerminated,

    /// The named service could not be opened on the session.
    #[error("service {service} failed to open: {reason}")]
    ServiceOpen {
        /// The service name that was requested.
        service: String,
        /// Description reported by the session, if any.
        reason: String,
    },

    /// The session refused to accept a request.
    #[error("failed to send the request: {0}")]
    RequestSubmit(String),

    /// The service answered with an error payload instead of a report.
    #[error("service error {code}: {message}")]
    Api {
        /// The numeric error code returned by the service.
        code: i32,
        /// The error text returned by the service.
        message: String,
    },

    /// An event or message arrived that no handler recognizes.
    #[error("unclassified event: {0}")]
    Unclassified(String),

    /// The data received was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// An invalid date range was provided (start must not be after end).
    #[error("invalid date range: start must not be after end")]
    InvalidDates,

    /// A query parameter was missing or inconsistent.
    #[error("invalid query parameters: {0}")]
    InvalidParams(String),

    /// No terminal response arrived within the configured timeout.
    #[error("timed out after {0:?} waiting for a response")]
    Timeout(Duration),

    /// The request was abandoned before any outcome was delivered.
    #[error("request was cancelled before completion")]
    Cancelled,
}

impl RankError {
    /// Whether this error ends the attempt it belongs to.
    ///
    /// Fatal kinds resolve the waiting caller. `Unclassified` is the only soft
    /// kind: it is logged by the dispatcher and the wait continues.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, RankError::Unclassified(_))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for RankError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        RankError::Websocket(Box::new(e))
    }
}

impl From<serde_json::Error> for RankError {
    fn from(e: serde_json::Error) -> Self {
        RankError::Data(e.to_string())
    }
}
