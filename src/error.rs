use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type used throughout the tracker.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading configuration or sending a record.
///
/// All errors are fatal to the beacon that produced them: nothing in the tracker retries or
/// recovers.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// No `<script>` element carrying the `data-ackee` marker attribute was found.
    #[error("no script element with a data-ackee attribute found")]
    ScriptElementNotFound,

    /// The script element is missing one of the required attributes.
    #[error("script element is missing the {0} attribute")]
    MissingAttribute(&'static str),

    /// Target URL composed from the server URL could not be parsed.
    #[error("invalid server url")]
    InvalidServerUrl(#[source] url::ParseError),

    /// Payload could not be serialized to JSON.
    #[error("failed to serialize payload")]
    Serialize(#[source] Arc<serde_json::Error>),

    /// Server responded with 200, but the body is not valid JSON.
    #[error("failed to parse response from server")]
    Parse(#[source] Arc<serde_json::Error>),

    /// Server responded with a status other than 200.
    #[error("server returned with an unhandled status: {0}")]
    ServerStatus(StatusCode),

    /// Network failure while transferring the record.
    #[error("an error occurred while transferring data to the server")]
    Transport(#[source] Arc<reqwest::Error>),

    /// The request was aborted before it completed.
    #[error("transfer to server has been canceled")]
    Aborted,

    /// The request exceeded the configured timeout.
    #[error("transfer to server timed out")]
    Timeout,

    /// An I/O error.
    #[error(transparent)]
    // std::io::Error is not clonable, so we're wrapping it in an Arc.
    Io(Arc<std::io::Error>),

    /// The background request thread panicked. This should normally never happen.
    #[error("beacon thread panicked")]
    BeaconThreadPanicked,
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Error::Timeout
        } else {
            Error::Transport(Arc::new(value.without_url()))
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::Error;

    #[test]
    fn server_status_error_mentions_status() {
        let err = Error::ServerStatus(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "server returned with an unhandled status: 500 Internal Server Error"
        );
    }

    #[test]
    fn parse_error_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let err = Error::Parse(source.into());
        assert!(std::error::Error::source(&err).is_some());
    }
}
