use thiserror::Error;

/// Errors from a [`MatrixProvider`](super::MatrixProvider) or
/// [`RouteGeometryProvider`](crate::geometry::RouteGeometryProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// No coordinates were provided.
    #[error("at least one coordinate is required")]
    EmptyInput,
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// The service could not be reached.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport-level description.
        message: String,
    },
    /// The service answered with a non-success HTTP status.
    #[error("HTTP {status} from {url}: {message}")]
    Http {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Description of the failure.
        message: String,
    },
    /// The service answered with an application-level error code.
    #[error("routing service returned {code}: {message}")]
    Service {
        /// Service status code, e.g. `InvalidQuery`.
        code: String,
        /// Service message.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse routing response: {message}")]
    Parse {
        /// Decoder message.
        message: String,
    },
    /// The response decoded but its content is unusable.
    #[error("malformed routing data: {message}")]
    Malformed {
        /// What was wrong with the data.
        message: String,
    },
}

impl RoutingError {
    /// Whether repeating the request may succeed.
    ///
    /// Only timeouts are considered transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
