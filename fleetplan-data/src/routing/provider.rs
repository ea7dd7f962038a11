//! OSRM-backed implementation of the core routing contracts.
//!
//! The core traits are synchronous to keep the planning pipeline embeddable
//! in synchronous contexts. This provider bridges its async HTTP calls to
//! the sync interface by blocking on a Tokio runtime internally.

use std::future::Future;
use std::time::Duration;

use fleetplan_core::{
    MatrixProvider, Overview, RouteGeometry, RouteGeometryProvider, RoutingError, TravelTable,
};
use geo::Coord;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};

use super::osrm::{CODE_NO_ROUTE, RouteResponse, TableResponse};

/// Error type for [`OsrmProvider`] construction failures.
#[derive(Debug, Error)]
pub enum ProviderBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Failed to build the Tokio runtime.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Default user agent for OSRM requests.
pub const DEFAULT_USER_AGENT: &str = "fleetplan-routing/0.1";

/// Default OSRM base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Default OSRM routing profile.
pub const DEFAULT_PROFILE: &str = "driving";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest slice of an error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Configuration for [`OsrmProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsrmConfig {
    /// Base URL for the OSRM service (e.g., `"http://localhost:5000"`).
    pub base_url: String,
    /// Routing profile segment of the request path (e.g., `"driving"`).
    pub profile: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            profile: DEFAULT_PROFILE.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl OsrmConfig {
    /// Create a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the routing profile.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Routing provider using the OSRM Table and Route services.
///
/// It owns a Tokio runtime that is reused across calls.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within an existing multi-threaded Tokio
/// runtime (detected via [`Handle::try_current()`] and
/// [`RuntimeFlavor::MultiThread`]), it uses that runtime's handle with
/// [`tokio::task::block_in_place`] to avoid nested runtime panics. Calling it
/// from within a `current_thread` runtime is not supported.
pub struct OsrmProvider {
    client: Client,
    config: OsrmConfig,
    runtime: Runtime,
}

impl std::fmt::Debug for OsrmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish()
    }
}

impl OsrmProvider {
    /// Create a new provider with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderBuildError> {
        Self::with_config(OsrmConfig::new(base_url))
    }

    /// Create a new provider with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn with_config(config: OsrmConfig) -> Result<Self, ProviderBuildError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            runtime,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &OsrmConfig {
        &self.config
    }

    fn service_url(&self, service: &str, coordinates: &[Coord<f64>]) -> String {
        let path: String = coordinates
            .iter()
            .map(|coord| format!("{},{}", coord.x, coord.y))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/{service}/v1/{}/{path}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile
        )
    }

    /// `{base}/table/v1/{profile}/{lon,lat;...}?annotations=distance,duration`
    fn table_url(&self, coordinates: &[Coord<f64>]) -> String {
        format!(
            "{}?annotations=distance,duration",
            self.service_url("table", coordinates)
        )
    }

    /// `{base}/route/v1/{profile}/{lon,lat;...}?overview=..&geometries=polyline`
    fn route_url(&self, coordinates: &[Coord<f64>], overview: Overview) -> String {
        format!(
            "{}?overview={}&geometries=polyline",
            self.service_url("route", coordinates),
            overview.as_str()
        )
    }

    /// GET `url` and decode the JSON body.
    ///
    /// OSRM reports rejected queries as 4xx responses with a JSON status
    /// body; those bodies are decoded like successes so that the caller can
    /// inspect the service code. Other failures map to [`RoutingError`].
    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, RoutingError> {
        debug!("requesting {url}");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, url))?;

        if status.is_success() {
            return serde_json::from_str(&body).map_err(|err| RoutingError::Parse {
                message: err.to_string(),
            });
        }
        serde_json::from_str(&body).map_err(|_| RoutingError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: body.chars().take(MAX_ERROR_BODY).collect(),
        })
    }

    /// Drive `future` to completion on a suitable runtime.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            // No runtime detected, or current_thread runtime: use our own runtime.
            _ => self.runtime.block_on(future),
        }
    }

    /// Convert a reqwest error to a `RoutingError`.
    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> RoutingError {
        if error.is_timeout() {
            return RoutingError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return RoutingError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }

        RoutingError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

/// Convert an OSRM table response to a [`TravelTable`].
///
/// Unreachable pairs (`null` cells) are rejected rather than guessed.
fn convert_table(response: TableResponse) -> Result<TravelTable, RoutingError> {
    if !response.is_ok() {
        return Err(RoutingError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let distances = response
        .distances
        .ok_or_else(|| RoutingError::Parse {
            message: "OSRM response missing distances array".to_owned(),
        })?;
    Ok(TravelTable {
        distances: reachable(distances, "distance")?,
        durations: response
            .durations
            .map(|durations| reachable(durations, "duration"))
            .transpose()?,
    })
}

fn reachable(rows: Vec<Vec<Option<f64>>>, annotation: &str) -> Result<Vec<Vec<f64>>, RoutingError> {
    rows.into_iter()
        .enumerate()
        .map(|(from, row)| {
            row.into_iter()
                .enumerate()
                .map(|(to, cell)| {
                    cell.ok_or_else(|| RoutingError::Malformed {
                        message: format!("no {annotation} from coordinate {from} to {to}"),
                    })
                })
                .collect::<Result<Vec<f64>, RoutingError>>()
        })
        .collect()
}

/// Convert an OSRM route response to the best [`RouteGeometry`], if any.
fn convert_route(response: RouteResponse) -> Result<Option<RouteGeometry>, RoutingError> {
    if response.code == CODE_NO_ROUTE {
        return Ok(None);
    }
    if !response.is_ok() {
        return Err(RoutingError::Service {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    Ok(response.routes.into_iter().next().map(|route| RouteGeometry {
        distance: route.distance,
        duration: route.duration,
        geometry: route.geometry.unwrap_or_default(),
    }))
}

impl MatrixProvider for OsrmProvider {
    fn table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, RoutingError> {
        if coordinates.is_empty() {
            return Err(RoutingError::EmptyInput);
        }
        let url = self.table_url(coordinates);
        let response: TableResponse = self.block_on(self.fetch_json(&url))?;
        convert_table(response)
    }
}

impl RouteGeometryProvider for OsrmProvider {
    fn route(
        &self,
        coordinates: &[Coord<f64>],
        overview: Overview,
    ) -> Result<Option<RouteGeometry>, RoutingError> {
        if coordinates.is_empty() {
            return Err(RoutingError::EmptyInput);
        }
        let url = self.route_url(coordinates, overview);
        let response: RouteResponse = self.block_on(self.fetch_json(&url))?;
        convert_route(response)
    }
}
