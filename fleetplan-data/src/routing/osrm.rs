//! OSRM response types for the Table and Route services.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#table-service> and
//! <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// Status code OSRM reports for a successful request.
const CODE_OK: &str = "Ok";

/// Status code OSRM reports when no route connects the coordinates.
pub const CODE_NO_ROUTE: &str = "NoRoute";

/// OSRM Table API response.
///
/// Requested with `annotations=distance,duration`, a successful response
/// carries both matrices. Cells are `None` when no route exists between a
/// pair.
#[derive(Debug, Deserialize)]
pub struct TableResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"InvalidQuery"` - Invalid query parameters
    /// - `"InvalidOptions"` - Invalid option combination
    /// - `"NoTable"` - Table computation failed
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Road distances in metres.
    pub distances: Option<Vec<Vec<Option<f64>>>>,

    /// Travel times in seconds.
    pub durations: Option<Vec<Vec<Option<f64>>>>,
}

impl TableResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Alternative routes, best first.
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

/// One route of a [`RouteResponse`].
#[derive(Debug, Deserialize)]
pub struct RouteEntry {
    /// Road distance in metres.
    pub distance: f64,
    /// Travel time in seconds.
    pub duration: f64,
    /// Encoded polyline; absent when requested with `overview=false`.
    pub geometry: Option<String>,
}
