//! Error taxonomy for a planning run.
//!
//! Input problems surface as [`ConfigError`] before any network or search
//! work happens. A failing distance service surfaces as
//! [`PlanError::MatrixUnavailable`]. An infeasible model is *not* an error:
//! [`Planner::plan`](crate::Planner::plan) returns `Ok(None)` for it.

use thiserror::Error;

use crate::clock::ClockError;
use crate::matrix::RoutingError;
use crate::model::ModelError;

/// Malformed or inconsistent input records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// No vehicles were supplied, so no depot can be identified.
    #[error("at least one vehicle is required")]
    NoVehicles,
    /// The first vehicle's depot is not among the centers.
    #[error("depot {depot_id:?} is not a known center")]
    MissingDepot {
        /// Depot identifier taken from the first vehicle.
        depot_id: String,
    },
    /// A demand references a center that does not exist.
    #[error("demand #{demand} references unknown center {center_id:?}")]
    UnknownLocation {
        /// Zero-based position of the demand record.
        demand: usize,
        /// Unresolved center identifier.
        center_id: String,
    },
    /// A demand targets the depot itself.
    #[error("demand #{demand} targets the depot {center_id:?}")]
    DemandAtDepot {
        /// Zero-based position of the demand record.
        demand: usize,
        /// Depot identifier.
        center_id: String,
    },
    /// A clock field could not be parsed.
    #[error("invalid {field}: {source}")]
    InvalidClock {
        /// Name of the offending field.
        field: &'static str,
        /// Underlying parse failure.
        #[source]
        source: ClockError,
    },
    /// A quantity was negative, NaN or infinite.
    #[error("invalid {field}: {value} (must be finite and non-negative)")]
    InvalidQuantity {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// Errors that abort a planning run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Input records were rejected.
    #[error("invalid planning input: {0}")]
    Config(#[from] ConfigError),
    /// The distance service failed or returned unusable data.
    #[error("distance matrix unavailable: {0}")]
    MatrixUnavailable(#[source] RoutingError),
    /// The matrix and the stop list disagree.
    #[error("failed to build constraint model: {0}")]
    Model(#[from] ModelError),
}
