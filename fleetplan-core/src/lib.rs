//! Core domain for the fleetplan delivery optimizer.
//!
//! A planning run flows strictly through five stages:
//!
//! 1. [`build`] reduces raw [`CenterRecord`], [`DemandRecord`] and
//!    [`VehicleRecord`] values into a canonical [`Problem`], repairing
//!    inconsistent windows instead of rejecting them.
//! 2. A [`MatrixProvider`] supplies distances and, optionally, durations
//!    between the stops; [`TravelMatrix`] validates them and estimates
//!    missing durations.
//! 3. [`ConstraintModel`] derives arc costs, the soft time dimension, the
//!    scaled capacity dimensions and cold-chain eligibility.
//! 4. A [`RouteSolver`] searches the model within a time budget.
//! 5. [`extract`] walks the solved successor chains into [`VehicleRoute`]s.
//!
//! [`Planner`] wires the stages together and produces a [`Plan`].

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clock;
pub mod error;
pub mod geometry;
pub mod matrix;
pub mod model;
pub mod plan;
pub mod problem;
pub mod records;
pub mod route;
pub mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use clock::{ClockError, TimeWindow};
pub use error::{ConfigError, PlanError};
pub use geometry::{Overview, RouteGeometry, RouteGeometryProvider, decorate_legs};
pub use matrix::{
    HaversineMatrixProvider, MatrixProvider, RoutingError, TravelMatrix, TravelTable,
    estimate_duration, haversine_distance,
};
pub use model::{ConstraintModel, IndexManager, ModelError, ModelParams, RouteEvaluation, Schedule};
pub use plan::{DEFAULT_TIME_LIMIT, Diagnostics, Leg, Plan, PlanEntry, PlanOptions, Planner};
pub use problem::{FleetWindow, Problem, Stop, VehicleSpec, build};
pub use records::{CenterRecord, DemandRecord, PlanInput, VehicleRecord};
pub use route::{VehicleRoute, extract};
pub use solver::{Objective, RouteSolver, Solution};
