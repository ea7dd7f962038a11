//! Facade crate for the fleetplan delivery optimizer.
//!
//! This crate re-exports the core domain types and exposes the guided local
//! search engine and the OSRM routing provider behind feature flags.
//!
//! ```
//! use fleetplan::{HaversineMatrixProvider, PlanInput, Planner};
//! # #[cfg(feature = "solver-gls")]
//! # {
//! use fleetplan::GlsSolver;
//!
//! let planner = Planner::new(HaversineMatrixProvider, GlsSolver::new());
//! assert!(planner.plan(&PlanInput::default()).is_err());
//! # }
//! ```

#![forbid(unsafe_code)]

pub use fleetplan_core::{
    CenterRecord, ConfigError, ConstraintModel, DemandRecord, Diagnostics, HaversineMatrixProvider,
    Leg, MatrixProvider, ModelParams, Objective, Overview, Plan, PlanEntry, PlanError, PlanInput,
    PlanOptions, Planner, RouteGeometry, RouteGeometryProvider, RouteSolver, RoutingError,
    Solution, TravelTable, VehicleRecord, VehicleRoute, build, decorate_legs, extract,
};

#[cfg(feature = "solver-gls")]
pub use fleetplan_solver_gls::{GlsConfig, GlsSolver};

#[cfg(feature = "osrm")]
pub use fleetplan_data::{OsrmConfig, OsrmProvider, ProviderBuildError};
