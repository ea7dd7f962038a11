//! Data access for the fleetplan optimizer.
//!
//! Responsibilities:
//! - Implement the core [`MatrixProvider`](fleetplan_core::MatrixProvider)
//!   and [`RouteGeometryProvider`](fleetplan_core::RouteGeometryProvider)
//!   contracts against an OSRM routing service.
//! - Decode the service's wire format into core types.
//!
//! Boundaries:
//! - Do not encode domain rules (they live in `fleetplan-core`).
//! - Keep blocking I/O off async executors; the providers own a runtime and
//!   only borrow the caller's when it is multi-threaded.
#![forbid(unsafe_code)]

pub mod routing;

pub use routing::{
    DEFAULT_BASE_URL, DEFAULT_PROFILE, DEFAULT_USER_AGENT, OsrmConfig, OsrmProvider,
    ProviderBuildError,
};
