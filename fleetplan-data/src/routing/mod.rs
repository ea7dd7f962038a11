//! HTTP routing providers backed by OSRM.
//!
//! [`OsrmProvider`] implements both [`fleetplan_core::MatrixProvider`]
//! (via the Table service) and [`fleetplan_core::RouteGeometryProvider`]
//! (via the Route service). Both core traits are synchronous; the provider
//! blocks on its async HTTP client internally.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use fleetplan_core::MatrixProvider;
//! use fleetplan_data::routing::{OsrmConfig, OsrmProvider};
//! use geo::Coord;
//!
//! let config = OsrmConfig::new("http://localhost:5000")
//!     .with_timeout(Duration::from_secs(60))
//!     .with_user_agent("my-app/1.0");
//! let provider = OsrmProvider::with_config(config)?;
//!
//! let table = provider.table(&[
//!     Coord { x: -3.70, y: 40.42 },
//!     Coord { x: -3.69, y: 40.41 },
//! ])?;
//! println!("{} m", table.distances[0][1]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod osrm;
mod provider;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_BASE_URL, DEFAULT_PROFILE, DEFAULT_USER_AGENT, OsrmConfig, OsrmProvider,
    ProviderBuildError,
};
