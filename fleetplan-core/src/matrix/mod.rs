//! Distance and duration matrices between stops.
//!
//! The [`MatrixProvider`] trait abstracts the external routing service: it
//! receives stop coordinates and returns a [`TravelTable`] of distances and
//! optional durations. [`TravelMatrix`] validates that table against the stop
//! count and fills in missing durations from distance at a fixed speed.

mod error;
mod haversine;
mod provider;
mod table;

pub use error::RoutingError;
pub use haversine::{EARTH_RADIUS_METERS, HaversineMatrixProvider, haversine_distance};
pub use provider::{MatrixProvider, TravelTable};
pub use table::{ESTIMATED_SPEED_MPS, TravelMatrix, estimate_duration};
