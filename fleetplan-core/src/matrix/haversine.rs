//! Great-circle fallback provider for offline planning.

use geo::{Coord, Distance, HaversineMeasure, Point};

use super::error::RoutingError;
use super::provider::{MatrixProvider, TravelTable};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

const EARTH: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_METERS);

/// Great-circle distance between two `(lon, lat)` coordinates, in metres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fleetplan_core::haversine_distance;
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.0, y: 1.0 };
/// let meters = haversine_distance(a, b);
/// assert!((meters - 111_195.0).abs() < 1.0);
/// ```
#[must_use]
pub fn haversine_distance(from: Coord<f64>, to: Coord<f64>) -> f64 {
    EARTH.distance(Point::from(from), Point::from(to))
}

/// `MatrixProvider` computing straight-line distances without durations.
///
/// Durations are left to the 30 km/h estimate applied by
/// [`TravelMatrix::from_table`](super::TravelMatrix::from_table). Road
/// distances are always longer, so plans built on this provider are
/// optimistic.
#[derive(Debug, Default, Clone, Copy)]
pub struct HaversineMatrixProvider;

impl MatrixProvider for HaversineMatrixProvider {
    fn table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, RoutingError> {
        if coordinates.is_empty() {
            return Err(RoutingError::EmptyInput);
        }
        let distances = coordinates
            .iter()
            .map(|from| {
                coordinates
                    .iter()
                    .map(|to| haversine_distance(*from, *to))
                    .collect()
            })
            .collect();
        Ok(TravelTable {
            distances,
            durations: None,
        })
    }
}
