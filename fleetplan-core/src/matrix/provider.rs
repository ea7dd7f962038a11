//! Matrix provider trait and the raw table it returns.

use geo::Coord;

use super::error::RoutingError;

/// Raw pairwise distances (metres) and, when available, durations (seconds).
///
/// `distances[i][j]` is the road distance from coordinate `i` to coordinate
/// `j`. The matrix need not be symmetric.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TravelTable {
    /// Distances in metres.
    pub distances: Vec<Vec<f64>>,
    /// Durations in seconds, if the service supplied them.
    pub durations: Option<Vec<Vec<f64>>>,
}

/// Fetch pairwise travel distances and durations between coordinates.
///
/// Coordinates use `x = longitude`, `y = latitude`. Implementations must
/// return an `n x n` table for `n` coordinates and
/// `Err(RoutingError::EmptyInput)` for an empty slice. Leaving `durations`
/// empty is allowed; callers estimate them from distance.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use fleetplan_core::{MatrixProvider, RoutingError, TravelTable};
///
/// struct Flat;
///
/// impl MatrixProvider for Flat {
///     fn table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, RoutingError> {
///         if coordinates.is_empty() {
///             return Err(RoutingError::EmptyInput);
///         }
///         let n = coordinates.len();
///         Ok(TravelTable {
///             distances: vec![vec![100.0; n]; n],
///             durations: None,
///         })
///     }
/// }
///
/// let table = Flat.table(&[Coord { x: 0.0, y: 0.0 }])?;
/// assert_eq!(table.distances.len(), 1);
/// # Ok::<(), RoutingError>(())
/// ```
pub trait MatrixProvider {
    /// Return the travel table for `coordinates`.
    fn table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, RoutingError>;
}

impl<T: MatrixProvider + ?Sized> MatrixProvider for &T {
    fn table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, RoutingError> {
        (**self).table(coordinates)
    }
}
