//! Route geometry for display collaborators.
//!
//! A [`RouteGeometryProvider`] turns an ordered list of coordinates into a
//! drawable path. The optimizer never consults it: [`decorate_legs`] only
//! annotates the legs of an existing [`Plan`], and visit order is left as
//! solved.

use geo::Coord;
use log::debug;

use crate::matrix::RoutingError;
use crate::plan::Plan;

/// Level of detail requested for a route geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Overview {
    /// Every vertex of the road path.
    #[default]
    Full,
    /// A simplified path suited to the current zoom level.
    Simplified,
    /// No geometry at all.
    False,
}

impl Overview {
    /// Query-string value understood by OSRM-compatible services.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Simplified => "simplified",
            Self::False => "false",
        }
    }
}

/// A routed path between consecutive coordinates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteGeometry {
    /// Road distance in metres.
    pub distance: f64,
    /// Travel time in seconds.
    pub duration: f64,
    /// Encoded polyline.
    pub geometry: String,
}

/// Route coordinates, visited in the given order, over the road network.
pub trait RouteGeometryProvider {
    /// Return the routed path through `coordinates`, or `None` when the
    /// service found no route.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError`] when the service fails.
    fn route(
        &self,
        coordinates: &[Coord<f64>],
        overview: Overview,
    ) -> Result<Option<RouteGeometry>, RoutingError>;
}

impl<T: RouteGeometryProvider + ?Sized> RouteGeometryProvider for &T {
    fn route(
        &self,
        coordinates: &[Coord<f64>],
        overview: Overview,
    ) -> Result<Option<RouteGeometry>, RoutingError> {
        (**self).route(coordinates, overview)
    }
}

/// Attach road geometry to every leg of `plan`.
///
/// Legs the service cannot route keep their matrix figures and no geometry.
/// Routed legs take the service's distance and duration. Returns the number
/// of legs decorated.
///
/// # Errors
///
/// Stops at the first [`RoutingError`].
pub fn decorate_legs<G>(
    plan: &mut Plan,
    provider: &G,
    overview: Overview,
) -> Result<usize, RoutingError>
where
    G: RouteGeometryProvider + ?Sized,
{
    let mut decorated = 0;
    for leg in &mut plan.legs {
        let Some(routed) = provider.route(&[leg.from_location, leg.to_location], overview)? else {
            debug!(
                "no route for leg {} -> {} of vehicle {}",
                leg.from_id, leg.to_id, leg.vehicle
            );
            continue;
        };
        leg.meters = routed.distance;
        leg.seconds = routed.duration;
        leg.geometry = Some(routed.geometry);
        decorated += 1;
    }
    Ok(decorated)
}
