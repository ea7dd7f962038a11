//! Shared helpers for fleetplan-core integration tests.

use std::cell::Cell;
use std::time::Duration;

use geo::Coord;
use fleetplan_core::{
    CenterRecord, ConstraintModel, DemandRecord, MatrixProvider, RouteSolver, RoutingError,
    Solution, TravelTable, VehicleRecord,
};

pub fn center(id: &str, lat: f64, lon: f64) -> CenterRecord {
    CenterRecord {
        id: id.to_owned(),
        name: id.to_owned(),
        lat,
        lon,
        open_from: Some("06:00".to_owned()),
        open_to: Some("22:00".to_owned()),
    }
}

pub fn demand(center_id: &str) -> DemandRecord {
    DemandRecord {
        center_id: center_id.to_owned(),
        vol_l: 1.0,
        kg: 1.0,
        service_min: 0,
        tw_start: None,
        tw_end: None,
        cold_chain: false,
    }
}

pub fn vehicle(depot_id: &str) -> VehicleRecord {
    VehicleRecord {
        depot_id: depot_id.to_owned(),
        capacity_vol_l: 100.0,
        capacity_kg: 100.0,
        refrigerated: false,
        shift_start: "08:00".to_owned(),
        shift_end: "18:00".to_owned(),
    }
}

/// Provider answering every request with a uniform 1000 m table, or with a
/// fixed error.
pub struct UniformProvider {
    pub error: Option<RoutingError>,
    pub calls: Cell<usize>,
}

impl UniformProvider {
    pub fn ok() -> Self {
        Self {
            error: None,
            calls: Cell::new(0),
        }
    }

    pub fn failing(error: RoutingError) -> Self {
        Self {
            error: Some(error),
            calls: Cell::new(0),
        }
    }
}

impl MatrixProvider for UniformProvider {
    fn table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, RoutingError> {
        self.calls.set(self.calls.get() + 1);
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        let n = coordinates.len();
        let distances = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 1_000.0 }).collect())
            .collect();
        Ok(TravelTable {
            distances,
            durations: None,
        })
    }
}

/// Tries every assignment of stops to vehicles, visiting each vehicle's
/// stops in index order. Only suitable for a handful of stops.
pub struct ExhaustiveSolver;

impl RouteSolver for ExhaustiveSolver {
    fn solve(&self, model: &ConstraintModel, _time_budget: Duration) -> Option<Solution> {
        let stops = model.stop_count().saturating_sub(1);
        let vehicles = model.vehicle_count();
        let combinations = vehicles.checked_pow(u32::try_from(stops).ok()?)?;
        (0..combinations)
            .filter_map(|code| {
                let mut routes = vec![Vec::new(); vehicles];
                let mut rest = code;
                for stop in 1..=stops {
                    routes[rest % vehicles].push(stop);
                    rest /= vehicles;
                }
                Solution::from_routes(model, &routes)
            })
            .min_by_key(|solution| solution.objective().total())
    }
}
