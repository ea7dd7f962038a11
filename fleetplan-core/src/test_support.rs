//! Fixture builders and deterministic test doubles shared by unit and
//! behaviour tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use geo::Coord;

use crate::{
    CenterRecord, ConstraintModel, DemandRecord, MatrixProvider, ModelParams, RouteSolver,
    RoutingError, Solution, TravelMatrix, TravelTable, VehicleRecord, build,
};

/// Center open from 06:00 to 22:00 named after its id.
#[must_use]
pub fn center(id: &str, lat: f64, lon: f64) -> CenterRecord {
    CenterRecord {
        id: id.to_owned(),
        name: format!("Center {id}"),
        lat,
        lon,
        open_from: Some("06:00".to_owned()),
        open_to: Some("22:00".to_owned()),
    }
}

/// Demand without a window, service time or cold-chain requirement.
#[must_use]
pub fn demand(center_id: &str, vol_l: f64, kg: f64) -> DemandRecord {
    DemandRecord {
        center_id: center_id.to_owned(),
        vol_l,
        kg,
        service_min: 0,
        tw_start: None,
        tw_end: None,
        cold_chain: false,
    }
}

/// One-litre, one-kilogram demand with the given `HH:MM` window.
#[must_use]
pub fn timed_demand(center_id: &str, start: &str, end: &str) -> DemandRecord {
    DemandRecord {
        tw_start: Some(start.to_owned()),
        tw_end: Some(end.to_owned()),
        ..demand(center_id, 1.0, 1.0)
    }
}

/// Non-refrigerated vehicle working 08:00 to 18:00.
#[must_use]
pub fn vehicle(depot_id: &str, capacity_vol_l: f64, capacity_kg: f64) -> VehicleRecord {
    VehicleRecord {
        depot_id: depot_id.to_owned(),
        capacity_vol_l,
        capacity_kg,
        refrigerated: false,
        shift_start: "08:00".to_owned(),
        shift_end: "18:00".to_owned(),
    }
}

/// Distance-only table from literal rows.
#[must_use]
pub fn table(rows: &[&[f64]]) -> TravelTable {
    TravelTable {
        distances: rows.iter().map(|row| row.to_vec()).collect(),
        durations: None,
    }
}

/// Travel matrix from literal distance rows, durations estimated.
///
/// # Panics
///
/// Panics when `rows` is not square.
#[must_use]
pub fn square_matrix(rows: &[&[f64]]) -> TravelMatrix {
    TravelMatrix::from_table(table(rows), rows.len()).expect("square matrix")
}

/// Depot plus one stop with a 09:00 to 10:00 window, one vehicle.
///
/// # Panics
///
/// Panics if the fixture records fail validation.
#[must_use]
pub fn single_stop_model() -> ConstraintModel {
    let centers = [center("D", 0.0, 0.0), center("A", 0.0, 0.01)];
    let problem = build(
        &centers,
        &[timed_demand("A", "09:00", "10:00")],
        &[vehicle("D", 10.0, 10.0)],
    )
    .expect("valid fixture");
    let matrix = square_matrix(&[&[0.0, 1_000.0], &[1_000.0, 0.0]]);
    ConstraintModel::new(problem, matrix, ModelParams::default()).expect("valid model")
}

/// Depot plus two untimed stops, two identical vehicles.
///
/// # Panics
///
/// Panics if the fixture records fail validation.
#[must_use]
pub fn two_stop_model() -> ConstraintModel {
    let centers = [
        center("D", 0.0, 0.0),
        center("A", 0.0, 0.01),
        center("B", 0.01, 0.0),
    ];
    let problem = build(
        &centers,
        &[demand("A", 1.0, 1.0), demand("B", 1.0, 1.0)],
        &[vehicle("D", 10.0, 10.0), vehicle("D", 10.0, 10.0)],
    )
    .expect("valid fixture");
    let matrix = square_matrix(&[
        &[0.0, 1_000.0, 1_200.0],
        &[1_000.0, 0.0, 800.0],
        &[1_200.0, 800.0, 0.0],
    ]);
    ConstraintModel::new(problem, matrix, ModelParams::default()).expect("valid model")
}

/// `MatrixProvider` replaying canned responses.
///
/// The n-th call returns the n-th response; once exhausted, the last
/// response repeats.
#[derive(Debug, Default)]
pub struct StubMatrixProvider {
    responses: Vec<Result<TravelTable, RoutingError>>,
    calls: AtomicUsize,
}

impl StubMatrixProvider {
    /// Always return `table`.
    #[must_use]
    pub fn new(table: TravelTable) -> Self {
        Self::with_responses(vec![Ok(table)])
    }

    /// Always fail with `error`.
    #[must_use]
    pub fn failing(error: RoutingError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    /// Replay `responses` in order.
    #[must_use]
    pub const fn with_responses(responses: Vec<Result<TravelTable, RoutingError>>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `table` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MatrixProvider for StubMatrixProvider {
    fn table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, RoutingError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if coordinates.is_empty() {
            return Err(RoutingError::EmptyInput);
        }
        self.responses
            .get(call)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or(Err(RoutingError::EmptyInput))
    }
}

/// `RouteSolver` returning a fixed assignment, or `None` if it is invalid
/// for the model.
#[derive(Debug, Clone, Default)]
pub struct FixedRoutesSolver {
    routes: Vec<Vec<usize>>,
}

impl FixedRoutesSolver {
    /// Solver answering with `routes`, one stop sequence per vehicle.
    #[must_use]
    pub const fn new(routes: Vec<Vec<usize>>) -> Self {
        Self { routes }
    }
}

impl RouteSolver for FixedRoutesSolver {
    fn solve(&self, model: &ConstraintModel, _time_budget: Duration) -> Option<Solution> {
        Solution::from_routes(model, &self.routes)
    }
}
