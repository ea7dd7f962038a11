//! Planning pipeline and its output records.
//!
//! [`Planner`] drives one run end to end: build the problem, fetch the
//! matrix, derive the constraint model, search, extract routes. The result
//! is a [`Plan`] of per-vehicle visit sequences and per-leg figures, or
//! `None` when the solver finds no feasible assignment.

use std::time::{Duration, Instant};

use geo::Coord;
use log::{info, warn};

use crate::clock::format_clock;
use crate::error::PlanError;
use crate::matrix::{MatrixProvider, TravelMatrix, TravelTable};
use crate::model::{ConstraintModel, ModelParams};
use crate::problem::build;
use crate::records::PlanInput;
use crate::route::{VehicleRoute, extract};
use crate::solver::{Objective, RouteSolver};

/// Default search budget.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(20);

/// One visit in a vehicle's sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanEntry {
    /// Vehicle position in the input.
    pub vehicle: usize,
    /// Position in the vehicle's sequence, the opening depot being 0.
    pub seq: usize,
    /// Stop index, 0 for the depot.
    pub stop_index: usize,
    /// Center identifier.
    pub stop_id: String,
    /// Center display name.
    pub name: String,
    /// Longitude.
    pub lon: f64,
    /// Latitude.
    pub lat: f64,
    /// Scheduled time in seconds from midnight.
    pub arrival_seconds: u32,
    /// Scheduled time as `HH:MM`.
    pub arrival: String,
}

/// One arc driven by a vehicle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Vehicle position in the input.
    pub vehicle: usize,
    /// Origin stop index.
    pub from_index: usize,
    /// Destination stop index.
    pub to_index: usize,
    /// Origin center identifier.
    pub from_id: String,
    /// Destination center identifier.
    pub to_id: String,
    /// Origin display name.
    pub from_name: String,
    /// Destination display name.
    pub to_name: String,
    /// Origin coordinate.
    pub from_location: Coord<f64>,
    /// Destination coordinate.
    pub to_location: Coord<f64>,
    /// Distance in metres.
    pub meters: f64,
    /// Travel time in seconds.
    pub seconds: f64,
    /// Encoded polyline, when decorated.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub geometry: Option<String>,
}

/// Run statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostics {
    /// Wall-clock time spent in the solver.
    pub solve_time: Duration,
    /// Number of stops, depot included.
    pub stops: usize,
    /// Whether durations were estimated from distance.
    pub durations_estimated: bool,
}

/// Solved plan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plan {
    /// One route per vehicle, in vehicle order.
    pub routes: Vec<VehicleRoute>,
    /// Visit rows for every vehicle, depot-only routes included.
    pub entries: Vec<PlanEntry>,
    /// Leg rows for vehicles that leave the depot.
    pub legs: Vec<Leg>,
    /// Objective of the returned solution.
    pub objective: Objective,
    /// Run statistics.
    pub diagnostics: Diagnostics,
}

impl Plan {
    /// Assemble entry and leg rows for `routes`.
    #[must_use]
    pub fn new(
        model: &ConstraintModel,
        routes: Vec<VehicleRoute>,
        objective: Objective,
        diagnostics: Diagnostics,
    ) -> Self {
        let stops = &model.problem().stops;
        let mut entries = Vec::new();
        let mut legs = Vec::new();
        for route in &routes {
            for (seq, (&stop_index, &time)) in route.stops.iter().zip(&route.times).enumerate() {
                let Some(stop) = stops.get(stop_index) else {
                    continue;
                };
                entries.push(PlanEntry {
                    vehicle: route.vehicle_id,
                    seq,
                    stop_index,
                    stop_id: stop.id.clone(),
                    name: stop.name.clone(),
                    lon: stop.location.x,
                    lat: stop.location.y,
                    arrival_seconds: time,
                    arrival: format_clock(time),
                });
            }
            if !route.is_used() {
                continue;
            }
            for pair in route.stops.windows(2) {
                let [from_index, to_index] = *pair else {
                    continue;
                };
                let (Some(from), Some(to)) = (stops.get(from_index), stops.get(to_index)) else {
                    continue;
                };
                legs.push(Leg {
                    vehicle: route.vehicle_id,
                    from_index,
                    to_index,
                    from_id: from.id.clone(),
                    to_id: to.id.clone(),
                    from_name: from.name.clone(),
                    to_name: to.name.clone(),
                    from_location: from.location,
                    to_location: to.location,
                    meters: model.matrix().distance(from_index, to_index),
                    seconds: model.matrix().duration(from_index, to_index),
                    geometry: None,
                });
            }
        }
        Self {
            routes,
            entries,
            legs,
            objective,
            diagnostics,
        }
    }

    /// Routes of vehicles that leave the depot.
    pub fn used_routes(&self) -> impl Iterator<Item = &VehicleRoute> {
        self.routes.iter().filter(|route| route.is_used())
    }
}

/// Knobs for a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// Search budget handed to the solver.
    pub time_limit: Duration,
    /// Time dimension coefficients.
    pub params: ModelParams,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            params: ModelParams::default(),
        }
    }
}

/// Planning pipeline over a matrix provider and a solver.
///
/// # Examples
/// ```
/// use fleetplan_core::{
///     CenterRecord, HaversineMatrixProvider, PlanInput, Planner, RouteSolver, Solution,
///     ConstraintModel, VehicleRecord,
/// };
/// use std::time::Duration;
///
/// struct Idle;
///
/// impl RouteSolver for Idle {
///     fn solve(&self, model: &ConstraintModel, _: Duration) -> Option<Solution> {
///         Solution::from_routes(model, &[vec![]])
///     }
/// }
///
/// let input = PlanInput {
///     centers: vec![CenterRecord { id: "D".into(), name: "Depot".into(), lat: 0.0,
///                                  lon: 0.0, open_from: None, open_to: None }],
///     demands: vec![],
///     vehicles: vec![VehicleRecord { depot_id: "D".into(), capacity_vol_l: 1.0,
///                                    capacity_kg: 1.0, refrigerated: false,
///                                    shift_start: "08:00".into(), shift_end: "18:00".into() }],
/// };
/// let plan = Planner::new(HaversineMatrixProvider, Idle).plan(&input)?.expect("feasible");
/// assert_eq!(plan.routes[0].stops, vec![0, 0]);
/// # Ok::<(), fleetplan_core::PlanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Planner<P, S> {
    provider: P,
    solver: S,
    options: PlanOptions,
}

impl<P, S> Planner<P, S>
where
    P: MatrixProvider,
    S: RouteSolver,
{
    /// Planner with default options.
    pub fn new(provider: P, solver: S) -> Self {
        Self::with_options(provider, solver, PlanOptions::default())
    }

    /// Planner with explicit options.
    pub const fn with_options(provider: P, solver: S, options: PlanOptions) -> Self {
        Self {
            provider,
            solver,
            options,
        }
    }

    /// Options in effect.
    pub const fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Plan deliveries for `input`.
    ///
    /// Returns `Ok(None)` when no assignment satisfies the hard constraints
    /// within the time limit.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Config`] for invalid records, before the matrix
    /// provider is called; [`PlanError::MatrixUnavailable`] when the provider
    /// fails (a timeout is retried once) or returns an unusable table.
    pub fn plan(&self, input: &PlanInput) -> Result<Option<Plan>, PlanError> {
        let problem = build(&input.centers, &input.demands, &input.vehicles)?;
        info!(
            "planning {} stops with {} vehicles",
            problem.stops.len().saturating_sub(1),
            problem.vehicles.len()
        );

        let table = self.fetch_table(&problem.coordinates())?;
        let matrix = TravelMatrix::from_table(table, problem.stops.len())
            .map_err(PlanError::MatrixUnavailable)?;
        if matrix.durations_estimated() {
            info!("matrix has no durations; estimating at 30 km/h");
        }
        let durations_estimated = matrix.durations_estimated();

        let model = ConstraintModel::new(problem, matrix, self.options.params)?;
        let started = Instant::now();
        let Some(solution) = self.solver.solve(&model, self.options.time_limit) else {
            info!("no solution found within {:?}", self.options.time_limit);
            return Ok(None);
        };
        let diagnostics = Diagnostics {
            solve_time: started.elapsed(),
            stops: model.stop_count(),
            durations_estimated,
        };
        let objective = solution.objective();
        info!(
            "solved: distance {} m, penalty {}",
            objective.distance, objective.penalty
        );

        let routes = extract(&solution, &model);
        Ok(Some(Plan::new(&model, routes, objective, diagnostics)))
    }

    fn fetch_table(&self, coordinates: &[Coord<f64>]) -> Result<TravelTable, PlanError> {
        match self.provider.table(coordinates) {
            Ok(table) => Ok(table),
            Err(err) if err.is_retryable() => {
                warn!("matrix request failed: {err}; retrying once");
                self.provider
                    .table(coordinates)
                    .map_err(PlanError::MatrixUnavailable)
            }
            Err(err) => Err(PlanError::MatrixUnavailable(err)),
        }
    }
}
