//! Constraint Model: costs, dimensions and eligibility over the stop graph.
//!
//! [`ConstraintModel`] is the narrow surface a [`RouteSolver`](crate::RouteSolver)
//! searches over. It owns the [`Problem`] and the validated [`TravelMatrix`]
//! and derives from them:
//!
//! - integer arc costs (rounded metres, identical for every vehicle);
//! - the time dimension, whose transits charge the service time of the arc's
//!   origin stop and whose windows are soft;
//! - volume and weight dimensions in tenths, demands rounded up and
//!   capacities rounded down;
//! - the hard cold-chain eligibility rule.

mod index;
mod schedule;

use thiserror::Error;

pub use index::IndexManager;
pub use schedule::Schedule;

use crate::clock::{SECONDS_PER_DAY, SECONDS_PER_HOUR, TimeWindow};
use crate::matrix::TravelMatrix;
use crate::problem::Problem;
use schedule::RouteTargets;

/// Scale applied to volumes and weights before integer comparison.
pub const CAPACITY_SCALE: f64 = 10.0;

/// Tunable coefficients of the time dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelParams {
    /// Penalty per second of soft-bound violation.
    pub penalty_per_second: i64,
    /// Maximum elapsed time of a route, in seconds.
    pub horizon: u32,
    /// Maximum waiting time on a single arc, in seconds.
    pub max_slack: u32,
    /// Latest admissible value of any time variable, in seconds.
    pub day_end: u32,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            penalty_per_second: 5,
            horizon: 14 * SECONDS_PER_HOUR,
            max_slack: 6 * SECONDS_PER_HOUR,
            day_end: SECONDS_PER_DAY,
        }
    }
}

/// Errors returned by [`ConstraintModel::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The problem has no depot.
    #[error("problem has no stops")]
    NoStops,
    /// The problem has no vehicles.
    #[error("problem has no vehicles")]
    NoVehicles,
    /// The matrix does not cover the stop list.
    #[error("matrix covers {actual} stops, expected {expected}")]
    MatrixSize {
        /// Number of stops in the problem.
        expected: usize,
        /// Number of stops covered by the matrix.
        actual: usize,
    },
}

/// Cost and timing of one vehicle's route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEvaluation {
    /// Sum of arc costs in metres.
    pub distance: i64,
    /// Soft window penalty.
    pub penalty: i64,
    /// Scaled volume carried.
    pub volume: i64,
    /// Scaled weight carried.
    pub weight: i64,
    /// Chosen arrival times.
    pub schedule: Schedule,
}

impl RouteEvaluation {
    /// Objective contribution: distance plus penalty.
    #[must_use]
    pub const fn cost(&self) -> i64 {
        self.distance.saturating_add(self.penalty)
    }
}

/// Solvable model derived from a [`Problem`] and its [`TravelMatrix`].
#[derive(Debug, Clone)]
pub struct ConstraintModel {
    problem: Problem,
    matrix: TravelMatrix,
    params: ModelParams,
    manager: IndexManager,
    volume_demand: Vec<i64>,
    weight_demand: Vec<i64>,
    volume_capacity: Vec<i64>,
    weight_capacity: Vec<i64>,
}

impl ConstraintModel {
    /// Derive the model.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError`] when the problem has no depot or no vehicles,
    /// or when the matrix size differs from the stop count.
    pub fn new(
        problem: Problem,
        matrix: TravelMatrix,
        params: ModelParams,
    ) -> Result<Self, ModelError> {
        if problem.stops.is_empty() {
            return Err(ModelError::NoStops);
        }
        if problem.vehicles.is_empty() {
            return Err(ModelError::NoVehicles);
        }
        if matrix.size() != problem.stops.len() {
            return Err(ModelError::MatrixSize {
                expected: problem.stops.len(),
                actual: matrix.size(),
            });
        }

        let manager = IndexManager::new(problem.stops.len(), problem.vehicles.len());
        let mut volume_demand: Vec<i64> = problem
            .stops
            .iter()
            .map(|stop| scale_up(stop.volume))
            .collect();
        let mut weight_demand: Vec<i64> = problem
            .stops
            .iter()
            .map(|stop| scale_up(stop.weight))
            .collect();
        if let (Some(volume), Some(weight)) = (volume_demand.first_mut(), weight_demand.first_mut())
        {
            *volume = 0;
            *weight = 0;
        }
        let volume_capacity = problem
            .vehicles
            .iter()
            .map(|vehicle| scale_down(vehicle.capacity_volume))
            .collect();
        let weight_capacity = problem
            .vehicles
            .iter()
            .map(|vehicle| scale_down(vehicle.capacity_weight))
            .collect();

        Ok(Self {
            problem,
            matrix,
            params,
            manager,
            volume_demand,
            weight_demand,
            volume_capacity,
            weight_capacity,
        })
    }

    /// The underlying problem.
    #[must_use]
    pub const fn problem(&self) -> &Problem {
        &self.problem
    }

    /// The validated travel matrix.
    #[must_use]
    pub const fn matrix(&self) -> &TravelMatrix {
        &self.matrix
    }

    /// Time dimension coefficients.
    #[must_use]
    pub const fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Search index layout.
    #[must_use]
    pub const fn manager(&self) -> &IndexManager {
        &self.manager
    }

    /// Number of stops, depot included.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.problem.stops.len()
    }

    /// Number of vehicles.
    #[must_use]
    pub fn vehicle_count(&self) -> usize {
        self.problem.vehicles.len()
    }

    /// Arc cost from stop `from` to stop `to`: the distance in whole metres.
    #[must_use]
    pub fn arc_cost(&self, from: usize, to: usize) -> i64 {
        round_to_i64(self.matrix.distance(from, to))
    }

    /// Time-dimension transit from `from` to `to`: rounded travel time plus
    /// the service time of `from` unless it is the depot.
    #[must_use]
    pub fn transit(&self, from: usize, to: usize) -> u32 {
        let travel = round_to_u32(self.matrix.duration(from, to));
        let service = if from == 0 {
            0
        } else {
            self.problem.stops.get(from).map_or(0, |stop| stop.service)
        };
        travel.saturating_add(service)
    }

    /// Scaled volume demand of `stop`; zero for the depot.
    #[must_use]
    pub fn volume_demand(&self, stop: usize) -> i64 {
        self.volume_demand.get(stop).copied().unwrap_or(0)
    }

    /// Scaled weight demand of `stop`; zero for the depot.
    #[must_use]
    pub fn weight_demand(&self, stop: usize) -> i64 {
        self.weight_demand.get(stop).copied().unwrap_or(0)
    }

    /// Scaled volume capacity of `vehicle`.
    #[must_use]
    pub fn volume_capacity(&self, vehicle: usize) -> i64 {
        self.volume_capacity.get(vehicle).copied().unwrap_or(0)
    }

    /// Scaled weight capacity of `vehicle`.
    #[must_use]
    pub fn weight_capacity(&self, vehicle: usize) -> i64 {
        self.weight_capacity.get(vehicle).copied().unwrap_or(0)
    }

    /// Whether `vehicle` may serve `stop`.
    ///
    /// A cold-chain stop is reserved for refrigerated vehicles. There is no
    /// penalty alternative.
    #[must_use]
    pub fn is_eligible(&self, stop: usize, vehicle: usize) -> bool {
        let Some(spec) = self.problem.vehicles.get(vehicle) else {
            return false;
        };
        self.problem
            .stops
            .get(stop)
            .is_some_and(|candidate| !candidate.cold_chain || spec.refrigerated)
    }

    /// Total arc cost of depot, `stops`, depot; zero for an empty route.
    #[must_use]
    pub fn route_distance(&self, stops: &[usize]) -> i64 {
        if stops.is_empty() {
            return 0;
        }
        self.closed_path(stops)
            .map(|(from, to)| self.arc_cost(from, to))
            .sum()
    }

    /// Evaluate `vehicle` serving `stops` in order.
    ///
    /// Returns `None` when a hard constraint fails: an unknown or depot stop,
    /// an ineligible stop, a capacity overflow or a route that cannot fit the
    /// time dimension.
    #[must_use]
    pub fn evaluate_route(&self, vehicle: usize, stops: &[usize]) -> Option<RouteEvaluation> {
        if vehicle >= self.vehicle_count() {
            return None;
        }
        let mut volume = 0_i64;
        let mut weight = 0_i64;
        let mut windows = Vec::with_capacity(stops.len());
        for &stop in stops {
            if stop == 0 || !self.is_eligible(stop, vehicle) {
                return None;
            }
            volume += self.volume_demand(stop);
            weight += self.weight_demand(stop);
            windows.push(self.problem.stops.get(stop)?.window);
        }
        if volume > self.volume_capacity(vehicle) || weight > self.weight_capacity(vehicle) {
            return None;
        }

        let transits: Vec<u32> = if stops.is_empty() {
            vec![0]
        } else {
            self.closed_path(stops)
                .map(|(from, to)| self.transit(from, to))
                .collect()
        };
        let schedule = schedule::schedule(&self.params, self.targets(), &transits, &windows)?;
        Some(RouteEvaluation {
            distance: self.route_distance(stops),
            penalty: schedule.penalty,
            volume,
            weight,
            schedule,
        })
    }

    fn targets(&self) -> RouteTargets {
        RouteTargets {
            fleet: self.problem.fleet_window,
            depot: self
                .problem
                .depot()
                .map_or(TimeWindow::FULL_DAY, |depot| depot.window),
        }
    }

    fn closed_path<'a>(&self, stops: &'a [usize]) -> impl Iterator<Item = (usize, usize)> + 'a {
        let path = std::iter::once(0)
            .chain(stops.iter().copied())
            .chain(std::iter::once(0));
        path.clone().zip(path.skip(1))
    }
}

fn scale_up(quantity: f64) -> i64 {
    float_to_i64((quantity * CAPACITY_SCALE).ceil())
}

fn scale_down(quantity: f64) -> i64 {
    float_to_i64((quantity * CAPACITY_SCALE).floor())
}

fn round_to_i64(value: f64) -> i64 {
    float_to_i64(value.round())
}

fn round_to_u32(value: f64) -> u32 {
    u32::try_from(round_to_i64(value).max(0)).unwrap_or(u32::MAX)
}

// Quantities are validated finite and non-negative; `as` saturates.
fn float_to_i64(value: f64) -> i64 {
    value as i64
}
