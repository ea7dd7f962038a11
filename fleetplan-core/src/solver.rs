//! Solver capability and the solution it returns.

use std::time::Duration;

use crate::model::ConstraintModel;

/// Objective value of a solution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    /// Sum of arc costs in metres across all routes.
    pub distance: i64,
    /// Sum of soft time-window and shift penalties.
    pub penalty: i64,
}

impl Objective {
    /// Distance plus penalty.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.distance.saturating_add(self.penalty)
    }
}

/// Assignment of stops to vehicles in the search index space.
///
/// Every visit index and every vehicle start index has a successor; vehicle
/// end indices have none. Built from per-vehicle stop sequences through
/// [`Solution::from_routes`], which enforces all hard constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    next: Vec<Option<usize>>,
    times: Vec<Option<u32>>,
    objective: Objective,
}

impl Solution {
    /// Build a solution from one stop sequence per vehicle.
    ///
    /// Returns `None` unless there is exactly one sequence per vehicle, every
    /// non-depot stop is visited exactly once, and each sequence passes
    /// [`ConstraintModel::evaluate_route`].
    #[must_use]
    pub fn from_routes(model: &ConstraintModel, routes: &[Vec<usize>]) -> Option<Self> {
        let manager = model.manager();
        if routes.len() != manager.vehicle_count() {
            return None;
        }
        let mut next = vec![None; manager.index_count()];
        let mut times = vec![None; manager.index_count()];
        let mut seen = vec![false; manager.stop_count()];
        let mut objective = Objective::default();

        for (vehicle, stops) in routes.iter().enumerate() {
            let evaluation = model.evaluate_route(vehicle, stops)?;
            objective.distance = objective.distance.saturating_add(evaluation.distance);
            objective.penalty = objective.penalty.saturating_add(evaluation.penalty);

            let start = manager.start(vehicle)?;
            let end = manager.end(vehicle)?;
            *times.get_mut(start)? = Some(evaluation.schedule.start);
            *times.get_mut(end)? = Some(evaluation.schedule.end);

            let mut current = start;
            for (&stop, &arrival) in stops.iter().zip(&evaluation.schedule.arrivals) {
                let visited = seen.get_mut(stop)?;
                if *visited {
                    return None;
                }
                *visited = true;
                let index = manager.index_of_stop(stop)?;
                *next.get_mut(current)? = Some(index);
                *times.get_mut(index)? = Some(arrival);
                current = index;
            }
            *next.get_mut(current)? = Some(end);
        }

        if seen.iter().skip(1).all(|visited| *visited) {
            Some(Self {
                next,
                times,
                objective,
            })
        } else {
            None
        }
    }

    /// Successor of a search index.
    #[must_use]
    pub fn next(&self, index: usize) -> Option<usize> {
        self.next.get(index).copied().flatten()
    }

    /// Time assigned to a search index: departure, arrival or return.
    #[must_use]
    pub fn time(&self, index: usize) -> Option<u32> {
        self.times.get(index).copied().flatten()
    }

    /// Objective value.
    #[must_use]
    pub const fn objective(&self) -> Objective {
        self.objective
    }
}

/// Search a [`ConstraintModel`] for a low-cost solution.
///
/// Implementations return `None` when no assignment satisfying the hard
/// constraints was found within `time_budget`. That outcome is infeasibility,
/// not a fault. Solvers must be `Send + Sync` so a single instance can serve
/// independent models from several threads.
pub trait RouteSolver: Send + Sync {
    /// Solve `model` within `time_budget`.
    fn solve(&self, model: &ConstraintModel, time_budget: Duration) -> Option<Solution>;
}

impl<T: RouteSolver + ?Sized> RouteSolver for &T {
    fn solve(&self, model: &ConstraintModel, time_budget: Duration) -> Option<Solution> {
        (**self).solve(model, time_budget)
    }
}
