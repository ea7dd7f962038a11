//! Route Extractor: per-vehicle stop sequences from a solved assignment.

use log::warn;

use crate::model::ConstraintModel;
use crate::solver::Solution;

/// Ordered visits of one vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRoute {
    /// Position of the vehicle in the input.
    pub vehicle_id: usize,
    /// Stop indices in visit order, opening and closing with the depot.
    pub stops: Vec<usize>,
    /// Sum of arc costs traversed by this vehicle, in metres.
    pub total_distance_meters: i64,
    /// Time at each entry of `stops`, in seconds from midnight.
    pub times: Vec<u32>,
}

impl VehicleRoute {
    /// Whether the vehicle leaves the depot at all.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.stops.len() > 2
    }
}

/// Walk each vehicle's successor chain from its start index to its end.
///
/// An unused vehicle yields `[0, 0]` with zero distance. A chain that does
/// not reach the end within the index count is cut short and logged.
#[must_use]
pub fn extract(solution: &Solution, model: &ConstraintModel) -> Vec<VehicleRoute> {
    let manager = model.manager();
    (0..manager.vehicle_count())
        .filter_map(|vehicle| {
            let start = manager.start(vehicle)?;
            let end = manager.end(vehicle)?;
            let mut stops = Vec::new();
            let mut times = Vec::new();
            let mut total_distance_meters = 0_i64;
            let mut index = start;
            for _ in 0..=manager.index_count() {
                let stop = manager.stop_of(index)?;
                stops.push(stop);
                times.push(solution.time(index).unwrap_or(0));
                if index == end {
                    break;
                }
                let Some(next) = solution.next(index) else {
                    warn!("vehicle {vehicle}: chain stops at index {index}");
                    break;
                };
                if !(index == start && next == end) {
                    total_distance_meters += model.arc_cost(stop, manager.stop_of(next)?);
                }
                index = next;
            }
            if index != end {
                warn!("vehicle {vehicle}: route does not return to the depot");
            }
            Some(VehicleRoute {
                vehicle_id: vehicle,
                stops,
                total_distance_meters,
                times,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::two_stop_model;
    use rstest::rstest;

    #[rstest]
    fn routes_open_and_close_at_the_depot() {
        let model = two_stop_model();
        let solution = Solution::from_routes(&model, &[vec![2, 1], vec![]]).expect("feasible");

        let routes = extract(&solution, &model);

        assert_eq!(routes.len(), 2);
        let used = routes.first().expect("vehicle 0");
        assert_eq!(used.stops, vec![0, 2, 1, 0]);
        assert_eq!(used.total_distance_meters, model.route_distance(&[2, 1]));
        assert_eq!(used.times.len(), 4);
        assert!(used.is_used());
    }

    #[rstest]
    fn unused_vehicle_is_depot_only_with_zero_distance() {
        let model = two_stop_model();
        let solution = Solution::from_routes(&model, &[vec![1, 2], vec![]]).expect("feasible");

        let idle = extract(&solution, &model).pop().expect("vehicle 1");

        assert_eq!(idle.vehicle_id, 1);
        assert_eq!(idle.stops, vec![0, 0]);
        assert_eq!(idle.total_distance_meters, 0);
        assert!(!idle.is_used());
    }

    #[rstest]
    fn distances_are_per_vehicle() {
        let model = two_stop_model();
        let solution = Solution::from_routes(&model, &[vec![1], vec![2]]).expect("feasible");

        let routes = extract(&solution, &model);
        let total: i64 = routes.iter().map(|route| route.total_distance_meters).sum();

        assert_eq!(total, solution.objective().distance);
        assert!(routes.iter().all(|route| route.stops.first() == Some(&0)));
        assert!(routes.iter().all(|route| route.stops.last() == Some(&0)));
    }
}
