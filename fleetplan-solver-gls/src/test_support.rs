//! Test-only model fixtures for `fleetplan-solver-gls`.
//!
//! The helpers in this module are available to unit tests, behavioural
//! tests and benchmarks. They are gated behind the `test-support` feature
//! (and `cfg(test)`).

use fleetplan_core::test_support::{center, demand, vehicle};
use fleetplan_core::{
    CenterRecord, ConstraintModel, DemandRecord, ModelParams, TravelMatrix, TravelTable,
    VehicleRecord, build,
};

/// Model from raw records and a distance-only matrix.
///
/// # Panics
///
/// Panics if the records or the matrix do not describe a valid model.
#[must_use]
#[expect(clippy::expect_used, reason = "fixtures are known to be valid")]
pub fn model_from(
    centers: &[CenterRecord],
    demands: &[DemandRecord],
    vehicles: &[VehicleRecord],
    distances: Vec<Vec<f64>>,
) -> ConstraintModel {
    let problem = build(centers, demands, vehicles).expect("valid fixture records");
    let size = problem.stops.len();
    let table = TravelTable {
        distances,
        durations: None,
    };
    let matrix = TravelMatrix::from_table(table, size).expect("valid fixture matrix");
    ConstraintModel::new(problem, matrix, ModelParams::default()).expect("valid fixture model")
}

fn metres(units: usize) -> f64 {
    units
        .checked_mul(1_000)
        .and_then(|value| u32::try_from(value).ok())
        .map_or(f64::MAX, f64::from)
}

/// Depot and `stops` one-litre stops spaced one kilometre apart on a line,
/// served by `vehicles` vehicles with room for every stop.
///
/// Stop `i` sits `i` kilometres from the depot, so the optimal plan drives
/// out and back once: `2 * stops` kilometres.
///
/// # Examples
/// ```
/// use fleetplan_solver_gls::test_support::line_model;
///
/// let model = line_model(3, 2);
/// assert_eq!(model.stop_count(), 4);
/// assert_eq!(model.arc_cost(1, 3), 2_000);
/// ```
#[must_use]
pub fn line_model(stops: usize, vehicles: usize) -> ConstraintModel {
    let ids: Vec<String> = (1..=stops).map(|index| format!("S{index}")).collect();
    let mut centers = vec![center("D", 0.0, 0.0)];
    centers.extend(
        ids.iter()
            .zip(1_u32..)
            .map(|(id, index)| center(id, 0.0, f64::from(index))),
    );
    let demands: Vec<DemandRecord> = ids.iter().map(|id| demand(id, 1.0, 1.0)).collect();
    let fleet = vec![vehicle("D", 1_000.0, 1_000.0); vehicles];
    let distances = (0..=stops)
        .map(|from| (0..=stops).map(|to| metres(from.abs_diff(to))).collect())
        .collect();
    model_from(&centers, &demands, &fleet, distances)
}

/// Depot plus one cold-chain stop too heavy for vehicle 0. Vehicle 1 is
/// large and refrigerated when `refrigerated` is set, otherwise large and
/// plain, leaving the stop without an eligible vehicle.
#[must_use]
pub fn cold_chain_model(refrigerated: bool) -> ConstraintModel {
    let centers = [center("D", 0.0, 0.0), center("C", 0.0, 0.01)];
    let demands = [DemandRecord {
        cold_chain: true,
        ..demand("C", 50.0, 50.0)
    }];
    let vehicles = [
        vehicle("D", 10.0, 10.0),
        VehicleRecord {
            refrigerated,
            ..vehicle("D", 100.0, 100.0)
        },
    ];
    model_from(
        &centers,
        &demands,
        &vehicles,
        vec![vec![0.0, 1_000.0], vec![1_000.0, 0.0]],
    )
}

/// Depot, a plain stop A one kilometre out and a cold-chain stop C five
/// kilometres out, each filling a whole vehicle.
///
/// Vehicle 0 is refrigerated and vehicle 1 is plain. A is the cheapest
/// first arc for vehicle 0, but the only feasible plan gives it C.
#[must_use]
pub fn refrigerated_swap_model() -> ConstraintModel {
    let centers = [
        center("D", 0.0, 0.0),
        center("A", 0.0, 0.009),
        center("C", 0.0, 0.045),
    ];
    let demands = [
        demand("A", 10.0, 10.0),
        DemandRecord {
            cold_chain: true,
            ..demand("C", 10.0, 10.0)
        },
    ];
    let vehicles = [
        VehicleRecord {
            refrigerated: true,
            ..vehicle("D", 10.0, 10.0)
        },
        vehicle("D", 10.0, 10.0),
    ];
    model_from(&centers, &demands, &vehicles, spur_distances())
}

/// Depot, a light stop A one kilometre out and a heavy stop B five
/// kilometres out. Only vehicle 0 can carry B; vehicle 1 only fits A.
#[must_use]
pub fn heavy_stop_model() -> ConstraintModel {
    let centers = [
        center("D", 0.0, 0.0),
        center("A", 0.0, 0.009),
        center("B", 0.0, 0.045),
    ];
    let demands = [demand("A", 10.0, 10.0), demand("B", 20.0, 20.0)];
    let vehicles = [vehicle("D", 20.0, 20.0), vehicle("D", 10.0, 10.0)];
    model_from(&centers, &demands, &vehicles, spur_distances())
}

fn spur_distances() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 1_000.0, 5_000.0],
        vec![1_000.0, 0.0, 4_000.0],
        vec![5_000.0, 4_000.0, 0.0],
    ]
}

/// Two clusters of two stops, east and north of the depot, and two
/// vehicles that each carry at most two stops.
///
/// Serving one cluster per vehicle costs about 42 km; mixing the clusters
/// costs about 67 km.
#[must_use]
pub fn crossing_model() -> ConstraintModel {
    let centers = [
        center("D", 0.0, 0.0),
        center("E1", 0.0, 0.1),
        center("E2", 0.01, 0.1),
        center("N1", 0.1, 0.0),
        center("N2", 0.1, 0.01),
    ];
    let demands: Vec<DemandRecord> = ["E1", "E2", "N1", "N2"]
        .iter()
        .map(|id| demand(id, 1.0, 1.0))
        .collect();
    let vehicles = vec![vehicle("D", 2.0, 2.0); 2];
    let distances = vec![
        vec![0.0, 10_000.0, 10_050.0, 10_000.0, 10_050.0],
        vec![10_000.0, 0.0, 1_000.0, 14_142.0, 13_454.0],
        vec![10_050.0, 1_000.0, 0.0, 13_454.0, 12_728.0],
        vec![10_000.0, 14_142.0, 13_454.0, 0.0, 1_000.0],
        vec![10_050.0, 13_454.0, 12_728.0, 1_000.0, 0.0],
    ];
    model_from(&centers, &demands, &vehicles, distances)
}

/// Depot, one stop with a 09:00 to 10:00 window reached by a 10 km / 20
/// minute drive, and one vehicle whose shift covers the window.
#[must_use]
pub fn windowed_model() -> ConstraintModel {
    let centers = [center("D", 0.0, 0.0), center("A", 0.0, 0.09)];
    let demands = [DemandRecord {
        tw_start: Some("09:00".to_owned()),
        tw_end: Some("10:00".to_owned()),
        ..demand("A", 1.0, 1.0)
    }];
    model_from(
        &centers,
        &demands,
        &[vehicle("D", 10.0, 10.0)],
        vec![vec![0.0, 10_000.0], vec![10_000.0, 0.0]],
    )
}

/// Two stops whose windows cannot both be met: A closes at 09:00 and B
/// opens at 17:00, a short drive apart, with a single vehicle.
///
/// The 6-hour slack cap forces either an early arrival at B or a late one
/// at A, so every plan carries a time-window penalty.
#[must_use]
pub fn conflicting_windows_model() -> ConstraintModel {
    let centers = [
        center("D", 0.0, 0.0),
        center("A", 0.0, 0.01),
        center("B", 0.01, 0.0),
    ];
    let demands = [
        DemandRecord {
            tw_start: Some("08:00".to_owned()),
            tw_end: Some("09:00".to_owned()),
            ..demand("A", 1.0, 1.0)
        },
        DemandRecord {
            tw_start: Some("17:00".to_owned()),
            tw_end: Some("18:00".to_owned()),
            ..demand("B", 1.0, 1.0)
        },
    ];
    model_from(
        &centers,
        &demands,
        &[vehicle("D", 10.0, 10.0)],
        vec![
            vec![0.0, 1_000.0, 1_000.0],
            vec![1_000.0, 0.0, 1_000.0],
            vec![1_000.0, 1_000.0, 0.0],
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn line_model_spaces_stops_evenly() {
        let model = line_model(4, 1);
        assert_eq!(model.stop_count(), 5);
        assert_eq!(model.arc_cost(0, 4), 4_000);
        assert_eq!(model.arc_cost(3, 1), 2_000);
    }

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    fn cold_chain_eligibility(#[case] refrigerated: bool, #[case] eligible: bool) {
        let model = cold_chain_model(refrigerated);
        assert!(!model.is_eligible(1, 0));
        assert_eq!(model.is_eligible(1, 1), eligible);
    }

    #[rstest]
    fn crossing_model_limits_each_vehicle_to_two_stops() {
        let model = crossing_model();
        assert!(model.evaluate_route(0, &[1, 2, 3]).is_none());
        assert!(model.evaluate_route(0, &[1, 2]).is_some());
    }
}
