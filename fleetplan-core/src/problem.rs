//! Problem Builder: reduce raw records to a canonical stop list.
//!
//! Stop 0 is always the depot. Every other stop is a distinct demand
//! location in first-seen order of the demand records, carrying the summed
//! volume and weight, the longest service time and the intersection of all
//! windows registered there. Window inconsistencies are repaired, never
//! rejected; structural problems (unknown ids, bad quantities) fail fast.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use geo::Coord;
use log::warn;

use crate::clock::{
    DEMAND_WINDOW_FALLBACK, DEPOT_WINDOW_FALLBACK, TimeWindow, parse_clock, parse_optional_clock,
};
use crate::error::ConfigError;
use crate::records::{CenterRecord, DemandRecord, VehicleRecord};

/// A location visited at most once per plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Center identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Position with `x = longitude` and `y = latitude`.
    pub location: Coord<f64>,
    /// Total volume delivered here, in litres.
    pub volume: f64,
    /// Total weight delivered here, in kilograms.
    pub weight: f64,
    /// Service duration in seconds.
    pub service: u32,
    /// Delivery window (opening hours for the depot).
    pub window: TimeWindow,
    /// Whether any demand here requires refrigeration.
    pub cold_chain: bool,
}

impl Stop {
    fn from_center(center: &CenterRecord, window: TimeWindow) -> Self {
        Self {
            id: center.id.clone(),
            name: center.name.clone(),
            location: Coord {
                x: center.lon,
                y: center.lat,
            },
            volume: 0.0,
            weight: 0.0,
            service: 0,
            window,
            cold_chain: false,
        }
    }
}

/// Normalised vehicle attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSpec {
    /// Position of the vehicle in the input, used as its identifier.
    pub index: usize,
    /// Volume capacity in litres.
    pub capacity_volume: f64,
    /// Weight capacity in kilograms.
    pub capacity_weight: f64,
    /// Whether the vehicle can serve cold-chain stops.
    pub refrigerated: bool,
    /// Shift start in seconds from midnight.
    pub shift_start: u32,
    /// Shift end in seconds from midnight.
    pub shift_end: u32,
}

/// Earliest shift start and latest shift end across the fleet.
///
/// Used as a soft target for every route's start and end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetWindow {
    /// Earliest shift start.
    pub earliest_start: u32,
    /// Latest shift end.
    pub latest_end: u32,
}

/// Canonical planning problem produced by [`build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Stops with the depot at index 0.
    pub stops: Vec<Stop>,
    /// Vehicles in input order.
    pub vehicles: Vec<VehicleSpec>,
    /// Fleet-wide soft start/end targets.
    pub fleet_window: FleetWindow,
}

impl Problem {
    /// The depot stop.
    #[must_use]
    pub fn depot(&self) -> Option<&Stop> {
        self.stops.first()
    }

    /// Coordinates of all stops in stop order, as sent to the matrix provider.
    #[must_use]
    pub fn coordinates(&self) -> Vec<Coord<f64>> {
        self.stops.iter().map(|stop| stop.location).collect()
    }
}

/// Build the canonical problem from raw records.
///
/// # Errors
///
/// Returns [`ConfigError`] when there are no vehicles, the depot named by the
/// first vehicle is unknown, a demand references an unknown center or the
/// depot, a clock string is malformed, or a quantity is negative or not
/// finite.
///
/// # Examples
/// ```
/// use fleetplan_core::{CenterRecord, DemandRecord, VehicleRecord, build};
///
/// # fn main() -> Result<(), fleetplan_core::ConfigError> {
/// let centers = vec![
///     CenterRecord { id: "D".into(), name: "Depot".into(), lat: 0.0, lon: 0.0,
///                    open_from: Some("06:00".into()), open_to: Some("22:00".into()) },
///     CenterRecord { id: "A".into(), name: "Shop".into(), lat: 0.0, lon: 0.01,
///                    open_from: None, open_to: None },
/// ];
/// let demand = DemandRecord { center_id: "A".into(), vol_l: 10.0, kg: 5.0, service_min: 10,
///                             tw_start: Some("09:00".into()), tw_end: Some("10:00".into()),
///                             cold_chain: false };
/// let vehicle = VehicleRecord { depot_id: "D".into(), capacity_vol_l: 100.0, capacity_kg: 100.0,
///                               refrigerated: false, shift_start: "08:00".into(),
///                               shift_end: "18:00".into() };
/// let problem = build(&centers, &[demand.clone(), demand], &[vehicle])?;
/// assert_eq!(problem.stops.len(), 2);
/// assert_eq!(problem.stops[1].volume, 20.0);
/// assert_eq!(problem.stops[1].service, 600);
/// # Ok(())
/// # }
/// ```
pub fn build(
    centers: &[CenterRecord],
    demands: &[DemandRecord],
    vehicles: &[VehicleRecord],
) -> Result<Problem, ConfigError> {
    let first_vehicle = vehicles.first().ok_or(ConfigError::NoVehicles)?;
    let depot_id = first_vehicle.depot_id.as_str();
    for (index, vehicle) in vehicles.iter().enumerate().skip(1) {
        if vehicle.depot_id != depot_id {
            warn!(
                "vehicle #{index} names depot {:?}; all vehicles start at {depot_id:?}",
                vehicle.depot_id
            );
        }
    }

    let centers_by_id = index_centers(centers);
    let depot_center = centers_by_id
        .get(depot_id)
        .copied()
        .ok_or_else(|| ConfigError::MissingDepot {
            depot_id: depot_id.to_owned(),
        })?;

    let open_from = clock_field("open_from", depot_center.open_from.as_deref())?;
    let open_to = clock_field("open_to", depot_center.open_to.as_deref())?;
    if TimeWindow::needs_repair(open_from, open_to) {
        warn!("depot {depot_id:?} has missing or inverted opening hours; repairing");
    }
    let depot_window = TimeWindow::repaired(open_from, open_to, DEPOT_WINDOW_FALLBACK);

    let mut accumulator = StopAccumulator::new(Stop::from_center(depot_center, depot_window));
    for (index, demand) in demands.iter().enumerate() {
        if demand.center_id == depot_id {
            return Err(ConfigError::DemandAtDepot {
                demand: index,
                center_id: demand.center_id.clone(),
            });
        }
        let center = centers_by_id
            .get(demand.center_id.as_str())
            .copied()
            .ok_or_else(|| ConfigError::UnknownLocation {
                demand: index,
                center_id: demand.center_id.clone(),
            })?;
        accumulator.add(center, demand)?;
    }

    let vehicles = vehicles
        .iter()
        .enumerate()
        .map(|(index, record)| vehicle_spec(index, record))
        .collect::<Result<Vec<_>, _>>()?;
    let fleet_window = fleet_window(&vehicles, depot_window);

    Ok(Problem {
        stops: accumulator.finish(),
        vehicles,
        fleet_window,
    })
}

fn index_centers(centers: &[CenterRecord]) -> HashMap<&str, &CenterRecord> {
    let mut by_id = HashMap::with_capacity(centers.len());
    for center in centers {
        match by_id.entry(center.id.as_str()) {
            Entry::Vacant(slot) => {
                slot.insert(center);
            }
            Entry::Occupied(_) => {
                warn!("duplicate center {:?} ignored", center.id);
            }
        }
    }
    by_id
}

fn clock_field(field: &'static str, value: Option<&str>) -> Result<Option<u32>, ConfigError> {
    parse_optional_clock(value).map_err(|source| ConfigError::InvalidClock { field, source })
}

fn quantity(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidQuantity { field, value })
    }
}

/// Stops under construction, with per-stop windows still open.
struct StopAccumulator<'a> {
    stops: Vec<Stop>,
    windows: Vec<Option<TimeWindow>>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> StopAccumulator<'a> {
    fn new(depot: Stop) -> Self {
        let window = depot.window;
        Self {
            stops: vec![depot],
            windows: vec![Some(window)],
            positions: HashMap::new(),
        }
    }

    fn position(&mut self, center: &'a CenterRecord) -> usize {
        let next = self.stops.len();
        let position = *self.positions.entry(center.id.as_str()).or_insert(next);
        if position == next {
            self.stops
                .push(Stop::from_center(center, TimeWindow::FULL_DAY));
            self.windows.push(None);
        }
        position
    }

    fn add(&mut self, center: &'a CenterRecord, demand: &DemandRecord) -> Result<(), ConfigError> {
        let volume = quantity("vol_l", demand.vol_l)?;
        let weight = quantity("kg", demand.kg)?;
        let start = clock_field("tw_start", demand.tw_start.as_deref())?;
        let end = clock_field("tw_end", demand.tw_end.as_deref())?;
        if TimeWindow::needs_repair(start, end) {
            warn!(
                "demand at {:?} has missing or inverted window; repairing",
                center.id
            );
        }
        let requested = TimeWindow::repaired(start, end, DEMAND_WINDOW_FALLBACK);

        let position = self.position(center);
        let (Some(stop), Some(window)) = (
            self.stops.get_mut(position),
            self.windows.get_mut(position),
        ) else {
            return Ok(());
        };
        stop.volume += volume;
        stop.weight += weight;
        stop.service = stop.service.max(demand.service_min.saturating_mul(60));
        stop.cold_chain |= demand.cold_chain;
        // A stop still open all day has no window yet and takes the new one whole.
        *window = Some(match *window {
            None => requested,
            Some(current) if current == TimeWindow::FULL_DAY => requested,
            Some(current) => {
                let (merged, conflicted) = current.intersect_or_repair(requested);
                if conflicted {
                    warn!(
                        "demand windows at {:?} do not overlap; using a two-hour slot",
                        center.id
                    );
                }
                merged
            }
        });
        Ok(())
    }

    fn finish(self) -> Vec<Stop> {
        self.stops
            .into_iter()
            .zip(self.windows)
            .map(|(mut stop, window)| {
                if let Some(window) = window {
                    stop.window = window;
                }
                stop
            })
            .collect()
    }
}

fn vehicle_spec(index: usize, record: &VehicleRecord) -> Result<VehicleSpec, ConfigError> {
    let shift_start = parse_clock(&record.shift_start).map_err(|source| {
        ConfigError::InvalidClock {
            field: "shift_start",
            source,
        }
    })?;
    let shift_end = parse_clock(&record.shift_end).map_err(|source| ConfigError::InvalidClock {
        field: "shift_end",
        source,
    })?;
    Ok(VehicleSpec {
        index,
        capacity_volume: quantity("capacity_vol_l", record.capacity_vol_l)?,
        capacity_weight: quantity("capacity_kg", record.capacity_kg)?,
        refrigerated: record.refrigerated,
        shift_start,
        shift_end,
    })
}

fn fleet_window(vehicles: &[VehicleSpec], depot_window: TimeWindow) -> FleetWindow {
    let earliest_start = vehicles
        .iter()
        .map(|vehicle| vehicle.shift_start)
        .min()
        .unwrap_or(depot_window.start);
    let latest_end = vehicles
        .iter()
        .map(|vehicle| vehicle.shift_end)
        .max()
        .unwrap_or(depot_window.end);
    FleetWindow {
        earliest_start,
        latest_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SECONDS_PER_HOUR;
    use crate::test_support::{center, demand, timed_demand, vehicle};
    use rstest::{fixture, rstest};

    #[fixture]
    fn centers() -> Vec<CenterRecord> {
        vec![
            center("D", 0.0, 0.0),
            center("A", 0.0, 0.01),
            center("B", 0.01, 0.0),
        ]
    }

    #[rstest]
    fn depot_is_first_and_demands_follow_first_seen_order(centers: Vec<CenterRecord>) {
        let demands = vec![demand("B", 1.0, 1.0), demand("A", 1.0, 1.0), demand("B", 1.0, 1.0)];
        let problem = build(&centers, &demands, &[vehicle("D", 10.0, 10.0)]).expect("valid input");

        let ids: Vec<&str> = problem.stops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["D", "B", "A"]);
    }

    #[rstest]
    fn demands_are_summed_and_service_takes_the_maximum(centers: Vec<CenterRecord>) {
        let mut first = demand("A", 10.5, 3.0);
        first.service_min = 5;
        let mut second = demand("A", 4.5, 2.0);
        second.service_min = 12;
        second.cold_chain = true;

        let problem =
            build(&centers, &[first, second], &[vehicle("D", 100.0, 100.0)]).expect("valid input");
        let stop = problem.stops.get(1).expect("one destination");

        assert!((stop.volume - 15.0).abs() < f64::EPSILON);
        assert!((stop.weight - 5.0).abs() < f64::EPSILON);
        assert_eq!(stop.service, 12 * 60);
        assert!(stop.cold_chain);
    }

    #[rstest]
    fn windows_are_intersected(centers: Vec<CenterRecord>) {
        let demands = vec![
            timed_demand("A", "08:00", "12:00"),
            timed_demand("A", "10:00", "14:00"),
        ];
        let problem = build(&centers, &demands, &[vehicle("D", 10.0, 10.0)]).expect("valid input");
        let stop = problem.stops.get(1).expect("one destination");
        assert_eq!(stop.window, TimeWindow::new(10 * SECONDS_PER_HOUR, 12 * SECONDS_PER_HOUR));
    }

    #[rstest]
    fn disjoint_windows_repair_to_two_hours_from_the_newer_start(centers: Vec<CenterRecord>) {
        let demands = vec![
            timed_demand("A", "08:00", "09:00"),
            timed_demand("A", "15:00", "16:00"),
        ];
        let problem = build(&centers, &demands, &[vehicle("D", 10.0, 10.0)]).expect("valid input");
        let stop = problem.stops.get(1).expect("one destination");
        assert_eq!(stop.window, TimeWindow::new(15 * SECONDS_PER_HOUR, 17 * SECONDS_PER_HOUR));
    }

    #[rstest]
    fn all_day_window_is_replaced_by_a_later_overnight_window(centers: Vec<CenterRecord>) {
        let demands = vec![demand("A", 1.0, 1.0), timed_demand("A", "22:00", "02:00")];
        let problem = build(&centers, &demands, &[vehicle("D", 10.0, 10.0)]).expect("valid input");
        let stop = problem.stops.get(1).expect("one destination");
        assert_eq!(stop.window, TimeWindow::new(22 * SECONDS_PER_HOUR, 26 * SECONDS_PER_HOUR));
    }

    #[rstest]
    fn inverted_window_is_repaired_to_four_hours(centers: Vec<CenterRecord>) {
        let demands = vec![timed_demand("A", "14:00", "09:00")];
        let problem = build(&centers, &demands, &[vehicle("D", 10.0, 10.0)]).expect("valid input");
        let stop = problem.stops.get(1).expect("one destination");
        assert_eq!(stop.window, TimeWindow::new(14 * SECONDS_PER_HOUR, 18 * SECONDS_PER_HOUR));
    }

    #[rstest]
    fn depot_window_uses_nine_hour_fallback() {
        let mut depot = center("D", 0.0, 0.0);
        depot.open_from = Some("20:00".into());
        depot.open_to = Some("06:00".into());
        let problem = build(&[depot], &[], &[vehicle("D", 1.0, 1.0)]).expect("valid input");
        let window = problem.depot().map(|stop| stop.window);
        assert_eq!(
            window,
            Some(TimeWindow::new(20 * SECONDS_PER_HOUR, 29 * SECONDS_PER_HOUR))
        );
    }

    #[rstest]
    fn fleet_window_spans_all_shifts(centers: Vec<CenterRecord>) {
        let mut early = vehicle("D", 1.0, 1.0);
        early.shift_start = "06:30".into();
        early.shift_end = "14:00".into();
        let mut late = vehicle("D", 1.0, 1.0);
        late.shift_start = "10:00".into();
        late.shift_end = "21:15".into();

        let problem = build(&centers, &[], &[early, late]).expect("valid input");

        assert_eq!(
            problem.fleet_window,
            FleetWindow {
                earliest_start: 23_400,
                latest_end: 76_500,
            }
        );
        assert_eq!(problem.stops.len(), 1);
    }

    #[rstest]
    fn missing_vehicles_is_a_config_error(centers: Vec<CenterRecord>) {
        let err = build(&centers, &[], &[]).expect_err("no vehicles");
        assert_eq!(err, ConfigError::NoVehicles);
    }

    #[rstest]
    fn unknown_depot_is_a_config_error(centers: Vec<CenterRecord>) {
        let err = build(&centers, &[], &[vehicle("X", 1.0, 1.0)]).expect_err("unknown depot");
        assert!(matches!(err, ConfigError::MissingDepot { depot_id } if depot_id == "X"));
    }

    #[rstest]
    fn unknown_demand_location_is_a_config_error(centers: Vec<CenterRecord>) {
        let demands = vec![demand("A", 1.0, 1.0), demand("Z", 1.0, 1.0)];
        let err = build(&centers, &demands, &[vehicle("D", 1.0, 1.0)]).expect_err("unknown");
        assert!(matches!(
            err,
            ConfigError::UnknownLocation { demand: 1, center_id } if center_id == "Z"
        ));
    }

    #[rstest]
    fn demand_at_depot_is_rejected(centers: Vec<CenterRecord>) {
        let err = build(&centers, &[demand("D", 1.0, 1.0)], &[vehicle("D", 1.0, 1.0)])
            .expect_err("depot demand");
        assert!(matches!(err, ConfigError::DemandAtDepot { demand: 0, .. }));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn invalid_quantities_are_rejected(centers: Vec<CenterRecord>, #[case] volume: f64) {
        let err = build(&centers, &[demand("A", volume, 1.0)], &[vehicle("D", 1.0, 1.0)])
            .expect_err("bad quantity");
        assert!(matches!(err, ConfigError::InvalidQuantity { field: "vol_l", .. }));
    }

    #[rstest]
    fn malformed_shift_is_rejected(centers: Vec<CenterRecord>) {
        let mut bad = vehicle("D", 1.0, 1.0);
        bad.shift_end = "late".into();
        let err = build(&centers, &[], &[bad]).expect_err("bad shift");
        assert!(matches!(
            err,
            ConfigError::InvalidClock {
                field: "shift_end",
                ..
            }
        ));
    }

    #[rstest]
    fn duplicate_centers_keep_the_first_definition() {
        let mut shadow = center("A", 9.0, 9.0);
        shadow.name = "Shadow".into();
        let centers = vec![center("D", 0.0, 0.0), center("A", 1.0, 2.0), shadow];
        let problem =
            build(&centers, &[demand("A", 1.0, 1.0)], &[vehicle("D", 1.0, 1.0)]).expect("valid");
        let stop = problem.stops.get(1).expect("one destination");
        assert_eq!(stop.location, Coord { x: 2.0, y: 1.0 });
    }
}
