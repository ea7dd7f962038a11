//! Raw input records as produced by the loading layer.
//!
//! These mirror the columns of the center, demand and vehicle tables. They
//! are deliberately loose (clock strings, optional bounds); the
//! [`problem`](crate::problem) module validates and normalises them.

/// A physical site: the depot or a delivery destination.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CenterRecord {
    /// Stable identifier referenced by demands and vehicles.
    pub id: String,
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// WGS84 latitude.
    pub lat: f64,
    /// WGS84 longitude.
    pub lon: f64,
    /// Opening time as `HH:MM`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub open_from: Option<String>,
    /// Closing time as `HH:MM`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub open_to: Option<String>,
}

/// A delivery request against one center.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DemandRecord {
    /// Identifier of the receiving center.
    pub center_id: String,
    /// Volume in litres.
    pub vol_l: f64,
    /// Weight in kilograms.
    pub kg: f64,
    /// On-site service time in minutes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub service_min: u32,
    /// Earliest delivery time as `HH:MM`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tw_start: Option<String>,
    /// Latest delivery time as `HH:MM`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tw_end: Option<String>,
    /// Whether the load must travel refrigerated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cold_chain: bool,
}

/// One vehicle of the fleet.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleRecord {
    /// Center the vehicle departs from and returns to.
    pub depot_id: String,
    /// Volume capacity in litres.
    pub capacity_vol_l: f64,
    /// Weight capacity in kilograms.
    pub capacity_kg: f64,
    /// Whether the vehicle can carry cold-chain loads.
    #[cfg_attr(feature = "serde", serde(default))]
    pub refrigerated: bool,
    /// Shift start as `HH:MM`.
    pub shift_start: String,
    /// Shift end as `HH:MM`.
    pub shift_end: String,
}

/// The full set of records for one planning run.
///
/// # Examples
/// ```
/// use fleetplan_core::PlanInput;
///
/// let input = PlanInput::default();
/// assert!(input.demands.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanInput {
    /// Depot and destination sites.
    #[cfg_attr(feature = "serde", serde(default))]
    pub centers: Vec<CenterRecord>,
    /// Delivery requests.
    #[cfg_attr(feature = "serde", serde(default))]
    pub demands: Vec<DemandRecord>,
    /// Available vehicles.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicles: Vec<VehicleRecord>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn deserialises_minimal_records() {
        let json = r#"{
            "centers": [
                {"id": "D", "name": "Depot", "lat": 40.4, "lon": -3.7,
                 "open_from": "07:00", "open_to": "20:00"},
                {"id": "C1", "lat": 40.5, "lon": -3.6}
            ],
            "demands": [
                {"center_id": "C1", "vol_l": 120.5, "kg": 80.0, "service_min": 15,
                 "tw_start": "09:00", "tw_end": "11:00", "cold_chain": true}
            ],
            "vehicles": [
                {"depot_id": "D", "capacity_vol_l": 1000.0, "capacity_kg": 800.0,
                 "refrigerated": true, "shift_start": "07:00", "shift_end": "19:00"}
            ]
        }"#;

        let input: PlanInput = serde_json::from_str(json).expect("input should parse");

        assert_eq!(input.centers.len(), 2);
        let destination = input.centers.get(1).expect("second center");
        assert!(destination.name.is_empty());
        assert!(destination.open_from.is_none());
        let demand = input.demands.first().expect("one demand");
        assert!(demand.cold_chain);
        assert_eq!(demand.tw_end.as_deref(), Some("11:00"));
        assert!(input.vehicles.first().is_some_and(|v| v.refrigerated));
    }

    #[rstest]
    fn missing_flags_default_to_false() {
        let json = r#"{"center_id": "C1", "vol_l": 1.0, "kg": 1.0}"#;
        let demand: DemandRecord = serde_json::from_str(json).expect("demand should parse");
        assert!(!demand.cold_chain);
        assert_eq!(demand.service_min, 0);
        assert!(demand.tw_start.is_none());
    }
}
