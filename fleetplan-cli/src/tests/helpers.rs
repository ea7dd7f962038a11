//! Test helpers for composing plan inputs and routing doubles.

use camino::{Utf8Path, Utf8PathBuf};
use fleetplan_core::test_support::{center, demand, vehicle};
use fleetplan_core::{
    DemandRecord, HaversineMatrixProvider, MatrixProvider, Overview, PlanInput, RouteGeometry,
    RouteGeometryProvider, RoutingError, VehicleRecord,
};
use geo::Coord;
use tempfile::TempDir;

use crate::CliError;
use crate::plan::{PlanConfig, RoutingBuilder};

/// Encoded polyline returned by [`FixedGeometry`].
pub(super) const FIXED_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC";

/// Temporary directory that lives as long as the value.
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &str) {
    fleetplan_fs::write_utf8(path, contents).expect("write fixture");
}

pub(super) fn write_input(path: &Utf8Path, input: &PlanInput) {
    let payload = serde_json::to_string_pretty(input).expect("serialise input");
    write_utf8(path, &payload);
}

/// Depot in central Madrid, three stops within a few kilometres and two
/// vans with room for everything.
pub(super) fn feasible_input() -> PlanInput {
    PlanInput {
        centers: vec![
            center("D", 40.4168, -3.7038),
            center("A", 40.4300, -3.7000),
            center("B", 40.4100, -3.6900),
            center("C", 40.4000, -3.7200),
        ],
        demands: vec![
            demand("A", 100.0, 50.0),
            DemandRecord {
                tw_start: Some("09:00".to_owned()),
                tw_end: Some("12:00".to_owned()),
                ..demand("B", 200.0, 80.0)
            },
            demand("C", 50.0, 20.0),
        ],
        vehicles: vec![vehicle("D", 1_000.0, 500.0), vehicle("D", 1_000.0, 500.0)],
    }
}

/// A cold-chain stop and a fleet without refrigeration.
pub(super) fn cold_chain_input() -> PlanInput {
    PlanInput {
        centers: vec![center("D", 40.4168, -3.7038), center("F", 40.4300, -3.7000)],
        demands: vec![DemandRecord {
            cold_chain: true,
            ..demand("F", 10.0, 10.0)
        }],
        vehicles: vec![VehicleRecord {
            refrigerated: false,
            ..vehicle("D", 1_000.0, 500.0)
        }],
    }
}

/// Geometry provider answering every leg with the same polyline.
pub(super) struct FixedGeometry;

impl RouteGeometryProvider for FixedGeometry {
    fn route(
        &self,
        coordinates: &[Coord<f64>],
        _overview: Overview,
    ) -> Result<Option<RouteGeometry>, RoutingError> {
        if coordinates.is_empty() {
            return Err(RoutingError::EmptyInput);
        }
        Ok(Some(RouteGeometry {
            distance: 1_234.0,
            duration: 321.0,
            geometry: FIXED_POLYLINE.to_owned(),
        }))
    }
}

/// Offline routing: great-circle matrix and [`FixedGeometry`].
pub(super) struct OfflineRouting;

impl RoutingBuilder for OfflineRouting {
    fn matrix_provider(&self, _config: &PlanConfig) -> Result<Box<dyn MatrixProvider>, CliError> {
        Ok(Box::new(HaversineMatrixProvider))
    }

    fn geometry_provider(
        &self,
        _config: &PlanConfig,
    ) -> Result<Box<dyn RouteGeometryProvider>, CliError> {
        Ok(Box::new(FixedGeometry))
    }
}
