//! Focused unit tests covering plan CLI configuration and input loading.

use super::helpers::{OfflineRouting, Workspace, feasible_input, write_input, write_utf8};
use super::*;
use crate::plan::{
    DefaultRoutingBuilder, PlanArgs, PlanConfig, PlanReport, RoutingBuilder,
    config_from_layers_for_test, load_plan_input, run_plan_with,
};
use camino::Utf8PathBuf;
use clap::Parser;
use fleetplan_core::haversine_distance;
use geo::Coord;
use rstest::rstest;
use std::time::Duration;

fn args_for(input_path: Utf8PathBuf) -> PlanArgs {
    PlanArgs {
        input_path: Some(input_path),
        ..PlanArgs::default()
    }
}

#[rstest]
fn converting_plan_without_input_errors() {
    let err = PlanConfig::try_from(PlanArgs::default()).expect_err("missing input should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_PLAN_INPUT);
            assert_eq!(env, ENV_PLAN_INPUT);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn plan_config_applies_defaults() {
    let config = PlanConfig::try_from(args_for(Utf8PathBuf::from("input.json")))
        .expect("config should build");

    assert_eq!(config.osrm.base_url, "http://localhost:5000");
    assert_eq!(config.osrm.profile, "driving");
    assert_eq!(config.osrm.timeout, Duration::from_secs(30));
    assert_eq!(config.time_limit, Duration::from_secs(20));
    assert_eq!(config.seed, 0);
    assert_eq!(config.penalty_per_second, 5);
    assert_eq!(config.output, None);
    assert!(!config.with_geometry);
    assert!(!config.offline);
}

#[rstest]
fn plan_config_honours_explicit_options() {
    let args = PlanArgs {
        osrm_base_url: Some("http://osrm.internal:5001".to_owned()),
        profile: Some("truck".to_owned()),
        time_limit_secs: Some(5),
        seed: Some(42),
        penalty_per_second: Some(9),
        timeout_secs: Some(3),
        with_geometry: Some(true),
        ..args_for(Utf8PathBuf::from("input.json"))
    };

    let config = PlanConfig::try_from(args).expect("config should build");

    assert_eq!(config.osrm.base_url, "http://osrm.internal:5001");
    assert_eq!(config.osrm.profile, "truck");
    assert_eq!(config.osrm.timeout, Duration::from_secs(3));
    assert_eq!(config.time_limit, Duration::from_secs(5));
    assert_eq!(config.seed, 42);
    assert_eq!(config.penalty_per_second, 9);
    assert!(config.with_geometry);
}

#[rstest]
fn geometry_requires_a_routing_service() {
    let args = PlanArgs {
        with_geometry: Some(true),
        offline: Some(true),
        ..args_for(Utf8PathBuf::from("input.json"))
    };

    let err = PlanConfig::try_from(args).expect_err("conflicting options");
    assert!(matches!(
        err,
        CliError::ConflictingOptions {
            first: ARG_PLAN_WITH_GEOMETRY,
            second: ARG_PLAN_OFFLINE,
        }
    ));
}

#[rstest]
fn validate_sources_reports_missing_input() {
    let workspace = Workspace::new();
    let config =
        PlanConfig::try_from(args_for(workspace.path("absent.json"))).expect("config builds");

    match config.validate_sources().expect_err("expected failure") {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_PLAN_INPUT),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let workspace = Workspace::new();
    let input_path = workspace.path("input.json");
    std::fs::create_dir(&input_path).expect("input directory");
    let config = PlanConfig::try_from(args_for(input_path.clone())).expect("config builds");

    match config.validate_sources().expect_err("expected failure") {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_PLAN_INPUT);
            assert_eq!(path, input_path);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn load_plan_input_decodes_json() {
    let workspace = Workspace::new();
    let input_path = workspace.path("input.json");
    write_input(&input_path, &feasible_input());

    let decoded = load_plan_input(&input_path).expect("input should decode");
    assert_eq!(decoded, feasible_input());
}

#[rstest]
fn load_plan_input_accepts_sparse_records() {
    let workspace = Workspace::new();
    let input_path = workspace.path("input.json");
    write_utf8(
        &input_path,
        r#"{
            "centers": [{"id": "D", "lat": 40.4, "lon": -3.7}],
            "vehicles": [{"depot_id": "D", "capacity_vol_l": 10, "capacity_kg": 10,
                          "shift_start": "08:00", "shift_end": "18:00"}]
        }"#,
    );

    let decoded = load_plan_input(&input_path).expect("input should decode");
    assert!(decoded.demands.is_empty());
    assert_eq!(decoded.centers[0].open_from, None);
}

#[rstest]
fn load_plan_input_rejects_invalid_json() {
    let workspace = Workspace::new();
    let input_path = workspace.path("input.json");
    write_utf8(&input_path, "{ not valid json");

    match load_plan_input(&input_path).expect_err("invalid json should error") {
        CliError::ParsePlanInput { path, .. } => assert_eq!(path, input_path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_plan_input_io_error_returns_read_error() {
    let workspace = Workspace::new();
    let input_path = workspace.path("input.json");

    match load_plan_input(&input_path).expect_err("missing input should error") {
        CliError::ReadPlanInput { path, .. } => assert_eq!(path, input_path),
        other => panic!("expected ReadPlanInput, found {other:?}"),
    }
}

#[rstest]
fn offline_builder_estimates_great_circle_distances() {
    let config = PlanConfig::try_from(PlanArgs {
        offline: Some(true),
        ..args_for(Utf8PathBuf::from("input.json"))
    })
    .expect("config builds");
    let from = Coord { x: -3.7038, y: 40.4168 };
    let to = Coord { x: -3.6900, y: 40.4100 };

    let provider = DefaultRoutingBuilder
        .matrix_provider(&config)
        .expect("offline provider");
    let table = provider.table(&[from, to]).expect("table");

    assert_eq!(table.distances[0][1], haversine_distance(from, to));
}

#[rstest]
fn infeasible_report_is_a_bare_status() {
    let payload = serde_json::to_value(PlanReport::Infeasible).expect("serialise");
    assert_eq!(payload, serde_json::json!({ "status": "infeasible" }));
}

#[rstest]
fn run_plan_with_writes_the_output_file() {
    let workspace = Workspace::new();
    let input_path = workspace.path("input.json");
    let output_path = workspace.path("out/plan.json");
    write_input(&input_path, &feasible_input());
    let args = PlanArgs {
        output: Some(output_path.clone()),
        time_limit_secs: Some(1),
        ..args_for(input_path)
    };
    let mut stdout = Vec::new();

    run_plan_with(args, &OfflineRouting, &mut stdout).expect("plan should succeed");

    assert!(stdout.is_empty());
    let written = fleetplan_fs::read_utf8(&output_path).expect("output written");
    let report: PlanReport = serde_json::from_str(&written).expect("plan JSON");
    assert!(matches!(report, PlanReport::Solved(_)));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "input_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let workspace = Workspace::new();
    let env_input = workspace.path("from-env.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "osrm_base_url": "http://from-file:5000",
            "seed": 1,
            "time_limit_secs": 60,
        }),
        None,
    );
    composer.push_environment(json!({
        "input_path": env_input.as_str(),
        "seed": 2,
    }));
    composer.push_cli(json!({ "seed": 3 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.input_path, env_input);
    assert_eq!(config.osrm.base_url, "http://from-file:5000");
    assert_eq!(config.time_limit, Duration::from_secs(60));
    assert_eq!(config.seed, 3);
}

#[rstest]
#[case(&["fleetplan", "--help"], 0)]
#[case(&["fleetplan", "--version"], 0)]
#[case(&["fleetplan", "plan", "--no-such-flag"], 1)]
fn argument_errors_map_to_exit_status(#[case] argv: &[&str], #[case] expected: u8) {
    let err = Cli::try_parse_from(argv).expect_err("clap should stop early");
    assert_eq!(report_argument_error(&err), expected);
}
