//! Plan command implementation for the fleetplan CLI.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fleetplan_core::{
    HaversineMatrixProvider, MatrixProvider, ModelParams, Overview, Plan, PlanInput, PlanOptions,
    Planner, RouteGeometryProvider, decorate_legs,
};
use fleetplan_data::{OsrmConfig, OsrmProvider};
use fleetplan_solver_gls::{GlsConfig, GlsSolver};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_PLAN_INPUT, ARG_PLAN_OFFLINE, ARG_PLAN_OSRM_BASE_URL, ARG_PLAN_OUTPUT, ARG_PLAN_PENALTY,
    ARG_PLAN_PROFILE, ARG_PLAN_SEED, ARG_PLAN_TIME_LIMIT, ARG_PLAN_TIMEOUT,
    ARG_PLAN_WITH_GEOMETRY, CliError, ENV_PLAN_INPUT,
};

const DEFAULT_TIME_LIMIT_SECS: u64 = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PENALTY_PER_SECOND: u32 = 5;

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Plan deliveries from a JSON document holding centers, \
                 demands and vehicles. Distances come from an OSRM instance \
                 (or from great-circle estimates with --offline); the plan \
                 is printed as JSON.",
    about = "Plan deliveries for a fleet"
)]
#[ortho_config(prefix = "FLEETPLAN")]
pub(crate) struct PlanArgs {
    /// Path to a JSON file with `centers`, `demands` and `vehicles`.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) input_path: Option<Utf8PathBuf>,
    /// Base URL for the OSRM server (e.g. "http://localhost:5000").
    #[arg(long = ARG_PLAN_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// OSRM routing profile.
    #[arg(long = ARG_PLAN_PROFILE, value_name = "name")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// Search budget in seconds.
    #[arg(long = ARG_PLAN_TIME_LIMIT, value_name = "secs")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Seed for the search.
    #[arg(long = ARG_PLAN_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Penalty per second of time-window violation.
    #[arg(long = ARG_PLAN_PENALTY, value_name = "n")]
    #[serde(default)]
    pub(crate) penalty_per_second: Option<u32>,
    /// Timeout for each OSRM request, in seconds.
    #[arg(long = ARG_PLAN_TIMEOUT, value_name = "secs")]
    #[serde(default)]
    pub(crate) timeout_secs: Option<u64>,
    /// Write the plan to this file instead of stdout.
    #[arg(long = ARG_PLAN_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Attach OSRM road geometry to every leg.
    #[arg(long = ARG_PLAN_WITH_GEOMETRY, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "bool")]
    #[serde(default)]
    pub(crate) with_geometry: Option<bool>,
    /// Estimate distances from great-circle distance instead of OSRM.
    #[arg(long = ARG_PLAN_OFFLINE, num_args = 0..=1, require_equals = true,
          default_missing_value = "true", value_name = "bool")]
    #[serde(default)]
    pub(crate) offline: Option<bool>,
}

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<PlanConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PlanConfig::try_from(merged)
    }
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    /// Path to the JSON input file.
    pub(crate) input_path: Utf8PathBuf,
    /// OSRM connection settings.
    pub(crate) osrm: OsrmConfig,
    /// Search budget.
    pub(crate) time_limit: Duration,
    /// Search seed.
    pub(crate) seed: u64,
    /// Penalty per second of time-window violation.
    pub(crate) penalty_per_second: u32,
    /// Output file, stdout when absent.
    pub(crate) output: Option<Utf8PathBuf>,
    /// Whether legs get road geometry.
    pub(crate) with_geometry: bool,
    /// Whether distances are estimated locally.
    pub(crate) offline: bool,
}

impl PlanConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        Self::require_existing(&self.input_path, ARG_PLAN_INPUT)
    }

    fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
        match fleetplan_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::SourcePathNotFile {
                field,
                path: path.to_path_buf(),
            }),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                Err(CliError::MissingSourceFile {
                    field,
                    path: path.to_path_buf(),
                })
            }
            Err(source) => Err(CliError::InspectSourcePath {
                field,
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            time_limit: self.time_limit,
            params: ModelParams {
                penalty_per_second: i64::from(self.penalty_per_second),
                ..ModelParams::default()
            },
        }
    }

    fn solver(&self) -> GlsSolver {
        GlsSolver::with_config(GlsConfig {
            seed: self.seed,
            ..GlsConfig::default()
        })
    }
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let input_path = args.input_path.ok_or(CliError::MissingArgument {
            field: ARG_PLAN_INPUT,
            env: ENV_PLAN_INPUT,
        })?;
        let with_geometry = args.with_geometry.unwrap_or(false);
        let offline = args.offline.unwrap_or(false);
        if with_geometry && offline {
            return Err(CliError::ConflictingOptions {
                first: ARG_PLAN_WITH_GEOMETRY,
                second: ARG_PLAN_OFFLINE,
            });
        }

        let mut osrm = OsrmConfig::default().with_timeout(Duration::from_secs(
            args.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        ));
        if let Some(base_url) = args.osrm_base_url {
            osrm.base_url = base_url;
        }
        if let Some(profile) = args.profile {
            osrm.profile = profile;
        }

        Ok(Self {
            input_path,
            osrm,
            time_limit: Duration::from_secs(
                args.time_limit_secs.unwrap_or(DEFAULT_TIME_LIMIT_SECS),
            ),
            seed: args.seed.unwrap_or(0),
            penalty_per_second: args
                .penalty_per_second
                .unwrap_or(DEFAULT_PENALTY_PER_SECOND),
            output: args.output,
            with_geometry,
            offline,
        })
    }
}

/// Builds the routing backends for the current plan invocation.
pub(super) trait RoutingBuilder {
    fn matrix_provider(&self, config: &PlanConfig) -> Result<Box<dyn MatrixProvider>, CliError>;

    fn geometry_provider(
        &self,
        config: &PlanConfig,
    ) -> Result<Box<dyn RouteGeometryProvider>, CliError>;
}

pub(super) struct DefaultRoutingBuilder;

impl DefaultRoutingBuilder {
    fn osrm(config: &PlanConfig) -> Result<OsrmProvider, CliError> {
        OsrmProvider::with_config(config.osrm.clone()).map_err(|source| {
            CliError::BuildRoutingProvider {
                base_url: config.osrm.base_url.clone(),
                source,
            }
        })
    }
}

impl RoutingBuilder for DefaultRoutingBuilder {
    fn matrix_provider(&self, config: &PlanConfig) -> Result<Box<dyn MatrixProvider>, CliError> {
        if config.offline {
            return Ok(Box::new(HaversineMatrixProvider));
        }
        Ok(Box::new(Self::osrm(config)?))
    }

    fn geometry_provider(
        &self,
        config: &PlanConfig,
    ) -> Result<Box<dyn RouteGeometryProvider>, CliError> {
        Ok(Box::new(Self::osrm(config)?))
    }
}

/// JSON document printed by the `plan` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum PlanReport {
    /// A plan satisfying every hard constraint.
    Solved(Plan),
    /// No assignment satisfies the hard constraints.
    Infeasible,
}

pub(super) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &DefaultRoutingBuilder, &mut stdout)
}

pub(super) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn RoutingBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_plan_config(args)?;
    let report = execute_plan(&config, builder)?;
    write_plan_report(&config, writer, &report)
}

fn resolve_plan_config(args: PlanArgs) -> Result<PlanConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_plan(config: &PlanConfig, builder: &dyn RoutingBuilder) -> Result<PlanReport, CliError> {
    let input = load_plan_input(&config.input_path)?;
    let provider = builder.matrix_provider(config)?;
    let planner = Planner::with_options(&*provider, config.solver(), config.plan_options());
    let Some(mut plan) = planner.plan(&input)? else {
        return Ok(PlanReport::Infeasible);
    };

    if config.with_geometry {
        let geometry = builder.geometry_provider(config)?;
        let decorated =
            decorate_legs(&mut plan, &*geometry, Overview::Full).map_err(CliError::Geometry)?;
        info!("decorated {decorated} of {} legs with geometry", plan.legs.len());
    }
    Ok(PlanReport::Solved(plan))
}

/// Loads a JSON-encoded [`PlanInput`] from disk.
pub(super) fn load_plan_input(path: &Utf8Path) -> Result<PlanInput, CliError> {
    let contents = fleetplan_fs::read_utf8(path).map_err(|source| CliError::ReadPlanInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CliError::ParsePlanInput {
        path: path.to_path_buf(),
        source,
    })
}

fn write_plan_report(
    config: &PlanConfig,
    writer: &mut dyn Write,
    report: &PlanReport,
) -> Result<(), CliError> {
    let mut payload = serde_json::to_string_pretty(report).map_err(CliError::SerialisePlan)?;
    payload.push('\n');

    if let Some(path) = &config.output {
        return fleetplan_fs::write_utf8(path, &payload).map_err(|source| {
            CliError::WritePlanFile {
                path: path.clone(),
                source,
            }
        });
    }
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WritePlanOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<PlanConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    PlanConfig::try_from(merged)
}
