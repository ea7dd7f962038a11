//! Error types emitted by the fleetplan CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fleetplan_core::{PlanError, RoutingError};
use fleetplan_data::ProviderBuildError;
use thiserror::Error;

/// Errors emitted by the fleetplan CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Two options that cannot be combined were both set.
    #[error("--{first} cannot be combined with --{second}")]
    ConflictingOptions {
        first: &'static str,
        second: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading the plan input file failed.
    #[error("failed to read plan input at {path:?}: {source}")]
    ReadPlanInput {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Plan input JSON could not be decoded.
    #[error("failed to parse plan input JSON at {path:?}: {source}")]
    ParsePlanInput {
        path: Utf8PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Constructing the OSRM provider failed.
    #[error("failed to build routing provider for {base_url:?}: {source}")]
    BuildRoutingProvider {
        base_url: String,
        #[source]
        source: ProviderBuildError,
    },
    /// The planning pipeline rejected the input or lost the matrix service.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Fetching leg geometry failed.
    #[error("failed to fetch leg geometry: {0}")]
    Geometry(#[source] RoutingError),
    /// Serialising the plan failed.
    #[error("failed to serialise plan: {0}")]
    SerialisePlan(#[source] serde_json::Error),
    /// Writing the plan to stdout failed.
    #[error("failed to write plan output: {0}")]
    WritePlanOutput(#[source] std::io::Error),
    /// Writing the plan to a file failed.
    #[error("failed to write plan to {path:?}: {source}")]
    WritePlanFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
