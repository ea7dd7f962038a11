//! Shared test harness modules for the fleetplan CLI.

use super::*;

mod helpers;
mod plan_unit;
