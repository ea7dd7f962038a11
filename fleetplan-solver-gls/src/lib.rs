//! Guided local search engine for fleetplan.
//!
//! [`GlsSolver`] implements [`RouteSolver`](fleetplan_core::RouteSolver). It
//! builds a first assignment by extending each vehicle's path along the
//! cheapest feasible arc, falls back to cheapest insertion for stops the
//! paths could not absorb, and then improves the assignment with
//! relocate, exchange, 2-opt and or-opt moves. Local optima are escaped by
//! penalising the arcs of highest utility and searching on the augmented
//! objective.
//!
//! Every random choice flows from [`GlsConfig::seed`], so a run is a fixed
//! trajectory cut short by the time budget or the iteration cap. The best
//! solution seen along that trajectory is returned, which makes a longer
//! budget never worse than a shorter one.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod construction;
mod guidance;
mod moves;
mod search;
mod solver;

pub use solver::{GlsConfig, GlsSolver};

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;
