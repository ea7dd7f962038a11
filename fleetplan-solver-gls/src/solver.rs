//! `GlsSolver`: the [`RouteSolver`] entry point.

use std::time::{Duration, Instant};

use fleetplan_core::{ConstraintModel, RouteSolver, Solution};
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::construction::construct;
use crate::search::Search;

/// Configuration for [`GlsSolver`].
#[derive(Debug, Clone, PartialEq)]
pub struct GlsConfig {
    /// Seed for every random choice made during the search.
    pub seed: u64,
    /// Scale of the penalty weight relative to the mean arc cost of the
    /// first local optimum.
    pub lambda_factor: f64,
    /// Upper bound on guided iterations, `None` for no bound.
    pub max_iterations: Option<usize>,
    /// Stop after this many guided iterations without a new best, `None`
    /// to search until the budget or `max_iterations` runs out.
    pub stall_iterations: Option<usize>,
}

impl Default for GlsConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            lambda_factor: 0.3,
            max_iterations: None,
            stall_iterations: Some(1_000),
        }
    }
}

/// Guided local search over the routing model.
///
/// The search is deterministic for a given [`GlsConfig`]: the budget only
/// decides where the fixed trajectory is cut, and the best solution seen up
/// to that point is returned.
///
/// # Examples
/// ```
/// use fleetplan_solver_gls::{GlsConfig, GlsSolver};
///
/// let solver = GlsSolver::with_config(GlsConfig {
///     seed: 7,
///     ..GlsConfig::default()
/// });
/// assert_eq!(solver.config().seed, 7);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlsSolver {
    config: GlsConfig,
}

impl GlsSolver {
    /// Construct a solver using default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a solver with explicit configuration.
    #[must_use]
    pub const fn with_config(config: GlsConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &GlsConfig {
        &self.config
    }

    fn within_limits(&self, iterations: usize, stalled: usize) -> bool {
        self.config
            .max_iterations
            .is_none_or(|limit| iterations < limit)
            && self
                .config
                .stall_iterations
                .is_none_or(|limit| stalled < limit)
    }
}

impl RouteSolver for GlsSolver {
    fn solve(&self, model: &ConstraintModel, time_budget: Duration) -> Option<Solution> {
        let started = Instant::now();
        let deadline = started.checked_add(time_budget);
        let routes = construct(model)?;
        let mut search = Search::new(model, routes, deadline)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        debug!("first solution costs {}", search.cost());

        let mut iterations = 0;
        if search.descend(&mut rng) {
            search.activate_guidance(self.config.lambda_factor);
            let mut stalled = 0;
            while self.within_limits(iterations, stalled) && !search.expired() {
                if search.penalise() == 0 {
                    break;
                }
                let before = search.best_cost();
                let completed = search.descend(&mut rng);
                iterations += 1;
                if search.best_cost() < before {
                    stalled = 0;
                } else {
                    stalled += 1;
                }
                if !completed {
                    break;
                }
            }
        }

        debug!(
            "guided search finished: objective {}, {iterations} iterations, {} moves, {:?}",
            search.best_cost(),
            search.moves_applied(),
            started.elapsed()
        );
        Solution::from_routes(model, search.best_routes())
    }
}
