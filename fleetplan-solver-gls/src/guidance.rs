//! Arc penalties steering the search away from local optima.

use fleetplan_core::ConstraintModel;

/// Arc penalty table and the weight `lambda` applied to it.
///
/// Until [`Guidance::activate`] runs, `lambda` is zero and augmented costs
/// equal true costs.
#[derive(Debug, Clone)]
pub(crate) struct Guidance {
    size: usize,
    penalties: Vec<u32>,
    lambda: i64,
}

impl Guidance {
    pub(crate) fn new(size: usize) -> Self {
        Self {
            size,
            penalties: vec![0; size.saturating_mul(size)],
            lambda: 0,
        }
    }

    pub(crate) const fn is_active(&self) -> bool {
        self.lambda > 0
    }

    #[cfg(test)]
    pub(crate) const fn lambda(&self) -> i64 {
        self.lambda
    }

    /// Fix `lambda` from the first local optimum: `factor` times the mean
    /// cost per arc, at least one.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        reason = "lambda is a coarse scale factor; rounding to whole units is intended"
    )]
    pub(crate) fn activate(&mut self, factor: f64, objective: i64, arcs: usize) {
        let per_arc = if arcs == 0 {
            0.0
        } else {
            objective as f64 / arcs as f64
        };
        self.lambda = ((factor * per_arc).round() as i64).max(1);
    }

    fn penalty(&self, from: usize, to: usize) -> u32 {
        from.checked_mul(self.size)
            .and_then(|row| row.checked_add(to))
            .and_then(|cell| self.penalties.get(cell))
            .copied()
            .unwrap_or(0)
    }

    /// Weighted penalty of the closed route depot, `route`, depot.
    pub(crate) fn route_penalty(&self, route: &[usize]) -> i64 {
        if !self.is_active() || route.is_empty() {
            return 0;
        }
        let total: i64 = arcs(route)
            .map(|(from, to)| i64::from(self.penalty(from, to)))
            .sum();
        total.saturating_mul(self.lambda)
    }

    /// Penalise every arc of `routes` with maximal utility
    /// `cost / (1 + penalty)`. Returns the number of arcs penalised.
    pub(crate) fn penalise(&mut self, model: &ConstraintModel, routes: &[Vec<usize>]) -> usize {
        let features: Vec<(usize, usize)> = routes
            .iter()
            .filter(|route| !route.is_empty())
            .flat_map(|route| arcs(route))
            .collect();

        let mut best: Option<(i64, i64)> = None;
        for &(from, to) in &features {
            let utility = (model.arc_cost(from, to), 1 + i64::from(self.penalty(from, to)));
            if best.is_none_or(|current| exceeds(utility, current)) {
                best = Some(utility);
            }
        }
        let Some(maximum) = best else {
            return 0;
        };

        let mut penalised = 0;
        for (from, to) in features {
            let utility = (model.arc_cost(from, to), 1 + i64::from(self.penalty(from, to)));
            if exceeds(maximum, utility) {
                continue;
            }
            if let Some(cell) = from
                .checked_mul(self.size)
                .and_then(|row| row.checked_add(to))
                .and_then(|cell| self.penalties.get_mut(cell))
            {
                *cell = cell.saturating_add(1);
                penalised += 1;
            }
        }
        penalised
    }
}

/// Arcs of the closed route depot, `route`, depot.
pub(crate) fn arcs(route: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    let path = std::iter::once(0)
        .chain(route.iter().copied())
        .chain(std::iter::once(0));
    path.clone().zip(path.skip(1))
}

/// Whether utility `a` is strictly greater than `b`, both given as
/// `(cost, 1 + penalty)` fractions.
fn exceeds(a: (i64, i64), b: (i64, i64)) -> bool {
    i128::from(a.0) * i128::from(b.1) > i128::from(b.0) * i128::from(a.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::line_model;
    use rstest::rstest;

    #[rstest]
    fn inactive_guidance_adds_nothing() {
        let guidance = Guidance::new(4);
        assert_eq!(guidance.route_penalty(&[1, 2, 3]), 0);
    }

    #[rstest]
    #[case(3_000, 4, 0.3, 225)]
    #[case(0, 4, 0.3, 1)]
    #[case(10, 0, 0.3, 1)]
    fn lambda_scales_with_cost_per_arc(
        #[case] objective: i64,
        #[case] arcs: usize,
        #[case] factor: f64,
        #[case] expected: i64,
    ) {
        let mut guidance = Guidance::new(3);
        guidance.activate(factor, objective, arcs);
        assert_eq!(guidance.lambda(), expected);
    }

    #[rstest]
    fn penalises_the_longest_arc_first() {
        let model = line_model(3, 1);
        let mut guidance = Guidance::new(model.stop_count());
        guidance.activate(1.0, 1, 1);

        // Route 0 -> 1 -> 3 -> 0: arcs cost 1000, 2000, 3000.
        let penalised = guidance.penalise(&model, &[vec![1, 3]]);

        assert_eq!(penalised, 1);
        assert_eq!(guidance.route_penalty(&[3]), 1);
        assert_eq!(guidance.route_penalty(&[1]), 0);
    }

    #[rstest]
    fn penalised_arcs_lose_utility() {
        let model = line_model(2, 1);
        let mut guidance = Guidance::new(model.stop_count());
        guidance.activate(1.0, 1, 1);

        // Arcs: 0->1 (1000), 1->2 (1000), 2->0 (2000).
        assert_eq!(guidance.penalise(&model, &[vec![1, 2]]), 1);
        // 2->0 now has utility 1000 and ties with the other two.
        assert_eq!(guidance.penalise(&model, &[vec![1, 2]]), 3);
    }

    #[rstest]
    fn closed_route_arcs() {
        let collected: Vec<(usize, usize)> = arcs(&[4, 2]).collect();
        assert_eq!(collected, vec![(0, 4), (4, 2), (2, 0)]);
    }
}
