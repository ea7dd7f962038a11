//! First-improvement local search on the augmented objective.

use std::time::Instant;

use fleetplan_core::ConstraintModel;
use log::trace;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::guidance::Guidance;
use crate::moves::{Move, neighbourhood};

/// Mutable search state: the current routes, their cached costs and the
/// best assignment seen so far.
pub(crate) struct Search<'a> {
    model: &'a ConstraintModel,
    routes: Vec<Vec<usize>>,
    costs: Vec<i64>,
    guidance: Guidance,
    deadline: Option<Instant>,
    best: Vec<Vec<usize>>,
    best_cost: i64,
    moves_applied: usize,
}

impl<'a> Search<'a> {
    /// Start from `routes`, one per vehicle. `None` if any route breaks a
    /// hard constraint.
    pub(crate) fn new(
        model: &'a ConstraintModel,
        routes: Vec<Vec<usize>>,
        deadline: Option<Instant>,
    ) -> Option<Self> {
        let costs = routes
            .iter()
            .enumerate()
            .map(|(vehicle, route)| {
                model
                    .evaluate_route(vehicle, route)
                    .map(|evaluation| evaluation.cost())
            })
            .collect::<Option<Vec<i64>>>()?;
        let best_cost = costs.iter().sum();
        Some(Self {
            model,
            best: routes.clone(),
            routes,
            costs,
            guidance: Guidance::new(model.stop_count()),
            deadline,
            best_cost,
            moves_applied: 0,
        })
    }

    pub(crate) fn expired(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// True objective of the current routes.
    pub(crate) fn cost(&self) -> i64 {
        self.costs.iter().sum()
    }

    pub(crate) const fn best_cost(&self) -> i64 {
        self.best_cost
    }

    pub(crate) fn best_routes(&self) -> &[Vec<usize>] {
        &self.best
    }

    pub(crate) const fn moves_applied(&self) -> usize {
        self.moves_applied
    }

    /// Number of arcs in the current assignment, empty routes excluded.
    pub(crate) fn arc_count(&self) -> usize {
        self.routes
            .iter()
            .filter(|route| !route.is_empty())
            .map(|route| route.len() + 1)
            .sum()
    }

    pub(crate) fn activate_guidance(&mut self, lambda_factor: f64) {
        let arcs = self.arc_count();
        self.guidance.activate(lambda_factor, self.cost(), arcs);
    }

    /// Penalise the current local optimum. Returns the number of arcs
    /// penalised; zero means there is nothing left to guide.
    pub(crate) fn penalise(&mut self) -> usize {
        self.guidance.penalise(self.model, &self.routes)
    }

    /// Descend to a local optimum of the augmented objective.
    ///
    /// Anchor stops are visited in an order drawn from `rng`; the first
    /// improving move found for an anchor is applied. Returns `false` if the
    /// deadline cut the descent short.
    pub(crate) fn descend(&mut self, rng: &mut ChaCha8Rng) -> bool {
        let mut anchors: Vec<usize> = (1..self.model.stop_count()).collect();
        loop {
            anchors.shuffle(rng);
            let mut improved = false;
            for &stop in &anchors {
                if self.expired() {
                    return false;
                }
                let Some((route, index)) = self.locate(stop) else {
                    continue;
                };
                improved |= self.improve_at(route, index);
            }
            if !improved {
                return true;
            }
        }
    }

    fn locate(&self, stop: usize) -> Option<(usize, usize)> {
        self.routes.iter().enumerate().find_map(|(route, stops)| {
            stops
                .iter()
                .position(|&candidate| candidate == stop)
                .map(|index| (route, index))
        })
    }

    fn improve_at(&mut self, route: usize, index: usize) -> bool {
        for candidate in neighbourhood(&self.routes, route, index) {
            if let Some(changes) = self.improving(candidate) {
                self.commit(changes);
                return true;
            }
        }
        false
    }

    /// The re-evaluated routes touched by `candidate` if it is feasible and
    /// lowers the augmented objective.
    fn improving(&self, candidate: Move) -> Option<Vec<(usize, Vec<usize>, i64)>> {
        let changes = candidate.apply(&self.routes)?;
        let mut delta = 0_i64;
        let mut evaluated = Vec::with_capacity(changes.len());
        for (vehicle, sequence) in changes {
            let cost = self.model.evaluate_route(vehicle, &sequence)?.cost();
            let before = self.routes.get(vehicle)?;
            delta += cost + self.guidance.route_penalty(&sequence)
                - self.costs.get(vehicle)?
                - self.guidance.route_penalty(before);
            evaluated.push((vehicle, sequence, cost));
        }
        (delta < 0).then_some(evaluated)
    }

    fn commit(&mut self, changes: Vec<(usize, Vec<usize>, i64)>) {
        for (vehicle, sequence, cost) in changes {
            if let (Some(route), Some(slot)) =
                (self.routes.get_mut(vehicle), self.costs.get_mut(vehicle))
            {
                *route = sequence;
                *slot = cost;
            }
        }
        self.moves_applied += 1;

        let cost = self.cost();
        if cost < self.best_cost {
            trace!("best objective improved from {} to {cost}", self.best_cost);
            self.best_cost = cost;
            self.best.clone_from(&self.routes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guidance::arcs;
    use crate::test_support::{crossing_model, line_model};
    use rand::SeedableRng;
    use rstest::rstest;

    #[rstest]
    fn descent_untangles_a_crossed_route() {
        let model = line_model(4, 1);
        let mut search = Search::new(&model, vec![vec![3, 1, 4, 2]], None).expect("feasible");
        let start = search.cost();

        assert!(search.descend(&mut ChaCha8Rng::seed_from_u64(0)));

        assert!(search.cost() < start);
        assert_eq!(search.best_cost(), search.cost());
        assert_eq!(search.best_routes().len(), 1);
    }

    #[rstest]
    fn descent_moves_stops_between_routes() {
        let model = crossing_model();
        let mut search = Search::new(&model, vec![vec![1, 3], vec![2, 4]], None).expect("feasible");
        let start = search.cost();

        search.descend(&mut ChaCha8Rng::seed_from_u64(3));

        assert!(search.moves_applied() > 0);
        assert!(search.best_cost() < start);
    }

    #[rstest]
    fn expired_deadline_stops_before_any_move() {
        let model = line_model(4, 1);
        let mut search =
            Search::new(&model, vec![vec![3, 1, 4, 2]], Some(Instant::now())).expect("feasible");

        assert!(!search.descend(&mut ChaCha8Rng::seed_from_u64(0)));
        assert_eq!(search.moves_applied(), 0);
    }

    #[rstest]
    fn rejects_infeasible_start() {
        let model = line_model(2, 1);
        assert!(Search::new(&model, vec![vec![0, 1]], None).is_none());
    }

    #[rstest]
    fn arc_count_matches_closed_routes() {
        let model = line_model(4, 2);
        let routes = vec![vec![1, 2], vec![]];
        let closed: usize = routes
            .iter()
            .filter(|route| !route.is_empty())
            .map(|route| arcs(route).count())
            .sum();
        let search = Search::new(&model, routes, None).expect("feasible");
        assert_eq!(search.arc_count(), closed);
        assert_eq!(search.arc_count(), 3);
    }
}
