//! First-solution heuristics.
//!
//! The cheapest-arc pass first seats the stops that only some vehicles can
//! carry, fewest candidates and largest load first. Each vehicle then grows
//! its path by appending the unassigned stop reachable over the cheapest
//! feasible arc, and stops left over are placed by cheapest insertion.
//!
//! When that pass strands a stop, regret insertion rebuilds the plan from
//! empty routes, always placing next the stop that would lose most by
//! waiting. A model is reported infeasible only when some stop fits no
//! vehicle on its own or both heuristics strand a stop.

use std::cmp::Reverse;

use fleetplan_core::ConstraintModel;
use log::debug;

/// Candidate placement: insertion cost delta, vehicle and position.
type Placement = (i64, usize, usize);

/// Build one stop sequence per vehicle, or `None` if some stop cannot be
/// placed without breaking a hard constraint.
pub(crate) fn construct(model: &ConstraintModel) -> Option<Vec<Vec<usize>>> {
    let carriers = carriers(model);
    if let Some(stop) = carriers.iter().skip(1).position(|&count| count == 0) {
        debug!("stop {} fits no vehicle; model is infeasible", stop + 1);
        return None;
    }
    if let Some(routes) = cheapest_arc(model, &carriers) {
        return Some(routes);
    }
    debug!("cheapest-arc pass stranded a stop; retrying with regret insertion");
    let routes = regret_insertion(model);
    if routes.is_none() {
        debug!("regret insertion stranded a stop; model is infeasible");
    }
    routes
}

/// Number of vehicles able to serve each stop alone. The depot slot is zero.
fn carriers(model: &ConstraintModel) -> Vec<usize> {
    (0..model.stop_count())
        .map(|stop| {
            if stop == 0 {
                return 0;
            }
            (0..model.vehicle_count())
                .filter(|&vehicle| model.evaluate_route(vehicle, &[stop]).is_some())
                .count()
        })
        .collect()
}

fn cheapest_arc(model: &ConstraintModel, carriers: &[usize]) -> Option<Vec<Vec<usize>>> {
    let stop_count = model.stop_count();
    let mut assigned = vec![false; stop_count];
    let mut routes = vec![Vec::new(); model.vehicle_count()];

    let mut restricted: Vec<(usize, usize)> = carriers
        .iter()
        .copied()
        .enumerate()
        .skip(1)
        .filter(|&(_, count)| count < model.vehicle_count())
        .collect();
    restricted.sort_by_key(|&(stop, count)| {
        (
            count,
            Reverse(model.volume_demand(stop).max(model.weight_demand(stop))),
            stop,
        )
    });
    for (stop, _) in restricted {
        place(model, &mut routes, &mut assigned, stop)?;
    }

    for (vehicle, route) in routes.iter_mut().enumerate() {
        extend_cheapest_arc(model, vehicle, route, &mut assigned);
    }

    for stop in 1..stop_count {
        if assigned.get(stop).copied().unwrap_or(true) {
            continue;
        }
        place(model, &mut routes, &mut assigned, stop)?;
    }
    Some(routes)
}

fn place(
    model: &ConstraintModel,
    routes: &mut [Vec<usize>],
    assigned: &mut [bool],
    stop: usize,
) -> Option<()> {
    let (_, vehicle, position) = placements(model, routes, stop).into_iter().min()?;
    routes.get_mut(vehicle)?.insert(position, stop);
    *assigned.get_mut(stop)? = true;
    Some(())
}

fn extend_cheapest_arc(
    model: &ConstraintModel,
    vehicle: usize,
    route: &mut Vec<usize>,
    assigned: &mut [bool],
) {
    loop {
        let last = route.last().copied().unwrap_or(0);
        let mut candidates: Vec<(i64, usize)> = assigned
            .iter()
            .enumerate()
            .skip(1)
            .filter(|&(stop, taken)| !*taken && model.is_eligible(stop, vehicle))
            .map(|(stop, _)| (model.arc_cost(last, stop), stop))
            .collect();
        candidates.sort_unstable();

        let chosen = candidates.into_iter().map(|(_, stop)| stop).find(|&stop| {
            route.push(stop);
            let feasible = model.evaluate_route(vehicle, route).is_some();
            route.pop();
            feasible
        });
        let Some(stop) = chosen else {
            return;
        };
        route.push(stop);
        if let Some(taken) = assigned.get_mut(stop) {
            *taken = true;
        }
    }
}

/// Regret-2 insertion from empty routes.
///
/// Each round places the pending stop whose best placement beats its best
/// placement on any other vehicle by the widest margin. A stop with a
/// single candidate vehicle has unbounded regret. Ties go to the cheaper
/// placement, then to the lower stop index.
fn regret_insertion(model: &ConstraintModel) -> Option<Vec<Vec<usize>>> {
    let mut routes = vec![Vec::new(); model.vehicle_count()];
    let mut pending: Vec<usize> = (1..model.stop_count()).collect();

    while !pending.is_empty() {
        let mut chosen: Option<(i64, i64, usize, usize, usize)> = None;
        for &stop in &pending {
            let mut options = placements(model, &routes, stop);
            options.sort_unstable();
            let Some(&(best, vehicle, position)) = options.first() else {
                debug!("stop {stop} has no feasible placement left");
                return None;
            };
            let regret = options
                .get(1)
                .map_or(i64::MAX, |&(second, _, _)| second - best);
            let wins = chosen.is_none_or(|(top, cheapest, ..)| {
                regret > top || (regret == top && best < cheapest)
            });
            if wins {
                chosen = Some((regret, best, stop, vehicle, position));
            }
        }
        let (_, _, stop, vehicle, position) = chosen?;
        routes.get_mut(vehicle)?.insert(position, stop);
        pending.retain(|&candidate| candidate != stop);
    }
    Some(routes)
}

/// Cheapest feasible placement of `stop` on each vehicle that can take it.
fn placements(model: &ConstraintModel, routes: &[Vec<usize>], stop: usize) -> Vec<Placement> {
    routes
        .iter()
        .enumerate()
        .filter(|&(vehicle, _)| model.is_eligible(stop, vehicle))
        .filter_map(|(vehicle, route)| {
            let current = model.evaluate_route(vehicle, route)?.cost();
            (0..=route.len())
                .filter_map(|position| {
                    let mut candidate = route.clone();
                    candidate.insert(position, stop);
                    let cost = model.evaluate_route(vehicle, &candidate)?.cost();
                    Some((cost - current, vehicle, position))
                })
                .min()
        })
        .collect()
}
