//! Arrival-time assignment for a single route.
//!
//! Given the transits of a route, the time variables are chosen to minimise
//! the soft window penalty under the hard limits of the time dimension: every
//! time lies in `[0, day_end]`, the route's elapsed time is at most
//! `horizon`, and no single arc waits longer than `max_slack`.

use crate::clock::TimeWindow;
use crate::problem::FleetWindow;

use super::ModelParams;

/// Timed route: departure, arrival at each visit, return.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    /// Departure from the depot.
    pub start: u32,
    /// Arrival at each visited stop, in visit order.
    pub arrivals: Vec<u32>,
    /// Return to the depot.
    pub end: u32,
    /// Soft-bound penalty of this timing.
    pub penalty: i64,
}

/// Soft targets shared by every route.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RouteTargets {
    pub fleet: FleetWindow,
    pub depot: TimeWindow,
}

/// Choose route times for `transits` (one more entry than `windows`).
///
/// Candidate departures align the route with every window bound, the fleet
/// targets and the depot hours. Each candidate is rolled forward, waiting
/// toward a window opening only as far as slack, horizon and day allow. The
/// cheapest candidate wins, ties going to the earliest departure. Returns
/// `None` when the transits alone exceed the horizon or the day.
pub(crate) fn schedule(
    params: &ModelParams,
    targets: RouteTargets,
    transits: &[u32],
    windows: &[TimeWindow],
) -> Option<Schedule> {
    let total = transits
        .iter()
        .try_fold(0_u32, |sum, transit| sum.checked_add(*transit))?;
    if total > params.horizon || total > params.day_end {
        return None;
    }
    let latest_start = params.day_end - total;

    let mut candidates = vec![
        0,
        targets.fleet.earliest_start,
        targets.fleet.latest_end.saturating_sub(total),
        targets.depot.start,
        targets.depot.end.saturating_sub(total),
        latest_start,
    ];
    let mut prefix = 0_u32;
    for (transit, window) in transits.iter().zip(windows) {
        prefix += transit;
        candidates.push(window.start.saturating_sub(prefix));
        candidates.push(window.end.saturating_sub(prefix));
    }
    for candidate in &mut candidates {
        *candidate = (*candidate).min(latest_start);
    }
    candidates.sort_unstable();
    candidates.dedup();

    candidates
        .into_iter()
        .map(|start| roll_forward(params, targets, transits, windows, start, total))
        .min_by_key(|schedule| (schedule.penalty, schedule.start))
}

fn roll_forward(
    params: &ModelParams,
    targets: RouteTargets,
    transits: &[u32],
    windows: &[TimeWindow],
    start: u32,
    total: u32,
) -> Schedule {
    let mut violation = u64::from(targets.fleet.earliest_start.saturating_sub(start))
        + u64::from(targets.depot.violation(start));
    let mut remaining = total;
    let mut time = start;
    let mut arrivals = Vec::with_capacity(windows.len());

    for (transit, window) in transits.iter().zip(windows) {
        remaining = remaining.saturating_sub(*transit);
        let reached = time + transit;
        let horizon_left = params
            .horizon
            .saturating_sub(reached - start)
            .saturating_sub(remaining);
        let day_left = params
            .day_end
            .saturating_sub(reached)
            .saturating_sub(remaining);
        let wait = window
            .start
            .saturating_sub(reached)
            .min(params.max_slack)
            .min(horizon_left)
            .min(day_left);
        let arrival = reached + wait;
        violation += u64::from(window.violation(arrival));
        arrivals.push(arrival);
        time = arrival;
    }

    let end = time + transits.last().copied().unwrap_or(0);
    violation += u64::from(end.saturating_sub(targets.fleet.latest_end))
        + u64::from(targets.depot.violation(end));

    let penalty = i64::try_from(violation)
        .unwrap_or(i64::MAX)
        .saturating_mul(params.penalty_per_second);
    Schedule {
        start,
        arrivals,
        end,
        penalty,
    }
}
