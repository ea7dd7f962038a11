//! Neighbourhood moves over per-vehicle stop sequences.

/// Longest segment moved by a single relocation.
pub(crate) const MAX_SEGMENT: usize = 3;

/// A local change to one or two routes.
///
/// Positions index into the stop sequence of a route (depot excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Move {
    /// Move `len` consecutive stops starting at `start` into `to_route`
    /// before position `to_pos`. A segment longer than one stop is an or-opt
    /// move. For an intra-route move `to_pos` indexes the route with the
    /// segment already removed.
    Relocate {
        route: usize,
        start: usize,
        len: usize,
        to_route: usize,
        to_pos: usize,
    },
    /// Swap one stop of route `a.0` with one stop of route `b.0`.
    Exchange { a: (usize, usize), b: (usize, usize) },
    /// Reverse the stops between `i` and `j` inclusive.
    TwoOpt { route: usize, i: usize, j: usize },
}

impl Move {
    /// The routes after the move, as `(route, sequence)` pairs for every
    /// route it touches. `None` if the move does not fit `routes`.
    pub(crate) fn apply(self, routes: &[Vec<usize>]) -> Option<Vec<(usize, Vec<usize>)>> {
        match self {
            Self::Relocate {
                route,
                start,
                len,
                to_route,
                to_pos,
            } => {
                let mut source = routes.get(route)?.clone();
                let end = start.checked_add(len)?;
                if len == 0 || end > source.len() {
                    return None;
                }
                let segment: Vec<usize> = source.drain(start..end).collect();
                if to_route == route {
                    if to_pos == start || to_pos > source.len() {
                        return None;
                    }
                    source.splice(to_pos..to_pos, segment);
                    return Some(vec![(route, source)]);
                }
                let mut target = routes.get(to_route)?.clone();
                if to_pos > target.len() {
                    return None;
                }
                target.splice(to_pos..to_pos, segment);
                Some(vec![(route, source), (to_route, target)])
            }
            Self::Exchange { a, b } => {
                if a.0 == b.0 {
                    return None;
                }
                let mut first = routes.get(a.0)?.clone();
                let mut second = routes.get(b.0)?.clone();
                let left = first.get_mut(a.1)?;
                let right = second.get_mut(b.1)?;
                std::mem::swap(left, right);
                Some(vec![(a.0, first), (b.0, second)])
            }
            Self::TwoOpt { route, i, j } => {
                let mut sequence = routes.get(route)?.clone();
                if i >= j || j >= sequence.len() {
                    return None;
                }
                sequence.get_mut(i..=j)?.reverse();
                Some(vec![(route, sequence)])
            }
        }
    }
}

/// Every move anchored at the stop in position `index` of `route`.
pub(crate) fn neighbourhood(routes: &[Vec<usize>], route: usize, index: usize) -> Vec<Move> {
    let Some(length) = routes.get(route).map(Vec::len) else {
        return Vec::new();
    };
    let mut moves = Vec::new();

    for len in 1..=MAX_SEGMENT {
        if index + len > length {
            break;
        }
        for (to_route, target) in routes.iter().enumerate() {
            let slots = if to_route == route {
                length - len
            } else {
                target.len()
            };
            moves.extend((0..=slots).map(|to_pos| Move::Relocate {
                route,
                start: index,
                len,
                to_route,
                to_pos,
            }));
        }
    }

    for (other, target) in routes.iter().enumerate() {
        if other == route {
            continue;
        }
        moves.extend((0..target.len()).map(|position| Move::Exchange {
            a: (route, index),
            b: (other, position),
        }));
    }

    moves.extend((index + 1..length).map(|j| Move::TwoOpt { route, i: index, j }));
    moves
}
