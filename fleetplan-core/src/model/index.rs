//! Mapping between search indices and stops.

/// Maps search indices to stops and vehicle endpoints.
///
/// Indices `0..n-1` are the non-depot stops `1..n`. They are followed by
/// one start index per vehicle and then one end index per vehicle, so the
/// depot can open and close every route without being a visit itself.
///
/// # Examples
/// ```
/// use fleetplan_core::IndexManager;
///
/// let manager = IndexManager::new(3, 2);
/// assert_eq!(manager.index_count(), 6);
/// assert_eq!(manager.stop_of(0), Some(1));
/// assert_eq!(manager.start(1), Some(3));
/// assert_eq!(manager.end(0), Some(4));
/// assert_eq!(manager.stop_of(5), Some(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexManager {
    stops: usize,
    vehicles: usize,
}

impl IndexManager {
    /// Build a manager for `stops` stops (depot included) and `vehicles`
    /// vehicles.
    #[must_use]
    pub const fn new(stops: usize, vehicles: usize) -> Self {
        Self { stops, vehicles }
    }

    /// Number of stops, depot included.
    #[must_use]
    pub const fn stop_count(&self) -> usize {
        self.stops
    }

    /// Number of vehicles.
    #[must_use]
    pub const fn vehicle_count(&self) -> usize {
        self.vehicles
    }

    /// Number of visit indices, one per non-depot stop.
    #[must_use]
    pub const fn visit_count(&self) -> usize {
        self.stops.saturating_sub(1)
    }

    /// Total number of search indices.
    #[must_use]
    pub const fn index_count(&self) -> usize {
        self.visit_count() + 2 * self.vehicles
    }

    /// Start index of `vehicle`.
    #[must_use]
    pub const fn start(&self, vehicle: usize) -> Option<usize> {
        if vehicle < self.vehicles {
            Some(self.visit_count() + vehicle)
        } else {
            None
        }
    }

    /// End index of `vehicle`.
    #[must_use]
    pub const fn end(&self, vehicle: usize) -> Option<usize> {
        if vehicle < self.vehicles {
            Some(self.visit_count() + self.vehicles + vehicle)
        } else {
            None
        }
    }

    /// Whether `index` is a vehicle start.
    #[must_use]
    pub const fn is_start(&self, index: usize) -> bool {
        index >= self.visit_count() && index < self.visit_count() + self.vehicles
    }

    /// Whether `index` is a vehicle end.
    #[must_use]
    pub const fn is_end(&self, index: usize) -> bool {
        index >= self.visit_count() + self.vehicles && index < self.index_count()
    }

    /// Vehicle owning a start or end index.
    #[must_use]
    pub const fn vehicle_of(&self, index: usize) -> Option<usize> {
        if self.is_start(index) {
            Some(index - self.visit_count())
        } else if self.is_end(index) {
            Some(index - self.visit_count() - self.vehicles)
        } else {
            None
        }
    }

    /// Stop behind a search index; vehicle endpoints map to the depot.
    #[must_use]
    pub const fn stop_of(&self, index: usize) -> Option<usize> {
        if index < self.visit_count() {
            Some(index + 1)
        } else if index < self.index_count() {
            Some(0)
        } else {
            None
        }
    }

    /// Visit index of a non-depot stop.
    #[must_use]
    pub const fn index_of_stop(&self, stop: usize) -> Option<usize> {
        if stop >= 1 && stop < self.stops {
            Some(stop - 1)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn endpoints_follow_visits() {
        let manager = IndexManager::new(4, 2);
        assert_eq!(manager.visit_count(), 3);
        assert_eq!(manager.start(0), Some(3));
        assert_eq!(manager.start(1), Some(4));
        assert_eq!(manager.end(0), Some(5));
        assert_eq!(manager.end(1), Some(6));
        assert_eq!(manager.start(2), None);
    }

    #[rstest]
    #[case(0, Some(1))]
    #[case(2, Some(3))]
    #[case(3, Some(0))]
    #[case(6, Some(0))]
    #[case(7, None)]
    fn maps_indices_to_stops(#[case] index: usize, #[case] stop: Option<usize>) {
        assert_eq!(IndexManager::new(4, 2).stop_of(index), stop);
    }

    #[rstest]
    fn classifies_endpoints() {
        let manager = IndexManager::new(4, 2);
        assert!(manager.is_start(4));
        assert!(!manager.is_start(5));
        assert!(manager.is_end(5));
        assert!(!manager.is_end(2));
        assert_eq!(manager.vehicle_of(6), Some(1));
        assert_eq!(manager.vehicle_of(1), None);
    }

    #[rstest]
    fn depot_has_no_visit_index() {
        let manager = IndexManager::new(4, 1);
        assert_eq!(manager.index_of_stop(0), None);
        assert_eq!(manager.index_of_stop(3), Some(2));
        assert_eq!(manager.index_of_stop(4), None);
    }

    #[rstest]
    fn depot_only_problem_has_endpoints_only() {
        let manager = IndexManager::new(1, 3);
        assert_eq!(manager.index_count(), 6);
        assert_eq!(manager.start(0), Some(0));
        assert_eq!(manager.end(2), Some(5));
    }
}
