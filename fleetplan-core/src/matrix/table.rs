//! Validated, square travel matrices indexed by stop.

use super::error::RoutingError;
use super::provider::TravelTable;

/// Speed used to estimate durations when the provider omits them: 30 km/h.
pub const ESTIMATED_SPEED_MPS: f64 = 30_000.0 / 3_600.0;

/// Estimate a travel duration in whole seconds from a distance in metres.
///
/// # Examples
/// ```
/// use fleetplan_core::estimate_duration;
///
/// assert_eq!(estimate_duration(1_000.0), 120.0);
/// ```
#[must_use]
pub fn estimate_duration(distance: f64) -> f64 {
    (distance / ESTIMATED_SPEED_MPS).round()
}

/// Distance (metres) and duration (seconds) between every pair of stops.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    size: usize,
    distances: Vec<f64>,
    durations: Vec<f64>,
    estimated: bool,
}

impl TravelMatrix {
    /// Validate a provider table against the expected stop count.
    ///
    /// Missing durations are estimated at [`ESTIMATED_SPEED_MPS`].
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Malformed`] when either matrix is not
    /// `size x size` or holds a negative or non-finite value.
    ///
    /// # Examples
    /// ```
    /// use fleetplan_core::{TravelMatrix, TravelTable};
    ///
    /// let table = TravelTable {
    ///     distances: vec![vec![0.0, 1_000.0], vec![1_000.0, 0.0]],
    ///     durations: None,
    /// };
    /// let matrix = TravelMatrix::from_table(table, 2)?;
    /// assert_eq!(matrix.duration(0, 1), 120.0);
    /// # Ok::<(), fleetplan_core::RoutingError>(())
    /// ```
    pub fn from_table(table: TravelTable, size: usize) -> Result<Self, RoutingError> {
        let distances = flatten("distances", table.distances, size)?;
        let (durations, estimated) = match table.durations {
            Some(durations) => (flatten("durations", durations, size)?, false),
            None => (distances.iter().copied().map(estimate_duration).collect(), true),
        };
        Ok(Self {
            size,
            distances,
            durations,
            estimated,
        })
    }

    /// Number of stops covered.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Whether durations were estimated from distance.
    #[must_use]
    pub const fn durations_estimated(&self) -> bool {
        self.estimated
    }

    /// Distance from stop `from` to stop `to` in metres.
    ///
    /// Out-of-range indices read as `0.0`.
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.cell(&self.distances, from, to)
    }

    /// Duration from stop `from` to stop `to` in seconds.
    ///
    /// Out-of-range indices read as `0.0`.
    #[must_use]
    pub fn duration(&self, from: usize, to: usize) -> f64 {
        self.cell(&self.durations, from, to)
    }

    fn cell(&self, values: &[f64], from: usize, to: usize) -> f64 {
        if from >= self.size || to >= self.size {
            return 0.0;
        }
        values.get(from * self.size + to).copied().unwrap_or(0.0)
    }
}

fn flatten(name: &str, rows: Vec<Vec<f64>>, size: usize) -> Result<Vec<f64>, RoutingError> {
    if rows.len() != size {
        return Err(RoutingError::Malformed {
            message: format!("{name}: expected {size} rows, got {}", rows.len()),
        });
    }
    let mut flat = Vec::with_capacity(size * size);
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != size {
            return Err(RoutingError::Malformed {
                message: format!("{name}: row {i} has {} columns, expected {size}", row.len()),
            });
        }
        if let Some((j, value)) = row
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite() || **value < 0.0)
        {
            return Err(RoutingError::Malformed {
                message: format!("{name}[{i}][{j}] is {value}"),
            });
        }
        flat.extend(row);
    }
    Ok(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn table(distances: Vec<Vec<f64>>, durations: Option<Vec<Vec<f64>>>) -> TravelTable {
        TravelTable {
            distances,
            durations,
        }
    }

    #[rstest]
    fn estimates_missing_durations_at_thirty_kmh() {
        let matrix = TravelMatrix::from_table(
            table(vec![vec![0.0, 1_000.0], vec![2_500.0, 0.0]], None),
            2,
        )
        .expect("valid table");

        assert!(matrix.durations_estimated());
        assert!((matrix.duration(0, 1) - 120.0).abs() < f64::EPSILON);
        assert!((matrix.duration(1, 0) - 300.0).abs() < f64::EPSILON);
        assert!(matrix.duration(0, 0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn keeps_supplied_durations() {
        let matrix = TravelMatrix::from_table(
            table(
                vec![vec![0.0, 1_000.0], vec![1_000.0, 0.0]],
                Some(vec![vec![0.0, 77.0], vec![88.0, 0.0]]),
            ),
            2,
        )
        .expect("valid table");

        assert!(!matrix.durations_estimated());
        assert!((matrix.duration(0, 1) - 77.0).abs() < f64::EPSILON);
        assert!((matrix.duration(1, 0) - 88.0).abs() < f64::EPSILON);
        assert!((matrix.distance(1, 0) - 1_000.0).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(table(vec![vec![0.0]], None), 2)]
    #[case(table(vec![vec![0.0, 1.0], vec![1.0]], None), 2)]
    #[case(table(vec![vec![0.0, -1.0], vec![1.0, 0.0]], None), 2)]
    #[case(table(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]], None), 2)]
    #[case(table(vec![vec![0.0, 1.0], vec![1.0, 0.0]], Some(vec![vec![0.0]])), 2)]
    fn rejects_malformed_tables(#[case] input: TravelTable, #[case] size: usize) {
        let err = TravelMatrix::from_table(input, size).expect_err("malformed table");
        assert!(matches!(err, RoutingError::Malformed { .. }));
    }

    #[rstest]
    fn out_of_range_reads_as_zero() {
        let matrix =
            TravelMatrix::from_table(table(vec![vec![5.0]], None), 1).expect("valid table");
        assert!(matrix.distance(0, 3).abs() < f64::EPSILON);
        assert_eq!(matrix.size(), 1);
    }

    #[rstest]
    fn only_timeouts_are_retryable() {
        let timeout = RoutingError::Timeout {
            url: "http://osrm".into(),
            timeout_secs: 30,
        };
        let network = RoutingError::Network {
            url: "http://osrm".into(),
            message: "refused".into(),
        };
        assert!(timeout.is_retryable());
        assert!(!network.is_retryable());
        assert!(!RoutingError::EmptyInput.is_retryable());
    }
}
