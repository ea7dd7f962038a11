//! Wall-clock parsing and time-window repair rules.
//!
//! All times are whole seconds from midnight. Input records carry `HH:MM`
//! strings; this module turns them into seconds and applies the repair rules
//! that keep every window well formed:
//!
//! - a window with a missing bound becomes the full day `[0, 24h]`;
//! - an inverted window `[s, e]` with `s > e` becomes `[s, s + fallback]`;
//! - intersecting two windows that do not overlap yields a two-hour slot
//!   starting at the newer window's start.

use thiserror::Error;

/// Seconds in one hour.
pub const SECONDS_PER_HOUR: u32 = 3_600;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u32 = 24 * SECONDS_PER_HOUR;

/// Fallback length applied to an inverted demand window.
pub const DEMAND_WINDOW_FALLBACK: u32 = 4 * SECONDS_PER_HOUR;

/// Fallback length applied to inverted depot opening hours.
pub const DEPOT_WINDOW_FALLBACK: u32 = 9 * SECONDS_PER_HOUR;

/// Length of the slot used when two demand windows do not overlap.
pub const CONFLICT_WINDOW_LENGTH: u32 = 2 * SECONDS_PER_HOUR;

const MAX_CLOCK_HOURS: u32 = 47;

/// Errors returned by [`parse_clock`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    /// The value is not of the form `HH:MM`.
    #[error("invalid clock value {value:?}: expected HH:MM")]
    Malformed {
        /// Offending input.
        value: String,
    },
}

/// Parse an `HH:MM` clock string into seconds from midnight.
///
/// Hours up to 47 are accepted so that repaired windows spilling past
/// midnight can be read back.
///
/// # Examples
/// ```
/// use fleetplan_core::clock::parse_clock;
///
/// assert_eq!(parse_clock("09:30"), Ok(34_200));
/// assert!(parse_clock("9h30").is_err());
/// ```
pub fn parse_clock(value: &str) -> Result<u32, ClockError> {
    let malformed = || ClockError::Malformed {
        value: value.to_owned(),
    };
    let (hours, minutes) = value.trim().split_once(':').ok_or_else(malformed)?;
    let hours: u32 = hours.trim().parse().map_err(|_| malformed())?;
    let minutes: u32 = minutes.trim().parse().map_err(|_| malformed())?;
    if hours > MAX_CLOCK_HOURS || minutes >= 60 {
        return Err(malformed());
    }
    Ok(hours * SECONDS_PER_HOUR + minutes * 60)
}

/// Parse an optional clock string, treating absent or blank values as `None`.
pub fn parse_optional_clock(value: Option<&str>) -> Result<Option<u32>, ClockError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_clock(text).map(Some),
    }
}

/// Render seconds from midnight as `HH:MM`, truncating spare seconds.
///
/// # Examples
/// ```
/// use fleetplan_core::clock::format_clock;
///
/// assert_eq!(format_clock(34_200), "09:30");
/// assert_eq!(format_clock(93_600), "26:00");
/// ```
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    let hours = seconds / SECONDS_PER_HOUR;
    let minutes = (seconds % SECONDS_PER_HOUR) / 60;
    format!("{hours:02}:{minutes:02}")
}

/// Inclusive interval `[start, end]` in seconds from midnight.
///
/// Values built through [`TimeWindow::repaired`] or
/// [`TimeWindow::intersect_or_repair`] always satisfy `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    /// Earliest acceptable time.
    pub start: u32,
    /// Latest acceptable time.
    pub end: u32,
}

impl TimeWindow {
    /// The whole day, `[00:00, 24:00]`.
    pub const FULL_DAY: Self = Self {
        start: 0,
        end: SECONDS_PER_DAY,
    };

    /// Construct a window without repair.
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Build a window from raw bounds, repairing missing or inverted input.
    ///
    /// # Examples
    /// ```
    /// use fleetplan_core::clock::{TimeWindow, DEMAND_WINDOW_FALLBACK};
    ///
    /// let inverted = TimeWindow::repaired(Some(50_400), Some(32_400), DEMAND_WINDOW_FALLBACK);
    /// assert_eq!(inverted, TimeWindow::new(50_400, 64_800));
    /// assert_eq!(TimeWindow::repaired(None, Some(1), DEMAND_WINDOW_FALLBACK), TimeWindow::FULL_DAY);
    /// ```
    #[must_use]
    pub fn repaired(start: Option<u32>, end: Option<u32>, fallback: u32) -> Self {
        match (start, end) {
            (Some(start), Some(end)) if start <= end => Self { start, end },
            (Some(start), Some(_)) => Self {
                start,
                end: start.saturating_add(fallback),
            },
            _ => Self::FULL_DAY,
        }
    }

    /// Whether [`TimeWindow::repaired`] would change the raw bounds.
    #[must_use]
    pub fn needs_repair(start: Option<u32>, end: Option<u32>) -> bool {
        !matches!((start, end), (Some(start), Some(end)) if start <= end)
    }

    /// Intersect with a newer window; fall back to a two-hour slot at the
    /// newer window's start when the two do not overlap.
    ///
    /// The returned flag is `true` when the fallback was used.
    #[must_use]
    pub fn intersect_or_repair(self, newer: Self) -> (Self, bool) {
        let start = self.start.max(newer.start);
        let end = self.end.min(newer.end);
        if start <= end {
            (Self { start, end }, false)
        } else {
            let slot = Self {
                start: newer.start,
                end: newer.start.saturating_add(CONFLICT_WINDOW_LENGTH),
            };
            (slot, true)
        }
    }

    /// Whether `time` lies inside the window.
    #[must_use]
    pub const fn contains(&self, time: u32) -> bool {
        self.start <= time && time <= self.end
    }

    /// Seconds by which `time` falls before the start or after the end.
    #[must_use]
    pub const fn violation(&self, time: u32) -> u32 {
        if time < self.start {
            self.start - time
        } else if time > self.end {
            time - self.end
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00:00", 0)]
    #[case("09:00", 32_400)]
    #[case(" 14:05 ", 50_700)]
    #[case("24:00", SECONDS_PER_DAY)]
    fn parses_valid_clocks(#[case] text: &str, #[case] expected: u32) {
        assert_eq!(parse_clock(text), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("9")]
    #[case("ab:cd")]
    #[case("10:60")]
    #[case("48:00")]
    #[case("-1:00")]
    fn rejects_malformed_clocks(#[case] text: &str) {
        assert!(matches!(
            parse_clock(text),
            Err(ClockError::Malformed { .. })
        ));
    }

    #[rstest]
    fn blank_optional_clock_is_none() {
        assert_eq!(parse_optional_clock(None), Ok(None));
        assert_eq!(parse_optional_clock(Some("  ")), Ok(None));
        assert_eq!(parse_optional_clock(Some("08:15")), Ok(Some(29_700)));
    }

    #[rstest]
    fn inverted_window_is_extended_from_start() {
        let window = TimeWindow::repaired(Some(50_400), Some(32_400), DEMAND_WINDOW_FALLBACK);
        assert_eq!(window, TimeWindow::new(50_400, 64_800));
        assert!(window.start <= window.end);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(3_600), None)]
    #[case(None, Some(3_600))]
    fn missing_bound_yields_full_day(#[case] start: Option<u32>, #[case] end: Option<u32>) {
        assert!(TimeWindow::needs_repair(start, end));
        assert_eq!(
            TimeWindow::repaired(start, end, DEMAND_WINDOW_FALLBACK),
            TimeWindow::FULL_DAY
        );
    }

    #[rstest]
    fn overlapping_windows_intersect() {
        let (window, repaired) =
            TimeWindow::new(28_800, 43_200).intersect_or_repair(TimeWindow::new(36_000, 50_400));
        assert_eq!(window, TimeWindow::new(36_000, 43_200));
        assert!(!repaired);
    }

    #[rstest]
    fn disjoint_windows_fall_back_to_two_hours() {
        let (window, repaired) =
            TimeWindow::new(28_800, 32_400).intersect_or_repair(TimeWindow::new(50_400, 54_000));
        assert_eq!(window, TimeWindow::new(50_400, 57_600));
        assert!(repaired);
    }

    #[rstest]
    #[case(100, 0)]
    #[case(50, 50)]
    #[case(260, 60)]
    fn violation_measures_distance_outside(#[case] time: u32, #[case] expected: u32) {
        let window = TimeWindow::new(100, 200);
        assert_eq!(window.violation(time), expected);
    }

    #[rstest]
    fn format_round_trips_whole_minutes() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(64_800), "18:00");
        assert_eq!(parse_clock(&format_clock(45_060)), Ok(45_060));
    }
}
