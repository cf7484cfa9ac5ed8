//! Horizontal placement of date-ranged bars over a row of timeline periods.
//!
//! Records that fall outside the visible periods are clamped onto the first
//! or last column instead of being hidden.

use chrono::NaiveDate;

use crate::model::timeline::{parse_date, Period};

/// Horizontal gap left between adjacent bars.
pub const BAR_GAP: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarLayout {
    pub left: f32,
    pub width: f32,
    pub start_index: usize,
    pub end_index: usize,
}

/// Index of the last period starting on or before `date`, or -1.
fn locate(date: NaiveDate, periods: &[Period]) -> isize {
    let mut found = -1;
    for (i, p) in periods.iter().enumerate() {
        if p.date <= date {
            found = i as isize;
        } else {
            break;
        }
    }
    found
}

/// Place a bar spanning `start..=end`. `None` only if there are no periods.
pub fn layout_bar(start: NaiveDate, end: NaiveDate, periods: &[Period]) -> Option<BarLayout> {
    let last = periods.len().checked_sub(1)? as isize;
    let start_index = locate(start, periods).clamp(0, last) as usize;
    let end_index = locate(end, periods).clamp(0, last) as usize;

    let left: f32 = periods[..start_index].iter().map(|p| p.width).sum();
    let span: f32 = if end_index >= start_index {
        periods[start_index..=end_index].iter().map(|p| p.width).sum()
    } else {
        0.0
    };
    let width = (periods[start_index].width - BAR_GAP).max(span - BAR_GAP);

    Some(BarLayout { left, width, start_index, end_index })
}

/// Same as [`layout_bar`] for raw date strings; malformed dates yield `None`.
pub fn layout_bar_str(start: &str, end: &str, periods: &[Period]) -> Option<BarLayout> {
    layout_bar(parse_date(start)?, parse_date(end)?, periods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::timeline::{build_periods, TimelineScale};
    use pretty_assertions::assert_eq;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn months() -> Vec<Period> {
        // Jan..Jun 2025, 140px each
        build_periods(d(2025, 1, 1), TimelineScale::Months, 6)
    }

    #[test]
    fn test_bar_inside_window() {
        let bar = layout_bar(d(2025, 2, 10), d(2025, 4, 2), &months()).unwrap();
        assert_eq!(
            bar,
            BarLayout { left: 140.0, width: 3.0 * 140.0 - BAR_GAP, start_index: 1, end_index: 3 }
        );
    }

    #[test]
    fn test_single_period_bar_has_minimum_width() {
        let bar = layout_bar(d(2025, 3, 3), d(2025, 3, 4), &months()).unwrap();
        assert_eq!(bar.left, 280.0);
        assert_eq!(bar.width, 140.0 - BAR_GAP);
    }

    #[test]
    fn test_bar_before_window_clamps_to_first_column() {
        let bar = layout_bar(d(2024, 6, 1), d(2024, 8, 1), &months()).unwrap();
        assert_eq!(bar.left, 0.0);
        assert_eq!(bar.start_index, 0);
        assert_eq!(bar.end_index, 0);
        assert_eq!(bar.width, 140.0 - BAR_GAP);
    }

    #[test]
    fn test_bar_after_window_clamps_to_last_column() {
        let bar = layout_bar(d(2026, 1, 1), d(2026, 5, 1), &months()).unwrap();
        assert_eq!(bar.start_index, 5);
        assert_eq!(bar.left, 5.0 * 140.0);
        assert_eq!(bar.width, 140.0 - BAR_GAP);
    }

    #[test]
    fn test_bar_overlapping_window_edges_spans_everything() {
        let bar = layout_bar(d(2024, 12, 1), d(2026, 1, 1), &months()).unwrap();
        assert_eq!(bar.left, 0.0);
        assert_eq!(bar.width, 6.0 * 140.0 - BAR_GAP);
    }

    #[test]
    fn test_reversed_range_falls_back_to_one_column() {
        let bar = layout_bar(d(2025, 5, 1), d(2025, 2, 1), &months()).unwrap();
        assert_eq!(bar.left, 4.0 * 140.0);
        assert_eq!(bar.width, 140.0 - BAR_GAP);
    }

    #[test]
    fn test_empty_periods_and_bad_strings() {
        assert!(layout_bar(d(2025, 1, 1), d(2025, 1, 2), &[]).is_none());
        assert!(layout_bar_str("2025-02-01", "soon", &months()).is_none());
        let bar = layout_bar_str("2025-02-01", "2025-02-28", &months()).unwrap();
        assert_eq!(bar.start_index, 1);
    }
}
