//! Calendar cell grids and task bucketing.
//!
//! Cells are rebuilt on every frame. Today/selected flags compare calendar
//! components, not instants, so the local offset never shifts a marker onto
//! a neighbouring day.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::model::Task;

pub const MONTH_GRID_CELLS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
}

impl CalendarView {
    pub fn label(&self) -> &'static str {
        match self {
            CalendarView::Month => "Month",
            CalendarView::Week => "Week",
            CalendarView::Day => "Day",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Column headers in display order.
    pub fn day_names(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarCell {
    pub date: NaiveDate,
    pub label: String,
    /// False for leading/trailing days that belong to a neighbouring month.
    pub is_valid: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

/// The first day of the week containing `date`.
pub fn week_start_of(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
        WeekStart::Monday => date.weekday().num_days_from_monday(),
    };
    date - Duration::days(offset as i64)
}

fn cell(date: NaiveDate, is_valid: bool, today: NaiveDate, selected: Option<NaiveDate>) -> CalendarCell {
    CalendarCell {
        date,
        label: date.day().to_string(),
        is_valid,
        is_today: is_valid && same_day(date, today),
        is_selected: is_valid && selected.is_some_and(|s| same_day(date, s)),
    }
}

/// Six weeks covering the month of `anchor`, starting on `week_start`.
pub fn build_month_grid(
    anchor: NaiveDate,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    week_start: WeekStart,
) -> Vec<CalendarCell> {
    let first = first_of_month(anchor);
    let grid_start = week_start_of(first, week_start);
    debug_assert_eq!(grid_start.weekday(), week_start.weekday());
    (0..MONTH_GRID_CELLS as i64)
        .map(|i| {
            let date = grid_start + Duration::days(i);
            let in_month = date.year() == first.year() && date.month() == first.month();
            cell(date, in_month, today, selected)
        })
        .collect()
}

/// The seven days of the week containing `anchor`.
pub fn build_week_grid(
    anchor: NaiveDate,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    week_start: WeekStart,
) -> Vec<CalendarCell> {
    let start = week_start_of(anchor, week_start);
    (0..7)
        .map(|i| cell(start + Duration::days(i), true, today, selected))
        .collect()
}

/// Every day of the month of `anchor`.
pub fn build_day_grid(anchor: NaiveDate, today: NaiveDate, selected: Option<NaiveDate>) -> Vec<CalendarCell> {
    let first = first_of_month(anchor);
    let n = days_in_month(first.year(), first.month());
    (0..n as i64)
        .map(|i| cell(first + Duration::days(i), true, today, selected))
        .collect()
}

/// Build the cells for `view`.
pub fn build_grid(
    view: CalendarView,
    anchor: NaiveDate,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    week_start: WeekStart,
) -> Vec<CalendarCell> {
    match view {
        CalendarView::Month => build_month_grid(anchor, today, selected, week_start),
        CalendarView::Week => build_week_grid(anchor, today, selected, week_start),
        CalendarView::Day => build_day_grid(anchor, today, selected),
    }
}

/// Move the anchor by `steps` months, weeks or days. Month steps clamp the
/// day to the length of the target month.
pub fn shift_anchor(anchor: NaiveDate, view: CalendarView, steps: i32) -> NaiveDate {
    match view {
        CalendarView::Month => {
            let months = anchor.year() * 12 + anchor.month0() as i32 + steps;
            let (y, m) = (months.div_euclid(12), months.rem_euclid(12) as u32 + 1);
            let day = anchor.day().min(days_in_month(y, m));
            NaiveDate::from_ymd_opt(y, m, day).unwrap_or(anchor)
        }
        CalendarView::Week => anchor + Duration::weeks(steps as i64),
        CalendarView::Day => anchor + Duration::days(steps as i64),
    }
}

fn local_date(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

/// Tasks created on each cell's date, in input order.
pub fn bucket_by_day<'a>(tasks: &'a [Task], cells: &[CalendarCell], offset: FixedOffset) -> Vec<Vec<&'a Task>> {
    let mut buckets: Vec<Vec<&Task>> = vec![Vec::new(); cells.len()];
    for task in tasks {
        let created = local_date(task.created_at, offset);
        for (i, c) in cells.iter().enumerate() {
            if same_day(c.date, created) {
                buckets[i].push(task);
            }
        }
    }
    buckets
}

/// Tasks created inside each half-open `[start, end)` range.
pub fn bucket_by_range<'a>(
    tasks: &'a [Task],
    ranges: &[(NaiveDate, NaiveDate)],
    offset: FixedOffset,
) -> Vec<Vec<&'a Task>> {
    let mut buckets: Vec<Vec<&Task>> = vec![Vec::new(); ranges.len()];
    for task in tasks {
        let created = local_date(task.created_at, offset);
        for (i, (start, end)) in ranges.iter().enumerate() {
            if created >= *start && created < *end {
                buckets[i].push(task);
            }
        }
    }
    buckets
}

/// `[start, start + 7)` ranges for each row of a month grid.
pub fn week_ranges(cells: &[CalendarCell]) -> Vec<(NaiveDate, NaiveDate)> {
    cells
        .chunks(7)
        .filter_map(|week| week.first())
        .map(|c| (c.date, c.date + Duration::days(7)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn task_at(name: &str, ts: DateTime<Utc>) -> Task {
        Task::new(name, "ana@studio.test", ts)
    }

    #[test]
    fn test_month_grid_has_42_cells_and_month_length_valid() {
        for year in [2023, 2024, 2025, 2100] {
            for month in 1..=12 {
                for ws in [WeekStart::Sunday, WeekStart::Monday] {
                    let grid = build_month_grid(d(year, month, 15), d(2000, 1, 1), None, ws);
                    assert_eq!(grid.len(), MONTH_GRID_CELLS);
                    let valid = grid.iter().filter(|c| c.is_valid).count() as u32;
                    assert_eq!(valid, days_in_month(year, month), "{year}-{month}");
                }
            }
        }
    }

    #[test]
    fn test_month_grid_starts_on_week_start() {
        // 1 March 2025 is a Saturday.
        let grid = build_month_grid(d(2025, 3, 1), d(2025, 3, 1), None, WeekStart::Sunday);
        assert_eq!(grid[0].date, d(2025, 2, 23));
        assert!(!grid[0].is_valid);
        assert_eq!(grid[6].date, d(2025, 3, 1));
        assert!(grid[6].is_valid);

        let grid = build_month_grid(d(2025, 3, 1), d(2025, 3, 1), None, WeekStart::Monday);
        assert_eq!(grid[0].date, d(2025, 2, 24));
        assert_eq!(grid[5].date, d(2025, 3, 1));
    }

    #[test]
    fn test_today_and_selected_flags() {
        let today = d(2025, 3, 12);
        let grid = build_month_grid(today, today, Some(d(2025, 3, 20)), WeekStart::Sunday);
        let todays: Vec<_> = grid.iter().filter(|c| c.is_today).collect();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].date, today);
        let selected: Vec<_> = grid.iter().filter(|c| c.is_selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "20");
    }

    #[test]
    fn test_out_of_month_cells_carry_no_markers() {
        // 28 Feb is shown as a leading cell of the March grid.
        let grid = build_month_grid(d(2025, 3, 5), d(2025, 2, 28), Some(d(2025, 2, 28)), WeekStart::Sunday);
        assert!(grid.iter().all(|c| !c.is_today && !c.is_selected));
    }

    #[test]
    fn test_week_and_day_grids() {
        let week = build_week_grid(d(2025, 3, 12), d(2025, 3, 12), None, WeekStart::Monday);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, d(2025, 3, 10));
        assert!(week.iter().all(|c| c.is_valid));

        let days = build_day_grid(d(2024, 2, 10), d(2024, 2, 29), None);
        assert_eq!(days.len(), 29);
        assert!(days[28].is_today);
    }

    #[test]
    fn test_shift_anchor_clamps_day() {
        assert_eq!(shift_anchor(d(2025, 1, 31), CalendarView::Month, 1), d(2025, 2, 28));
        assert_eq!(shift_anchor(d(2025, 1, 15), CalendarView::Month, -1), d(2024, 12, 15));
        assert_eq!(shift_anchor(d(2025, 1, 15), CalendarView::Week, 2), d(2025, 1, 29));
        assert_eq!(shift_anchor(d(2025, 1, 15), CalendarView::Day, -15), d(2024, 12, 31));
    }

    #[test]
    fn test_bucket_by_day_uses_local_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let tasks = vec![
            task_at("late", Utc.with_ymd_and_hms(2025, 3, 4, 23, 30, 0).unwrap()),
            task_at("early", Utc.with_ymd_and_hms(2025, 3, 5, 8, 0, 0).unwrap()),
        ];
        let cells = build_week_grid(d(2025, 3, 4), d(2025, 3, 4), None, WeekStart::Sunday);
        let tue = cells.iter().position(|c| c.date == d(2025, 3, 4)).unwrap();

        let by_utc = bucket_by_day(&tasks, &cells, utc);
        assert_eq!(by_utc[tue].len(), 1);
        assert_eq!(by_utc[tue + 1].len(), 1);

        let by_local = bucket_by_day(&tasks, &cells, plus_two);
        assert_eq!(by_local[tue].len(), 0);
        let names: Vec<_> = by_local[tue + 1].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["late", "early"]);
    }

    #[test]
    fn test_bucket_by_week_ranges() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let grid = build_month_grid(d(2025, 3, 1), d(2025, 3, 1), None, WeekStart::Sunday);
        let ranges = week_ranges(&grid);
        assert_eq!(ranges.len(), 6);
        let tasks = vec![
            task_at("a", Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
            task_at("b", Utc.with_ymd_and_hms(2025, 3, 2, 12, 0, 0).unwrap()),
            task_at("c", Utc.with_ymd_and_hms(2025, 5, 2, 12, 0, 0).unwrap()),
        ];
        let buckets = bucket_by_range(&tasks, &ranges, utc);
        assert_eq!(buckets[0].len(), 1);
        assert_eq!(buckets[1].len(), 1);
        assert_eq!(buckets.iter().map(Vec::len).sum::<usize>(), 2);
    }
}
