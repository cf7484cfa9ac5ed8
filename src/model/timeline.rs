use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::calendar::{days_in_month, first_of_month};
use crate::model::PlanPhase;

/// Column granularity of the staff/project timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimelineScale {
    Days,
    #[default]
    Weeks,
    Months,
}

impl TimelineScale {
    pub fn period_width(&self) -> f32 {
        match self {
            TimelineScale::Days => 36.0,
            TimelineScale::Weeks => 90.0,
            TimelineScale::Months => 140.0,
        }
    }
}

/// One column of a timeline header.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    /// First day covered by the column.
    pub date: NaiveDate,
    pub label: String,
    pub width: f32,
}

fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month0() as i32 + months;
    NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1).unwrap_or(date)
}

/// `count` consecutive periods starting at the one containing `anchor`.
/// Weeks align to Monday, months to the 1st.
pub fn build_periods(anchor: NaiveDate, scale: TimelineScale, count: usize) -> Vec<Period> {
    let width = scale.period_width();
    match scale {
        TimelineScale::Days => (0..count as i64)
            .map(|i| {
                let date = anchor + Duration::days(i);
                Period { date, label: date.format("%d").to_string(), width }
            })
            .collect(),
        TimelineScale::Weeks => {
            let start = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
            (0..count as i64)
                .map(|i| {
                    let date = start + Duration::weeks(i);
                    Period { date, label: date.format("W%V %b %d").to_string(), width }
                })
                .collect()
        }
        TimelineScale::Months => {
            let start = first_of_month(anchor);
            (0..count as i32)
                .map(|i| {
                    let date = add_months(start, i);
                    Period { date, label: date.format("%b %Y").to_string(), width }
                })
                .collect()
        }
    }
}

/// Try parsing a date string with several common formats. Datetime strings
/// are cut to their date part.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let s = s.get(..10).filter(|head| s.len() > 10 && head.contains('-')).unwrap_or(s);
    for fmt in &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Zoom levels of the phase planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlannerZoom {
    Day,
    #[default]
    Week,
    Month,
    Quarter,
}

impl PlannerZoom {
    pub fn all() -> &'static [PlannerZoom] {
        &[PlannerZoom::Day, PlannerZoom::Week, PlannerZoom::Month, PlannerZoom::Quarter]
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlannerZoom::Day => "Day",
            PlannerZoom::Week => "Week",
            PlannerZoom::Month => "Month",
            PlannerZoom::Quarter => "Quarter",
        }
    }

    /// Pixels per day; exact for Day/Week zoom.
    pub fn day_width(&self) -> Option<f32> {
        match self {
            PlannerZoom::Day => Some(40.0),
            PlannerZoom::Week => Some(16.0),
            PlannerZoom::Month | PlannerZoom::Quarter => None,
        }
    }

    /// Pixels per calendar month for Month/Quarter zoom.
    pub fn month_width(&self) -> Option<f32> {
        match self {
            PlannerZoom::Month => Some(150.0),
            PlannerZoom::Quarter => Some(60.0),
            PlannerZoom::Day | PlannerZoom::Week => None,
        }
    }

    pub fn zoom_in(self) -> Self {
        match self {
            PlannerZoom::Quarter => PlannerZoom::Month,
            PlannerZoom::Month => PlannerZoom::Week,
            PlannerZoom::Week | PlannerZoom::Day => PlannerZoom::Day,
        }
    }

    pub fn zoom_out(self) -> Self {
        match self {
            PlannerZoom::Day => PlannerZoom::Week,
            PlannerZoom::Week => PlannerZoom::Month,
            PlannerZoom::Month | PlannerZoom::Quarter => PlannerZoom::Quarter,
        }
    }
}

/// Manages the visible window of the phase planner.
#[derive(Debug, Clone)]
pub struct PlannerViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date.
    pub end: NaiveDate,
    pub zoom: PlannerZoom,
}

impl PlannerViewport {
    pub fn new(start: NaiveDate, end: NaiveDate, zoom: PlannerZoom) -> Self {
        let start = match zoom {
            PlannerZoom::Month | PlannerZoom::Quarter => first_of_month(start),
            _ => start,
        };
        Self { start, end: end.max(start), zoom }
    }

    /// Convert a date to an x-pixel offset from the viewport start.
    pub fn date_to_x(&self, date: NaiveDate) -> f32 {
        if let Some(day_w) = self.zoom.day_width() {
            return (date - self.start).num_days() as f32 * day_w;
        }
        let month_w = self.zoom.month_width().unwrap_or(150.0);
        let months = (date.year() - self.start.year()) * 12 + date.month() as i32
            - self.start.month() as i32;
        let frac = (date.day() - 1) as f32 / days_in_month(date.year(), date.month()) as f32;
        (months as f32 + frac) * month_w
    }

    /// Convert an x-pixel offset back to a date.
    pub fn x_to_date(&self, x: f32) -> NaiveDate {
        if let Some(day_w) = self.zoom.day_width() {
            return self.start + Duration::days((x / day_w).round() as i64);
        }
        let month_w = self.zoom.month_width().unwrap_or(150.0);
        let months = (x / month_w).floor();
        let month_start = add_months(first_of_month(self.start), months as i32);
        let frac = x / month_w - months;
        let days = (frac * days_in_month(month_start.year(), month_start.month()) as f32).floor();
        month_start + Duration::days(days as i64)
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f32 {
        self.date_to_x(self.end + Duration::days(1))
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom.zoom_in());
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom.zoom_out());
    }

    pub fn set_zoom(&mut self, zoom: PlannerZoom) {
        *self = Self::new(self.start, self.end, zoom);
    }

    /// Scroll the viewport by a number of days.
    pub fn scroll_days(&mut self, days: i64) {
        self.start += Duration::days(days);
        self.end += Duration::days(days);
    }

    /// Frame the given phases with a margin on each side.
    pub fn fit_to(&mut self, phases: &[PlanPhase]) {
        if let (Some(min), Some(max)) = (
            phases.iter().map(|p| p.start).min(),
            phases.iter().map(|p| p.end).max(),
        ) {
            *self = Self::new(min - Duration::days(7), max + Duration::days(30), self.zoom);
        }
    }

    /// Header columns for the current zoom: days, Monday weeks, months, or
    /// quarters.
    pub fn header_periods(&self) -> Vec<Period> {
        let mut periods = Vec::new();
        match self.zoom {
            PlannerZoom::Day => {
                let mut date = self.start;
                while date <= self.end {
                    periods.push(Period {
                        date,
                        label: date.format("%d").to_string(),
                        width: self.zoom.day_width().unwrap_or(40.0),
                    });
                    date += Duration::days(1);
                }
            }
            PlannerZoom::Week => {
                let mut date = self.start - Duration::days(self.start.weekday().num_days_from_monday() as i64);
                while date <= self.end {
                    periods.push(Period {
                        date,
                        label: date.format("W%V").to_string(),
                        width: 7.0 * self.zoom.day_width().unwrap_or(16.0),
                    });
                    date += Duration::weeks(1);
                }
            }
            PlannerZoom::Month | PlannerZoom::Quarter => {
                let step = if self.zoom == PlannerZoom::Month { 1 } else { 3 };
                let mut date = first_of_month(self.start);
                if step == 3 {
                    date = add_months(date, -(date.month0() as i32 % 3));
                }
                while date <= self.end {
                    let label = if step == 1 {
                        date.format("%b %Y").to_string()
                    } else {
                        format!("Q{} {}", date.month0() / 3 + 1, date.year())
                    };
                    let next = add_months(date, step);
                    periods.push(Period {
                        date,
                        label,
                        width: self.date_to_x(next) - self.date_to_x(date),
                    });
                    date = next;
                }
            }
        }
        periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_periods_align_to_scale() {
        let weeks = build_periods(d(2025, 3, 12), TimelineScale::Weeks, 4);
        assert_eq!(weeks[0].date, d(2025, 3, 10));
        assert_eq!(weeks[3].date, d(2025, 3, 31));

        let months = build_periods(d(2025, 11, 20), TimelineScale::Months, 3);
        let dates: Vec<_> = months.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2025, 11, 1), d(2025, 12, 1), d(2026, 1, 1)]);
        assert_eq!(months[2].label, "Jan 2026");
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2025-03-01"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date("2025-03-01T10:00:00Z"), Some(d(2025, 3, 1)));
        assert_eq!(parse_date("15/06/2025"), Some(d(2025, 6, 15)));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_day_zoom_round_trip() {
        let vp = PlannerViewport::new(d(2025, 3, 1), d(2025, 4, 1), PlannerZoom::Day);
        assert_eq!(vp.date_to_x(d(2025, 3, 6)), 200.0);
        assert_eq!(vp.x_to_date(200.0), d(2025, 3, 6));
        assert_eq!(vp.x_to_date(-40.0), d(2025, 2, 28));
    }

    #[test]
    fn test_month_zoom_positions() {
        let vp = PlannerViewport::new(d(2025, 1, 20), d(2025, 6, 1), PlannerZoom::Month);
        assert_eq!(vp.start, d(2025, 1, 1));
        assert_eq!(vp.date_to_x(d(2025, 3, 1)), 300.0);
        assert_eq!(vp.x_to_date(300.0), d(2025, 3, 1));
        let header = vp.header_periods();
        assert_eq!(header.len(), 6);
        assert!(header.iter().all(|p| (p.width - 150.0).abs() < 1e-3));
    }

    #[test]
    fn test_quarter_header_aligns_to_quarter() {
        let vp = PlannerViewport::new(d(2025, 5, 10), d(2025, 12, 1), PlannerZoom::Quarter);
        let header = vp.header_periods();
        assert_eq!(header[0].date, d(2025, 4, 1));
        assert_eq!(header[0].label, "Q2 2025");
    }

    #[test]
    fn test_zoom_steps_saturate() {
        assert_eq!(PlannerZoom::Day.zoom_in(), PlannerZoom::Day);
        assert_eq!(PlannerZoom::Quarter.zoom_out(), PlannerZoom::Quarter);
        assert_eq!(PlannerZoom::Week.zoom_out(), PlannerZoom::Month);
    }
}
