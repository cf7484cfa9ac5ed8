use chrono::{Duration, NaiveDate};
use egui::{Color32, Pos2, Rect, RichText, Rounding, Sense, Stroke, Ui, Vec2};

use crate::model::bar_layout::{layout_bar_str, BarLayout};
use crate::model::timeline::{build_periods, Period};
use crate::model::{Project, TimelineScale};
use crate::ui::theme;

const LABEL_WIDTH: f32 = 200.0;
const PERIOD_COUNT: usize = 18;

#[derive(Debug, Clone)]
pub struct TimelineState {
    pub scale: TimelineScale,
    pub anchor: NaiveDate,
}

impl TimelineState {
    pub fn new(today: NaiveDate) -> Self {
        Self { scale: TimelineScale::default(), anchor: today - Duration::weeks(2) }
    }

    fn step(&self) -> Duration {
        match self.scale {
            TimelineScale::Days => Duration::days(7),
            TimelineScale::Weeks => Duration::weeks(4),
            TimelineScale::Months => Duration::days(91),
        }
    }
}

struct Row {
    label: String,
    sub: String,
    /// Raw date strings; empty when the record has no date.
    start: String,
    end: String,
    color: Color32,
    is_project: bool,
}

impl Row {
    fn bar(&self, periods: &[Period]) -> Option<BarLayout> {
        layout_bar_str(&self.start, &self.end, periods)
    }
}

/// Render the staff/project timeline tab.
pub fn show_timeline(state: &mut TimelineState, projects: &[Project], today: NaiveDate, ui: &mut Ui) {
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        if ui.button(egui_phosphor::regular::CARET_LEFT).clicked() {
            state.anchor -= state.step();
        }
        if ui.button("Today").clicked() {
            state.anchor = today - Duration::weeks(2);
        }
        if ui.button(egui_phosphor::regular::CARET_RIGHT).clicked() {
            state.anchor += state.step();
        }
        ui.add_space(8.0);
        ui.label(RichText::new("Studio timeline").strong().size(16.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            for (scale, label) in [
                (TimelineScale::Months, "Months"),
                (TimelineScale::Weeks, "Weeks"),
                (TimelineScale::Days, "Days"),
            ] {
                ui.selectable_value(&mut state.scale, scale, label);
            }
        });
    });
    ui.add_space(4.0);

    let periods = build_periods(state.anchor, state.scale, PERIOD_COUNT);
    let rows = collect_rows(projects);
    let grid_width: f32 = periods.iter().map(|p| p.width).sum();
    let height = theme::HEADER_HEIGHT + rows.len() as f32 * (theme::ROW_HEIGHT + theme::ROW_GAP) + 20.0;

    egui::ScrollArea::both()
        .id_salt("timeline_scroll")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(LABEL_WIDTH + grid_width, height), Sense::hover());
            let origin = response.rect.min;
            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            draw_header(&painter, origin, &periods, today);

            for (i, row) in rows.iter().enumerate() {
                let y = origin.y + theme::HEADER_HEIGHT + i as f32 * (theme::ROW_HEIGHT + theme::ROW_GAP);
                let row_rect = Rect::from_min_size(
                    Pos2::new(origin.x, y),
                    Vec2::new(LABEL_WIDTH + grid_width, theme::ROW_HEIGHT + theme::ROW_GAP),
                );
                painter.rect_filled(row_rect, 0.0, if i % 2 == 0 { theme::BG_PANEL } else { theme::BG_DARK });

                let indent = if row.is_project { 8.0 } else { 22.0 };
                painter.text(
                    Pos2::new(origin.x + indent, y + theme::ROW_HEIGHT / 2.0),
                    egui::Align2::LEFT_CENTER,
                    &row.label,
                    if row.is_project { theme::font_header() } else { theme::font_sub() },
                    if row.is_project { theme::TEXT_PRIMARY } else { theme::TEXT_SECONDARY },
                );

                let grid_x = origin.x + LABEL_WIDTH;
                let Some(bar) = row.bar(&periods) else {
                    painter.text(
                        Pos2::new(grid_x + 8.0, y + theme::ROW_HEIGHT / 2.0),
                        egui::Align2::LEFT_CENTER,
                        "—",
                        theme::font_sub(),
                        theme::TEXT_DIM,
                    );
                    continue;
                };
                let rect = bar_rect(bar, grid_x, y);
                painter.rect_filled(rect, Rounding::same(theme::BAR_ROUNDING), row.color);
                let clipped = painter.with_clip_rect(rect);
                clipped.text(
                    Pos2::new(rect.left() + 6.0, rect.center().y),
                    egui::Align2::LEFT_CENTER,
                    &row.sub,
                    theme::font_small(),
                    theme::TEXT_ON_BAR,
                );
                let hover = ui.interact(rect, ui.id().with(("timeline-bar", i)), Sense::hover());
                hover.on_hover_text(format!("{}\n{} → {}", row.label, row.start, row.end));
            }

            painter.line_segment(
                [
                    Pos2::new(origin.x + LABEL_WIDTH, origin.y),
                    Pos2::new(origin.x + LABEL_WIDTH, origin.y + height),
                ],
                Stroke::new(1.0, theme::BORDER_SUBTLE),
            );
        });
}

fn collect_rows(projects: &[Project]) -> Vec<Row> {
    let mut rows = Vec::new();
    for (i, project) in projects.iter().enumerate() {
        let color = theme::TASK_COLORS[i % theme::TASK_COLORS.len()];
        rows.push(Row {
            label: project.name.clone(),
            sub: project.status.label().to_string(),
            start: project.start.map(|d| d.to_string()).unwrap_or_default(),
            end: project.end.map(|d| d.to_string()).unwrap_or_default(),
            color,
            is_project: true,
        });
        for assignment in &project.team {
            rows.push(Row {
                label: assignment.staff.clone(),
                sub: assignment.role.clone(),
                start: assignment.start.clone(),
                end: assignment.end.clone(),
                color: color.gamma_multiply(0.7),
                is_project: false,
            });
        }
    }
    rows
}

fn bar_rect(bar: BarLayout, grid_x: f32, y: f32) -> Rect {
    Rect::from_min_size(
        Pos2::new(grid_x + bar.left + 2.0, y + theme::BAR_INSET + 2.0),
        Vec2::new(bar.width, theme::ROW_HEIGHT - 2.0 * (theme::BAR_INSET + 2.0)),
    )
}

fn draw_header(painter: &egui::Painter, origin: Pos2, periods: &[Period], today: NaiveDate) {
    let total: f32 = periods.iter().map(|p| p.width).sum();
    painter.rect_filled(
        Rect::from_min_size(origin, Vec2::new(LABEL_WIDTH + total, theme::HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    let mut x = origin.x + LABEL_WIDTH;
    for (i, period) in periods.iter().enumerate() {
        painter.line_segment(
            [Pos2::new(x, origin.y + theme::HEADER_HEIGHT), Pos2::new(x, origin.y + 2000.0)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        let next = periods.get(i + 1).map(|p| p.date);
        let is_current = period.date <= today && next.map_or(true, |n| today < n);
        painter.text(
            Pos2::new(x + 4.0, origin.y + theme::HEADER_HEIGHT / 2.0),
            egui::Align2::LEFT_CENTER,
            &period.label,
            theme::font_sub(),
            if is_current { theme::TODAY_LINE } else { theme::TEXT_SECONDARY },
        );
        x += period.width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Assignment;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_rows_without_readable_dates_get_no_bar() {
        let mut loft = Project::new("Harbour Loft");
        loft.start = Some(d(2025, 3, 3));
        loft.end = Some(d(2025, 4, 25));
        loft.team = vec![
            Assignment { staff: "Ana".into(), role: "Lead".into(), start: "2025-03-10".into(), end: "2025-03-28".into() },
            Assignment { staff: "Ben".into(), role: "Buyer".into(), start: "next week".into(), end: "2025-04-01".into() },
        ];
        let undated = Project::new("Cafe refit");

        let periods = build_periods(d(2025, 3, 3), TimelineScale::Weeks, 8);
        let rows = collect_rows(&[loft, undated]);
        let bars: Vec<_> = rows.iter().map(|r| (r.label.as_str(), r.bar(&periods).is_some())).collect();
        assert_eq!(
            bars,
            vec![("Harbour Loft", true), ("Ana", true), ("Ben", false), ("Cafe refit", false)]
        );

        let ana = rows[1].bar(&periods).unwrap();
        assert_eq!((ana.start_index, ana.end_index), (1, 3));
    }
}
