use chrono::{Datelike, FixedOffset, NaiveDate};
use egui::{Color32, RichText, Sense, Ui};

use crate::model::calendar::{
    bucket_by_day, bucket_by_range, build_grid, shift_anchor, week_ranges, CalendarCell, CalendarView, WeekStart,
};
use crate::model::{Project, Task};
use crate::model::project::project_name;
use crate::ui::theme;

const MAX_CHIPS: usize = 3;

/// Transient selection state of the calendar tab.
#[derive(Debug, Clone)]
pub struct CalendarState {
    pub view: CalendarView,
    pub anchor: NaiveDate,
    pub selected: Option<NaiveDate>,
}

impl CalendarState {
    pub fn new(view: CalendarView, today: NaiveDate) -> Self {
        Self { view, anchor: today, selected: Some(today) }
    }
}

pub enum CalendarAction {
    None,
    ViewChanged(CalendarView),
}

/// Render the calendar tab.
pub fn show_calendar(
    state: &mut CalendarState,
    tasks: &[Task],
    projects: &[Project],
    week_start: WeekStart,
    today: NaiveDate,
    offset: FixedOffset,
    ui: &mut Ui,
) -> CalendarAction {
    let mut action = CalendarAction::None;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        if ui.button(egui_phosphor::regular::CARET_LEFT).clicked() {
            state.anchor = shift_anchor(state.anchor, state.view, -1);
        }
        if ui.button("Today").clicked() {
            state.anchor = today;
            state.selected = Some(today);
        }
        if ui.button(egui_phosphor::regular::CARET_RIGHT).clicked() {
            state.anchor = shift_anchor(state.anchor, state.view, 1);
        }
        ui.add_space(8.0);
        let title = match state.view {
            CalendarView::Month | CalendarView::Day => state.anchor.format("%B %Y").to_string(),
            CalendarView::Week => format!("Week of {}", state.anchor.format("%d %b %Y")),
        };
        ui.label(RichText::new(title).strong().size(16.0));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            for view in [CalendarView::Day, CalendarView::Week, CalendarView::Month] {
                if ui.selectable_label(state.view == view, view.label()).clicked() && state.view != view {
                    state.view = view;
                    action = CalendarAction::ViewChanged(view);
                }
            }
        });
    });
    ui.add_space(4.0);
    ui.separator();

    let cells = build_grid(state.view, state.anchor, today, state.selected, week_start);
    let buckets = bucket_by_day(tasks, &cells, offset);

    match state.view {
        CalendarView::Month => {
            let weekly = bucket_by_range(tasks, &week_ranges(&cells), offset);
            show_month(state, &cells, &buckets, &weekly, week_start, ui);
        }
        CalendarView::Week => show_week(state, &cells, &buckets, week_start, ui),
        CalendarView::Day => show_days(state, &cells, &buckets, ui),
    }

    if let Some(selected) = state.selected {
        ui.add_space(6.0);
        ui.separator();
        let created: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.created_at.with_timezone(&offset).date_naive() == selected)
            .collect();
        ui.label(
            RichText::new(format!("Created on {}", selected.format("%A %d %B")))
                .strong()
                .color(theme::TEXT_SECONDARY),
        );
        if created.is_empty() {
            ui.label(RichText::new("No tasks").color(theme::TEXT_DIM));
        }
        for task in created {
            ui.horizontal(|ui| {
                task_chip(ui, task);
                ui.label(RichText::new(project_name(projects, task.project_id)).size(11.0).color(theme::TEXT_DIM));
            });
        }
    }

    action
}

fn show_month(
    state: &mut CalendarState,
    cells: &[CalendarCell],
    buckets: &[Vec<&Task>],
    weekly: &[Vec<&Task>],
    week_start: WeekStart,
    ui: &mut Ui,
) {
    let week_col = 48.0;
    let col_w = ((ui.available_width() - week_col) / 7.0 - 6.0).max(60.0);
    egui::Grid::new("month_grid")
        .num_columns(8)
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            for name in week_start.day_names() {
                ui.label(RichText::new(name).size(11.0).color(theme::TEXT_DIM).strong());
            }
            ui.label(RichText::new("Week").size(11.0).color(theme::TEXT_DIM).strong());
            ui.end_row();

            for (row, week) in cells.chunks(7).enumerate() {
                for (col, cell) in week.iter().enumerate() {
                    let idx = row * 7 + col;
                    day_cell(state, cell, &buckets[idx], egui::vec2(col_w, 84.0), ui);
                }
                let count = weekly.get(row).map(Vec::len).unwrap_or(0);
                ui.label(RichText::new(count.to_string()).size(11.0).color(theme::TEXT_DIM));
                ui.end_row();
            }
        });
}

fn show_week(state: &mut CalendarState, cells: &[CalendarCell], buckets: &[Vec<&Task>], week_start: WeekStart, ui: &mut Ui) {
    let col_w = (ui.available_width() / 7.0 - 6.0).max(80.0);
    egui::Grid::new("week_grid")
        .num_columns(7)
        .spacing([4.0, 4.0])
        .show(ui, |ui| {
            for (name, cell) in week_start.day_names().iter().zip(cells) {
                ui.label(RichText::new(format!("{} {}", name, cell.date.day())).size(11.0).color(theme::TEXT_DIM).strong());
            }
            ui.end_row();
            for (cell, bucket) in cells.iter().zip(buckets) {
                day_cell(state, cell, bucket, egui::vec2(col_w, 260.0), ui);
            }
            ui.end_row();
        });
}

fn show_days(state: &mut CalendarState, cells: &[CalendarCell], buckets: &[Vec<&Task>], ui: &mut Ui) {
    egui::ScrollArea::horizontal().id_salt("day_strip").show(ui, |ui| {
        ui.horizontal(|ui| {
            for (cell, bucket) in cells.iter().zip(buckets) {
                let label = format!("{}\n{}", cell.date.format("%a"), cell.label);
                let mut text = RichText::new(label).size(11.0);
                if cell.is_today {
                    text = text.color(theme::TODAY_LINE).strong();
                }
                let resp = ui.add_sized([38.0, 40.0], egui::SelectableLabel::new(cell.is_selected, text));
                if resp.clicked() {
                    state.selected = Some(cell.date);
                    state.anchor = cell.date;
                }
                if !bucket.is_empty() {
                    resp.on_hover_text(format!("{} task(s)", bucket.len()));
                }
            }
        });
    });
}

fn day_cell(state: &mut CalendarState, cell: &CalendarCell, tasks: &[&Task], size: egui::Vec2, ui: &mut Ui) {
    let fill = if cell.is_selected {
        theme::BG_SELECTED
    } else if cell.is_valid {
        theme::BG_PANEL
    } else {
        theme::BG_CELL_INVALID
    };
    let stroke = if cell.is_today {
        egui::Stroke::new(1.5, theme::TODAY_LINE)
    } else {
        egui::Stroke::new(1.0, theme::BORDER_SUBTLE)
    };
    let resp = egui::Frame::default()
        .fill(fill)
        .stroke(stroke)
        .rounding(egui::Rounding::same(4.0))
        .inner_margin(egui::Margin::same(4.0))
        .show(ui, |ui| {
            ui.set_min_size(size);
            ui.set_max_width(size.x);
            let color = if cell.is_valid { theme::TEXT_PRIMARY } else { theme::TEXT_DIM };
            ui.label(RichText::new(&cell.label).size(11.0).color(color));
            for task in tasks.iter().take(MAX_CHIPS) {
                task_chip(ui, task);
            }
            if tasks.len() > MAX_CHIPS {
                ui.label(RichText::new(format!("+{} more", tasks.len() - MAX_CHIPS)).size(10.0).color(theme::TEXT_DIM));
            }
        })
        .response;
    if ui.interact(resp.rect, ui.id().with(("cell", cell.date)), Sense::click()).clicked() {
        state.selected = Some(cell.date);
        if cell.is_valid {
            state.anchor = cell.date;
        }
    }
}

fn task_chip(ui: &mut Ui, task: &Task) {
    let color = theme::priority_color(task.priority);
    ui.horizontal(|ui| {
        let (dot, _) = ui.allocate_exact_size(egui::vec2(6.0, 6.0), Sense::hover());
        ui.painter().circle_filled(dot.center(), 3.0, color);
        let text = if task.completed {
            RichText::new(&task.name).strikethrough().color(theme::TEXT_DIM)
        } else {
            RichText::new(&task.name).color(Color32::WHITE)
        };
        ui.add(egui::Label::new(text.size(10.5)).truncate());
    });
}
