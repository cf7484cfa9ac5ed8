use chrono::NaiveDate;
use egui::{Color32, Pos2, Rect, Response, Rounding, Sense, Stroke, Ui, Vec2};
use uuid::Uuid;

use crate::model::drag::{DragEngine, DragMode, DragOutcome};
use crate::model::{Plan, PlanPhase, PlannerViewport, PlannerZoom};
use crate::ui::theme;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;

/// Plan being edited in the planner tab.
pub struct PlannerState {
    pub project_id: Option<Uuid>,
    pub plan: Option<Plan>,
    /// Unsaved changes since the last load or save.
    pub dirty: bool,
    pub viewport: PlannerViewport,
    pub drag: DragEngine,
    pub selected_phase: Option<Uuid>,
}

impl PlannerState {
    pub fn new(today: NaiveDate, zoom: PlannerZoom) -> Self {
        Self {
            project_id: None,
            plan: None,
            dirty: false,
            viewport: PlannerViewport::new(today - chrono::Duration::days(7), today + chrono::Duration::days(60), zoom),
            drag: DragEngine::new(),
            selected_phase: None,
        }
    }

    /// Replace the edited plan and frame its phases.
    pub fn load(&mut self, plan: Plan) {
        self.viewport.fit_to(&plan.phases);
        self.project_id = Some(plan.project_id);
        self.plan = Some(plan);
        self.dirty = false;
        self.selected_phase = None;
        self.drag = DragEngine::new();
    }
}

/// What happened in the chart this frame.
#[derive(Debug, Clone, Default)]
pub struct ChartInteraction {
    /// Phase dates moved during a drag.
    pub changed: bool,
    /// A drag finished on this phase; the plan needs saving.
    pub committed: Option<Uuid>,
    pub zoom_changed: bool,
}

/// Render the phase chart (right panel of the planner tab).
pub fn show_planner_chart(
    phases: &mut [PlanPhase],
    viewport: &mut PlannerViewport,
    engine: &mut DragEngine,
    selected: &mut Option<Uuid>,
    today: NaiveDate,
    ui: &mut Ui,
) -> ChartInteraction {
    let mut interaction = ChartInteraction::default();
    let available = ui.available_size();

    if ui.rect_contains_pointer(ui.max_rect()) && ui.input(|i| i.modifiers.ctrl) {
        let scroll = ui.input(|i| i.smooth_scroll_delta.y);
        let before = viewport.zoom;
        if scroll > 0.0 {
            viewport.zoom_in();
        } else if scroll < 0.0 {
            viewport.zoom_out();
        }
        interaction.zoom_changed = viewport.zoom != before;
    }

    let chart_width = viewport.total_width().max(available.x);
    let chart_height = HEADER_HEIGHT + phases.len() as f32 * (ROW_HEIGHT + ROW_PADDING) + 40.0;

    egui::ScrollArea::both()
        .id_salt("planner_chart")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) =
                ui.allocate_painter(Vec2::new(chart_width, chart_height.max(available.y)), Sense::click());
            let origin = response.rect.min;
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);
            draw_header(&painter, origin, viewport, chart_width);
            draw_rows(&painter, origin, phases.len(), chart_width);
            draw_today_line(&painter, origin, viewport, today, chart_height);

            for i in 0..phases.len() {
                let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING) + ROW_PADDING;
                let is_selected = *selected == Some(phases[i].id);
                let bar_rect = draw_phase_bar(&painter, origin, viewport, &phases[i], y, is_selected);
                let id = phases[i].id;

                let bar = ui.interact(bar_rect, ui.make_persistent_id(("phase-bar", id)), Sense::click_and_drag());
                let left = ui.interact(
                    handle_rect(bar_rect, bar_rect.left()),
                    ui.make_persistent_id(("phase-resize-left", id)),
                    Sense::drag(),
                );
                let right = ui.interact(
                    handle_rect(bar_rect, bar_rect.right()),
                    ui.make_persistent_id(("phase-resize-right", id)),
                    Sense::drag(),
                );

                if bar.clicked() {
                    *selected = Some(id);
                    consumed_click = true;
                }

                for (resp, mode) in [
                    (&left, DragMode::ResizeStart),
                    (&right, DragMode::ResizeEnd),
                    (&bar, DragMode::Move),
                ] {
                    if resp.drag_started() && !engine.is_active() {
                        if let Some(pos) = resp.interact_pointer_pos() {
                            engine.begin(&phases[i], mode, pos.x);
                            *selected = Some(id);
                            consumed_click = true;
                        }
                    }
                }

                if engine.phase_id() == Some(id) {
                    let dragging = [&left, &right, &bar].into_iter().find(|r| r.dragged());
                    if let Some(pos) = dragging.and_then(Response::interact_pointer_pos) {
                        let cursor = match engine.mode() {
                            Some(DragMode::Move) => egui::CursorIcon::Grabbing,
                            _ => egui::CursorIcon::ResizeHorizontal,
                        };
                        ui.ctx().set_cursor_icon(cursor);
                        if engine.update(phases, pos.x, viewport.zoom) == DragOutcome::Applied {
                            interaction.changed = true;
                        }
                    }
                    if left.drag_stopped() || right.drag_stopped() || bar.drag_stopped() {
                        interaction.committed = engine.end();
                    }
                }

                let phase = &phases[i];
                if is_selected || left.hovered() || right.hovered() {
                    if left.hovered() || right.hovered() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                    } else if bar.hovered() {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                    draw_handles(&painter, bar_rect);
                }

                if !engine.is_active() && (bar.hovered() || left.hovered() || right.hovered()) {
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        egui::Id::new(("phase-tip", id)),
                        |ui| {
                            ui.strong(&phase.name);
                            ui.label(format!("{} → {}", phase.start.format("%d/%m/%Y"), phase.end.format("%d/%m/%Y")));
                            if !phase.owner.is_empty() {
                                ui.label(format!("Owner: {}", phase.owner));
                            }
                            ui.label(format!("Progress: {}%", (phase.progress * 100.0).round() as i32));
                            ui.label(format!("Risk: {}", phase.risk.label()));
                        },
                    );
                }
            }

            if let Some(pos) = response.hover_pos().filter(|_| !engine.is_active()) {
                let date = viewport.x_to_date(pos.x - origin.x);
                painter.text(
                    Pos2::new(pos.x + 6.0, origin.y + HEADER_HEIGHT - 8.0),
                    egui::Align2::LEFT_CENTER,
                    date.format("%a %d %b").to_string(),
                    theme::font_small(),
                    theme::TEXT_DIM,
                );
            }

            // Pointer released outside any bar.
            if engine.is_active() && !ui.input(|i| i.pointer.any_down()) {
                interaction.committed = engine.end();
            }

            if response.clicked() && !consumed_click {
                *selected = None;
            }
        });

    interaction
}

fn handle_rect(bar_rect: Rect, x: f32) -> Rect {
    Rect::from_min_max(
        Pos2::new(x - HANDLE_WIDTH * 0.5, bar_rect.top()),
        Pos2::new(x + HANDLE_WIDTH * 0.5, bar_rect.bottom()),
    )
    .expand(4.0)
}

fn draw_handles(painter: &egui::Painter, bar_rect: Rect) {
    let handle_h = bar_rect.height() * 0.55;
    let handle_y = bar_rect.center().y - handle_h / 2.0;
    let lh = Rect::from_min_size(Pos2::new(bar_rect.left() - 1.5, handle_y), Vec2::new(4.0, handle_h));
    let rh = Rect::from_min_size(Pos2::new(bar_rect.right() - 2.5, handle_y), Vec2::new(4.0, handle_h));
    painter.rect_filled(lh, Rounding::same(2.0), theme::HANDLE_COLOR);
    painter.rect_filled(rh, Rounding::same(2.0), theme::HANDLE_COLOR);
}

fn draw_rows(painter: &egui::Painter, origin: Pos2, count: usize, width: f32) {
    for i in 0..count {
        let y = origin.y + HEADER_HEIGHT + i as f32 * (ROW_HEIGHT + ROW_PADDING);
        let fill = if i % 2 == 0 { theme::BG_PANEL } else { theme::BG_DARK };
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(origin.x, y), Vec2::new(width, ROW_HEIGHT + ROW_PADDING)),
            0.0,
            fill,
        );
        painter.line_segment(
            [
                Pos2::new(origin.x, y + ROW_HEIGHT + ROW_PADDING),
                Pos2::new(origin.x + width, y + ROW_HEIGHT + ROW_PADDING),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );
    }
}

fn draw_header(painter: &egui::Painter, origin: Pos2, viewport: &PlannerViewport, width: f32) {
    painter.rect_filled(Rect::from_min_size(origin, Vec2::new(width, HEADER_HEIGHT)), 0.0, theme::BG_HEADER);
    painter.line_segment(
        [
            Pos2::new(origin.x, origin.y + HEADER_HEIGHT),
            Pos2::new(origin.x + width, origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let mut last_month = None;
    for period in viewport.header_periods() {
        let x = origin.x + viewport.date_to_x(period.date);
        painter.line_segment(
            [Pos2::new(x, origin.y + HEADER_HEIGHT), Pos2::new(x, origin.y + 2000.0)],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        painter.text(
            Pos2::new(x + 3.0, origin.y + 28.0),
            egui::Align2::LEFT_CENTER,
            &period.label,
            theme::font_sub(),
            theme::TEXT_SECONDARY,
        );
        let month = period.date.format("%b %Y").to_string();
        if last_month.as_ref() != Some(&month) {
            painter.text(
                Pos2::new(x + 3.0, origin.y + 12.0),
                egui::Align2::LEFT_CENTER,
                &month,
                theme::font_header(),
                theme::TEXT_PRIMARY,
            );
            last_month = Some(month);
        }
    }
}

fn draw_today_line(painter: &egui::Painter, origin: Pos2, viewport: &PlannerViewport, today: NaiveDate, height: f32) {
    if today < viewport.start || today > viewport.end {
        return;
    }
    let x = origin.x + viewport.date_to_x(today);
    painter.line_segment(
        [Pos2::new(x, origin.y + HEADER_HEIGHT), Pos2::new(x, origin.y + height)],
        Stroke::new(1.5, theme::TODAY_LINE),
    );
    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(Pos2::new(x - badge_w / 2.0, origin.y + HEADER_HEIGHT - 1.0), Vec2::new(badge_w, 14.0));
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(badge_rect.center(), egui::Align2::CENTER_CENTER, "Today", theme::font_small(), Color32::WHITE);
}

fn draw_phase_bar(
    painter: &egui::Painter,
    origin: Pos2,
    viewport: &PlannerViewport,
    phase: &PlanPhase,
    y: f32,
    is_selected: bool,
) -> Rect {
    let x_start = origin.x + viewport.date_to_x(phase.start);
    let x_end = origin.x + viewport.date_to_x(phase.end + chrono::Duration::days(1));
    let bar_width = (x_end - x_start).max(6.0);
    let inset = theme::BAR_INSET;

    let bar_rect = Rect::from_min_size(Pos2::new(x_start, y + inset), Vec2::new(bar_width, ROW_HEIGHT - inset * 2.0));
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    painter.rect_filled(bar_rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(bar_rect, rounding, phase.color);
    painter.rect_filled(
        Rect::from_min_size(bar_rect.min, Vec2::new(bar_width, (bar_rect.height() * 0.45).max(4.0))),
        Rounding { nw: theme::BAR_ROUNDING, ne: theme::BAR_ROUNDING, sw: 0.0, se: 0.0 },
        Color32::from_white_alpha(25),
    );

    if phase.progress > 0.0 {
        let progress_width = bar_width * phase.progress.clamp(0.0, 1.0);
        painter.rect_filled(
            Rect::from_min_size(bar_rect.min, Vec2::new(progress_width, bar_rect.height())),
            rounding,
            theme::PROGRESS_OVERLAY,
        );
        if phase.progress < 0.98 {
            let tick_x = bar_rect.left() + progress_width;
            painter.line_segment(
                [Pos2::new(tick_x, bar_rect.top() + 2.0), Pos2::new(tick_x, bar_rect.bottom() - 2.0)],
                Stroke::new(1.0, Color32::from_white_alpha(60)),
            );
        }
    }

    // Risk marker in the top-right corner.
    painter.circle_filled(
        Pos2::new(bar_rect.right() - 5.0, bar_rect.top() + 5.0),
        2.5,
        theme::risk_color(phase.risk),
    );

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if bar_width > 30.0 {
        let galley = painter.layout_no_wrap(phase.name.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = y + inset + (bar_rect.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(bar_rect)
            .galley(Pos2::new(bar_rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }

    bar_rect
}
