use chrono::{DateTime, FixedOffset, Utc};
use egui::{Color32, RichText, Ui};
use uuid::Uuid;

use crate::model::project::project_name;
use crate::model::tracking::format_duration;
use crate::model::{Project, Task};
use crate::ui::theme;

/// Requests from the time-tracking tab. The app applies them and persists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackingAction {
    None,
    Select(Uuid),
    Start(Uuid),
    Pause(Uuid),
    Resume(Uuid),
    Stop(Uuid),
    ToggleCompleted(Uuid),
    Adjust { task: Uuid, session: Uuid, minutes: i64 },
}

#[derive(Debug, Clone)]
pub struct TrackingState {
    pub selected: Option<Uuid>,
    pub adjust_minutes: i64,
    pub show_completed: bool,
}

impl Default for TrackingState {
    fn default() -> Self {
        Self { selected: None, adjust_minutes: 15, show_completed: false }
    }
}

/// Render the time-tracking tab.
pub fn show_time_tracking(
    state: &mut TrackingState,
    tasks: &[Task],
    projects: &[Project],
    now: DateTime<Utc>,
    offset: FixedOffset,
    ui: &mut Ui,
) -> TrackingAction {
    let mut action = TrackingAction::None;

    egui::SidePanel::left("tracking_tasks")
        .default_width(theme::SIDE_PANEL_WIDTH)
        .resizable(true)
        .frame(
            egui::Frame::default()
                .fill(theme::BG_PANEL)
                .inner_margin(egui::Margin::same(8.0))
                .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE)),
        )
        .show_inside(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("My tasks").strong().size(15.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.checkbox(&mut state.show_completed, "Done");
                });
            });
            ui.add_space(4.0);
            egui::ScrollArea::vertical().id_salt("tracking_list").show(ui, |ui| {
                for task in tasks.iter().filter(|t| state.show_completed || !t.completed) {
                    let is_selected = state.selected == Some(task.id);
                    let resp = egui::Frame::default()
                        .fill(if is_selected { theme::BG_SELECTED } else { theme::BG_DARK })
                        .rounding(egui::Rounding::same(4.0))
                        .inner_margin(egui::Margin::symmetric(6.0, 4.0))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                let (dot, _) = ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                                ui.painter().circle_filled(dot.center(), 3.0, theme::priority_color(task.priority));
                                ui.add(egui::Label::new(RichText::new(&task.name).size(12.0)).truncate());
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    let color = if task.is_running() { theme::SUCCESS } else { theme::TEXT_DIM };
                                    ui.label(
                                        RichText::new(format_duration(task.running_total(now)))
                                            .font(theme::font_sub())
                                            .color(color),
                                    );
                                });
                            });
                            ui.label(
                                RichText::new(project_name(projects, task.project_id))
                                    .size(10.0)
                                    .color(theme::TEXT_DIM),
                            );
                        })
                        .response;
                    if ui.interact(resp.rect, egui::Id::new(("tracking-row", task.id)), egui::Sense::click()).clicked() {
                        action = TrackingAction::Select(task.id);
                    }
                    ui.add_space(2.0);
                }
            });
        });

    egui::CentralPanel::default()
        .frame(egui::Frame::default().fill(theme::BG_DARK).inner_margin(egui::Margin::same(12.0)))
        .show_inside(ui, |ui| {
            let Some(task) = state.selected.and_then(|id| tasks.iter().find(|t| t.id == id)) else {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("Select a task to track time").color(theme::TEXT_DIM));
                });
                return;
            };
            if let Some(a) = show_task_detail(state, task, projects, now, offset, ui) {
                action = a;
            }
        });

    action
}

fn show_task_detail(
    state: &mut TrackingState,
    task: &Task,
    projects: &[Project],
    now: DateTime<Utc>,
    offset: FixedOffset,
    ui: &mut Ui,
) -> Option<TrackingAction> {
    let mut action = None;

    ui.horizontal(|ui| {
        ui.label(RichText::new(&task.name).strong().size(18.0));
        ui.label(
            RichText::new(task.priority.label())
                .size(11.0)
                .color(theme::priority_color(task.priority)),
        );
    });
    ui.label(RichText::new(project_name(projects, task.project_id)).color(theme::TEXT_SECONDARY));
    let (done, total) = task.subtask_progress();
    if total > 0 {
        ui.label(RichText::new(format!("Subtasks {done}/{total}")).size(11.0).color(theme::TEXT_DIM));
    }
    ui.add_space(10.0);

    ui.label(RichText::new(format_duration(task.running_total(now))).font(egui::FontId::monospace(32.0)));
    ui.add_space(6.0);

    ui.horizontal(|ui| {
        let button = |text: String, fill: Color32| {
            egui::Button::new(RichText::new(text).color(Color32::WHITE)).fill(fill).rounding(egui::Rounding::same(4.0))
        };
        if !task.is_active {
            let enabled = !task.completed;
            let start = button(format!("{}  Start", egui_phosphor::regular::PLAY), theme::SUCCESS);
            if ui.add_enabled(enabled, start).clicked() {
                action = Some(TrackingAction::Start(task.id));
            }
        } else if task.is_paused {
            if ui.add(button(format!("{}  Resume", egui_phosphor::regular::PLAY), theme::SUCCESS)).clicked() {
                action = Some(TrackingAction::Resume(task.id));
            }
        } else if ui.add(button(format!("{}  Pause", egui_phosphor::regular::PAUSE), theme::ACCENT)).clicked() {
            action = Some(TrackingAction::Pause(task.id));
        }
        if task.is_active && ui.add(button(format!("{}  Stop", egui_phosphor::regular::STOP), theme::DANGER)).clicked() {
            action = Some(TrackingAction::Stop(task.id));
        }
        let label = if task.completed { "Reopen" } else { "Mark done" };
        if ui.add_enabled(!task.is_active, egui::Button::new(label)).clicked() {
            action = Some(TrackingAction::ToggleCompleted(task.id));
        }
    });

    ui.add_space(12.0);
    ui.separator();
    ui.horizontal(|ui| {
        ui.label(RichText::new("Sessions").strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add(egui::DragValue::new(&mut state.adjust_minutes).range(1..=480).suffix(" min"));
            ui.label(RichText::new("Adjust by").size(11.0).color(theme::TEXT_DIM));
        });
    });
    ui.add_space(4.0);

    if task.sessions.is_empty() {
        ui.label(RichText::new("No sessions yet").color(theme::TEXT_DIM));
        return action;
    }

    egui::ScrollArea::vertical().id_salt("session_list").show(ui, |ui| {
        egui::Grid::new("session_grid")
            .num_columns(5)
            .striped(true)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                for header in ["Date", "Start", "End", "Duration", ""] {
                    ui.label(RichText::new(header).size(10.0).color(theme::TEXT_DIM).strong());
                }
                ui.end_row();

                for session in task.sessions.iter().rev() {
                    ui.label(session.date.format("%d/%m/%Y").to_string());
                    ui.label(session.start_time.with_timezone(&offset).format("%H:%M").to_string());
                    match session.end_time {
                        Some(end) => ui.label(end.with_timezone(&offset).format("%H:%M").to_string()),
                        None => ui.label(RichText::new("running").color(theme::SUCCESS)),
                    };
                    let live = if session.is_open() {
                        session.total_time + (now - session.start_time).num_milliseconds().max(0) as u64
                    } else {
                        session.total_time
                    };
                    ui.label(RichText::new(format_duration(live)).font(theme::font_timer()));
                    ui.horizontal(|ui| {
                        let editable = !session.is_open();
                        let minus = ui
                            .add_enabled(editable, egui::Button::new(egui_phosphor::regular::MINUS).small())
                            .on_hover_text(format!("Deduct {} min", state.adjust_minutes));
                        if minus.clicked() {
                            action = Some(TrackingAction::Adjust {
                                task: task.id,
                                session: session.id,
                                minutes: -state.adjust_minutes,
                            });
                        }
                        let plus = ui
                            .add_enabled(editable, egui::Button::new(egui_phosphor::regular::PLUS).small())
                            .on_hover_text(format!("Add {} min", state.adjust_minutes));
                        if plus.clicked() {
                            action = Some(TrackingAction::Adjust {
                                task: task.id,
                                session: session.id,
                                minutes: state.adjust_minutes,
                            });
                        }
                    });
                    ui.end_row();
                }
            });
    });

    action
}
