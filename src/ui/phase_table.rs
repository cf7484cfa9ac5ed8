use egui::{Color32, RichText, Ui};
use uuid::Uuid;

use crate::model::PlanPhase;
use crate::ui::theme;

/// Actions that the phase table can request.
pub enum PhaseTableAction {
    None,
    Select(Uuid),
    Delete(Uuid),
    Add,
}

/// Render the left-side phase list of the planner.
pub fn show_phase_table(
    phases: &mut [PlanPhase],
    selected_phase: Option<Uuid>,
    overall_progress: f32,
    ui: &mut Ui,
) -> PhaseTableAction {
    let mut action = PhaseTableAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Phases").strong().size(15.0).color(theme::TEXT_PRIMARY));
        ui.add_space(4.0);
        ui.label(RichText::new(format!("({})", phases.len())).size(11.0).color(theme::TEXT_DIM));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{:.0}% overall", overall_progress * 100.0))
                    .size(11.0)
                    .color(theme::TEXT_SECONDARY),
            );
        });
    });
    ui.add_space(4.0);

    let btn = egui::Button::new(
        RichText::new(format!("{}  Add Phase", egui_phosphor::regular::PLUS)).color(Color32::WHITE).size(12.0),
    )
    .fill(theme::ACCENT)
    .rounding(egui::Rounding::same(5.0));
    if ui.add_sized([ui.available_width(), 30.0], btn).clicked() {
        action = PhaseTableAction::Add;
    }

    ui.add_space(6.0);
    ui.separator();
    ui.add_space(2.0);

    egui::ScrollArea::vertical()
        .id_salt("phase_table")
        .auto_shrink([false, false])
        .max_height(ui.available_height() * 0.5)
        .show(ui, |ui| {
            for (i, phase) in phases.iter_mut().enumerate() {
                let is_selected = selected_phase == Some(phase.id);
                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };

                let frame_resp = egui::Frame::default()
                    .fill(row_bg)
                    .rounding(egui::Rounding::same(4.0))
                    .inner_margin(egui::Margin::symmetric(6.0, 4.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.spacing_mut().item_spacing.x = 6.0;

                            let caret = if phase.expanded {
                                egui_phosphor::regular::CARET_DOWN
                            } else {
                                egui_phosphor::regular::CARET_RIGHT
                            };
                            if ui
                                .add(egui::Button::new(RichText::new(caret).size(10.0)).frame(false))
                                .clicked()
                            {
                                phase.expanded = !phase.expanded;
                            }

                            let (dot_rect, _) = ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                            ui.painter().circle_filled(dot_rect.center(), 3.0, phase.color);

                            let name_color = if is_selected { Color32::WHITE } else { theme::TEXT_PRIMARY };
                            ui.add(egui::Label::new(RichText::new(&phase.name).size(12.0).color(name_color)).truncate());

                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                ui.spacing_mut().item_spacing.x = 4.0;
                                let del = ui.add(
                                    egui::Button::new(RichText::new(egui_phosphor::regular::X).size(10.0).color(theme::TEXT_DIM))
                                        .frame(false),
                                );
                                if del.on_hover_text("Delete phase").clicked() {
                                    action = PhaseTableAction::Delete(phase.id);
                                }
                                ui.add(
                                    egui::ProgressBar::new(phase.progress)
                                        .desired_width(48.0)
                                        .fill(phase.color)
                                        .rounding(egui::Rounding::same(3.0)),
                                );
                                ui.label(
                                    RichText::new(phase.end.format("%d/%m").to_string())
                                        .size(10.0)
                                        .color(theme::TEXT_SECONDARY),
                                );
                                ui.label(RichText::new("→").size(9.0).color(theme::TEXT_DIM));
                                ui.label(
                                    RichText::new(phase.start.format("%d/%m").to_string())
                                        .size(10.0)
                                        .color(theme::TEXT_SECONDARY),
                                );
                            });
                        });

                        if phase.expanded {
                            ui.indent(("phase-detail", phase.id), |ui| {
                                let owner = if phase.owner.is_empty() { "—" } else { phase.owner.as_str() };
                                ui.label(RichText::new(format!("Owner: {owner}")).size(10.5).color(theme::TEXT_SECONDARY));
                                ui.horizontal(|ui| {
                                    ui.label(RichText::new("Risk:").size(10.5).color(theme::TEXT_SECONDARY));
                                    ui.label(
                                        RichText::new(phase.risk.label()).size(10.5).color(theme::risk_color(phase.risk)),
                                    );
                                    ui.label(
                                        RichText::new(format!("· {} days", phase.duration_days()))
                                            .size(10.5)
                                            .color(theme::TEXT_DIM),
                                    );
                                });
                                if !phase.notes.is_empty() {
                                    ui.label(RichText::new(&phase.notes).size(10.5).color(theme::TEXT_DIM));
                                }
                            });
                        }
                    });

                let row_click = ui.interact(
                    frame_resp.response.rect,
                    egui::Id::new(("phase-row", phase.id)),
                    egui::Sense::click(),
                );
                if row_click.clicked() {
                    action = PhaseTableAction::Select(phase.id);
                }
                ui.add_space(1.0);
            }
        });

    action
}
