use egui::{Color32, RichText, Ui};

use crate::model::phase::Risk;
use crate::model::PlanPhase;
use crate::ui::theme;

/// Actions the editor can request.
pub enum EditorAction {
    None,
    Changed,
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

/// Render an inline editor for the selected phase.
pub fn show_phase_editor(phase: &mut PlanPhase, ui: &mut Ui) -> EditorAction {
    let mut action = EditorAction::None;

    ui.add_space(6.0);
    ui.label(RichText::new("Edit Phase").strong().size(13.0).color(theme::TEXT_PRIMARY));
    ui.add_space(4.0);

    egui::Frame::default()
        .fill(theme::BG_DARK)
        .rounding(egui::Rounding::same(5.0))
        .inner_margin(egui::Margin::same(8.0))
        .stroke(egui::Stroke::new(1.0, theme::BORDER_SUBTLE))
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 6.0;
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;

            field_label(ui, "Name");
            let name = ui.add_sized(
                [ui.available_width(), 24.0],
                egui::TextEdit::singleline(&mut phase.name).font(egui::FontId::proportional(12.0)),
            );
            if name.changed() {
                action = EditorAction::Changed;
            }

            field_label(ui, "Owner");
            let owner = ui.add_sized(
                [ui.available_width(), 24.0],
                egui::TextEdit::singleline(&mut phase.owner)
                    .font(egui::FontId::proportional(12.0))
                    .hint_text("Who leads this phase"),
            );
            if owner.changed() {
                action = EditorAction::Changed;
            }

            // Start and end are kept ordered whichever one moves.
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    field_label(ui, "Start");
                    let resp = ui.add(egui_extras::DatePickerButton::new(&mut phase.start).id_salt("dp_phase_start"));
                    if resp.changed() {
                        if phase.start > phase.end {
                            phase.end = phase.start;
                        }
                        action = EditorAction::Changed;
                    }
                });
                ui.add_space(8.0);
                ui.vertical(|ui| {
                    field_label(ui, "End");
                    let resp = ui.add(egui_extras::DatePickerButton::new(&mut phase.end).id_salt("dp_phase_end"));
                    if resp.changed() {
                        if phase.end < phase.start {
                            phase.start = phase.end;
                        }
                        action = EditorAction::Changed;
                    }
                });
            });

            field_label(ui, "Progress");
            let slider = egui::Slider::new(&mut phase.progress, 0.0..=1.0)
                .custom_formatter(|v, _| format!("{:.0}%", v * 100.0))
                .custom_parser(|s| s.trim().trim_end_matches('%').parse::<f64>().ok().map(|v| v / 100.0));
            if ui.add_sized([ui.available_width(), 20.0], slider).changed() {
                action = EditorAction::Changed;
            }

            field_label(ui, "Risk");
            egui::ComboBox::from_id_salt("risk_combo")
                .selected_text(RichText::new(phase.risk.label()).size(11.0).color(theme::risk_color(phase.risk)))
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for risk in Risk::all() {
                        let text = RichText::new(risk.label()).color(theme::risk_color(*risk));
                        if ui.selectable_value(&mut phase.risk, *risk, text).changed() {
                            action = EditorAction::Changed;
                        }
                    }
                });

            field_label(ui, "Notes");
            let notes = ui.add_sized(
                [ui.available_width(), 60.0],
                egui::TextEdit::multiline(&mut phase.notes)
                    .font(egui::FontId::proportional(11.0))
                    .hint_text("Add notes..."),
            );
            if notes.changed() {
                action = EditorAction::Changed;
            }

            field_label(ui, "Color");
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(4.0, 4.0);
                for color in theme::TASK_COLORS {
                    let is_current = phase.color == *color;
                    let size = if is_current { 20.0 } else { 16.0 };
                    let (rect, resp) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::click());
                    ui.painter().rect_filled(rect, egui::Rounding::same(3.0), *color);
                    if is_current {
                        ui.painter().rect_stroke(
                            rect.expand(1.0),
                            egui::Rounding::same(4.0),
                            egui::Stroke::new(2.0, Color32::WHITE),
                        );
                    }
                    if resp.on_hover_text("Click to set color").clicked() {
                        phase.color = *color;
                        action = EditorAction::Changed;
                    }
                }
            });
        });

    action
}
