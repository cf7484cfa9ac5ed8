use egui::{Color32, Context, RichText, Window};

use crate::app::StudioApp;
use crate::model::phase::Risk;
use crate::ui::theme;

/// Render the "Add Phase" dialog.
pub fn show_add_phase_dialog(app: &mut StudioApp, ctx: &Context) {
    let mut should_close = false;
    Window::new(RichText::new("Add Phase").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([340.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.visuals_mut().faint_bg_color = Color32::TRANSPARENT;
            ui.add_space(4.0);

            egui::Grid::new("add_phase_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut app.new_phase.name).hint_text("Phase name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Owner").color(theme::TEXT_SECONDARY));
                    ui.add_sized([220.0, 24.0], egui::TextEdit::singleline(&mut app.new_phase.owner));
                    ui.end_row();

                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut app.new_phase.start).id_salt("dlg_dp_start"));
                    ui.end_row();

                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut app.new_phase.end).id_salt("dlg_dp_end"));
                    ui.end_row();

                    ui.label(RichText::new("Risk").color(theme::TEXT_SECONDARY));
                    egui::ComboBox::from_id_salt("dlg_risk")
                        .selected_text(app.new_phase.risk.label())
                        .show_ui(ui, |ui| {
                            for risk in Risk::all() {
                                ui.selectable_value(&mut app.new_phase.risk, *risk, risk.label());
                            }
                        });
                    ui.end_row();
                });

            if app.new_phase.end < app.new_phase.start {
                ui.label(RichText::new("End is before start; it will be moved to the start date.").size(10.5).color(theme::DANGER));
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let create = egui::Button::new(RichText::new("Create").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], create).clicked() {
                    app.create_phase_from_dialog();
                    should_close = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_add_phase = false;
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut StudioApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 200.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Studio Planner").strong());
                ui.add_space(2.0);
                ui.label(RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION"))).color(theme::TEXT_SECONDARY));
                ui.add_space(10.0);
                ui.label("Projects, phases and time tracking");
                ui.label("for interior design studios.");
                ui.add_space(6.0);
                ui.label(RichText::new(format!("Signed in as {}", app.settings.user_email)).size(11.0).color(theme::TEXT_DIM));
                ui.add_space(10.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the "Phase CSV Format" help dialog.
pub fn show_csv_help_dialog(app: &mut StudioApp, ctx: &Context) {
    let mut should_close = false;

    Window::new(RichText::new("Phase CSV Format").strong().size(14.0))
        .resizable(true)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_size([520.0, 420.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.label(RichText::new("Delimiters").strong());
                ui.label("Comma, semicolon or tab; detected from the header line.");
                ui.add_space(8.0);

                ui.label(RichText::new("Columns").strong());
                egui::Grid::new("csv_columns")
                    .num_columns(3)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for cell in ["Column", "Accepted headers", "Values"] {
                            ui.label(RichText::new(cell).underline());
                        }
                        ui.end_row();
                        for (col, headers, values) in [
                            ("Name *", "Name, Phase, Task, Title, Label", "Any text"),
                            ("Start *", "Start, Start Date, From, Begin", "Date"),
                            ("End *", "End, End Date, To, Finish, Due", "Date"),
                            ("Owner", "Owner, Lead, Assignee, Responsible", "Any text"),
                            ("Progress", "Progress, Status, Complete", "0-100, 45%, Done, In Progress"),
                            ("Risk", "Risk, Risk Level", "Low / Medium / High"),
                            ("Notes", "Notes, Description, Comment", "Any text"),
                        ] {
                            ui.label(RichText::new(col).strong());
                            ui.label(headers);
                            ui.label(values);
                            ui.end_row();
                        }
                    });
                ui.add_space(8.0);

                ui.label(RichText::new("Date formats").strong());
                for fmt in ["YYYY-MM-DD", "DD/MM/YYYY", "MM/DD/YYYY", "DD-MM-YYYY", "DD.MM.YYYY", "YYYY/MM/DD"] {
                    ui.label(RichText::new(fmt).monospace().size(11.0));
                }
                ui.add_space(8.0);
                ui.label(RichText::new("Rows with a missing name or an unreadable date are skipped and counted.").small());
            });

            ui.separator();
            if ui.add_sized([80.0, 28.0], egui::Button::new("Close")).clicked() {
                should_close = true;
            }
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_csv_help = false;
    }
}
