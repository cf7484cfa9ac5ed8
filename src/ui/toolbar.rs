use egui::{menu, RichText, Ui};

use crate::app::{StudioApp, Tab};
use crate::model::calendar::WeekStart;
use crate::model::PlannerZoom;
use crate::ui::theme;

/// Render the top menu bar and tab strip.
pub fn show_toolbar(app: &mut StudioApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  Save Plan          Ctrl+S").clicked() {
                app.save_plan();
                ui.close_menu();
            }
            if ui.button("  Reload").clicked() {
                app.refresh();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import Phases CSV...").clicked() {
                app.import_phases_csv();
                ui.close_menu();
            }
            if ui.button("  Phase CSV Format").clicked() {
                app.show_csv_help = true;
                ui.close_menu();
            }
            if ui.button("  Export Timesheet CSV...").clicked() {
                app.export_timesheet_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Open Data Folder").clicked() {
                app.open_data_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Planner Zoom").small().weak());
            for zoom in PlannerZoom::all() {
                if ui.radio(app.planner.viewport.zoom == *zoom, zoom.label()).clicked() {
                    app.set_planner_zoom(*zoom);
                    ui.close_menu();
                }
            }
            ui.separator();
            ui.label(RichText::new("Week Starts On").small().weak());
            for (week_start, label) in [(WeekStart::Sunday, "Sunday"), (WeekStart::Monday, "Monday")] {
                if ui.radio(app.settings.week_start == week_start, label).clicked() {
                    app.set_week_start(week_start);
                    ui.close_menu();
                }
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.separator();
        for tab in Tab::all() {
            let text = RichText::new(format!("{}  {}", tab.icon(), tab.label())).font(theme::font_menu());
            if ui.selectable_label(app.tab == *tab, text).clicked() {
                app.tab = *tab;
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let role = if app.settings.is_admin { "admin" } else { "staff" };
            ui.label(RichText::new(format!("{} ({})", app.settings.user_email, role)).size(11.0).weak());
        });
    });
}
