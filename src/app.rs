use std::path::PathBuf;
use std::time::Duration as StdDuration;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::AppSettings;
use crate::error::{StoreError, TrackingError};
use crate::io::csv_export::export_timesheet_file;
use crate::io::csv_import::import_phases;
use crate::io::{DocumentStore, StudioApi};
use crate::model::calendar::WeekStart;
use crate::model::document::DocumentKind;
use crate::model::{PlanPhase, PlannerZoom, Project, Risk, Task, TaskPatch};
use crate::ui;
use crate::ui::calendar_view::{CalendarAction, CalendarState};
use crate::ui::documents::{DocumentAction, DocumentsState};
use crate::ui::planner::PlannerState;
use crate::ui::time_tracking::{TrackingAction, TrackingState};
use crate::ui::timeline_view::TimelineState;
use crate::ui::toasts::Toasts;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Calendar,
    Timeline,
    Planner,
    TimeTracking,
    Documents,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Calendar, Tab::Timeline, Tab::Planner, Tab::TimeTracking, Tab::Documents]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Calendar => "Calendar",
            Tab::Timeline => "Timeline",
            Tab::Planner => "Planner",
            Tab::TimeTracking => "Time Tracking",
            Tab::Documents => "Documents",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Tab::Calendar => egui_phosphor::regular::CALENDAR_BLANK,
            Tab::Timeline => egui_phosphor::regular::USERS_THREE,
            Tab::Planner => egui_phosphor::regular::CHART_BAR_HORIZONTAL,
            Tab::TimeTracking => egui_phosphor::regular::TIMER,
            Tab::Documents => egui_phosphor::regular::FOLDER_OPEN,
        }
    }
}

/// Fields of the "Add Phase" dialog.
#[derive(Debug, Clone)]
pub struct NewPhaseDraft {
    pub name: String,
    pub owner: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub risk: Risk,
}

impl NewPhaseDraft {
    fn new(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            owner: String::new(),
            start: today,
            end: today + chrono::Duration::days(14),
            risk: Risk::default(),
        }
    }
}

/// Main application state.
pub struct StudioApp {
    pub settings: AppSettings,
    settings_path: PathBuf,
    api: Box<dyn StudioApi>,
    documents: Box<dyn DocumentStore>,

    pub tab: Tab,
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,

    pub calendar: CalendarState,
    pub timeline: TimelineState,
    pub planner: PlannerState,
    pub tracking: TrackingState,
    pub docs: DocumentsState,

    // Dialog state
    pub show_add_phase: bool,
    pub show_about: bool,
    pub show_csv_help: bool,
    pub new_phase: NewPhaseDraft,

    pub status_message: String,
    pub toasts: Toasts,
    /// Text to place on the clipboard next frame.
    clipboard: Option<String>,
}

fn local_offset() -> FixedOffset {
    *Local::now().offset()
}

impl StudioApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        settings: AppSettings,
        settings_path: PathBuf,
        api: Box<dyn StudioApi>,
        documents: Box<dyn DocumentStore>,
    ) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        Self::with_stores(settings, settings_path, api, documents, Local::now().date_naive())
    }

    /// Build the app over the given stores and load the initial data.
    pub fn with_stores(
        settings: AppSettings,
        settings_path: PathBuf,
        api: Box<dyn StudioApi>,
        documents: Box<dyn DocumentStore>,
        today: NaiveDate,
    ) -> Self {
        let mut app = Self {
            calendar: CalendarState::new(settings.calendar_view, today),
            timeline: TimelineState::new(today),
            planner: PlannerState::new(today, settings.planner_zoom),
            tracking: TrackingState::default(),
            docs: DocumentsState::default(),
            settings,
            settings_path,
            api,
            documents,
            tab: Tab::Calendar,
            tasks: Vec::new(),
            projects: Vec::new(),
            show_add_phase: false,
            show_about: false,
            show_csv_help: false,
            new_phase: NewPhaseDraft::new(today),
            status_message: "Ready".to_string(),
            toasts: Toasts::default(),
            clipboard: None,
        };
        app.refresh();
        if let Some(first) = app.projects.first().map(|p| p.id) {
            app.select_plan_project(first);
        }
        app
    }

    // --- Data loading ---

    /// Reload tasks and projects from the data API.
    pub fn refresh(&mut self) {
        let result = self
            .api
            .list_tasks(&self.settings.user_email, self.settings.is_admin)
            .and_then(|tasks| Ok((tasks, self.api.list_projects()?)));
        match result {
            Ok((tasks, projects)) => {
                self.tasks = tasks;
                self.projects = projects;
                self.status_message = format!("Loaded {} tasks, {} projects", self.tasks.len(), self.projects.len());
            }
            Err(e) => {
                error!(error = %e, "failed to load workspace");
                self.toasts.error(format!("Could not load data: {e}"));
            }
        }
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            warn!(path = %self.settings_path.display(), error = %e, "failed to save settings");
            self.toasts.error(format!("Could not save settings: {e}"));
        }
    }

    pub fn set_week_start(&mut self, week_start: WeekStart) {
        if self.settings.week_start != week_start {
            self.settings.week_start = week_start;
            self.save_settings();
        }
    }

    pub fn set_planner_zoom(&mut self, zoom: PlannerZoom) {
        self.planner.viewport.set_zoom(zoom);
        self.remember_zoom();
    }

    fn remember_zoom(&mut self) {
        if self.settings.planner_zoom != self.planner.viewport.zoom {
            self.settings.planner_zoom = self.planner.viewport.zoom;
            self.save_settings();
        }
    }

    pub fn open_data_folder(&mut self) {
        let dir = self.settings.resolved_data_dir();
        if let Err(e) = open::that(&dir) {
            warn!(path = %dir.display(), error = %e, "failed to open data folder");
            self.toasts.error(format!("Could not open {}: {e}", dir.display()));
        }
    }

    // --- Planner ---

    /// Switch the planner to another project's plan.
    pub fn select_plan_project(&mut self, project_id: Uuid) {
        if self.planner.project_id == Some(project_id) {
            return;
        }
        if self.planner.dirty {
            let confirm = rfd::MessageDialog::new()
                .set_title("Unsaved plan")
                .set_description("Discard unsaved changes to the current plan?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }
        match self.api.load_plan(project_id) {
            Ok(plan) => {
                info!(project = %project_id, phases = plan.phases.len(), "plan loaded");
                self.planner.load(plan);
            }
            Err(e) => {
                error!(project = %project_id, error = %e, "failed to load plan");
                self.toasts.error(format!("Could not load plan: {e}"));
            }
        }
    }

    pub fn save_plan(&mut self) {
        let Some(plan) = self.planner.plan.as_ref() else {
            self.toasts.info("No plan open");
            return;
        };
        match self.api.save_plan(plan) {
            Ok(()) => {
                self.planner.dirty = false;
                self.status_message = "Plan saved".to_string();
                self.toasts.info("Plan saved");
            }
            Err(e) => {
                error!(project = %plan.project_id, error = %e, "failed to save plan");
                self.toasts.error(format!("Could not save plan: {e}"));
            }
        }
    }

    pub fn create_phase_from_dialog(&mut self) {
        let Some(plan) = self.planner.plan.as_mut() else {
            return;
        };
        let name = if self.new_phase.name.trim().is_empty() {
            "New Phase".to_string()
        } else {
            self.new_phase.name.trim().to_string()
        };
        let mut phase = PlanPhase::new(name, self.new_phase.start, self.new_phase.end);
        phase.owner = self.new_phase.owner.trim().to_string();
        phase.risk = self.new_phase.risk;
        phase.color = ui::theme::TASK_COLORS[plan.phases.len() % ui::theme::TASK_COLORS.len()];
        self.planner.selected_phase = Some(phase.id);
        plan.phases.push(phase);
        self.planner.dirty = true;
        self.new_phase = NewPhaseDraft::new(self.new_phase.start);
        self.status_message = "Phase added".to_string();
    }

    pub fn delete_phase(&mut self, id: Uuid) {
        let Some(plan) = self.planner.plan.as_mut() else {
            return;
        };
        if let Some(removed) = plan.remove_phase(id) {
            self.planner.dirty = true;
            if self.planner.selected_phase == Some(id) {
                self.planner.selected_phase = None;
            }
            self.status_message = format!("Deleted phase '{}'", removed.name);
        }
    }

    pub fn import_phases_csv(&mut self) {
        if self.planner.plan.is_none() {
            self.toasts.info("Pick a project before importing phases");
            return;
        }
        if self.planner.plan.as_ref().is_some_and(|p| !p.phases.is_empty()) {
            let confirm = rfd::MessageDialog::new()
                .set_title("Import Phases")
                .set_description("This will replace the phases of the current plan. Continue?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }
        if let Some(path) = rfd::FileDialog::new().add_filter("CSV Files", &["csv", "txt"]).pick_file() {
            match import_phases(&path) {
                Ok((phases, skipped)) => self.replace_phases(phases, skipped),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "phase import failed");
                    self.toasts.error(format!("CSV import failed: {e}"));
                }
            }
        }
    }

    fn replace_phases(&mut self, phases: Vec<PlanPhase>, skipped: usize) {
        let Some(plan) = self.planner.plan.as_mut() else {
            return;
        };
        let count = phases.len();
        plan.phases = phases;
        self.planner.viewport.fit_to(&plan.phases);
        self.planner.selected_phase = None;
        self.planner.dirty = true;
        self.status_message = if skipped > 0 {
            format!("Imported {count} phases ({skipped} rows skipped)")
        } else {
            format!("Imported {count} phases")
        };
        self.toasts.info(self.status_message.clone());
    }

    pub fn export_timesheet_csv(&mut self) {
        if self.tasks.iter().all(|t| t.sessions.is_empty()) {
            self.toasts.info("Nothing to export; no tracked sessions yet");
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("timesheet.csv")
            .save_file()
        {
            match export_timesheet_file(&self.tasks, &self.projects, local_offset(), &path) {
                Ok(count) => {
                    info!(path = %path.display(), rows = count, "timesheet exported");
                    self.toasts.info(format!("Exported {count} sessions"));
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "timesheet export failed");
                    self.toasts.error(format!("CSV export failed: {e}"));
                }
            }
        }
    }

    // --- Time tracking ---

    pub fn apply_tracking(&mut self, action: TrackingAction, now: DateTime<Utc>) {
        match action {
            TrackingAction::None => {}
            TrackingAction::Select(id) => self.tracking.selected = Some(id),
            TrackingAction::Start(id) => self.update_tracked(id, "started", |t| t.start(now)),
            TrackingAction::Pause(id) => self.update_tracked(id, "paused", |t| t.pause(now)),
            TrackingAction::Resume(id) => self.update_tracked(id, "resumed", |t| t.resume(now)),
            TrackingAction::Stop(id) => self.update_tracked(id, "stopped", |t| t.stop(now)),
            TrackingAction::Adjust { task, session, minutes } => {
                self.update_tracked(task, "adjusted", |t| t.adjust_session(session, minutes))
            }
            TrackingAction::ToggleCompleted(id) => {
                let Some(completed) = self.tasks.iter().find(|t| t.id == id).map(|t| t.completed) else {
                    return;
                };
                let patch = TaskPatch { completed: Some(!completed), ..Default::default() };
                self.push_patch(id, &patch, if completed { "reopened" } else { "completed" });
            }
        }
    }

    /// Run a tracking transition on a copy of the task and persist it. The
    /// local list only changes once the store accepts the patch.
    fn update_tracked(&mut self, id: Uuid, verb: &str, transition: impl FnOnce(&mut Task) -> Result<(), TrackingError>) {
        let Some(mut draft) = self.tasks.iter().find(|t| t.id == id).cloned() else {
            return;
        };
        if let Err(e) = transition(&mut draft) {
            self.toasts.error(e.to_string());
            return;
        }
        self.push_patch(id, &draft.tracking_patch(), verb);
    }

    fn push_patch(&mut self, id: Uuid, patch: &TaskPatch, verb: &str) {
        match self.api.update_task(id, patch) {
            Ok(updated) => {
                info!(task = %id, action = verb, total_ms = updated.total_work_time, "task updated");
                self.status_message = format!("'{}' {}", updated.name, verb);
                if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == id) {
                    *slot = updated;
                }
            }
            Err(e) => {
                error!(task = %id, action = verb, error = %e, "task update failed");
                self.toasts.error(format!("Could not save task: {e}"));
            }
        }
    }

    // --- Documents ---

    fn reload_documents(&mut self) {
        let Some(project_id) = self.docs.project_id else {
            self.docs.entries.clear();
            return;
        };
        match self.documents.list(&project_id.to_string(), &self.docs.path_string()) {
            Ok(entries) => self.docs.entries = entries,
            Err(e) => {
                warn!(project = %project_id, error = %e, "failed to list documents");
                self.docs.entries.clear();
                self.toasts.error(format!("Could not list documents: {e}"));
            }
        }
    }

    fn report(&mut self, result: Result<(), StoreError>, done: String) {
        match result {
            Ok(()) => {
                self.status_message = done;
                self.reload_documents();
            }
            Err(e) => self.toasts.error(e.to_string()),
        }
    }

    pub fn apply_document_action(&mut self, action: DocumentAction) {
        if let DocumentAction::SelectProject(id) = action {
            self.docs.project_id = Some(id);
            self.docs.path.clear();
            self.docs.renaming = None;
            self.reload_documents();
            return;
        }
        let Some(project_id) = self.docs.project_id else {
            return;
        };
        let project = project_id.to_string();
        let path = self.docs.path_string();

        match action {
            DocumentAction::None | DocumentAction::SelectProject(_) => {}
            DocumentAction::Refresh => self.reload_documents(),
            DocumentAction::EnterFolder(name) => {
                self.docs.path.push(name);
                self.reload_documents();
            }
            DocumentAction::NavigateTo(depth) => {
                self.docs.path.truncate(depth);
                self.reload_documents();
            }
            DocumentAction::CreateFolder(name) => {
                let result = self.documents.create_folder(&project, &path, &name);
                self.report(result, format!("Created folder '{}'", name.trim()));
            }
            DocumentAction::Upload => {
                if let Some(source) = rfd::FileDialog::new().pick_file() {
                    let result = self.documents.upload(&project, &path, &source).map(|entry| entry.name);
                    match result {
                        Ok(name) => self.report(Ok(()), format!("Uploaded '{name}'")),
                        Err(e) => self.report(Err(e), String::new()),
                    }
                }
            }
            DocumentAction::AddLink { name, url } => {
                let result = self.documents.add_link(&project, &path, &name, &url);
                self.report(result, format!("Saved link '{}'", name.trim()));
            }
            DocumentAction::Rename { from, to } => {
                let result = self.documents.rename(&project, &path, &from, &to);
                self.report(result, format!("Renamed '{from}' to '{}'", to.trim()));
            }
            DocumentAction::Delete(name) => {
                let confirm = rfd::MessageDialog::new()
                    .set_title("Delete")
                    .set_description(format!("Delete '{name}'? Folders are removed with their contents."))
                    .set_buttons(rfd::MessageButtons::YesNo)
                    .show();
                if confirm == rfd::MessageDialogResult::Yes {
                    let result = self.documents.delete(&project, &path, &name);
                    self.report(result, format!("Deleted '{name}'"));
                }
            }
            DocumentAction::CopyUrl(name) => {
                self.clipboard = Some(self.documents.public_url(&project, &path, &name));
                self.toasts.info("Public URL copied");
            }
            DocumentAction::Open(entry) => {
                let target = match entry.kind {
                    DocumentKind::Folder => {
                        self.docs.path.push(entry.name);
                        self.reload_documents();
                        return;
                    }
                    DocumentKind::File => self
                        .documents
                        .local_path(&project, &path, &entry.name)
                        .map(|p| p.to_string_lossy().to_string()),
                    DocumentKind::Link => match entry.url {
                        Some(url) => Ok(url),
                        None => self.documents.read_link(&project, &path, &entry.name),
                    },
                };
                match target {
                    Ok(target) => {
                        if let Err(e) = open::that(&target) {
                            warn!(target = %target, error = %e, "failed to open document");
                            self.toasts.error(format!("Could not open '{}': {e}", entry.name));
                        }
                    }
                    Err(e) => self.toasts.error(e.to_string()),
                }
            }
        }
    }

    // --- Panels ---

    fn show_planner_tab(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, today: NaiveDate) {
        let mut table_action = ui::phase_table::PhaseTableAction::None;
        let mut editor_changed = false;
        let mut pick_project = None;

        egui::SidePanel::left("phase_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .min_width(220.0)
            .max_width(ui::theme::SIDE_PANEL_WIDTH * 2.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show_inside(ui, |ui| {
                let current = self
                    .planner
                    .project_id
                    .and_then(|id| self.projects.iter().find(|p| p.id == id))
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "— pick project —".to_string());
                egui::ComboBox::from_id_salt("plan_project")
                    .selected_text(current)
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for project in &self.projects {
                            if ui.selectable_label(self.planner.project_id == Some(project.id), &project.name).clicked() {
                                pick_project = Some(project.id);
                            }
                        }
                    });
                ui.add_space(6.0);

                let Some(plan) = self.planner.plan.as_mut() else {
                    ui.label(egui::RichText::new("No plan loaded").color(ui::theme::TEXT_DIM));
                    return;
                };

                if let Some(sel_id) = self.planner.selected_phase {
                    if let Some(phase) = plan.phase_mut(sel_id) {
                        if let ui::phase_editor::EditorAction::Changed = ui::phase_editor::show_phase_editor(phase, ui) {
                            editor_changed = true;
                        }
                    }
                    ui.add_space(4.0);
                    ui.separator();
                }

                let overall = plan.overall_progress();
                table_action =
                    ui::phase_table::show_phase_table(&mut plan.phases, self.planner.selected_phase, overall, ui);
            });

        if let Some(id) = pick_project {
            self.select_plan_project(id);
        }
        match table_action {
            ui::phase_table::PhaseTableAction::Select(id) => self.planner.selected_phase = Some(id),
            ui::phase_table::PhaseTableAction::Delete(id) => self.delete_phase(id),
            ui::phase_table::PhaseTableAction::Add => {
                if self.planner.plan.is_some() {
                    self.show_add_phase = true;
                }
            }
            ui::phase_table::PhaseTableAction::None => {}
        }
        if editor_changed {
            self.planner.dirty = true;
            self.status_message = "Phase updated".to_string();
        }

        let mut save_clicked = false;
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(ui::theme::BG_DARK))
            .show_inside(ui, |ui| {
                let Some(plan) = self.planner.plan.as_mut() else {
                    return;
                };
                let viewport = &mut self.planner.viewport;
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            let step = match viewport.zoom {
                                PlannerZoom::Day => 7,
                                PlannerZoom::Week => 28,
                                PlannerZoom::Month => 91,
                                PlannerZoom::Quarter => 182,
                            };
                            if ui.button(egui_phosphor::regular::CARET_LEFT).clicked() {
                                viewport.scroll_days(-step);
                            }
                            if ui.button(egui_phosphor::regular::CARET_RIGHT).clicked() {
                                viewport.scroll_days(step);
                            }
                            if ui.button("Fit").on_hover_text("Frame all phases").clicked() {
                                viewport.fit_to(&plan.phases);
                            }
                            ui.separator();
                            for zoom in PlannerZoom::all() {
                                if ui.selectable_label(viewport.zoom == *zoom, zoom.label()).clicked() {
                                    viewport.set_zoom(*zoom);
                                }
                            }
                            if let Some((start, end)) = plan.date_range() {
                                ui.separator();
                                ui.label(
                                    egui::RichText::new(format!("{} → {}", start.format("%d %b %Y"), end.format("%d %b %Y")))
                                        .size(11.0)
                                        .color(ui::theme::TEXT_SECONDARY),
                                );
                            }
                            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                let label = format!("{}  Save", egui_phosphor::regular::FLOPPY_DISK);
                                if ui.add_enabled(self.planner.dirty, egui::Button::new(label)).clicked() {
                                    save_clicked = true;
                                }
                            });
                        });
                    });
                let interaction = ui::planner::show_planner_chart(
                    &mut plan.phases,
                    &mut self.planner.viewport,
                    &mut self.planner.drag,
                    &mut self.planner.selected_phase,
                    today,
                    ui,
                );
                if interaction.changed {
                    if let Some(phase) = self.planner.selected_phase.and_then(|id| plan.phase(id)) {
                        self.status_message = format!(
                            "'{}' {} → {}",
                            phase.name,
                            phase.start.format("%Y-%m-%d"),
                            phase.end.format("%Y-%m-%d")
                        );
                    }
                }
                if interaction.committed.is_some() {
                    self.planner.dirty = true;
                }
                if interaction.zoom_changed {
                    ctx.request_repaint();
                }
            });

        if save_clicked {
            self.save_plan();
        }
        self.remember_zoom();
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(10.5)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let running = self.tasks.iter().filter(|t| t.is_running()).count();
                        ui.label(
                            egui::RichText::new(format!(
                                "Tasks: {} · Running: {} · Zoom: {}",
                                self.tasks.len(),
                                running,
                                self.planner.viewport.zoom.label()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                        if self.planner.dirty {
                            ui.label(egui::RichText::new("Plan unsaved").size(10.5).color(ui::theme::DANGER));
                        }
                    });
                });
            });
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        let now = Utc::now();
        let local_now = now.with_timezone(&Local);
        let today = local_now.date_naive();
        let offset = *local_now.offset();

        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) {
            self.save_plan();
        }
        if let Some(text) = self.clipboard.take() {
            ctx.copy_text(text);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });
        self.show_status_bar(ctx);

        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(ui::theme::BG_PANEL).inner_margin(egui::Margin::same(6.0)))
            .show(ctx, |ui| match self.tab {
                Tab::Calendar => {
                    let action = ui::calendar_view::show_calendar(
                        &mut self.calendar,
                        &self.tasks,
                        &self.projects,
                        self.settings.week_start,
                        today,
                        offset,
                        ui,
                    );
                    if let CalendarAction::ViewChanged(view) = action {
                        self.settings.calendar_view = view;
                        self.save_settings();
                    }
                }
                Tab::Timeline => ui::timeline_view::show_timeline(&mut self.timeline, &self.projects, today, ui),
                Tab::Planner => self.show_planner_tab(ctx, ui, today),
                Tab::TimeTracking => {
                    let action = ui::time_tracking::show_time_tracking(
                        &mut self.tracking,
                        &self.tasks,
                        &self.projects,
                        now,
                        offset,
                        ui,
                    );
                    self.apply_tracking(action, now);
                }
                Tab::Documents => {
                    let action = ui::documents::show_documents(&mut self.docs, &self.projects, ui);
                    self.apply_document_action(action);
                }
            });

        // Live timers are recomputed from stored values on every frame.
        if self.tasks.iter().any(Task::is_running) {
            ctx.request_repaint_after(StdDuration::from_secs(1));
        }

        if self.show_add_phase {
            ui::dialogs::show_add_phase_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.show_csv_help {
            ui::dialogs::show_csv_help_dialog(self, ctx);
        }
        self.toasts.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{FsDocumentStore, JsonFileApi};
    use chrono::TimeZone;

    const USER: &str = "ana@studio.example";

    fn app(dir: &tempfile::TempDir) -> StudioApp {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let settings = AppSettings { user_email: USER.to_string(), is_admin: false, ..Default::default() };
        let api = JsonFileApi::open(&dir.path().join("workspace.json"), today, USER).unwrap();
        let docs = FsDocumentStore::new(dir.path().join("documents"), "https://files.example.com");
        StudioApp::with_stores(settings, dir.path().join("settings.json"), Box::new(api), Box::new(docs), today)
    }

    fn reload(dir: &tempfile::TempDir) -> Vec<Task> {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        JsonFileApi::open(&dir.path().join("workspace.json"), today, USER)
            .unwrap()
            .list_tasks(USER, true)
            .unwrap()
    }

    #[test]
    fn test_loads_visible_tasks_and_first_plan() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(&dir);
        assert_eq!(app.tasks.len(), 3);
        assert_eq!(app.projects.len(), 2);
        assert_eq!(app.planner.plan.as_ref().map(|p| p.phases.len()), Some(4));
        assert!(!app.planner.dirty);
    }

    #[test]
    fn test_tracking_transitions_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let id = app.tasks[0].id;
        let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();

        app.apply_tracking(TrackingAction::Start(id), t0);
        app.apply_tracking(TrackingAction::Pause(id), t0 + chrono::Duration::minutes(25));

        let stored = reload(&dir).into_iter().find(|t| t.id == id).unwrap();
        assert!(stored.is_active && stored.is_paused);
        assert_eq!(stored.total_work_time, 25 * 60_000);
        assert_eq!(app.tasks[0].total_work_time, 25 * 60_000);
    }

    #[test]
    fn test_rejected_transition_leaves_task_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let id = app.tasks[0].id;
        let before = app.tasks[0].clone();

        app.apply_tracking(TrackingAction::Pause(id), Utc::now());
        assert_eq!(app.tasks[0], before);
        assert_eq!(app.toasts.len(), 1);
    }

    #[test]
    fn test_adjust_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let id = app.tasks[0].id;
        let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        app.apply_tracking(TrackingAction::Start(id), t0);
        app.apply_tracking(TrackingAction::Stop(id), t0 + chrono::Duration::minutes(40));
        let session = app.tasks[0].sessions[0].id;

        app.apply_tracking(TrackingAction::Adjust { task: id, session, minutes: -15 }, t0);
        assert_eq!(app.tasks[0].total_work_time, 25 * 60_000);
        app.apply_tracking(TrackingAction::Adjust { task: id, session, minutes: 15 }, t0);
        assert_eq!(app.tasks[0].total_work_time, 40 * 60_000);
    }

    #[test]
    fn test_phase_edits_mark_plan_dirty_until_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        app.new_phase.name = "Snagging".to_string();
        app.create_phase_from_dialog();
        assert!(app.planner.dirty);
        assert_eq!(app.planner.plan.as_ref().map(|p| p.phases.len()), Some(5));

        app.save_plan();
        assert!(!app.planner.dirty);
    }

    #[test]
    fn test_document_actions_refresh_listing() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(&dir);
        let project = app.projects[0].id;

        app.apply_document_action(DocumentAction::SelectProject(project));
        assert!(app.docs.entries.is_empty());
        app.apply_document_action(DocumentAction::CreateFolder("Drawings".into()));
        app.apply_document_action(DocumentAction::AddLink { name: "Supplier".into(), url: "https://tiles.example".into() });
        let names: Vec<_> = app.docs.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Drawings", "Supplier"]);

        app.apply_document_action(DocumentAction::EnterFolder("Drawings".into()));
        assert_eq!(app.docs.path_string(), "Drawings");
        assert!(app.docs.entries.is_empty());
        app.apply_document_action(DocumentAction::NavigateTo(0));
        assert_eq!(app.docs.entries.len(), 2);

        app.apply_document_action(DocumentAction::CopyUrl("plan.pdf".into()));
        assert_eq!(
            app.clipboard.as_deref(),
            Some(format!("https://files.example.com/{project}/plan.pdf").as_str())
        );
    }
}
