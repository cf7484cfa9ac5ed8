use egui::{Color32, RichText, Ui};
use uuid::Uuid;

use crate::model::document::{format_size, DocumentEntry, DocumentKind};
use crate::model::Project;
use crate::ui::theme;

/// Requests from the documents tab; the app runs them against the store.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentAction {
    None,
    SelectProject(Uuid),
    EnterFolder(String),
    /// Jump to a breadcrumb depth (0 = project root).
    NavigateTo(usize),
    CreateFolder(String),
    Upload,
    AddLink { name: String, url: String },
    Rename { from: String, to: String },
    Delete(String),
    Open(DocumentEntry),
    CopyUrl(String),
    Refresh,
}

#[derive(Debug, Clone, Default)]
pub struct DocumentsState {
    pub project_id: Option<Uuid>,
    pub path: Vec<String>,
    pub entries: Vec<DocumentEntry>,
    pub new_folder: String,
    pub link_name: String,
    pub link_url: String,
    /// Entry being renamed and the edited name.
    pub renaming: Option<(String, String)>,
}

impl DocumentsState {
    /// Folder path below the project root, `/`-separated.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }
}

/// Render the documents tab.
pub fn show_documents(state: &mut DocumentsState, projects: &[Project], ui: &mut Ui) -> DocumentAction {
    let mut action = DocumentAction::None;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        let current = state
            .project_id
            .and_then(|id| projects.iter().find(|p| p.id == id))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "— pick project —".to_string());
        egui::ComboBox::from_id_salt("doc_project")
            .selected_text(current)
            .width(220.0)
            .show_ui(ui, |ui| {
                for project in projects {
                    if ui.selectable_label(state.project_id == Some(project.id), &project.name).clicked() {
                        action = DocumentAction::SelectProject(project.id);
                    }
                }
            });
        if state.project_id.is_some() && ui.button(egui_phosphor::regular::ARROW_CLOCKWISE).on_hover_text("Refresh").clicked() {
            action = DocumentAction::Refresh;
        }
    });

    if state.project_id.is_none() {
        ui.add_space(20.0);
        ui.label(RichText::new("Choose a project to browse its documents").color(theme::TEXT_DIM));
        return action;
    }

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if ui.link(format!("{} Root", egui_phosphor::regular::HOUSE)).clicked() {
            action = DocumentAction::NavigateTo(0);
        }
        for (i, segment) in state.path.iter().enumerate() {
            ui.label(RichText::new("/").color(theme::TEXT_DIM));
            if ui.link(segment).clicked() {
                action = DocumentAction::NavigateTo(i + 1);
            }
        }
    });
    ui.separator();

    ui.horizontal(|ui| {
        ui.add(egui::TextEdit::singleline(&mut state.new_folder).hint_text("New folder").desired_width(140.0));
        if ui.button(format!("{} Folder", egui_phosphor::regular::FOLDER_PLUS)).clicked() && !state.new_folder.trim().is_empty() {
            action = DocumentAction::CreateFolder(std::mem::take(&mut state.new_folder));
        }
        ui.separator();
        if ui.button(format!("{} Upload", egui_phosphor::regular::UPLOAD_SIMPLE)).clicked() {
            action = DocumentAction::Upload;
        }
        ui.separator();
        ui.add(egui::TextEdit::singleline(&mut state.link_name).hint_text("Link name").desired_width(120.0));
        ui.add(egui::TextEdit::singleline(&mut state.link_url).hint_text("https://").desired_width(200.0));
        let can_link = !state.link_name.trim().is_empty() && !state.link_url.trim().is_empty();
        if ui.add_enabled(can_link, egui::Button::new(format!("{} Link", egui_phosphor::regular::LINK))).clicked() {
            action = DocumentAction::AddLink {
                name: std::mem::take(&mut state.link_name),
                url: std::mem::take(&mut state.link_url),
            };
        }
    });
    ui.add_space(6.0);

    if state.entries.is_empty() {
        ui.label(RichText::new("This folder is empty").color(theme::TEXT_DIM));
        return action;
    }

    egui::ScrollArea::vertical().id_salt("doc_list").auto_shrink([false, false]).show(ui, |ui| {
        egui::Grid::new("doc_grid")
            .num_columns(4)
            .striped(true)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                for header in ["Name", "Size", "Modified", ""] {
                    ui.label(RichText::new(header).size(10.0).color(theme::TEXT_DIM).strong());
                }
                ui.end_row();

                for entry in &state.entries {
                    let icon = match entry.kind {
                        DocumentKind::Folder => egui_phosphor::regular::FOLDER,
                        DocumentKind::File => egui_phosphor::regular::FILE,
                        DocumentKind::Link => egui_phosphor::regular::LINK,
                    };

                    let renaming_this = state.renaming.as_ref().is_some_and(|(from, _)| from == &entry.name);
                    if renaming_this {
                        let mut commit = false;
                        let mut cancel = false;
                        if let Some((_, to)) = state.renaming.as_mut() {
                            let resp = ui.add(egui::TextEdit::singleline(to).desired_width(200.0));
                            commit = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                            cancel = ui.input(|i| i.key_pressed(egui::Key::Escape));
                        }
                        if commit {
                            if let Some((from, to)) = state.renaming.take() {
                                action = DocumentAction::Rename { from, to };
                            }
                        } else if cancel {
                            state.renaming = None;
                        }
                    } else {
                        let name = RichText::new(format!("{}  {}", icon, entry.name)).color(Color32::WHITE);
                        let resp = ui.add(egui::Label::new(name).sense(egui::Sense::click()));
                        let resp = match &entry.url {
                            Some(url) => resp.on_hover_text(url),
                            None => resp,
                        };
                        if resp.double_clicked() {
                            action = if entry.is_folder() {
                                DocumentAction::EnterFolder(entry.name.clone())
                            } else {
                                DocumentAction::Open(entry.clone())
                            };
                        }
                    }

                    let size = if entry.kind == DocumentKind::File { format_size(entry.size) } else { "—".to_string() };
                    ui.label(RichText::new(size).size(11.0).color(theme::TEXT_SECONDARY));
                    let modified = entry
                        .modified
                        .map(|m| m.with_timezone(&chrono::Local).format("%d/%m/%Y %H:%M").to_string())
                        .unwrap_or_else(|| "—".to_string());
                    ui.label(RichText::new(modified).size(11.0).color(theme::TEXT_SECONDARY));

                    ui.horizontal(|ui| {
                        if entry.kind == DocumentKind::File
                            && ui.small_button(egui_phosphor::regular::COPY).on_hover_text("Copy public URL").clicked()
                        {
                            action = DocumentAction::CopyUrl(entry.name.clone());
                        }
                        if !entry.is_folder()
                            && ui.small_button(egui_phosphor::regular::ARROW_SQUARE_OUT).on_hover_text("Open").clicked()
                        {
                            action = DocumentAction::Open(entry.clone());
                        }
                        if ui.small_button(egui_phosphor::regular::PENCIL_SIMPLE).on_hover_text("Rename").clicked() {
                            state.renaming = Some((entry.name.clone(), entry.name.clone()));
                        }
                        if ui.small_button(egui_phosphor::regular::TRASH).on_hover_text("Delete").clicked() {
                            action = DocumentAction::Delete(entry.name.clone());
                        }
                    });
                    ui.end_row();
                }
            });
    });

    action
}
