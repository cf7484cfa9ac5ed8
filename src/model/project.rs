use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Concept,
    Design,
    Procurement,
    Installation,
    Completed,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::Concept => "Concept",
            ProjectStatus::Design => "Design",
            ProjectStatus::Procurement => "Procurement",
            ProjectStatus::Installation => "Installation",
            ProjectStatus::Completed => "Completed",
        }
    }
}

/// A staff member booked onto a project for a date range.
///
/// Dates are kept as the API sends them (ISO strings) and parsed when laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub staff: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

/// A studio project. Read-only here; owned by the data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub team: Vec<Assignment>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            client: String::new(),
            status: ProjectStatus::default(),
            start: None,
            end: None,
            team: Vec::new(),
        }
    }
}

/// Display name for a project reference, or an em dash when unknown.
pub fn project_name(projects: &[Project], id: Option<Uuid>) -> String {
    id.and_then(|id| projects.iter().find(|p| p.id == id))
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "—".to_string())
}
