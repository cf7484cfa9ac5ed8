use chrono::{DateTime, Duration, NaiveDate, Utc};
use egui::Color32;
use serde::{Deserialize, Serialize};

use super::phase::{Plan, PlanPhase, Risk};
use super::project::{Assignment, Project, ProjectStatus};
use super::task::{Priority, Subtask, Task};

/// Everything the local data API persists in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub plans: Vec<Plan>,
    pub modified: DateTime<Utc>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            tasks: Vec::new(),
            plans: Vec::new(),
            modified: Utc::now(),
        }
    }
}

impl Workspace {
    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Sample studio data for a first run, centred on `today`.
    pub fn sample(today: NaiveDate, user: &str) -> Self {
        let days = Duration::days;
        let now = Utc::now();

        let mut loft = Project::new("Harbour Loft");
        loft.client = "M. Okafor".to_string();
        loft.status = ProjectStatus::Design;
        loft.start = Some(today - days(20));
        loft.end = Some(today + days(70));
        loft.team = vec![
            Assignment { staff: "Ana".into(), role: "Lead designer".into(), start: (today - days(20)).to_string(), end: (today + days(40)).to_string() },
            Assignment { staff: "Ben".into(), role: "Procurement".into(), start: (today + days(10)).to_string(), end: (today + days(60)).to_string() },
        ];

        let mut cafe = Project::new("Corner Café Refit");
        cafe.client = "Bloom & Bean".to_string();
        cafe.status = ProjectStatus::Procurement;
        cafe.start = Some(today - days(45));
        cafe.end = Some(today + days(25));
        cafe.team = vec![
            Assignment { staff: "Cleo".into(), role: "Site lead".into(), start: (today - days(10)).to_string(), end: (today + days(25)).to_string() },
            Assignment { staff: "Ana".into(), role: "Finishes".into(), start: (today + days(5)).to_string(), end: (today + days(20)).to_string() },
        ];

        let mut moodboard = Task::new("Living room moodboard", user, now - days(2));
        moodboard.priority = Priority::High;
        moodboard.project_id = Some(loft.id);
        moodboard.subtasks = vec![
            Subtask { name: "Fabric swatches".into(), done: true },
            Subtask { name: "Lighting references".into(), done: false },
        ];

        let mut survey = Task::new("Measured survey", user, now - days(6));
        survey.project_id = Some(loft.id);
        survey.assignees = vec!["ben@studio.example".to_string()];

        let mut samples = Task::new("Order tile samples", "cleo@studio.example", now);
        samples.priority = Priority::Low;
        samples.project_id = Some(cafe.id);
        samples.assignees = vec![user.to_string()];

        let phase = |name: &str, from: i64, to: i64, color: Color32| {
            let mut p = PlanPhase::new(name, today + days(from), today + days(to));
            p.color = color;
            p
        };
        let mut concept = phase("Concept", -20, -5, Color32::from_rgb(66, 133, 244));
        concept.progress = 1.0;
        concept.owner = "Ana".into();
        let mut design = phase("Detailed design", -5, 20, Color32::from_rgb(52, 168, 83));
        design.progress = 0.3;
        design.owner = "Ana".into();
        design.risk = Risk::Medium;
        let mut procurement = phase("Procurement", 15, 45, Color32::from_rgb(251, 140, 0));
        procurement.owner = "Ben".into();
        procurement.risk = Risk::High;
        let install = phase("Installation", 45, 70, Color32::from_rgb(171, 71, 188));

        let plan = Plan {
            project_id: loft.id,
            phases: vec![concept, design, procurement, install],
        };

        Self {
            projects: vec![loft, cafe],
            tasks: vec![moodboard, survey, samples],
            plans: vec![plan],
            modified: now,
        }
    }
}
