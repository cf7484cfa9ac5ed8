use chrono::NaiveDate;
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Risk {
    #[default]
    Low,
    Medium,
    High,
}

impl Risk {
    pub fn all() -> &'static [Risk] {
        &[Risk::Low, Risk::Medium, Risk::High]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Risk::Low => "Low",
            Risk::Medium => "Medium",
            Risk::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Risk> {
        match s.trim().to_lowercase().as_str() {
            "low" | "l" | "green" => Some(Risk::Low),
            "medium" | "med" | "m" | "amber" => Some(Risk::Medium),
            "high" | "h" | "red" => Some(Risk::High),
            _ => None,
        }
    }
}

/// A named, date-ranged segment of a project plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredPhase")]
pub struct PlanPhase {
    pub id: Uuid,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub owner: String,
    /// Progress from 0.0 (not started) to 1.0 (complete).
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub risk: Risk,
    /// Display color for the phase bar (stored as RGBA).
    #[serde(with = "color_serde")]
    pub color: Color32,
    #[serde(default)]
    pub expanded: bool,
    #[serde(default)]
    pub notes: String,
}

/// On-disk shape of a phase; loading raises `end` to `start` like `PlanPhase::new`.
#[derive(Deserialize)]
struct StoredPhase {
    id: Uuid,
    name: String,
    start: NaiveDate,
    end: NaiveDate,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    progress: f32,
    #[serde(default)]
    risk: Risk,
    #[serde(with = "color_serde")]
    color: Color32,
    #[serde(default)]
    expanded: bool,
    #[serde(default)]
    notes: String,
}

impl From<StoredPhase> for PlanPhase {
    fn from(stored: StoredPhase) -> Self {
        Self {
            id: stored.id,
            name: stored.name,
            start: stored.start,
            end: stored.end.max(stored.start),
            owner: stored.owner,
            progress: stored.progress.clamp(0.0, 1.0),
            risk: stored.risk,
            color: stored.color,
            expanded: stored.expanded,
            notes: stored.notes,
        }
    }
}

impl PlanPhase {
    /// Create a phase; `end` is raised to `start` if it precedes it.
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start,
            end: end.max(start),
            owner: String::new(),
            progress: 0.0,
            risk: Risk::default(),
            color: Color32::from_rgb(70, 130, 180), // Steel blue
            expanded: false,
            notes: String::new(),
        }
    }

    /// Inclusive duration in days.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// The phase plan of a single project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub project_id: Uuid,
    #[serde(default)]
    pub phases: Vec<PlanPhase>,
}

impl Plan {
    pub fn new(project_id: Uuid) -> Self {
        Self {
            project_id,
            phases: Vec::new(),
        }
    }

    pub fn phase(&self, id: Uuid) -> Option<&PlanPhase> {
        self.phases.iter().find(|p| p.id == id)
    }

    pub fn phase_mut(&mut self, id: Uuid) -> Option<&mut PlanPhase> {
        self.phases.iter_mut().find(|p| p.id == id)
    }

    pub fn remove_phase(&mut self, id: Uuid) -> Option<PlanPhase> {
        let idx = self.phases.iter().position(|p| p.id == id)?;
        Some(self.phases.remove(idx))
    }

    /// Earliest start and latest end across all phases.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.phases.iter().map(|p| p.start).min()?;
        let max = self.phases.iter().map(|p| p.end).max()?;
        Some((min, max))
    }

    /// Mean progress weighted by phase duration.
    pub fn overall_progress(&self) -> f32 {
        let total: i64 = self.phases.iter().map(|p| p.duration_days()).sum();
        if total == 0 {
            return 0.0;
        }
        let done: f32 = self
            .phases
            .iter()
            .map(|p| p.progress.clamp(0.0, 1.0) * p.duration_days() as f32)
            .sum();
        done / total as f32
    }
}

/// Serde helper for `Color32`.
mod color_serde {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rgba = [color.r(), color.g(), color.b(), color.a()];
        rgba.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rgba: [u8; 4] = Deserialize::deserialize(deserializer)?;
        Ok(Color32::from_rgba_premultiplied(
            rgba[0], rgba[1], rgba[2], rgba[3],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_new_phase_never_ends_before_start() {
        let p = PlanPhase::new("Survey", d(2025, 3, 10), d(2025, 3, 1));
        assert_eq!(p.end, p.start);
        assert_eq!(p.duration_days(), 1);
    }

    #[test]
    fn test_overall_progress_weights_by_duration() {
        let mut plan = Plan::new(Uuid::new_v4());
        let mut a = PlanPhase::new("Concept", d(2025, 1, 1), d(2025, 1, 10));
        a.progress = 1.0;
        let b = PlanPhase::new("Build", d(2025, 1, 11), d(2025, 2, 9));
        plan.phases = vec![a, b];
        assert!((plan.overall_progress() - 0.25).abs() < 1e-6);
        assert_eq!(plan.date_range(), Some((d(2025, 1, 1), d(2025, 2, 9))));
    }

    #[test]
    fn test_phase_json_keeps_iso_dates_and_color() {
        let mut p = PlanPhase::new("Install", d(2025, 6, 1), d(2025, 6, 3));
        p.risk = Risk::High;
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"2025-06-01\""));
        assert!(json.contains("\"high\""));
        let back: PlanPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(back.color, p.color);
    }

    #[test]
    fn test_loading_reversed_phase_restores_order() {
        let p = PlanPhase::new("Install", d(2025, 6, 1), d(2025, 6, 3));
        let json = serde_json::to_string(&p).unwrap().replace("\"2025-06-03\"", "\"2025-05-20\"");
        let back: PlanPhase = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start, d(2025, 6, 1));
        assert_eq!(back.end, d(2025, 6, 1));
        assert_eq!(back.id, p.id);
    }
}
