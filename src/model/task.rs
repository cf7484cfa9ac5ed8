use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Task priority as stored by the data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

/// One contiguous interval of tracked work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub start_time: DateTime<Utc>,
    /// `None` while the session is open.
    pub end_time: Option<DateTime<Utc>>,
    /// Elapsed milliseconds; only authoritative once the session is closed.
    pub total_time: u64,
    /// UTC day the session started; local views derive their own day from
    /// `start_time`.
    pub date: NaiveDate,
}

impl Session {
    pub fn open(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_time: now,
            end_time: None,
            total_time: 0,
            date: now.date_naive(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

/// A task record fetched from the data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub priority: Priority,
    pub created_by: String,
    #[serde(default)]
    pub assignees: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub completed: bool,

    // Time tracking
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_paused: bool,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub current_session: Option<Uuid>,
    /// Sum of closed session totals, in milliseconds.
    #[serde(default)]
    pub total_work_time: u64,
}

impl Task {
    pub fn new(name: impl Into<String>, created_by: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            priority: Priority::default(),
            created_by: created_by.into(),
            assignees: Vec::new(),
            created_at,
            project_id: None,
            subtasks: Vec::new(),
            completed: false,
            is_active: false,
            is_paused: false,
            sessions: Vec::new(),
            current_session: None,
            total_work_time: 0,
        }
    }

    /// Whether `email` may see this task without admin rights.
    pub fn is_visible_to(&self, email: &str) -> bool {
        self.created_by.eq_ignore_ascii_case(email)
            || self.assignees.iter().any(|a| a.eq_ignore_ascii_case(email))
    }

    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.done).count();
        (done, self.subtasks.len())
    }
}

/// Partial update of a task's tracking fields, as accepted by the data API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions: Option<Vec<Session>>,
    /// `Some(None)` clears the pointer and travels as `null`; an absent
    /// field leaves it alone.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub current_session: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_work_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Maps a present field (including `null`) to `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(v) = self.is_active {
            task.is_active = v;
        }
        if let Some(v) = self.is_paused {
            task.is_paused = v;
        }
        if let Some(ref v) = self.sessions {
            task.sessions = v.clone();
        }
        if let Some(v) = self.current_session {
            task.current_session = v;
        }
        if let Some(v) = self.total_work_time {
            task.total_work_time = v;
        }
        if let Some(v) = self.completed {
            task.completed = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        let created = Utc.with_ymd_and_hms(2025, 3, 4, 9, 0, 0).unwrap();
        let mut task = Task::new("Moodboard", "ana@studio.test", created);
        task.assignees.push("Ben@Studio.test".to_string());
        task
    }

    #[test]
    fn test_visibility_matches_creator_and_assignees() {
        let task = sample();
        assert!(task.is_visible_to("ana@studio.test"));
        assert!(task.is_visible_to("ben@studio.test"));
        assert!(!task.is_visible_to("cleo@studio.test"));
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut task = sample();
        task.name = "Keep me".to_string();
        let patch = TaskPatch {
            is_active: Some(true),
            current_session: Some(None),
            total_work_time: Some(42),
            ..Default::default()
        };
        patch.apply(&mut task);
        assert!(task.is_active);
        assert!(!task.is_paused);
        assert_eq!(task.total_work_time, 42);
        assert_eq!(task.name, "Keep me");
    }

    #[test]
    fn test_patch_keeps_cleared_session_over_json() {
        let clear = TaskPatch { current_session: Some(None), ..Default::default() };
        let json = serde_json::to_string(&clear).unwrap();
        assert_eq!(json, r#"{"current_session":null}"#);
        assert_eq!(serde_json::from_str::<TaskPatch>(&json).unwrap(), clear);

        let id = Uuid::new_v4();
        let set = TaskPatch { current_session: Some(Some(id)), ..Default::default() };
        let back: TaskPatch = serde_json::from_str(&serde_json::to_string(&set).unwrap()).unwrap();
        assert_eq!(back.current_session, Some(Some(id)));

        let untouched: TaskPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(untouched.current_session, None);
    }

    #[test]
    fn test_priority_serializes_lowercase() {
        let json = serde_json::to_string(&Priority::High).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
