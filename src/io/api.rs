//! The data API the views bind to, and a local JSON-file implementation.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::io::file::{load_workspace, save_workspace};
use crate::model::{Plan, Project, Task, TaskPatch, Workspace};

/// Records owned by the studio's backend.
pub trait StudioApi {
    /// Tasks visible to `requester`; admins see every task.
    fn list_tasks(&self, requester: &str, is_admin: bool) -> Result<Vec<Task>, StoreError>;

    /// Apply a partial update and return the stored task.
    fn update_task(&mut self, id: Uuid, patch: &TaskPatch) -> Result<Task, StoreError>;

    fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    fn get_project(&self, id: Uuid) -> Result<Project, StoreError>;

    /// The project's plan, or an empty one if none was saved yet.
    fn load_plan(&self, project_id: Uuid) -> Result<Plan, StoreError>;

    fn save_plan(&mut self, plan: &Plan) -> Result<(), StoreError>;
}

/// Keeps the whole workspace in memory and rewrites the file on each mutation.
pub struct JsonFileApi {
    path: PathBuf,
    workspace: Workspace,
}

impl JsonFileApi {
    /// Open `path`, seeding it with sample data if it does not exist.
    pub fn open(path: &Path, today: NaiveDate, user: &str) -> Result<Self, StoreError> {
        let workspace = if path.exists() {
            let ws = load_workspace(path)?;
            info!(path = %path.display(), tasks = ws.tasks.len(), projects = ws.projects.len(), "workspace loaded");
            ws
        } else {
            let ws = Workspace::sample(today, user);
            save_workspace(&ws, path)?;
            info!(path = %path.display(), "seeded sample workspace");
            ws
        };
        Ok(Self { path: path.to_path_buf(), workspace })
    }

    /// In-memory store over an existing workspace; nothing is written until
    /// the first mutation.
    pub fn with_workspace(path: &Path, workspace: Workspace) -> Self {
        Self { path: path.to_path_buf(), workspace }
    }

    /// Write `next` to disk and only then make it the in-memory state.
    fn commit(&mut self, mut next: Workspace) -> Result<(), StoreError> {
        next.touch();
        save_workspace(&next, &self.path).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "failed to write workspace");
        })?;
        self.workspace = next;
        Ok(())
    }
}

impl StudioApi for JsonFileApi {
    fn list_tasks(&self, requester: &str, is_admin: bool) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .workspace
            .tasks
            .iter()
            .filter(|t| is_admin || t.is_visible_to(requester))
            .cloned()
            .collect())
    }

    fn update_task(&mut self, id: Uuid, patch: &TaskPatch) -> Result<Task, StoreError> {
        let mut next = self.workspace.clone();
        let task = next
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { entity: "Task", id })?;
        patch.apply(task);
        let updated = task.clone();
        self.commit(next)?;
        Ok(updated)
    }

    fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.workspace.projects.clone())
    }

    fn get_project(&self, id: Uuid) -> Result<Project, StoreError> {
        self.workspace
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound { entity: "Project", id })
    }

    fn load_plan(&self, project_id: Uuid) -> Result<Plan, StoreError> {
        Ok(self
            .workspace
            .plans
            .iter()
            .find(|p| p.project_id == project_id)
            .cloned()
            .unwrap_or_else(|| Plan::new(project_id)))
    }

    fn save_plan(&mut self, plan: &Plan) -> Result<(), StoreError> {
        if !self.workspace.projects.iter().any(|p| p.id == plan.project_id) {
            return Err(StoreError::NotFound { entity: "Project", id: plan.project_id });
        }
        let mut next = self.workspace.clone();
        match next.plans.iter_mut().find(|p| p.project_id == plan.project_id) {
            Some(existing) => *existing = plan.clone(),
            None => next.plans.push(plan.clone()),
        }
        self.commit(next)?;
        info!(project = %plan.project_id, phases = plan.phases.len(), "plan saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlanPhase;
    use chrono::{TimeZone, Utc};

    const USER: &str = "ana@studio.test";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn test_open_seeds_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        let api = JsonFileApi::open(&path, today(), USER).unwrap();
        assert!(path.exists());
        let projects = api.list_projects().unwrap();
        assert!(!projects.is_empty());

        let reopened = JsonFileApi::open(&path, today(), USER).unwrap();
        assert_eq!(reopened.list_projects().unwrap(), projects);
    }

    #[test]
    fn test_list_tasks_filters_by_requester() {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let mine = Task::new("Mine", USER, created);
        let mut assigned = Task::new("Assigned", "ben@studio.test", created);
        assigned.assignees.push(USER.to_string());
        let other = Task::new("Other", "ben@studio.test", created);
        let ws = Workspace { tasks: vec![mine, assigned, other], ..Default::default() };

        let dir = tempfile::tempdir().unwrap();
        let api = JsonFileApi::with_workspace(&dir.path().join("w.json"), ws);
        let names: Vec<_> = api.list_tasks(USER, false).unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Mine", "Assigned"]);
        assert_eq!(api.list_tasks(USER, true).unwrap().len(), 3);
    }

    #[test]
    fn test_update_task_persists_patch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        let mut api = JsonFileApi::open(&path, today(), USER).unwrap();
        let id = api.list_tasks(USER, true).unwrap()[0].id;

        let patch = TaskPatch { total_work_time: Some(1234), ..Default::default() };
        let updated = api.update_task(id, &patch).unwrap();
        assert_eq!(updated.total_work_time, 1234);

        let reopened = JsonFileApi::open(&path, today(), USER).unwrap();
        let stored = reopened.list_tasks(USER, true).unwrap().into_iter().find(|t| t.id == id).unwrap();
        assert_eq!(stored.total_work_time, 1234);
    }

    #[test]
    fn test_update_unknown_task_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = JsonFileApi::with_workspace(&dir.path().join("w.json"), Workspace::default());
        let err = api.update_task(Uuid::nil(), &TaskPatch::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Task", .. }));
        assert!(!dir.path().join("w.json").exists());
    }

    #[test]
    fn test_plan_defaults_empty_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workspace.json");
        let mut api = JsonFileApi::open(&path, today(), USER).unwrap();
        let project = api.list_projects().unwrap()[1].clone();

        let mut plan = api.load_plan(project.id).unwrap();
        assert!(plan.phases.is_empty());
        plan.phases.push(PlanPhase::new("Strip-out", today(), today()));
        api.save_plan(&plan).unwrap();

        let reopened = JsonFileApi::open(&path, today(), USER).unwrap();
        assert_eq!(reopened.load_plan(project.id).unwrap(), plan);
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let seeded = Workspace::sample(today(), USER);
        let task_id = seeded.tasks[0].id;
        let before = seeded.tasks[0].total_work_time;
        let project_id = seeded.projects[0].id;
        let plan_before = seeded.plans.iter().find(|p| p.project_id == project_id).cloned();
        // A directory at the target path makes every write fail.
        let mut api = JsonFileApi::with_workspace(dir.path(), seeded);

        let patch = TaskPatch { total_work_time: Some(999), ..Default::default() };
        assert!(api.update_task(task_id, &patch).is_err());
        let stored = api.list_tasks(USER, true).unwrap().into_iter().find(|t| t.id == task_id).unwrap();
        assert_eq!(stored.total_work_time, before);

        let mut plan = Plan::new(project_id);
        plan.phases.push(PlanPhase::new("Joinery", today(), today()));
        assert!(api.save_plan(&plan).is_err());
        let reloaded = api.load_plan(project_id).unwrap();
        assert_eq!(reloaded, plan_before.unwrap_or_else(|| Plan::new(project_id)));
    }

    #[test]
    fn test_save_plan_for_unknown_project_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut api = JsonFileApi::with_workspace(&dir.path().join("w.json"), Workspace::default());
        assert!(api.save_plan(&Plan::new(Uuid::new_v4())).is_err());
        assert!(api.get_project(Uuid::nil()).is_err());
    }
}
