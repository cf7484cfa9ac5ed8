//! Persisted user settings (lives in the OS config directory).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::calendar::{CalendarView, WeekStart};
use crate::model::PlannerZoom;

const APP_NAME: &str = "StudioPlanner";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Identity used to filter the task list.
    pub user_email: String,
    pub is_admin: bool,
    /// Prefix for public document URLs.
    pub storage_base_url: String,
    /// Overrides the OS data directory when set.
    pub data_dir: Option<PathBuf>,
    pub week_start: WeekStart,
    pub calendar_view: CalendarView,
    pub planner_zoom: PlannerZoom,
    /// Fallback tracing filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            user_email: "studio@studio.example".into(),
            is_admin: true,
            storage_base_url: "https://storage.studio.example/documents".into(),
            data_dir: None,
            week_start: WeekStart::default(),
            calendar_view: CalendarView::default(),
            planner_zoom: PlannerZoom::default(),
            log_filter: "studio_planner=info".into(),
        }
    }
}

impl AppSettings {
    /// Load from `path`; a missing or unreadable file yields defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring malformed settings");
                Self::default()
            }),
            Err(_) => {
                debug!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), crate::error::StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Directory holding the workspace file and project documents.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// Path of `settings.json`.
pub fn settings_path() -> PathBuf {
    match directories::ProjectDirs::from("", "", APP_NAME) {
        Some(dirs) => dirs.config_dir().join("settings.json"),
        None => PathBuf::from(".").join("settings.json"),
    }
}

fn default_data_dir() -> PathBuf {
    match directories::ProjectDirs::from("", "", APP_NAME) {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => PathBuf::from(".").join("data"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load(&dir.path().join("nope.json"));
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "user_email": "ana@studio.test", "week_start": "Monday" }"#).unwrap();
        let settings = AppSettings::load(&path);
        assert_eq!(settings.user_email, "ana@studio.test");
        assert_eq!(settings.week_start, WeekStart::Monday);
        assert_eq!(settings.planner_zoom, PlannerZoom::Week);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = AppSettings {
            is_admin: false,
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(AppSettings::load(&path), settings);
        assert_eq!(settings.resolved_data_dir(), dir.path());
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppSettings::load(&path), AppSettings::default());
    }
}
