pub mod calendar_view;
pub mod dialogs;
pub mod documents;
pub mod phase_editor;
pub mod phase_table;
pub mod planner;
pub mod theme;
pub mod time_tracking;
pub mod timeline_view;
pub mod toasts;
pub mod toolbar;
