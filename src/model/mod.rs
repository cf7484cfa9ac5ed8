pub mod bar_layout;
pub mod calendar;
pub mod document;
pub mod drag;
pub mod phase;
pub mod project;
pub mod task;
pub mod timeline;
pub mod tracking;
pub mod workspace;

pub use phase::{Plan, PlanPhase, Risk};
pub use project::{Assignment, Project};
pub use task::{Priority, Session, Task, TaskPatch};
pub use timeline::{PlannerViewport, PlannerZoom, TimelineScale};
pub use workspace::Workspace;
