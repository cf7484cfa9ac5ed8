use std::path::Path;

use chrono::{FixedOffset, Utc};

use crate::error::StoreError;
use crate::model::project::project_name;
use crate::model::{Project, Task};

/// Write a semicolon-delimited timesheet with one row per closed session.
///
/// Columns: Task ; Project ; Date ; Start ; End ; Minutes
/// Dates and times are shown in `offset`. Returns the number of sessions written.
pub fn export_timesheet<W: std::io::Write>(
    tasks: &[Task],
    projects: &[Project],
    offset: FixedOffset,
    writer: W,
) -> Result<usize, StoreError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(["Task", "Project", "Date", "Start", "End", "Minutes"])?;

    let mut rows = 0;
    for task in tasks {
        let project = project_name(projects, task.project_id);
        for session in task.sessions.iter().filter(|s| !s.is_open()) {
            let start = session.start_time.with_timezone(&offset);
            let end = session.end_time.unwrap_or_else(Utc::now);
            wtr.write_record([
                task.name.clone(),
                project.clone(),
                start.date_naive().format("%Y-%m-%d").to_string(),
                start.format("%H:%M").to_string(),
                end.with_timezone(&offset).format("%H:%M").to_string(),
                (session.total_time / 60_000).to_string(),
            ])?;
            rows += 1;
        }
    }

    wtr.flush()?;
    Ok(rows)
}

/// Export the timesheet to a file.
pub fn export_timesheet_file(
    tasks: &[Task],
    projects: &[Project],
    offset: FixedOffset,
    path: &Path,
) -> Result<usize, StoreError> {
    let file = std::fs::File::create(path)?;
    export_timesheet(tasks, projects, offset, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_only_closed_sessions_are_written() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let project = Project::new("Harbour Loft");
        let mut task = Task::new("Survey", "ana@studio.test", t0);
        task.project_id = Some(project.id);
        task.start(t0).unwrap();
        task.pause(t0 + Duration::minutes(30)).unwrap();
        task.resume(t0 + Duration::minutes(45)).unwrap();

        let mut out = Vec::new();
        let rows = export_timesheet(&[task], &[project], FixedOffset::east_opt(0).unwrap(), &mut out).unwrap();
        assert_eq!(rows, 1);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Task;Project;Date;Start;End;Minutes");
        assert_eq!(lines[1], "Survey;Harbour Loft;2025-03-10;09:00;09:30;30");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_date_follows_export_offset() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 4, 22, 30, 0).unwrap();
        let mut task = Task::new("Survey", "ana@studio.test", t0);
        task.start(t0).unwrap();
        task.stop(t0 + Duration::minutes(30)).unwrap();
        let mut out = Vec::new();
        export_timesheet(&[task], &[], FixedOffset::east_opt(2 * 3600).unwrap(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().nth(1), Some("Survey;—;2025-03-05;00:30;01:00;30"));
    }

    #[test]
    fn test_unknown_project_shows_placeholder() {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap();
        let mut task = Task::new("Admin", "ana@studio.test", t0);
        task.start(t0).unwrap();
        task.stop(t0 + Duration::minutes(5)).unwrap();
        let mut out = Vec::new();
        export_timesheet(&[task], &[], FixedOffset::east_opt(3600).unwrap(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Admin;—;2025-03-10;10:00;10:05;5"));
    }
}
