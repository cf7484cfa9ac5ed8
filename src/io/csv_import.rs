use std::path::Path;

use tracing::warn;

use crate::error::StoreError;
use crate::model::timeline::parse_date;
use crate::model::{PlanPhase, Risk};
use crate::ui::theme;

/// Map a status or percentage string to a progress value (0.0 – 1.0).
fn parse_progress(s: &str) -> f32 {
    let s = s.trim().to_lowercase();
    if let Ok(pct) = s.trim_end_matches('%').trim().parse::<f32>() {
        let value = if s.ends_with('%') || pct > 1.0 { pct / 100.0 } else { pct };
        return value.clamp(0.0, 1.0);
    }
    match s.as_str() {
        "finished" | "done" | "complete" | "completed" => 1.0,
        "in progress" | "in-progress" | "active" | "started" => 0.5,
        _ => 0.0,
    }
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if semicolons >= commas && semicolons >= tabs {
        b';'
    } else if tabs >= commas {
        b'\t'
    } else {
        b','
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Start,
    End,
    Owner,
    Progress,
    Risk,
    Notes,
}

/// Map a header to a column, ignoring case, spaces, hyphens and underscores.
fn header_to_col(header: &str) -> Option<Column> {
    let normalized = header.trim().to_lowercase().replace([' ', '-', '_'], "");
    match normalized.as_str() {
        "name" | "phase" | "phasename" | "task" | "taskname" | "label" | "title" => Some(Column::Name),
        "start" | "startdate" | "from" | "begin" => Some(Column::Start),
        "end" | "enddate" | "to" | "finish" | "due" | "duedate" => Some(Column::End),
        "owner" | "lead" | "responsible" | "assignee" => Some(Column::Owner),
        "progress" | "status" | "complete" | "done" => Some(Column::Progress),
        "risk" | "risklevel" | "rag" => Some(Column::Risk),
        "notes" | "description" | "comment" | "comments" => Some(Column::Notes),
        _ => None,
    }
}

fn field_value<'r>(record: &'r csv::StringRecord, col_map: &[Option<Column>], col: Column) -> Option<&'r str> {
    col_map
        .iter()
        .position(|c| *c == Some(col))
        .and_then(|idx| record.get(idx))
        .filter(|s| !s.is_empty())
}

/// Import plan phases from CSV text.
///
/// Auto-detects the delimiter and matches headers flexibly. Rows with a
/// missing name or unparseable dates are skipped. Returns
/// `(phases, skipped_count)`.
pub fn import_phases_str(content: &str) -> Result<(Vec<PlanPhase>, usize), StoreError> {
    let first_line = content.lines().next().unwrap_or("");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(first_line))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Column>> = headers.iter().map(header_to_col).collect();
    for required in [Column::Name, Column::Start, Column::End] {
        if !col_map.contains(&Some(required)) {
            let found: Vec<&str> = headers.iter().collect();
            return Err(StoreError::Import(format!(
                "CSV is missing required columns. Found headers: {:?}. \
                 Need columns for: phase name, start date, end date.",
                found
            )));
        }
    }

    let colors = theme::TASK_COLORS;
    let mut phases = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row, error = %e, "skipping unreadable CSV row");
                skipped += 1;
                continue;
            }
        };
        let field = |col: Column| field_value(&record, &col_map, col);

        let Some(name) = field(Column::Name) else {
            skipped += 1;
            continue;
        };
        let (Some(start), Some(end)) = (
            field(Column::Start).and_then(parse_date),
            field(Column::End).and_then(parse_date),
        ) else {
            warn!(row, name, "skipping row with invalid dates");
            skipped += 1;
            continue;
        };

        let mut phase = PlanPhase::new(name, start, end);
        phase.owner = field(Column::Owner).unwrap_or_default().to_string();
        phase.progress = field(Column::Progress).map(parse_progress).unwrap_or(0.0);
        phase.risk = field(Column::Risk).and_then(Risk::parse).unwrap_or_default();
        phase.notes = field(Column::Notes).unwrap_or_default().to_string();
        phase.color = colors[phases.len() % colors.len()];
        phases.push(phase);
    }

    if phases.is_empty() {
        return Err(StoreError::Import(if skipped > 0 {
            format!("No valid phases found in CSV ({} rows skipped)", skipped)
        } else {
            "CSV file is empty or has no data rows".to_string()
        }));
    }
    Ok((phases, skipped))
}

/// Import plan phases from a CSV file.
pub fn import_phases(path: &Path) -> Result<(Vec<PlanPhase>, usize), StoreError> {
    let content = std::fs::read_to_string(path)?;
    import_phases_str(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_semicolon_file_with_optional_columns() {
        let csv = "Phase Name;Start Date;End Date;Owner;Status;Risk\n\
                   Concept;01/03/2025;14/03/2025;Ana;Done;low\n\
                   Joinery;2025-03-15;2025-04-30;Ben;40%;High\n";
        let (phases, skipped) = import_phases_str(csv).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].start, d(2025, 3, 1));
        assert_eq!(phases[0].progress, 1.0);
        assert_eq!(phases[1].owner, "Ben");
        assert!((phases[1].progress - 0.4).abs() < 1e-6);
        assert_eq!(phases[1].risk, Risk::High);
        assert_ne!(phases[0].color, phases[1].color);
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let csv = "name,start,end\n\
                   Good,2025-01-01,2025-01-05\n\
                   ,2025-01-01,2025-01-05\n\
                   Bad dates,someday,2025-01-05\n";
        let (phases, skipped) = import_phases_str(csv).unwrap();
        assert_eq!(phases.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_reversed_dates_are_normalised() {
        let csv = "name,start,end\nFlip,2025-02-10,2025-02-01\n";
        let (phases, _) = import_phases_str(csv).unwrap();
        assert!(phases[0].start <= phases[0].end);
    }

    #[test]
    fn test_missing_required_columns() {
        let err = import_phases_str("title,owner\nA,Ana\n").unwrap_err();
        assert!(matches!(err, StoreError::Import(_)));
        let err = import_phases_str("name,start,end\n").unwrap_err();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn test_parse_progress_variants() {
        assert_eq!(parse_progress("0.25"), 0.25);
        assert_eq!(parse_progress("75"), 0.75);
        assert_eq!(parse_progress("in progress"), 0.5);
        assert_eq!(parse_progress("???"), 0.0);
    }
}
