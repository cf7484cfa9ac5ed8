//! Pointer drag handling for phase bars.
//!
//! Deltas are always measured from the snapshot taken when the drag began,
//! so rounding never accumulates across pointer-move events.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use crate::model::calendar::days_in_month;
use crate::model::timeline::PlannerZoom;
use crate::model::PlanPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// No drag in progress, or the phase vanished.
    Idle,
    Applied,
    /// The delta would have put start after end; nothing changed.
    Rejected,
}

#[derive(Debug, Clone)]
struct DragSnapshot {
    phase_id: Uuid,
    mode: DragMode,
    start: NaiveDate,
    end: NaiveDate,
    start_pointer_x: f32,
}

/// Convert a horizontal pixel delta into whole days at the given zoom.
/// Month and quarter zoom approximate with the length of `anchor`'s month.
pub fn day_delta(pixel_delta: f32, zoom: PlannerZoom, anchor: NaiveDate) -> i64 {
    if let Some(day_w) = zoom.day_width() {
        return (pixel_delta / day_w).round() as i64;
    }
    let month_w = zoom.month_width().unwrap_or(150.0);
    let days = days_in_month(anchor.year(), anchor.month()) as f32;
    (pixel_delta / month_w * days).round() as i64
}

#[derive(Debug, Default)]
pub struct DragEngine {
    active: Option<DragSnapshot>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn mode(&self) -> Option<DragMode> {
        self.active.as_ref().map(|s| s.mode)
    }

    pub fn phase_id(&self) -> Option<Uuid> {
        self.active.as_ref().map(|s| s.phase_id)
    }

    /// Pointer-down on a bar body or handle.
    pub fn begin(&mut self, phase: &PlanPhase, mode: DragMode, pointer_x: f32) {
        self.active = Some(DragSnapshot {
            phase_id: phase.id,
            mode,
            start: phase.start,
            end: phase.end,
            start_pointer_x: pointer_x,
        });
    }

    /// Pointer-move: apply the delta since `begin` to the dragged phase.
    pub fn update(&mut self, phases: &mut [PlanPhase], pointer_x: f32, zoom: PlannerZoom) -> DragOutcome {
        let Some(snap) = self.active.as_ref() else {
            return DragOutcome::Idle;
        };
        let Some(phase) = phases.iter_mut().find(|p| p.id == snap.phase_id) else {
            return DragOutcome::Idle;
        };
        let days = day_delta(pointer_x - snap.start_pointer_x, zoom, snap.start);
        if apply_delta(phase, snap, days) {
            DragOutcome::Applied
        } else {
            DragOutcome::Rejected
        }
    }

    /// Pointer-up. Returns the phase that was being dragged.
    pub fn end(&mut self) -> Option<Uuid> {
        let snap = self.active.take()?;
        debug!(phase = %snap.phase_id, mode = ?snap.mode, "drag finished");
        Some(snap.phase_id)
    }
}

fn apply_delta(phase: &mut PlanPhase, snap: &DragSnapshot, days: i64) -> bool {
    let delta = Duration::days(days);
    match snap.mode {
        DragMode::Move => {
            phase.start = snap.start + delta;
            phase.end = snap.end + delta;
            true
        }
        DragMode::ResizeStart => {
            let new_start = snap.start + delta;
            if new_start > phase.end {
                return false;
            }
            phase.start = new_start;
            true
        }
        DragMode::ResizeEnd => {
            let new_end = snap.end + delta;
            if new_end < phase.start {
                return false;
            }
            phase.end = new_end;
            true
        }
    }
}
