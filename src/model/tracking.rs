//! Time tracking over a task's session list.
//!
//! The aggregate `total_work_time` only ever counts closed sessions. The
//! live figure shown while a timer runs is derived from the open session's
//! start time, so a missed repaint never loses time.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::TrackingError;
use crate::model::task::{Session, Task, TaskPatch};

const MS_PER_MINUTE: u64 = 60_000;

fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_milliseconds().max(0) as u64
}

impl Task {
    /// Whether a session is currently accumulating time.
    pub fn is_running(&self) -> bool {
        self.is_active && !self.is_paused
    }

    /// Start tracking. Opens the first session of this run.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TrackingError> {
        if self.is_active {
            return Err(TrackingError::AlreadyRunning);
        }
        let session = Session::open(now);
        self.current_session = Some(session.id);
        self.sessions.push(session);
        self.is_active = true;
        self.is_paused = false;
        debug!(task = %self.id, "timer started");
        Ok(())
    }

    /// Close the open session and mark the timer paused.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), TrackingError> {
        if !self.is_running() {
            return Err(TrackingError::NotRunning);
        }
        self.close_current(now);
        self.is_paused = true;
        self.recompute_total();
        debug!(task = %self.id, total_ms = self.total_work_time, "timer paused");
        Ok(())
    }

    /// Open a new session after a pause.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), TrackingError> {
        if !self.is_active {
            return Err(TrackingError::NotRunning);
        }
        if !self.is_paused {
            return Err(TrackingError::NotPaused);
        }
        let session = Session::open(now);
        self.current_session = Some(session.id);
        self.sessions.push(session);
        self.is_paused = false;
        debug!(task = %self.id, "timer resumed");
        Ok(())
    }

    /// Stop tracking, closing the open session if there is one.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<(), TrackingError> {
        if !self.is_active {
            return Err(TrackingError::NotRunning);
        }
        self.close_current(now);
        self.is_active = false;
        self.is_paused = false;
        self.recompute_total();
        debug!(task = %self.id, total_ms = self.total_work_time, "timer stopped");
        Ok(())
    }

    /// Closed-session total plus the live delta of the open session.
    pub fn running_total(&self, now: DateTime<Utc>) -> u64 {
        let closed: u64 = self
            .sessions
            .iter()
            .filter(|s| !s.is_open())
            .map(|s| s.total_time)
            .sum();
        let live = if self.is_running() {
            self.current_session
                .and_then(|id| self.sessions.iter().find(|s| s.id == id))
                .map(|s| elapsed_ms(s.start_time, now))
                .unwrap_or(0)
        } else {
            0
        };
        closed + live
    }

    /// Add (positive) or deduct (negative) minutes on a closed session.
    pub fn adjust_session(&mut self, session_id: Uuid, minutes: i64) -> Result<(), TrackingError> {
        let session = self
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or(TrackingError::SessionNotFound(session_id))?;
        if session.is_open() {
            return Err(TrackingError::SessionOpen);
        }
        let delta = minutes.unsigned_abs() * MS_PER_MINUTE;
        if minutes < 0 {
            if delta > session.total_time {
                return Err(TrackingError::Underflow {
                    requested_ms: delta,
                    available_ms: session.total_time,
                });
            }
            session.total_time -= delta;
        } else {
            session.total_time += delta;
        }
        self.recompute_total();
        Ok(())
    }

    /// Re-sum every closed session into `total_work_time`.
    pub fn recompute_total(&mut self) {
        self.total_work_time = self
            .sessions
            .iter()
            .filter(|s| !s.is_open())
            .map(|s| s.total_time)
            .sum();
    }

    /// Tracking fields to send to the data API after a transition.
    pub fn tracking_patch(&self) -> TaskPatch {
        TaskPatch {
            is_active: Some(self.is_active),
            is_paused: Some(self.is_paused),
            sessions: Some(self.sessions.clone()),
            current_session: Some(self.current_session),
            total_work_time: Some(self.total_work_time),
            completed: None,
        }
    }

    fn close_current(&mut self, now: DateTime<Utc>) {
        if let Some(id) = self.current_session.take() {
            if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
                session.end_time = Some(now);
                session.total_time = elapsed_ms(session.start_time, now);
            }
        }
    }
}

/// Render milliseconds as `HH:MM:SS`.
pub fn format_duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap()
    }

    fn task() -> Task {
        Task::new("Site survey", "ana@studio.test", t0())
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut t = task();
        t.start(t0()).unwrap();
        assert_eq!(t.start(t0()), Err(TrackingError::AlreadyRunning));
        assert_eq!(t.sessions.len(), 1);
    }

    #[test]
    fn test_pause_resume_twice_sums_open_intervals() {
        let mut t = task();
        let start = t0();
        t.start(start).unwrap();
        t.pause(start + Duration::minutes(10)).unwrap();
        t.resume(start + Duration::minutes(15)).unwrap();
        t.pause(start + Duration::minutes(40)).unwrap();
        t.resume(start + Duration::minutes(50)).unwrap();
        t.pause(start + Duration::minutes(55)).unwrap();

        assert_eq!(t.sessions.len(), 3);
        assert_eq!(t.total_work_time, 40 * MS_PER_MINUTE);
        assert!(t.current_session.is_none());
        assert!(t.sessions.iter().all(|s| !s.is_open()));
    }

    #[test]
    fn test_running_total_includes_live_delta_only_when_running() {
        let mut t = task();
        t.start(t0()).unwrap();
        let later = t0() + Duration::seconds(90);
        assert_eq!(t.running_total(later), 90_000);

        t.pause(later).unwrap();
        // Paused: wall clock moves on, total does not.
        assert_eq!(t.running_total(later + Duration::hours(1)), 90_000);
    }

    #[test]
    fn test_running_total_is_monotonic_while_active() {
        let mut t = task();
        t.start(t0()).unwrap();
        let mut last = 0;
        for s in 0..20 {
            let now = t0() + Duration::seconds(s * 7);
            let total = t.running_total(now);
            assert!(total >= last);
            last = total;
        }
    }

    #[test]
    fn test_resume_requires_pause() {
        let mut t = task();
        assert_eq!(t.resume(t0()), Err(TrackingError::NotRunning));
        t.start(t0()).unwrap();
        assert_eq!(t.resume(t0()), Err(TrackingError::NotPaused));
    }

    #[test]
    fn test_stop_closes_open_session() {
        let mut t = task();
        t.start(t0()).unwrap();
        t.stop(t0() + Duration::minutes(25)).unwrap();
        assert!(!t.is_active);
        assert!(!t.is_paused);
        assert_eq!(t.total_work_time, 25 * MS_PER_MINUTE);
        assert_eq!(t.stop(t0()), Err(TrackingError::NotRunning));
    }

    #[test]
    fn test_stop_while_paused_keeps_total() {
        let mut t = task();
        t.start(t0()).unwrap();
        t.pause(t0() + Duration::minutes(5)).unwrap();
        t.stop(t0() + Duration::minutes(30)).unwrap();
        assert_eq!(t.total_work_time, 5 * MS_PER_MINUTE);
    }

    #[test]
    fn test_deduct_then_add_restores_session() {
        let mut t = task();
        t.start(t0()).unwrap();
        t.pause(t0() + Duration::minutes(45)).unwrap();
        let id = t.sessions[0].id;
        let original = t.sessions[0].total_time;

        t.adjust_session(id, -15).unwrap();
        assert_eq!(t.sessions[0].total_time, original - 15 * MS_PER_MINUTE);
        assert_eq!(t.total_work_time, t.sessions[0].total_time);

        t.adjust_session(id, 15).unwrap();
        assert_eq!(t.sessions[0].total_time, original);
        assert_eq!(t.total_work_time, original);
    }

    #[test]
    fn test_deduct_beyond_session_is_rejected() {
        let mut t = task();
        t.start(t0()).unwrap();
        t.pause(t0() + Duration::minutes(5)).unwrap();
        let id = t.sessions[0].id;
        let err = t.adjust_session(id, -10).unwrap_err();
        assert!(matches!(err, TrackingError::Underflow { .. }));
        assert_eq!(t.sessions[0].total_time, 5 * MS_PER_MINUTE);
    }

    #[test]
    fn test_open_session_cannot_be_adjusted() {
        let mut t = task();
        t.start(t0()).unwrap();
        let id = t.sessions[0].id;
        assert_eq!(t.adjust_session(id, 5), Err(TrackingError::SessionOpen));
        assert_eq!(
            t.adjust_session(Uuid::nil(), 5),
            Err(TrackingError::SessionNotFound(Uuid::nil()))
        );
    }

    #[test]
    fn test_tracking_patch_round_trips_through_apply() {
        let mut t = task();
        t.start(t0()).unwrap();
        t.pause(t0() + Duration::minutes(3)).unwrap();

        let mut stored = task();
        stored.id = t.id;
        t.tracking_patch().apply(&mut stored);
        assert_eq!(stored.sessions, t.sessions);
        assert_eq!(stored.total_work_time, t.total_work_time);
        assert!(stored.is_paused);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "00:00:00");
        assert_eq!(format_duration(3_723_000), "01:02:03");
    }
}
