//! Focus timer state machine and recorded focus sessions.
//!
//! # Responsibility
//! - Model the countdown timer as a pure value driven by explicit ticks.
//! - Define the persisted session record.
//!
//! # Invariants
//! - `time_left_secs` never exceeds the active mode's full duration.
//! - Mode can only change while the timer is paused.
//! - Reaching zero deactivates the timer; only `Pomodoro` runs are counted.

use super::project::ProjectId;
use super::task::TaskId;
use super::{ensure_id, timestamp_now, ValidationError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type FocusSessionId = Uuid;

/// Timer presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FocusMode {
    Pomodoro,
    ShortBreak,
    LongBreak,
    DeepWork,
}

impl FocusMode {
    pub fn minutes(self) -> u32 {
        match self {
            Self::Pomodoro => 25,
            Self::ShortBreak => 5,
            Self::LongBreak => 15,
            Self::DeepWork => 90,
        }
    }

    pub fn total_secs(self) -> u32 {
        self.minutes() * 60
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pomodoro => "Pomodoro",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
            Self::DeepWork => "Deep Work",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pomodoro => "pomodoro",
            Self::ShortBreak => "shortBreak",
            Self::LongBreak => "longBreak",
            Self::DeepWork => "deepWork",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pomodoro" => Some(Self::Pomodoro),
            "shortBreak" => Some(Self::ShortBreak),
            "longBreak" => Some(Self::LongBreak),
            "deepWork" => Some(Self::DeepWork),
            _ => None,
        }
    }
}

/// Countdown timer value. Callers drive it with [`FocusTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTimer {
    pub mode: FocusMode,
    pub time_left_secs: u32,
    pub is_active: bool,
    pub sessions_completed: u32,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self::new(FocusMode::Pomodoro)
    }
}

impl FocusTimer {
    pub fn new(mode: FocusMode) -> Self {
        Self {
            mode,
            time_left_secs: mode.total_secs(),
            is_active: false,
            sessions_completed: 0,
        }
    }

    pub fn start(&mut self) {
        if self.time_left_secs > 0 {
            self.is_active = true;
        }
    }

    pub fn pause(&mut self) {
        self.is_active = false;
    }

    /// Stops the timer and refills the current mode's duration.
    pub fn reset(&mut self) {
        self.is_active = false;
        self.time_left_secs = self.mode.total_secs();
    }

    /// Switches preset. Ignored while running; returns whether it applied.
    pub fn switch_mode(&mut self, mode: FocusMode) -> bool {
        if self.is_active {
            return false;
        }
        self.mode = mode;
        self.time_left_secs = mode.total_secs();
        true
    }

    /// Advances an active timer. Returns `true` when this tick finished it.
    pub fn tick(&mut self, elapsed_secs: u32) -> bool {
        if !self.is_active || self.time_left_secs == 0 {
            return false;
        }
        self.time_left_secs = self.time_left_secs.saturating_sub(elapsed_secs);
        if self.time_left_secs > 0 {
            return false;
        }
        self.is_active = false;
        if self.mode == FocusMode::Pomodoro {
            self.sessions_completed += 1;
        }
        true
    }

    /// Elapsed share of the current run, 0..=100.
    pub fn progress_percent(&self) -> f64 {
        let total = f64::from(self.mode.total_secs());
        (total - f64::from(self.time_left_secs)) / total * 100.0
    }

    /// `mm:ss` rendering of the remaining time.
    pub fn display(&self) -> String {
        format_clock(self.time_left_secs)
    }
}

pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One recorded run of the focus timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub id: FocusSessionId,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default)]
    pub task_id: Option<TaskId>,
    pub mode: FocusMode,
    pub duration_minutes: u32,
    pub completed: bool,
    pub interrupted: bool,
    #[serde(default)]
    pub notes: String,
    pub focus_level: u8,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl FocusSession {
    /// Builds a session that ended now and lasted the mode's full preset.
    pub fn finished(mode: FocusMode, completed: bool, focus_level: u8) -> Self {
        let end_time = timestamp_now();
        let duration_minutes = mode.minutes();
        Self {
            id: Uuid::new_v4(),
            project_id: None,
            task_id: None,
            mode,
            duration_minutes,
            completed,
            interrupted: !completed,
            notes: String::new(),
            focus_level,
            start_time: end_time - Duration::minutes(i64::from(duration_minutes)),
            end_time,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        ensure_id(&self.id)?;
        if !(1..=5).contains(&self.focus_level) {
            return Err(ValidationError::FocusLevelOutOfRange(self.focus_level));
        }
        if self.end_time < self.start_time {
            return Err(ValidationError::InvalidSessionWindow);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{format_clock, FocusMode, FocusSession, FocusTimer};

    #[test]
    fn tick_to_zero_stops_and_counts_pomodoro() {
        let mut timer = FocusTimer::default();
        timer.start();
        assert!(!timer.tick(60));
        assert_eq!(timer.display(), "24:00");

        assert!(timer.tick(10_000));
        assert_eq!(timer.time_left_secs, 0);
        assert!(!timer.is_active);
        assert_eq!(timer.sessions_completed, 1);
    }

    #[test]
    fn break_runs_are_not_counted() {
        let mut timer = FocusTimer::new(FocusMode::ShortBreak);
        timer.start();
        assert!(timer.tick(FocusMode::ShortBreak.total_secs()));
        assert_eq!(timer.sessions_completed, 0);
    }

    #[test]
    fn paused_timer_ignores_ticks_and_allows_mode_switch() {
        let mut timer = FocusTimer::default();
        assert!(!timer.tick(30));
        assert_eq!(timer.time_left_secs, 25 * 60);

        timer.start();
        assert!(!timer.switch_mode(FocusMode::DeepWork));
        timer.pause();
        assert!(timer.switch_mode(FocusMode::DeepWork));
        assert_eq!(timer.time_left_secs, 90 * 60);
    }

    #[test]
    fn reset_refills_and_progress_tracks_elapsed() {
        let mut timer = FocusTimer::new(FocusMode::LongBreak);
        timer.start();
        timer.tick(450);
        assert_eq!(timer.progress_percent(), 50.0);

        timer.reset();
        assert!(!timer.is_active);
        assert_eq!(timer.progress_percent(), 0.0);
    }

    #[test]
    fn clock_pads_minutes_and_seconds() {
        assert_eq!(format_clock(5 * 60 + 7), "05:07");
        assert_eq!(format_clock(0), "00:00");
    }

    #[test]
    fn finished_session_spans_preset_duration() {
        let session = FocusSession::finished(FocusMode::Pomodoro, false, 3);
        assert!(session.interrupted);
        assert_eq!(session.duration_minutes, 25);
        assert_eq!((session.end_time - session.start_time).num_minutes(), 25);
        assert!(session.validate().is_ok());
    }
}
