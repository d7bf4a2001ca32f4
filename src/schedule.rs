//! Business-hours schedule evaluation.
//!
//! A weekly schedule holds at most one open window per weekday. Days
//! without a window, and days whose configured window fails to parse,
//! count as closed.

use crate::error::{Result, SentinelError};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};
use log::error;

/// Policy for weekdays with no usable window: closed (interior stays
/// masked) rather than carrying the previous mask state forward.
pub const UNCONFIGURED_DAY_IS_CLOSED: bool = true;

/// One open window within a day, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ScheduleWindow {
    /// Parse a window from the `"H:MM-H:MM"` configuration format.
    pub fn parse(value: &str) -> Result<Self> {
        let (start, end) = value.split_once('-').ok_or_else(|| {
            SentinelError::Config(format!(
                "invalid business hours {value:?}: expected \"H:MM-H:MM\""
            ))
        })?;

        let start = parse_time(start.trim())?;
        let end = parse_time(end.trim())?;

        if end < start {
            return Err(SentinelError::Config(format!(
                "invalid business hours {value:?}: window ends before it starts"
            )));
        }

        Ok(Self { start, end })
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        self.start <= time && time <= self.end
    }
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| SentinelError::Config(format!("invalid time of day {value:?}: {e}")))
}

/// Per-weekday open windows, Monday first.
#[derive(Debug, Clone, Default)]
pub struct WeeklySchedule {
    windows: [Option<ScheduleWindow>; 7],
}

impl WeeklySchedule {
    /// Build the schedule from the raw per-weekday configuration
    /// strings. A malformed entry is logged and leaves that day
    /// closed; it does not fail startup.
    pub fn from_config(hours: &[Option<String>; 7]) -> Self {
        let mut schedule = Self::default();
        for (slot, raw) in schedule.windows.iter_mut().zip(hours) {
            if let Some(raw) = raw {
                match ScheduleWindow::parse(raw) {
                    Ok(window) => *slot = Some(window),
                    Err(e) => error!("Ignoring business-hours entry, day stays closed: {e}"),
                }
            }
        }
        schedule
    }

    pub fn set(&mut self, weekday: Weekday, window: ScheduleWindow) {
        self.windows[weekday.num_days_from_monday() as usize] = Some(window);
    }

    pub fn window_for(&self, weekday: Weekday) -> Option<&ScheduleWindow> {
        self.windows[weekday.num_days_from_monday() as usize].as_ref()
    }

    /// Whether business hours apply at `now`.
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        match self.window_for(now.weekday()) {
            Some(window) => window.contains(now.time()),
            None => !UNCONFIGURED_DAY_IS_CLOSED,
        }
    }
}
