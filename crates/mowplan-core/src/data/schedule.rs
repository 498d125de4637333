//! Weekly mowing schedules.
//!
//! Days are numbered from Monday (0) to Sunday (6); start times are wall
//! clock times in whatever time zone the caller's `now` is expressed in.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

fn default_days() -> Vec<u8> {
    vec![0, 2, 4]
}

fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default()
}

fn default_duration() -> u32 {
    60
}

fn default_priority() -> i32 {
    1
}

fn default_true() -> bool {
    true
}

/// When a zone should be mowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MowingSchedule {
    /// Weekdays, 0 = Monday
    #[serde(default = "default_days")]
    pub days: Vec<u8>,
    #[serde(default = "default_start_time")]
    pub start_time: NaiveTime,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Higher runs first when several zones are due
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for MowingSchedule {
    fn default() -> Self {
        Self {
            days: default_days(),
            start_time: default_start_time(),
            duration_minutes: default_duration(),
            priority: default_priority(),
            enabled: true,
        }
    }
}

impl MowingSchedule {
    /// Every day at `start_time`
    pub fn daily(start_time: NaiveTime) -> Self {
        Self {
            days: (0..7).collect(),
            start_time,
            ..Self::default()
        }
    }

    pub fn with_days(mut self, days: impl Into<Vec<u8>>) -> Self {
        self.days = days.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn runs_on(&self, weekday: u8) -> bool {
        self.days.contains(&weekday)
    }

    /// Scheduled today, past the start time and not yet completed today
    pub fn is_due<Tz: TimeZone>(&self, now: &DateTime<Tz>, completed_last: Option<&DateTime<Utc>>) -> bool {
        if !self.enabled || !self.runs_on(weekday_index(now)) || now.time() < self.start_time {
            return false;
        }
        let today = now.date_naive();
        completed_last.map_or(true, |done| done.with_timezone(&now.timezone()).date_naive() < today)
    }

    /// Whole days until the next scheduled start that is still ahead of
    /// `now`; 0 for a start later today. `None` without valid days.
    pub fn days_until_next<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<u32> {
        if !self.enabled {
            return None;
        }
        let today = u32::from(weekday_index(now));
        let started = now.time() >= self.start_time;
        self.days
            .iter()
            .filter(|&&day| day < 7)
            .map(|&day| match (u32::from(day) + 7 - today) % 7 {
                0 if started => 7,
                away => away,
            })
            .min()
    }
}

fn weekday_index<Tz: TimeZone>(now: &DateTime<Tz>) -> u8 {
    // always < 7
    now.weekday().num_days_from_monday() as u8
}

/// Accepts RFC 3339 timestamps as well as naive ISO 8601 ones, which are
/// taken as UTC.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_timestamp(&s).map_err(serde::de::Error::custom))
        .transpose()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").map(|t| t.and_utc()))
        .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
}
