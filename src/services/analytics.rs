//! Daily analytics series.
//!
//! Every series covers `[today - (days - 1), today]` in UTC calendar days and
//! is dense: one point per day, ascending, zero-filled where no events exist.
//! Raw rows are bucketed by the UTC date of their relevant timestamp and then
//! left-joined against the generated day list.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::dto::{FocusMinutesPoint, MoodFocusPoint, TaskThroughputPoint};
use crate::models::focus_session::FocusSession;
use crate::models::mood::MoodEntry;
use crate::models::task::Task;

/// Longest window any series is computed over, roughly ten years.
pub const MAX_WINDOW_DAYS: u32 = 3660;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsWindow {
    start: NaiveDate,
    today: NaiveDate,
}

impl AnalyticsWindow {
    /// Window of `days` calendar days ending on (and including) `today`.
    /// A zero-day request is treated as one day, and anything longer than
    /// [`MAX_WINDOW_DAYS`] is cut to that.
    pub fn ending_on(today: NaiveDate, days: u32) -> Self {
        let days = days.clamp(1, MAX_WINDOW_DAYS);
        Self {
            start: today - Duration::days(i64::from(days) - 1),
            today,
        }
    }

    pub fn ending_today(days: u32) -> Self {
        Self::ending_on(Utc::now().date_naive(), days)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn day_count(&self) -> usize {
        (self.today - self.start).num_days() as usize + 1
    }

    /// Midnight UTC at the start of the first day.
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Midnight UTC after the last day (exclusive bound).
    pub fn ends_before(&self) -> DateTime<Utc> {
        (self.today + Duration::days(1))
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.today
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.day_count() as i64).map(move |offset| start + Duration::days(offset))
    }
}

fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

/// Sum of work-session minutes per day.
pub fn focus_minutes(window: &AnalyticsWindow, sessions: &[FocusSession]) -> Vec<FocusMinutesPoint> {
    let mut seconds_by_day: HashMap<NaiveDate, i64> = HashMap::new();
    for session in sessions.iter().filter(|s| s.is_work()) {
        let day = session.completed_at.date_naive();
        if window.contains(day) {
            *seconds_by_day.entry(day).or_insert(0) += i64::from(session.duration_seconds);
        }
    }

    window
        .dates()
        .map(|date| FocusMinutesPoint {
            date,
            minutes: seconds_by_day
                .get(&date)
                .map(|secs| round_whole(*secs as f64 / 60.0))
                .unwrap_or(0),
            is_today: date == window.today(),
        })
        .collect()
}

/// Tasks created per day and tasks completed per day.
///
/// `completed` is attributed to the UTC day of the task's `updated_at`, so a
/// completed task that is edited again later moves to the day of that edit.
pub fn task_throughput(window: &AnalyticsWindow, tasks: &[Task]) -> Vec<TaskThroughputPoint> {
    let mut created: HashMap<NaiveDate, i64> = HashMap::new();
    let mut completed: HashMap<NaiveDate, i64> = HashMap::new();

    for task in tasks {
        let created_day = task.created_at.date_naive();
        if window.contains(created_day) {
            *created.entry(created_day).or_insert(0) += 1;
        }
        if task.is_completed() {
            let updated_day = task.updated_at.date_naive();
            if window.contains(updated_day) {
                *completed.entry(updated_day).or_insert(0) += 1;
            }
        }
    }

    window
        .dates()
        .map(|date| TaskThroughputPoint {
            date,
            created: created.get(&date).copied().unwrap_or(0),
            completed: completed.get(&date).copied().unwrap_or(0),
            is_today: date == window.today(),
        })
        .collect()
}

/// Average work-session length on the days each mood label was logged.
///
/// Every mood entry is paired with every work session completed on the same
/// UTC day; the label's value is the mean session length over all of its
/// pairs. Labels with no pairs report 0. Output is ordered by label.
pub fn mood_focus(
    window: &AnalyticsWindow,
    moods: &[MoodEntry],
    sessions: &[FocusSession],
) -> Vec<MoodFocusPoint> {
    let mut session_minutes_by_day: HashMap<NaiveDate, Vec<f64>> = HashMap::new();
    for session in sessions.iter().filter(|s| s.is_work()) {
        session_minutes_by_day
            .entry(session.completed_at.date_naive())
            .or_default()
            .push(session.minutes());
    }

    // label -> (sum of paired session minutes, pair count)
    let mut by_label: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for mood in moods {
        let day = mood.created_at.date_naive();
        if !window.contains(day) {
            continue;
        }
        let entry = by_label.entry(mood.mood.as_str()).or_insert((0.0, 0));
        if let Some(minutes) = session_minutes_by_day.get(&day) {
            entry.0 += minutes.iter().sum::<f64>();
            entry.1 += minutes.len() as u64;
        }
    }

    by_label
        .into_iter()
        .map(|(mood, (sum, pairs))| MoodFocusPoint {
            mood: mood.to_string(),
            focus_minutes: if pairs == 0 {
                0
            } else {
                round_whole(sum / pairs as f64)
            },
        })
        .collect()
}
