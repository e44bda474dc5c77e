use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

use super::source::SourceError;
use crate::services::analytics::AnalyticsWindow;

/// Label of the placeholder mood row shown when there is nothing to chart.
pub const NO_MOOD_DATA: &str = "No mood data yet";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDay {
    pub date: NaiveDate,
    /// `YYYY-MM-DD`, the key server records are matched on.
    pub key: String,
    /// Axis label, e.g. `Jun 8`.
    pub label: String,
    pub is_today: bool,
}

impl CanonicalDay {
    /// The `days` UTC calendar days ending on `today`, oldest first.
    pub fn window(today: NaiveDate, days: u32) -> Vec<CanonicalDay> {
        AnalyticsWindow::ending_on(today, days)
            .dates()
            .map(|date| CanonicalDay {
                date,
                key: date.format("%Y-%m-%d").to_string(),
                label: date.format("%b %-d").to_string(),
                is_today: date == today,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusDisplayPoint {
    pub date: NaiveDate,
    pub label: String,
    pub minutes: i64,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDisplayPoint {
    pub date: NaiveDate,
    pub label: String,
    pub created: i64,
    pub completed: i64,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodDisplayPoint {
    pub mood: String,
    pub focus_minutes: i64,
}

impl MoodDisplayPoint {
    pub fn no_data() -> Self {
        Self {
            mood: NO_MOOD_DATA.into(),
            focus_minutes: 0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.mood == NO_MOOD_DATA && self.focus_minutes == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardModel {
    pub focus_data: Vec<FocusDisplayPoint>,
    pub task_data: Vec<TaskDisplayPoint>,
    pub mood_data: Vec<MoodDisplayPoint>,
}

impl DashboardModel {
    /// What the dashboard shows when every source failed.
    pub fn fallback(today: NaiveDate, days: u32) -> Self {
        let days = CanonicalDay::window(today, days);
        Self {
            focus_data: focus_series(&days, &HashMap::new()),
            task_data: task_series(&days, &HashMap::new()),
            mood_data: vec![MoodDisplayPoint::no_data()],
        }
    }
}

/// Settled outcome of the three fetches, each independent of the others.
#[derive(Debug)]
pub struct SourceOutcomes {
    pub focus: Result<Vec<Value>, SourceError>,
    pub tasks: Result<Vec<Value>, SourceError>,
    pub mood: Result<Vec<Value>, SourceError>,
}

impl SourceOutcomes {
    pub fn all_failed(&self) -> bool {
        self.focus.is_err() && self.tasks.is_err() && self.mood.is_err()
    }
}

/// Merge the fetched series onto the canonical day list ending at `today`.
///
/// Days missing from a series, or every day of a failed series, get zeros.
/// Records without a `date` string are skipped. The mood series has no day
/// axis; it is passed through, or replaced by the single sentinel row when
/// it failed or is empty.
pub fn reconcile(today: NaiveDate, days: u32, outcomes: &SourceOutcomes) -> DashboardModel {
    let canonical = CanonicalDay::window(today, days);

    let focus_by_date = outcomes
        .focus
        .as_ref()
        .map(|records| index_by_date(records))
        .unwrap_or_default();
    let tasks_by_date = outcomes
        .tasks
        .as_ref()
        .map(|records| index_by_date(records))
        .unwrap_or_default();

    let mut mood_data: Vec<MoodDisplayPoint> = outcomes
        .mood
        .as_ref()
        .map(|records| records.iter().filter_map(mood_point).collect())
        .unwrap_or_default();
    if mood_data.is_empty() {
        mood_data.push(MoodDisplayPoint::no_data());
    }

    DashboardModel {
        focus_data: focus_series(&canonical, &focus_by_date),
        task_data: task_series(&canonical, &tasks_by_date),
        mood_data,
    }
}

fn focus_series(days: &[CanonicalDay], by_date: &HashMap<&str, &Value>) -> Vec<FocusDisplayPoint> {
    days.iter()
        .map(|day| FocusDisplayPoint {
            date: day.date,
            label: day.label.clone(),
            minutes: by_date
                .get(day.key.as_str())
                .map(|record| rounded(&record["minutes"]))
                .unwrap_or(0),
            is_today: day.is_today,
        })
        .collect()
}

fn task_series(days: &[CanonicalDay], by_date: &HashMap<&str, &Value>) -> Vec<TaskDisplayPoint> {
    days.iter()
        .map(|day| {
            let record = by_date.get(day.key.as_str());
            TaskDisplayPoint {
                date: day.date,
                label: day.label.clone(),
                created: record.map(|r| count(&r["created"])).unwrap_or(0),
                completed: record.map(|r| count(&r["completed"])).unwrap_or(0),
                is_today: day.is_today,
            }
        })
        .collect()
}

/// Records keyed by their `date` string. Later duplicates win.
fn index_by_date(records: &[Value]) -> HashMap<&str, &Value> {
    let mut by_date = HashMap::with_capacity(records.len());
    let mut skipped = 0usize;
    for record in records {
        match record.get("date").and_then(Value::as_str) {
            Some(date) if !date.is_empty() => {
                by_date.insert(date, record);
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "Skipped analytics records without a date");
    }
    by_date
}

fn mood_point(record: &Value) -> Option<MoodDisplayPoint> {
    let mood = record.get("mood").and_then(Value::as_str)?.trim();
    if mood.is_empty() {
        return None;
    }
    Some(MoodDisplayPoint {
        mood: capitalize(mood),
        focus_minutes: rounded(&record["focusMinutes"]),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn rounded(value: &Value) -> i64 {
    number(value).map(|n| n.round() as i64).unwrap_or(0)
}

fn count(value: &Value) -> i64 {
    number(value).map(|n| n.trunc() as i64).unwrap_or(0)
}
