//! Activity record types
//!
//! Records are built once per load from [`RawEvent`]s and never mutated
//! afterwards; the only derived data is the set of time buckets.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::store::{RecordError, RecordResult};

/// View name used for records that carry no view
pub const DELETED_VIEW: &str = "Deleted";

/// External identifier of an activity event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(from = "RawId")]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        RecordId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId(s.to_string())
    }
}

/// Event ids arrive either as strings or as numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for RecordId {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => RecordId(s),
            RawId::Number(n) => RecordId(n.to_string()),
        }
    }
}

/// Kind of activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Read,
    Modified,
    Created,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [ActivityType::Read, ActivityType::Modified, ActivityType::Created];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Read => "read",
            ActivityType::Modified => "modified",
            ActivityType::Created => "created",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// First day of a week bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// First day of the week containing `day`
    pub fn week_of(self, day: NaiveDate) -> Option<NaiveDate> {
        let into_week = match self {
            WeekStart::Sunday => day.weekday().num_days_from_sunday(),
            WeekStart::Monday => day.weekday().num_days_from_monday(),
        };
        day.checked_sub_days(Days::new(u64::from(into_week)))
    }
}

/// How timestamps are bucketed at load time
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Offset from UTC, in minutes, of the calendar the buckets use
    pub utc_offset_minutes: i32,
    pub week_start: WeekStart,
}

impl BucketConfig {
    pub fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes.checked_mul(60)?)
    }
}

/// Calendar buckets derived from an event timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBuckets {
    pub date: DateTime<FixedOffset>,
    pub day: NaiveDate,
    /// First day of the week containing `day`
    pub week: NaiveDate,
    /// First day of the month containing `day`
    pub month: NaiveDate,
    pub year: i32,
}

impl TimeBuckets {
    /// Derive buckets from epoch milliseconds
    pub fn derive(when: i64, offset: FixedOffset, week_start: WeekStart) -> Option<Self> {
        let date = DateTime::<Utc>::from_timestamp_millis(when)?.with_timezone(&offset);
        let day = date.date_naive();
        let week = week_start.week_of(day)?;
        let month = Self::month_of(day)?;

        Some(TimeBuckets {
            date,
            day,
            week,
            month,
            year: day.year(),
        })
    }

    /// First day of the month containing `day`
    pub fn month_of(day: NaiveDate) -> Option<NaiveDate> {
        day.with_day(1)
    }
}

/// Raw input event, as supplied by the host application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub activity: ActivityType,
    /// Epoch milliseconds
    pub when: i64,
    pub from: String,
    pub from_id: String,
    pub from_pseudo: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub to_pseudo: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub view: Option<String>,
    #[serde(default)]
    pub body: String,
}

/// An immutable activity record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    #[serde(rename = "type")]
    pub activity: ActivityType,
    pub when: i64,
    /// Actor real name
    pub from: String,
    pub from_id: String,
    pub from_pseudo: String,
    /// Target real name (read relations)
    pub to: Option<String>,
    pub to_pseudo: Option<String>,
    pub title: String,
    pub view: Option<String>,
    pub body: String,
    #[serde(flatten)]
    pub buckets: TimeBuckets,
}

impl Record {
    pub(crate) fn from_raw(raw: RawEvent, config: &BucketConfig) -> RecordResult<Self> {
        let offset = config
            .offset()
            .ok_or(RecordError::InvalidOffset(config.utc_offset_minutes))?;
        let buckets = TimeBuckets::derive(raw.when, offset, config.week_start).ok_or_else(|| {
            RecordError::InvalidTimestamp {
                id: raw.id.clone(),
                when: raw.when,
            }
        })?;

        Ok(Record {
            id: raw.id,
            activity: raw.activity,
            when: raw.when,
            from: raw.from,
            from_id: raw.from_id,
            from_pseudo: raw.from_pseudo,
            to: raw.to,
            to_pseudo: raw.to_pseudo,
            title: raw.title,
            view: raw.view,
            body: raw.body,
            buckets,
        })
    }

    /// The record's view, or [`DELETED_VIEW`] when it has none.
    ///
    /// "No view assigned" and "view was deleted" are not distinguished.
    pub fn view_or_deleted(&self) -> &str {
        self.view.as_deref().unwrap_or(DELETED_VIEW)
    }

    pub fn is_read(&self) -> bool {
        self.activity == ActivityType::Read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-14T10:30:00Z, a Thursday
    const THURSDAY_MS: i64 = 1_710_412_200_000;

    #[test]
    fn test_buckets_sunday_week() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let b = TimeBuckets::derive(THURSDAY_MS, offset, WeekStart::Sunday).unwrap();

        assert_eq!(b.day, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
        assert_eq!(b.week, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(b.month, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(b.year, 2024);
    }

    #[test]
    fn test_buckets_monday_week_and_offset() {
        // +14h pushes the instant into Friday local time
        let offset = FixedOffset::east_opt(14 * 3600).unwrap();
        let b = TimeBuckets::derive(THURSDAY_MS, offset, WeekStart::Monday).unwrap();

        assert_eq!(b.day, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(b.week, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    }

    #[test]
    fn test_out_of_range_timestamp() {
        let offset = FixedOffset::east_opt(0).unwrap();
        assert!(TimeBuckets::derive(i64::MAX, offset, WeekStart::Sunday).is_none());
    }

    #[test]
    fn test_raw_event_json() {
        let json = r#"{
            "id": 7, "type": "read", "when": 1710412200000,
            "from": "Alice Smith", "fromId": "u1", "fromPseudo": "Otter",
            "to": "Bob Jones", "toPseudo": "Heron", "title": "Intro"
        }"#;
        let raw: RawEvent = serde_json::from_str(json).unwrap();
        assert_eq!(raw.id, RecordId::new("7"));
        assert_eq!(raw.activity, ActivityType::Read);
        assert_eq!(raw.view, None);
        assert!(raw.body.is_empty());

        let record = Record::from_raw(raw, &BucketConfig::default()).unwrap();
        assert_eq!(record.view_or_deleted(), DELETED_VIEW);
        assert!(record.is_read());
    }
}
