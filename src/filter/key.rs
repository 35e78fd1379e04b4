//! Dimension key values

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A key in a dimension's key space.
///
/// Keys are totally ordered so that range filters work; keys of different
/// variants order by variant first (`Text < Int < Date`).
///
/// Keys serialize as bare JSON values. Dates are written as `YYYY-MM-DD`
/// and a string in exactly that form reads back as a date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum DimensionKey {
    Text(String),
    Int(i64),
    Date(NaiveDate),
}

impl DimensionKey {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DimensionKey::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            DimensionKey::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DimensionKey::Date(d) => Some(*d),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Int(i64),
    Text(String),
}

impl<'de> Deserialize<'de> for DimensionKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawKey::deserialize(deserializer)? {
            RawKey::Int(i) => DimensionKey::Int(i),
            RawKey::Text(s) => match NaiveDate::parse_from_str(&s, DATE_FORMAT) {
                // Only the canonical spelling, so "2024-3-9" stays text
                Ok(d) if d.format(DATE_FORMAT).to_string() == s => DimensionKey::Date(d),
                _ => DimensionKey::Text(s),
            },
        })
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionKey::Text(s) => write!(f, "{}", s),
            DimensionKey::Int(i) => write!(f, "{}", i),
            DimensionKey::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
        }
    }
}

impl From<&str> for DimensionKey {
    fn from(s: &str) -> Self {
        DimensionKey::Text(s.to_string())
    }
}

impl From<String> for DimensionKey {
    fn from(s: String) -> Self {
        DimensionKey::Text(s)
    }
}

impl From<i64> for DimensionKey {
    fn from(i: i64) -> Self {
        DimensionKey::Int(i)
    }
}

impl From<i32> for DimensionKey {
    fn from(i: i32) -> Self {
        DimensionKey::Int(i64::from(i))
    }
}

impl From<NaiveDate> for DimensionKey {
    fn from(d: NaiveDate) -> Self {
        DimensionKey::Date(d)
    }
}
