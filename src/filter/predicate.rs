//! Filter predicates over a dimension's key space

use super::key::DimensionKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Current filter of one dimension
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FilterPredicate {
    /// Accept every key
    #[default]
    All,
    Exact(DimensionKey),
    In(BTreeSet<DimensionKey>),
    /// Inclusive on both ends
    Range { lo: DimensionKey, hi: DimensionKey },
}

impl FilterPredicate {
    pub fn accepts(&self, key: &DimensionKey) -> bool {
        match self {
            FilterPredicate::All => true,
            FilterPredicate::Exact(k) => k == key,
            FilterPredicate::In(keys) => keys.contains(key),
            FilterPredicate::Range { lo, hi } => lo <= key && key <= hi,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterPredicate::All)
    }

    /// True when this predicate selects exactly `key` and nothing else
    pub fn is_exactly(&self, key: &DimensionKey) -> bool {
        match self {
            FilterPredicate::Exact(k) => k == key,
            FilterPredicate::In(keys) => keys.len() == 1 && keys.contains(key),
            _ => false,
        }
    }
}

impl fmt::Display for FilterPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterPredicate::All => write!(f, "*"),
            FilterPredicate::Exact(k) => write!(f, "= {}", k),
            FilterPredicate::In(keys) => {
                write!(f, "in [")?;
                for (i, k) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", k)?;
                }
                write!(f, "]")
            }
            FilterPredicate::Range { lo, hi } => write!(f, "[{} ..= {}]", lo, hi),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_range_is_inclusive() {
        let p = FilterPredicate::Range { lo: 3i64.into(), hi: 7i64.into() };
        assert!(p.accepts(&3i64.into()));
        assert!(p.accepts(&7i64.into()));
        assert!(!p.accepts(&8i64.into()));
        assert!(!p.accepts(&2i64.into()));
    }

    #[test]
    fn test_set_membership() {
        let p = FilterPredicate::In(["read".into(), "created".into()].into_iter().collect());
        assert!(p.accepts(&"read".into()));
        assert!(!p.accepts(&"modified".into()));
        assert!(!p.is_exactly(&"read".into()));
    }

    #[test]
    fn test_all_and_exact() {
        assert!(FilterPredicate::All.accepts(&"anything".into()));
        let p = FilterPredicate::Exact("read".into());
        assert!(p.is_exactly(&"read".into()));
        assert_eq!(p.to_string(), "= read");
    }

    #[test]
    fn test_date_selection_survives_json() {
        let day = DimensionKey::from(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        let next = DimensionKey::from(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap());

        let exact = FilterPredicate::Exact(day.clone());
        let json = serde_json::to_string(&exact).unwrap();
        assert_eq!(json, r#"{"kind":"exact","value":"1970-01-01"}"#);
        let back: FilterPredicate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, exact);
        assert!(back.accepts(&day));

        let range = FilterPredicate::Range { lo: day.clone(), hi: next.clone() };
        let back: FilterPredicate = serde_json::from_str(&serde_json::to_string(&range).unwrap()).unwrap();
        assert_eq!(back, range);
        assert!(back.accepts(&next));
    }
}
