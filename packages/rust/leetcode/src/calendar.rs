//! Submission-calendar decoding.
//!
//! LeetCode ships the calendar as a JSON *string* mapping epoch seconds (day
//! start, UTC) to submission counts.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use footprint_shared::{FootprintError, Result};

/// Decode the calendar into per-day counts, keyed by UTC date.
pub fn parse_submission_calendar(raw: &str) -> Result<BTreeMap<NaiveDate, u32>> {
    let entries: BTreeMap<String, Value> = serde_json::from_str(raw)
        .map_err(|e| FootprintError::parse(format!("submission calendar: {e}")))?;

    let mut days = BTreeMap::new();
    for (epoch, count) in entries {
        let seconds: i64 = epoch.trim().parse().map_err(|_| {
            FootprintError::parse(format!("submission calendar key '{epoch}' is not epoch seconds"))
        })?;
        let date = DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| FootprintError::parse(format!("epoch {seconds} out of range")))?
            .date_naive();
        let count = count
            .as_u64()
            .and_then(|c| u32::try_from(c).ok())
            .ok_or_else(|| {
                FootprintError::parse(format!("submission count for {epoch}: {count}"))
            })?;

        *days.entry(date).or_insert(0) += count;
    }

    Ok(days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_keys_are_utc_days() {
        // 1695945600 = 2023-09-29T00:00:00Z, 1696032000 = 2023-09-30T00:00:00Z
        let days = parse_submission_calendar(r#"{"1695945600": 2, "1696032000": 5}"#).unwrap();
        let d = |s| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        assert_eq!(days.len(), 2);
        assert_eq!(days[&d("2023-09-29")], 2);
        assert_eq!(days[&d("2023-09-30")], 5);
    }

    #[test]
    fn empty_calendar() {
        assert!(parse_submission_calendar("{}").unwrap().is_empty());
    }

    #[test]
    fn malformed_calendar_is_a_parse_error() {
        assert!(parse_submission_calendar("not json").is_err());
        assert!(parse_submission_calendar(r#"{"abc": 1}"#).is_err());
    }
}
