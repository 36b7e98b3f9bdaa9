//! Typed views over the LeetCode GraphQL profile and the submissions feed.

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use footprint_shared::de::null_as_default;
use footprint_shared::{FootprintError, Result};

/// Public problem page prefix.
const PROBLEM_URL_BASE: &str = "https://leetcode.com/problems";

// ---------------------------------------------------------------------------
// Profile (GraphQL `data` object)
// ---------------------------------------------------------------------------

/// The `data` object of the combined profile query.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeProfile {
    pub matched_user: Option<MatchedUser>,
    /// Absent for accounts that never entered a contest.
    pub user_contest_ranking: Option<ContestRanking>,
    #[serde(skip)]
    pub raw: Value,
}

impl LeetCodeProfile {
    pub fn from_value(raw: Value) -> Result<Self> {
        let mut profile: Self = serde_json::from_value(raw.clone())
            .map_err(|e| FootprintError::parse(format!("LeetCode profile: {e}")))?;
        profile.raw = raw;
        Ok(profile)
    }

    /// Raw submission calendar JSON string, if the account has one.
    pub fn submission_calendar(&self) -> Option<&str> {
        self.matched_user
            .as_ref()
            .and_then(|u| u.submission_calendar.as_deref())
            .filter(|c| !c.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    pub profile: Option<ProfileInfo>,
    pub submit_stats: Option<SubmitStats>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub badges: Vec<Badge>,
    pub active_badge: Option<Badge>,
    /// JSON-encoded `{"<epoch seconds>": count}` map, kept as a string.
    pub submission_calendar: Option<String>,
}

impl MatchedUser {
    /// Accepted-submission counts per difficulty, in source order.
    pub fn accepted_by_difficulty(&self) -> &[DifficultyCount] {
        self.submit_stats
            .as_ref()
            .map(|s| s.ac_submission_num.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInfo {
    pub ranking: Option<u64>,
    pub real_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ac_submission_num: Vec<DifficultyCount>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_submission_num: Vec<DifficultyCount>,
}

/// Solved problems (`count`) and submissions for one difficulty bucket.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DifficultyCount {
    #[serde(default, deserialize_with = "null_as_default")]
    pub difficulty: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub submissions: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub display_name: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRanking {
    pub attended_contests_count: Option<u64>,
    pub rating: Option<f64>,
    pub global_ranking: Option<u64>,
    pub total_participants: Option<u64>,
    pub top_percentage: Option<f64>,
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// One recent accepted submission, as returned.
///
/// Every field is read loosely so that no entry is ever dropped: strings are
/// kept, numbers are stringified, and `timestamp` stays a raw JSON value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    #[serde(default, deserialize_with = "loose_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub title_slug: Option<String>,
    /// Epoch seconds, usually a string. Numbers (integer or float) accepted.
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default, deserialize_with = "loose_string")]
    pub lang: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl RawSubmission {
    /// Wrap one fetched entry. Never fails: a non-object entry keeps only its
    /// raw value and renders with defaults.
    pub fn from_value(raw: Value) -> Self {
        let mut sub: Self = match serde_json::from_value(raw.clone()) {
            Ok(sub) => sub,
            Err(e) => {
                warn!(error = %e, "submission entry has an unexpected shape");
                Self::default()
            }
        };
        sub.raw = raw;
        sub
    }

    /// Normalize for rendering: defaults for missing fields, UTC date, problem URL.
    pub fn normalize(&self) -> Submission {
        let slug = self.title_slug.as_deref().unwrap_or_default();
        Submission {
            title: self.title.clone().unwrap_or_else(|| "Unknown".into()),
            url: format!("{PROBLEM_URL_BASE}/{slug}/"),
            lang: self.lang.clone().unwrap_or_else(|| "?".into()),
            date: self.timestamp.as_ref().map(format_timestamp).unwrap_or_default(),
        }
    }
}

/// A normalized accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub title: String,
    pub url: String,
    pub lang: String,
    /// `YYYY-MM-DD` in UTC, or the raw timestamp when it is not an epoch.
    pub date: String,
}

/// Format epoch seconds as a UTC `YYYY-MM-DD`; unparseable input is echoed back.
///
/// Fractional seconds are truncated. `null` formats as an empty string.
pub fn format_timestamp(ts: &Value) -> String {
    let seconds = match ts {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_seconds(s.trim()),
        _ => None,
    };

    match seconds.and_then(|s| DateTime::from_timestamp(s, 0)) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => match ts {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

fn parse_seconds(text: &str) -> Option<i64> {
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

/// Any scalar as a string; `null` and missing become `None`.
fn loose_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamps_are_utc_days() {
        // 2023-11-14T22:13:20Z
        assert_eq!(format_timestamp(&json!("1700000000")), "2023-11-14");
        assert_eq!(format_timestamp(&json!(1700000000)), "2023-11-14");
        assert_eq!(format_timestamp(&json!(1700000000.75)), "2023-11-14");
        assert_eq!(format_timestamp(&json!("1700000000.0")), "2023-11-14");
        // Just before midnight UTC stays on the same day regardless of local zone.
        assert_eq!(format_timestamp(&json!(1704067199)), "2023-12-31");
        assert_eq!(format_timestamp(&json!("yesterday")), "yesterday");
        assert_eq!(format_timestamp(&json!(true)), "true");
        assert_eq!(format_timestamp(&Value::Null), "");
    }

    #[test]
    fn submission_normalizes_with_defaults() {
        let sub = RawSubmission::from_value(json!({
            "title": "Two Sum",
            "titleSlug": "two-sum",
            "timestamp": "1700000000",
            "lang": "python3",
            "statusDisplay": "Accepted"
        }));
        let norm = sub.normalize();
        assert_eq!(norm.title, "Two Sum");
        assert_eq!(norm.url, "https://leetcode.com/problems/two-sum/");
        assert_eq!(norm.lang, "python3");
        assert_eq!(norm.date, "2023-11-14");
        assert_eq!(sub.raw["statusDisplay"], "Accepted");

        let bare = RawSubmission::from_value(json!({})).normalize();
        assert_eq!(bare.title, "Unknown");
        assert_eq!(bare.lang, "?");
        assert_eq!(bare.date, "");
    }

    #[test]
    fn odd_shaped_submissions_are_kept() {
        let sub = RawSubmission::from_value(json!({
            "title": 42,
            "titleSlug": "answer",
            "timestamp": 1700000000.0,
            "lang": null
        }));
        let norm = sub.normalize();
        assert_eq!(norm.title, "42");
        assert_eq!(norm.date, "2023-11-14");
        assert_eq!(norm.lang, "?");

        let scalar = RawSubmission::from_value(json!("two-sum"));
        assert_eq!(scalar.raw, json!("two-sum"));
        assert_eq!(scalar.normalize().title, "Unknown");
    }

    #[test]
    fn profile_without_contest_data() {
        let profile = LeetCodeProfile::from_value(json!({
            "matchedUser": {
                "username": "coder",
                "profile": { "ranking": 12345, "realName": "" },
                "submitStats": {
                    "acSubmissionNum": [
                        { "difficulty": "All", "count": 10, "submissions": 20 },
                        { "difficulty": "Easy", "count": 7, "submissions": 12 }
                    ],
                    "totalSubmissionNum": []
                },
                "badges": null,
                "activeBadge": null,
                "submissionCalendar": "{}"
            },
            "userContestRanking": null
        }))
        .unwrap();

        assert!(profile.user_contest_ranking.is_none());
        let user = profile.matched_user.as_ref().unwrap();
        assert!(user.badges.is_empty());
        assert_eq!(user.accepted_by_difficulty().len(), 2);
        assert_eq!(profile.submission_calendar(), Some("{}"));
    }
}
