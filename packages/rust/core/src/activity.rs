//! Daily activity timeline across both sources.
//!
//! Counts are keyed by UTC day. The timeline is continuous: every day in the
//! requested range is present, with zeros where neither source saw activity.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::{info, instrument, warn};

use footprint_github::{CommitRecord, GitHubClient, HistoryOptions, resolve_history};
use footprint_leetcode::{LeetCodeClient, parse_submission_calendar};
use footprint_shared::{GitHubConfig, LeetCodeConfig, Result};

use crate::pipeline::ProgressReporter;

/// Per-day counts from one source.
pub type DailyCounts = BTreeMap<NaiveDate, u32>;

/// Window ending at (and including) the end day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ActivityRange {
    #[serde(rename = "30d")]
    ThirtyDays,
    #[serde(rename = "90d")]
    NinetyDays,
    #[default]
    #[serde(rename = "1y")]
    Year,
}

impl ActivityRange {
    /// `30d`, `90d` or `1y`; anything else is a year.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "30d" => Self::ThirtyDays,
            "90d" => Self::NinetyDays,
            "1y" => Self::Year,
            other => {
                warn!(range = other, "unknown activity range, using 1y");
                Self::Year
            }
        }
    }

    pub fn days(self) -> u64 {
        match self {
            Self::ThirtyDays => 30,
            Self::NinetyDays => 90,
            Self::Year => 365,
        }
    }

    /// First day of the window ending on `end`.
    pub fn start(self, end: NaiveDate) -> NaiveDate {
        end.checked_sub_days(Days::new(self.days() - 1))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ThirtyDays => "30d",
            Self::NinetyDays => "90d",
            Self::Year => "1y",
        }
    }
}

impl fmt::Display for ActivityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityDay {
    /// `YYYY-MM-DD`
    pub date: NaiveDate,
    pub total: u32,
    pub leetcode: u32,
    pub github: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityTimeline {
    pub range: ActivityRange,
    pub days: Vec<ActivityDay>,
}

impl ActivityTimeline {
    pub fn total(&self) -> u64 {
        self.days.iter().map(|d| u64::from(d.total)).sum()
    }

    pub fn active_days(&self) -> usize {
        self.days.iter().filter(|d| d.total > 0).count()
    }
}

/// Merge both sources into one continuous, ascending run of days.
/// Counts outside the window are ignored.
pub fn build_timeline(
    range: ActivityRange,
    end: NaiveDate,
    github: &DailyCounts,
    leetcode: &DailyCounts,
) -> ActivityTimeline {
    let days = range
        .start(end)
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| {
            let github = github.get(&date).copied().unwrap_or(0);
            let leetcode = leetcode.get(&date).copied().unwrap_or(0);
            ActivityDay {
                date,
                total: github + leetcode,
                leetcode,
                github,
            }
        })
        .collect();

    ActivityTimeline { range, days }
}

/// Commit records per day. Undated or malformed dates are skipped.
pub fn commits_per_day(commits: &[CommitRecord]) -> DailyCounts {
    let mut days = DailyCounts::new();
    for commit in commits {
        if let Ok(date) = NaiveDate::parse_from_str(&commit.date, "%Y-%m-%d") {
            *days.entry(date).or_insert(0) += 1;
        }
    }
    days
}

/// Fetch both sources and build the timeline ending on `end`.
///
/// GitHub counts come from the contribution calendar when a token is
/// configured, otherwise from the resolved commit history. LeetCode is
/// best-effort: any failure there yields an empty calendar.
#[instrument(skip_all, fields(range = %range, %end))]
pub async fn collect_activity(
    github: &GitHubConfig,
    leetcode: &LeetCodeConfig,
    range: ActivityRange,
    end: NaiveDate,
    progress: &dyn ProgressReporter,
) -> Result<ActivityTimeline> {
    let start = range.start(end);
    let client = GitHubClient::new(github)?;

    let github_days = if client.has_token() {
        progress.phase("Fetching GitHub contribution calendar");
        client.contribution_calendar(&github.username, start, end).await?
    } else {
        progress.phase("Counting recent GitHub commits");
        let opts = HistoryOptions::from(github);
        let history = resolve_history(&client, &github.username, &opts).await?;
        commits_per_day(&history.commits)
    };

    progress.phase("Fetching LeetCode submission calendar");
    let leetcode_days = match leetcode_calendar(leetcode).await {
        Ok(days) => days,
        Err(e) => {
            warn!(error = %e, "LeetCode calendar unavailable, counting zero submissions");
            DailyCounts::new()
        }
    };

    let timeline = build_timeline(range, end, &github_days, &leetcode_days);
    info!(
        days = timeline.days.len(),
        active_days = timeline.active_days(),
        total = timeline.total(),
        "activity timeline built"
    );
    Ok(timeline)
}

async fn leetcode_calendar(config: &LeetCodeConfig) -> Result<DailyCounts> {
    let client = LeetCodeClient::new(config)?;
    let profile = client.profile(&config.username).await?;
    match profile.submission_calendar() {
        Some(raw) => parse_submission_calendar(raw),
        None => Ok(DailyCounts::new()),
    }
}
