//! Typed views over GitHub REST payloads.
//!
//! Each record deserializes once at the fetch boundary and keeps the raw
//! JSON object alongside, so the archival artifact stays verbatim while the
//! assembler works with named, neutral-default fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use footprint_shared::de::null_as_default;
use footprint_shared::{FootprintError, Result};

/// Branch used when a repository payload carries no `default_branch`.
const FALLBACK_BRANCH: &str = "main";

// ---------------------------------------------------------------------------
// UserProfile
// ---------------------------------------------------------------------------

/// `GET /users/{username}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub login: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub twitter_username: Option<String>,
    pub public_repos: Option<u64>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub html_url: Option<String>,
    /// The payload exactly as returned.
    #[serde(skip)]
    pub raw: Value,
}

impl UserProfile {
    pub fn from_value(raw: Value) -> Result<Self> {
        let mut profile: Self = serde_json::from_value(raw.clone())
            .map_err(|e| FootprintError::parse(format!("GitHub user profile: {e}")))?;
        profile.raw = raw;
        Ok(profile)
    }
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// One entry of `GET /users/{username}/repos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Repository {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stargazers_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub forks_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    pub pushed_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fork: bool,
    pub default_branch: Option<String>,
    /// Truncated README excerpt, filled in after listing; empty when absent.
    #[serde(skip)]
    pub readme: String,
    #[serde(skip)]
    pub raw: Value,
}

impl Repository {
    pub fn from_value(raw: Value) -> Result<Self> {
        let mut repo: Self = serde_json::from_value(raw.clone())
            .map_err(|e| FootprintError::parse(format!("GitHub repository: {e}")))?;
        repo.raw = raw;
        Ok(repo)
    }

    /// Non-empty description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }

    /// Primary language, if GitHub detected one.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|l| !l.is_empty())
    }

    /// Day component of `pushed_at`, or `""`.
    pub fn pushed_date(&self) -> String {
        day_of(self.pushed_at.as_deref().unwrap_or_default())
    }

    pub fn branch(&self) -> &str {
        self.default_branch
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(FALLBACK_BRANCH)
    }
}

// ---------------------------------------------------------------------------
// Events feed
// ---------------------------------------------------------------------------

/// Event type carrying landed commits.
pub const PUSH_EVENT: &str = "PushEvent";

/// One entry of `GET /users/{username}/events/public`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub repo: EventRepo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub payload: EventPayload,
}

impl Event {
    pub fn is_push(&self) -> bool {
        self.kind == PUSH_EVENT
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventRepo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub commits: Vec<EventCommit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventCommit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Branch commit listing
// ---------------------------------------------------------------------------

/// One entry of `GET /repos/{full_name}/commits`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BranchCommit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitAuthor {
    pub date: Option<String>,
}

impl BranchCommit {
    /// Normalize into a [`CommitRecord`] attributed to `repo`.
    pub fn to_record(&self, repo: &str) -> CommitRecord {
        let date = self
            .commit
            .author
            .as_ref()
            .and_then(|a| a.date.as_deref())
            .unwrap_or_default();
        CommitRecord {
            repo: repo.to_string(),
            message: first_line(&self.commit.message),
            date: day_of(date),
        }
    }
}

// ---------------------------------------------------------------------------
// CommitRecord
// ---------------------------------------------------------------------------

/// A normalized commit: repository, first message line, ISO day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub repo: String,
    pub message: String,
    /// `YYYY-MM-DD`, or `""` when the source had no date.
    pub date: String,
}

/// First line of a commit message; the whole message when it has no newline.
pub fn first_line(message: &str) -> String {
    message.split('\n').next().unwrap_or_default().to_string()
}

/// Day-precision prefix of an ISO-8601 timestamp.
pub fn day_of(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}
