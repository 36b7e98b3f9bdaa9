//! LeetCode fetchers.
//!
//! Profile data comes from the public GraphQL endpoint in a single query.
//! Recent accepted submissions come from a public aggregation API instead,
//! because the GraphQL `recentAcSubmissions` field rejects anonymous callers.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use footprint_shared::{FootprintError, LeetCodeConfig, Result};

use crate::records::{LeetCodeProfile, RawSubmission};

/// LeetCode serves anonymous GraphQL only to browser-like agents.
const USER_AGENT: &str = "Mozilla/5.0";

const REFERER: &str = "https://leetcode.com";

/// Key under which the aggregation API wraps its list.
const SUBMISSIONS_KEY: &str = "submission";

const PROFILE_QUERY: &str = r#"
query userProfile($username: String!) {
  matchedUser(username: $username) {
    username
    profile {
      ranking
      realName
    }
    submitStats {
      acSubmissionNum {
        difficulty
        count
        submissions
      }
      totalSubmissionNum {
        difficulty
        count
        submissions
      }
    }
    badges {
      id
      displayName
      icon
    }
    activeBadge {
      displayName
      icon
    }
    submissionCalendar
  }
  userContestRanking(username: $username) {
    attendedContestsCount
    rating
    globalRanking
    totalParticipants
    topPercentage
  }
}
"#;

#[derive(Debug, Clone)]
pub struct LeetCodeClient {
    http: Client,
    graphql_url: String,
    submissions_base: String,
}

impl LeetCodeClient {
    pub fn new(config: &LeetCodeConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FootprintError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            graphql_url: config.graphql_url.clone(),
            submissions_base: config.submissions_base.trim_end_matches('/').to_string(),
        })
    }

    /// Identity, solve counts, contest ranking, badges, and calendar in one query.
    ///
    /// A payload carrying GraphQL `errors` is a [`FootprintError::Query`].
    #[instrument(skip(self))]
    pub async fn profile(&self, username: &str) -> Result<LeetCodeProfile> {
        let payload = json!({
            "query": PROFILE_QUERY,
            "variables": { "username": username },
        });
        let request = self
            .http
            .post(&self.graphql_url)
            .header(reqwest::header::REFERER, REFERER)
            .json(&payload);

        let mut body = fetch_json(request, &self.graphql_url).await?;

        if let Some(errors) = body.get("errors") {
            return Err(FootprintError::Query(format!("LeetCode GraphQL errors: {errors}")));
        }

        let data = body
            .get_mut("data")
            .map(Value::take)
            .filter(|d| !d.is_null())
            .ok_or_else(|| FootprintError::parse("LeetCode GraphQL response has no data"))?;

        LeetCodeProfile::from_value(data)
    }

    /// Up to `limit` recent accepted submissions, newest first.
    ///
    /// Accepts either a bare list or `{"submission": [...]}`.
    #[instrument(skip(self))]
    pub async fn recent_submissions(
        &self,
        username: &str,
        limit: u32,
    ) -> Result<Vec<RawSubmission>> {
        let url = format!("{}/{username}/acSubmission", self.submissions_base);
        let request = self.http.get(&url).query(&[("limit", limit)]);

        let body = fetch_json(request, &url).await?;
        let entries = unwrap_submission_list(body);

        let submissions: Vec<RawSubmission> = entries
            .into_iter()
            .take(limit as usize)
            .map(RawSubmission::from_value)
            .collect();

        debug!(count = submissions.len(), "fetched recent submissions");
        Ok(submissions)
    }
}

/// Bare list, or the list under [`SUBMISSIONS_KEY`]; anything else is empty.
fn unwrap_submission_list(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove(SUBMISSIONS_KEY) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

async fn fetch_json(request: RequestBuilder, url: &str) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| FootprintError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    debug!(%url, status = status.as_u16(), "LeetCode response");
    if !status.is_success() {
        return Err(FootprintError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FootprintError::Network(format!("{url}: failed to read body: {e}")))?;

    serde_json::from_str(&body)
        .map_err(|e| FootprintError::parse(format!("{url}: invalid JSON: {e}")))
}
