//! Daily contribution counts from the GitHub GraphQL API.
//!
//! GraphQL requires authentication, so this is only available with a token.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use footprint_shared::{FootprintError, Result};

use crate::client::GitHubClient;

const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ContributionsData>,
    errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ContributionsData {
    user: Option<ContributionsUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsUser {
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection {
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
struct ContributionCalendar {
    #[serde(default)]
    weeks: Vec<ContributionWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionWeek {
    #[serde(default)]
    contribution_days: Vec<ContributionDay>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContributionDay {
    date: NaiveDate,
    contribution_count: u32,
}

impl GitHubClient {
    /// Contribution count per day in `from..=to` (UTC days).
    #[instrument(skip(self))]
    pub async fn contribution_calendar(
        &self,
        username: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, u32>> {
        if !self.has_token() {
            return Err(FootprintError::config(
                "the GitHub contribution calendar needs a token (GraphQL rejects anonymous calls)",
            ));
        }

        let url = self.endpoint("graphql");
        let payload = json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": {
                "login": username,
                "from": format!("{from}T00:00:00Z"),
                "to": format!("{to}T23:59:59Z"),
            }
        });

        let raw = self
            .fetch_json(self.post(&url).json(&payload), &url)
            .await?
            .ok_or_else(|| FootprintError::not_found("GitHub GraphQL endpoint"))?;

        let response: GraphqlResponse = serde_json::from_value(raw)
            .map_err(|e| FootprintError::parse(format!("contribution calendar: {e}")))?;
        if let Some(errors) = response.errors {
            return Err(FootprintError::Query(format!("GitHub GraphQL errors: {errors}")));
        }

        let Some(user) = response.data.and_then(|d| d.user) else {
            return Err(FootprintError::not_found(format!("GitHub user '{username}'")));
        };

        let days: BTreeMap<NaiveDate, u32> = user
            .contributions_collection
            .contribution_calendar
            .weeks
            .into_iter()
            .flat_map(|w| w.contribution_days)
            .filter(|d| d.date >= from && d.date <= to)
            .map(|d| (d.date, d.contribution_count))
            .collect();

        debug!(days = days.len(), "contribution calendar fetched");
        Ok(days)
    }
}
