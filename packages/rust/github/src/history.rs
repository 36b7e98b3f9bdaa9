//! Recent commit history with a feed-first, search-second resolution.
//!
//! The public events feed is the cheap signal: one request per page, commits
//! already grouped by push. It only covers roughly the last 90 days, so an
//! account that pushes rarely can come back empty. Only then do we walk the
//! most recently pushed repositories and ask each for the account's commits.

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use footprint_shared::{GitHubConfig, Result};

use crate::client::GitHubClient;
use crate::records::{CommitRecord, Event, day_of, first_line};

/// Bounds for both resolution strategies.
#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Events requested per feed page.
    pub per_page: u32,
    /// Feed pages read at most.
    pub max_pages: u32,
    /// Repositories searched by the fallback.
    pub fallback_repo_limit: u32,
    /// Commits kept per repository by the fallback.
    pub commits_per_repo: u32,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            per_page: 100,
            max_pages: 3,
            fallback_repo_limit: 10,
            commits_per_repo: 5,
        }
    }
}

impl From<&GitHubConfig> for HistoryOptions {
    fn from(config: &GitHubConfig) -> Self {
        Self {
            per_page: config.events_per_page,
            max_pages: config.events_max_pages,
            fallback_repo_limit: config.fallback_repo_limit,
            commits_per_repo: config.fallback_commits_per_repo,
        }
    }
}

/// Which strategy produced a [`ResolvedHistory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryStrategy {
    EventFeed,
    RepositorySearch,
}

/// Output of [`resolve_history`]: commits from exactly one strategy.
#[derive(Debug, Clone)]
pub struct ResolvedHistory {
    pub strategy: HistoryStrategy,
    pub commits: Vec<CommitRecord>,
}

/// Resolution progress. The fallback is only reachable from
/// `PrimaryAttempted` with an empty commit list.
#[derive(Debug)]
enum ResolverState {
    PrimaryAttempted(Vec<CommitRecord>),
    Resolved(ResolvedHistory),
}

/// Resolve the account's recent push activity.
///
/// Event-feed commits keep feed order. Fallback commits are sorted by date,
/// newest first, because per-repository order says nothing about global recency.
#[instrument(skip(client, opts), fields(max_pages = opts.max_pages))]
pub async fn resolve_history(
    client: &GitHubClient,
    username: &str,
    opts: &HistoryOptions,
) -> Result<ResolvedHistory> {
    let primary = event_feed_commits(client, username, opts).await?;
    let mut state = ResolverState::PrimaryAttempted(primary);

    loop {
        state = match state {
            ResolverState::Resolved(history) => {
                info!(
                    strategy = ?history.strategy,
                    commits = history.commits.len(),
                    "commit history resolved"
                );
                return Ok(history);
            }
            ResolverState::PrimaryAttempted(commits) if !commits.is_empty() => {
                ResolverState::Resolved(ResolvedHistory {
                    strategy: HistoryStrategy::EventFeed,
                    commits,
                })
            }
            ResolverState::PrimaryAttempted(_) => {
                warn!("events feed empty, falling back to per-repository commit search");
                let commits = repository_search_commits(client, username, opts).await?;
                ResolverState::Resolved(ResolvedHistory {
                    strategy: HistoryStrategy::RepositorySearch,
                    commits,
                })
            }
        };
    }
}

/// Primary strategy: push events from the public feed, page by page.
async fn event_feed_commits(
    client: &GitHubClient,
    username: &str,
    opts: &HistoryOptions,
) -> Result<Vec<CommitRecord>> {
    let mut commits = Vec::new();

    for page in 1..=opts.max_pages {
        let events = client.public_events(username, page, opts.per_page).await?;
        if events.is_empty() {
            debug!(page, "end of events feed");
            break;
        }
        commits.extend(push_event_commits(&events));
    }

    Ok(commits)
}

/// Fallback strategy: the author's latest commits on each recent repository.
///
/// A repository that errors (empty, private, blocked) is skipped.
async fn repository_search_commits(
    client: &GitHubClient,
    username: &str,
    opts: &HistoryOptions,
) -> Result<Vec<CommitRecord>> {
    let repos = client.repositories(username, opts.fallback_repo_limit).await?;
    let mut commits = Vec::new();

    for repo in &repos {
        match client
            .author_commits(&repo.full_name, repo.branch(), username, opts.commits_per_repo)
            .await
        {
            Ok(entries) => {
                debug!(repo = %repo.full_name, count = entries.len(), "repository commits");
                commits.extend(entries.iter().map(|e| e.to_record(&repo.full_name)));
            }
            Err(e) => {
                warn!(repo = %repo.full_name, error = %e, "skipping repository in commit search");
            }
        }
    }

    sort_newest_first(&mut commits);
    Ok(commits)
}

/// Flatten push events into commit records, preserving feed order.
pub fn push_event_commits(events: &[Event]) -> Vec<CommitRecord> {
    events
        .iter()
        .filter(|event| event.is_push())
        .flat_map(|event| {
            let date = day_of(&event.created_at);
            event.payload.commits.iter().map(move |c| CommitRecord {
                repo: event.repo.name.clone(),
                message: first_line(&c.message),
                date: date.clone(),
            })
        })
        .collect()
}

/// Stable sort by ISO day, newest first. Day-precision strings compare correctly
/// as plain strings; undated records sink to the end.
pub fn sort_newest_first(commits: &mut [CommitRecord]) {
    commits.sort_by(|a, b| b.date.cmp(&a.date));
}
