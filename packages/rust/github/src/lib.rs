//! GitHub fetchers and commit-history resolution.
//!
//! - [`GitHubClient`]: profile, repository list, README, events, commit search
//! - [`resolve_history`]: event feed first, per-repository search as fallback
//! - [`GitHubClient::contribution_calendar`]: daily counts via GraphQL (token required)

mod client;
mod contributions;
pub mod history;
pub mod records;

pub use client::{GitHubClient, decode_readme, truncate_chars};
pub use history::{HistoryOptions, HistoryStrategy, ResolvedHistory, resolve_history};
pub use records::{CommitRecord, Repository, UserProfile};
