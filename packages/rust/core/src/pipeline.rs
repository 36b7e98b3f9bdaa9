//! End-to-end pipelines: fetch → resolve → assemble, one full pass per run.
//!
//! Each pipeline returns everything an artifact writer needs: the typed
//! records, the verbatim archive, and the rendered documents. Nothing is
//! written to disk here, so a failed run leaves no partial artifacts.

use std::time::Instant;

use serde_json::{Value, json};
use tracing::{info, instrument};

use footprint_github::{
    GitHubClient, HistoryOptions, Repository, ResolvedHistory, UserProfile, resolve_history,
};
use footprint_leetcode::{LeetCodeClient, LeetCodeProfile, RawSubmission, Submission};
use footprint_shared::{GitHubConfig, LeetCodeConfig, OutputDocument, Result};

use crate::assembler::{render_github_documents, render_leetcode_document};

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called for each item of a phase that iterates (e.g. README fetches).
    fn step(&self, detail: &str, current: usize, total: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn step(&self, _detail: &str, _current: usize, _total: usize) {}
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

/// Result of [`run_github`].
#[derive(Debug)]
pub struct GitHubRun {
    pub username: String,
    pub profile: UserProfile,
    /// Non-fork repositories in fetch order, READMEs attached.
    pub repositories: Vec<Repository>,
    pub history: ResolvedHistory,
    /// Profile document first, then one per repository.
    pub documents: Vec<OutputDocument>,
}

impl GitHubRun {
    /// Every fetched object verbatim, plus the resolved commits.
    pub fn archive(&self) -> Value {
        let repos: Vec<&Value> = self.repositories.iter().map(|r| &r.raw).collect();
        json!({
            "user_profile": self.profile.raw,
            "repos": repos,
            "recent_commits": self.history.commits,
        })
    }
}

/// Run the GitHub pipeline.
///
/// 1. Profile
/// 2. Repository list (non-fork, most recently pushed first)
/// 3. Commit history (event feed, or per-repository search when it is empty)
/// 4. README excerpt per repository
/// 5. Documents
#[instrument(skip_all, fields(username = %config.username))]
pub async fn run_github(
    config: &GitHubConfig,
    progress: &dyn ProgressReporter,
) -> Result<GitHubRun> {
    let start = Instant::now();
    let client = GitHubClient::new(config)?;
    let username = config.username.as_str();

    info!(authenticated = client.has_token(), "starting GitHub pipeline");

    progress.phase("Fetching GitHub profile");
    let profile = client.user_profile(username).await?;

    progress.phase("Fetching repositories");
    let mut repositories = client.repositories(username, config.max_repos).await?;

    progress.phase("Resolving commit history");
    let history = resolve_history(&client, username, &HistoryOptions::from(config)).await?;

    progress.phase("Fetching READMEs");
    let total = repositories.len();
    for (i, repo) in repositories.iter_mut().enumerate() {
        progress.step(&repo.name, i + 1, total);
        repo.readme = client.readme(username, &repo.name, config.readme_max_chars).await?;
    }

    progress.phase("Assembling documents");
    let documents = render_github_documents(username, &profile, &repositories, &history.commits);

    info!(
        repos = repositories.len(),
        commits = history.commits.len(),
        strategy = ?history.strategy,
        documents = documents.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "GitHub pipeline complete"
    );

    Ok(GitHubRun {
        username: username.to_string(),
        profile,
        repositories,
        history,
        documents,
    })
}

// ---------------------------------------------------------------------------
// LeetCode
// ---------------------------------------------------------------------------

/// Result of [`run_leetcode`].
#[derive(Debug)]
pub struct LeetCodeRun {
    pub username: String,
    pub profile: LeetCodeProfile,
    /// Submissions as returned, archived verbatim.
    pub submissions: Vec<RawSubmission>,
    /// Exactly one document.
    pub documents: Vec<OutputDocument>,
}

impl LeetCodeRun {
    /// The GraphQL `data` object with the submissions under `recentAcSubmissions`.
    pub fn archive(&self) -> Value {
        let mut archive = match &self.profile.raw {
            Value::Object(map) => map.clone(),
            _ => serde_json::Map::new(),
        };
        let subs: Vec<Value> = self.submissions.iter().map(|s| s.raw.clone()).collect();
        archive.insert("recentAcSubmissions".into(), Value::Array(subs));
        Value::Object(archive)
    }
}

/// Run the LeetCode pipeline: profile query, recent submissions, one document.
#[instrument(skip_all, fields(username = %config.username))]
pub async fn run_leetcode(
    config: &LeetCodeConfig,
    progress: &dyn ProgressReporter,
) -> Result<LeetCodeRun> {
    let start = Instant::now();
    let client = LeetCodeClient::new(config)?;
    let username = config.username.as_str();

    info!("starting LeetCode pipeline");

    progress.phase("Fetching LeetCode profile");
    let profile = client.profile(username).await?;

    progress.phase("Fetching recent accepted submissions");
    let submissions = client.recent_submissions(username, config.submission_limit).await?;

    progress.phase("Assembling document");
    let normalized: Vec<Submission> = submissions.iter().map(RawSubmission::normalize).collect();
    let documents = vec![render_leetcode_document(username, &profile, &normalized)];

    info!(
        submissions = submissions.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "LeetCode pipeline complete"
    );

    Ok(LeetCodeRun {
        username: username.to_string(),
        profile,
        submissions,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use footprint_github::HistoryStrategy;
    use footprint_shared::{AppConfig, FootprintError, SourceType};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn github_config(server: &MockServer) -> GitHubConfig {
        let mut config = GitHubConfig::from(&AppConfig::default());
        config.username = "octocat".into();
        config.api_base = server.uri();
        config.token = None;
        config
    }

    fn leetcode_config(server: &MockServer) -> LeetCodeConfig {
        let mut config = LeetCodeConfig::from(&AppConfig::default());
        config.username = "coder".into();
        config.graphql_url = format!("{}/graphql/", server.uri());
        config.submissions_base = server.uri();
        config
    }

    fn repo_json(name: &str, fork: bool, pushed: &str) -> Value {
        json!({
            "name": name,
            "full_name": format!("octocat/{name}"),
            "fork": fork,
            "language": "Rust",
            "stargazers_count": 2,
            "forks_count": 0,
            "topics": [],
            "pushed_at": pushed,
            "html_url": format!("https://github.com/octocat/{name}"),
            "default_branch": "main"
        })
    }

    async fn mount_profile_and_repos(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "octocat",
                "name": "The Octocat",
                "public_repos": 3
            })))
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                repo_json("newest", false, "2024-05-02T00:00:00Z"),
                repo_json("forked", true, "2024-05-01T12:00:00Z"),
                repo_json("older", false, "2024-04-01T00:00:00Z"),
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn github_run_assembles_documents_in_repository_order() {
        let server = MockServer::start().await;
        mount_profile_and_repos(&server).await;

        Mock::given(method("GET"))
            .and(path("/users/octocat/events/public"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "type": "PushEvent",
                "repo": { "name": "octocat/newest" },
                "created_at": "2024-05-02T09:00:00Z",
                "payload": { "commits": [{ "message": "Ship it\n\nbody" }] }
            }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/events/public"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        // "aGVsbG8=" is "hello"
        Mock::given(method("GET"))
            .and(path("/repos/octocat/newest/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": "aGVs\nbG8=",
                "encoding": "base64"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/older/readme"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let run = run_github(&github_config(&server), &SilentProgress).await.unwrap();

        assert_eq!(run.history.strategy, HistoryStrategy::EventFeed);
        assert_eq!(run.repositories.len(), 2);
        assert_eq!(run.documents.len(), 3);
        assert_eq!(run.documents[0].metadata.source_type, SourceType::GithubProfile);
        assert_eq!(run.documents[1].metadata.repo.as_deref(), Some("newest"));
        assert_eq!(run.documents[2].metadata.repo.as_deref(), Some("older"));

        assert!(run.documents[0].body.contains("  - [2024-05-02] octocat/newest: Ship it"));
        assert!(run.documents[1].body.contains("  README (excerpt):\n    hello"));
        assert!(!run.documents[2].body.contains("README"));

        let archive = run.archive();
        assert_eq!(archive["user_profile"]["login"], "octocat");
        assert_eq!(archive["repos"].as_array().unwrap().len(), 2);
        assert_eq!(archive["repos"][0]["name"], "newest");
        assert_eq!(archive["recent_commits"][0]["message"], "Ship it");
    }

    #[tokio::test]
    async fn github_profile_failure_aborts_the_run() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let err = run_github(&github_config(&server), &SilentProgress).await.unwrap_err();
        assert!(matches!(err, FootprintError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn github_readme_server_error_aborts_the_run() {
        let server = MockServer::start().await;
        mount_profile_and_repos(&server).await;

        Mock::given(method("GET"))
            .and(path("/users/octocat/events/public"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/newest/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/older/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/newest/readme"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octocat/older/readme"))
            .respond_with(ResponseTemplate::new(404))
            .expect(0)
            .mount(&server)
            .await;

        let err = run_github(&github_config(&server), &SilentProgress).await.unwrap_err();
        assert!(matches!(err, FootprintError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn leetcode_run_archives_submissions_verbatim() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "matchedUser": {
                        "username": "coder",
                        "profile": { "ranking": 10, "realName": "Ada" },
                        "badges": []
                    },
                    "userContestRanking": null
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/coder/acSubmission"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 1,
                "submission": [{
                    "title": "Two Sum",
                    "titleSlug": "two-sum",
                    "timestamp": "1700000000",
                    "lang": "rust",
                    "statusDisplay": "Accepted"
                }]
            })))
            .mount(&server)
            .await;

        let run = run_leetcode(&leetcode_config(&server), &SilentProgress).await.unwrap();

        assert_eq!(run.documents.len(), 1);
        let doc = &run.documents[0];
        assert_eq!(doc.metadata.source_type, SourceType::LeetcodeProfile);
        assert!(doc.body.contains("Recent Accepted Submissions (last 1):"));
        assert!(!doc.body.contains("Contest Rankings:"));

        let archive = run.archive();
        assert_eq!(archive["matchedUser"]["username"], "coder");
        assert_eq!(archive["recentAcSubmissions"][0]["statusDisplay"], "Accepted");
    }

    #[tokio::test]
    async fn leetcode_keeps_every_submission_whatever_its_timestamp_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "matchedUser": { "username": "coder" }, "userContestRanking": null }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/coder/acSubmission"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "submission": [
                    { "title": "Two Sum", "titleSlug": "two-sum", "timestamp": "1700000000" },
                    { "title": "LRU Cache", "titleSlug": "lru-cache", "timestamp": 1700000000.0 },
                    { "title": "Jump Game", "titleSlug": "jump-game", "timestamp": { "s": 1 } }
                ]
            })))
            .mount(&server)
            .await;

        let run = run_leetcode(&leetcode_config(&server), &SilentProgress).await.unwrap();

        assert_eq!(run.submissions.len(), 3);
        let body = &run.documents[0].body;
        assert!(body.contains("Recent Accepted Submissions (last 3):"));
        assert!(body.contains("LRU Cache"));
        assert!(body.contains("2023-11-14"));

        let archive = run.archive();
        let archived = archive["recentAcSubmissions"].as_array().unwrap();
        assert_eq!(archived.len(), 3);
        assert_eq!(archived[1]["timestamp"], json!(1700000000.0));
        assert_eq!(archived[2]["timestamp"], json!({ "s": 1 }));
    }

    #[tokio::test]
    async fn leetcode_empty_submissions_still_render() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "matchedUser": { "username": "coder" }, "userContestRanking": null }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/coder/acSubmission"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let run = run_leetcode(&leetcode_config(&server), &SilentProgress).await.unwrap();
        assert!(
            run.documents[0]
                .body
                .contains("Recent Accepted Submissions: none returned")
        );
        assert_eq!(run.archive()["recentAcSubmissions"], json!([]));
    }
}
