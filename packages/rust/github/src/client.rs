//! GitHub REST client.
//!
//! Thin wrapper over `reqwest` that adds the API headers, maps statuses to
//! [`FootprintError`] variants, and decodes payloads into typed records.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use footprint_shared::{FootprintError, GitHubConfig, Result};

use crate::records::{BranchCommit, Event, Repository, UserProfile};

/// User-Agent string for GitHub requests.
const USER_AGENT: &str = concat!("footprint/", env!("CARGO_PKG_VERSION"));

/// Media type requested from the REST API.
const ACCEPT: &str = "application/vnd.github+json";

/// Pinned REST API version.
const API_VERSION: &str = "2022-11-28";

/// Blocking-style GitHub client: every call is awaited on its own, with a timeout.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    api_base: String,
    token: Option<String>,
    readme_timeout: Duration,
}

impl GitHubClient {
    /// Build a client from the runtime pipeline configuration.
    pub fn new(config: &GitHubConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FootprintError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            readme_timeout: Duration::from_secs(config.readme_timeout_secs),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// `GET /users/{username}`. A missing account is [`FootprintError::NotFound`].
    #[instrument(skip(self))]
    pub async fn user_profile(&self, username: &str) -> Result<UserProfile> {
        let url = self.endpoint(&format!("users/{username}"));
        let raw = self
            .fetch_json(self.get(&url), &url)
            .await?
            .ok_or_else(|| FootprintError::not_found(format!("GitHub user '{username}'")))?;
        UserProfile::from_value(raw)
    }

    /// Non-fork repositories, most recently pushed first, at most `max`.
    #[instrument(skip(self))]
    pub async fn repositories(&self, username: &str, max: u32) -> Result<Vec<Repository>> {
        let url = self.endpoint(&format!("users/{username}/repos"));
        let request = self
            .get(&url)
            .query(&[("sort", "pushed"), ("direction", "desc"), ("type", "owner")])
            .query(&[("per_page", max)]);

        let raw = self
            .fetch_json(request, &url)
            .await?
            .ok_or_else(|| FootprintError::not_found(format!("repositories of '{username}'")))?;

        let entries = expect_array(raw, "GitHub repository list")?;
        let mut repos = Vec::with_capacity(entries.len());
        for entry in entries {
            let repo = Repository::from_value(entry)?;
            if repo.fork {
                debug!(repo = %repo.full_name, "skipping fork");
                continue;
            }
            repos.push(repo);
        }
        repos.truncate(max as usize);

        debug!(count = repos.len(), "fetched repositories");
        Ok(repos)
    }

    /// Decoded README excerpt truncated to `max_chars` characters.
    ///
    /// Returns an empty string when the repository has no README.
    #[instrument(skip(self))]
    pub async fn readme(&self, owner: &str, repo: &str, max_chars: usize) -> Result<String> {
        let url = self.endpoint(&format!("repos/{owner}/{repo}/readme"));
        let request = self.get(&url).timeout(self.readme_timeout);

        let Some(raw) = self.fetch_json(request, &url).await? else {
            debug!("no README");
            return Ok(String::new());
        };

        let payload: ReadmePayload = decode(raw, "GitHub README")?;
        decode_readme(&payload.content, max_chars)
    }

    /// One page of the public events feed (1-based `page`).
    #[instrument(skip(self))]
    pub async fn public_events(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Event>> {
        let url = self.endpoint(&format!("users/{username}/events/public"));
        let request = self.get(&url).query(&[("per_page", per_page), ("page", page)]);

        let raw = self
            .fetch_json(request, &url)
            .await?
            .ok_or_else(|| FootprintError::not_found(format!("events of '{username}'")))?;
        decode(raw, "GitHub events page")
    }

    /// Most recent commits on `branch` authored by `author`.
    #[instrument(skip(self))]
    pub async fn author_commits(
        &self,
        full_name: &str,
        branch: &str,
        author: &str,
        per_page: u32,
    ) -> Result<Vec<BranchCommit>> {
        let url = self.endpoint(&format!("repos/{full_name}/commits"));
        let request = self
            .get(&url)
            .query(&[("sha", branch), ("author", author)])
            .query(&[("per_page", per_page)]);

        let raw = self
            .fetch_json(request, &url)
            .await?
            .ok_or_else(|| FootprintError::not_found(format!("commits of '{full_name}'")))?;
        decode(raw, "GitHub commit list")
    }

    // -----------------------------------------------------------------------
    // Request plumbing
    // -----------------------------------------------------------------------

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.get(url))
    }

    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.authorize(self.http.post(url))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and parse the JSON body.
    ///
    /// `Ok(None)` means the API answered 404; every other non-2xx status is an error.
    pub(crate) async fn fetch_json(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<Option<Value>> {
        let response = request
            .send()
            .await
            .map_err(|e| FootprintError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "GitHub response");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
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
            .map(Some)
            .map_err(|e| FootprintError::parse(format!("{url}: invalid JSON: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReadmePayload {
    #[serde(default, deserialize_with = "footprint_shared::de::null_as_default")]
    content: String,
}

fn decode<T: DeserializeOwned>(raw: Value, what: &str) -> Result<T> {
    serde_json::from_value(raw).map_err(|e| FootprintError::parse(format!("{what}: {e}")))
}

fn expect_array(raw: Value, what: &str) -> Result<Vec<Value>> {
    match raw {
        Value::Array(items) => Ok(items),
        other => Err(FootprintError::parse(format!(
            "{what}: expected a JSON array, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decode base64 README content (GitHub wraps it at 60 columns), drop
/// invalid UTF-8, cut to `max_chars` characters, then trim.
pub fn decode_readme(content: &str, max_chars: usize) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| FootprintError::parse(format!("README is not valid base64: {e}")))?;

    let text = String::from_utf8_lossy(&bytes).replace(char::REPLACEMENT_CHARACTER, "");
    Ok(truncate_chars(&text, max_chars).trim().to_string())
}

/// Prefix of `text` holding at most `max` characters.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use footprint_shared::AppConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: Option<&str>) -> GitHubClient {
        let mut config = GitHubConfig::from(&AppConfig::default());
        config.api_base = server.uri();
        config.token = token.map(String::from);
        GitHubClient::new(&config).unwrap()
    }

    fn repo_json(name: &str, fork: bool) -> Value {
        json!({
            "name": name,
            "full_name": format!("octocat/{name}"),
            "fork": fork,
            "language": "Rust",
            "stargazers_count": 1,
            "forks_count": 0,
            "topics": [],
            "pushed_at": "2024-01-01T00:00:00Z",
            "html_url": format!("https://github.com/octocat/{name}"),
            "default_branch": "main"
        })
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("", 3), "");
    }

    #[test]
    fn readme_longer_than_bound_is_cut_to_exactly_the_bound() {
        let text = "x".repeat(1000);
        let encoded = STANDARD.encode(text.as_bytes());
        let excerpt = decode_readme(&encoded, 600).unwrap();
        assert_eq!(excerpt.chars().count(), 600);
    }

    #[test]
    fn readme_decodes_wrapped_base64() {
        let encoded = STANDARD.encode("# Title\n\nSome text.\n");
        let wrapped = format!("{}\n{}\n", &encoded[..10], &encoded[10..]);
        assert_eq!(decode_readme(&wrapped, 600).unwrap(), "# Title\n\nSome text.");
    }

    #[test]
    fn readme_rejects_garbage() {
        assert!(decode_readme("@@not base64@@", 600).is_err());
    }

    #[tokio::test]
    async fn repositories_exclude_forks() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("sort", "pushed"))
            .and(query_param("per_page", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                repo_json("alpha", false),
                repo_json("forked-one", true),
                repo_json("beta", false),
                repo_json("forked-two", true),
                repo_json("gamma", false),
            ])))
            .mount(&server)
            .await;

        let repos = client_for(&server, None).repositories("octocat", 30).await.unwrap();

        assert_eq!(repos.len(), 3);
        assert!(repos.iter().all(|r| !r.fork));
        let names: Vec<_> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn profile_not_found_is_typed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server, None).user_profile("ghost").await.unwrap_err();
        assert!(matches!(err, FootprintError::NotFound { .. }));
    }

    #[tokio::test]
    async fn profile_server_error_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server, None).user_profile("octocat").await.unwrap_err();
        assert!(matches!(err, FootprintError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn bearer_token_is_sent_when_configured() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .and(header("authorization", "Bearer t0ken"))
            .and(header("x-github-api-version", API_VERSION))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "login": "octocat", "name": "The Octocat" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server, Some("t0ken"))
            .user_profile("octocat")
            .await
            .unwrap();
        assert_eq!(profile.name.as_deref(), Some("The Octocat"));
        assert_eq!(profile.raw["login"], "octocat");
    }

    #[tokio::test]
    async fn missing_readme_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/alpha/readme"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let readme = client_for(&server, None).readme("octocat", "alpha", 600).await.unwrap();
        assert_eq!(readme, "");
    }

    #[tokio::test]
    async fn readme_server_error_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/alpha/readme"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .readme("octocat", "alpha", 600)
            .await
            .unwrap_err();
        assert!(matches!(err, FootprintError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn readme_is_decoded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/octocat/alpha/readme"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "encoding": "base64",
                "content": STANDARD.encode("  # Alpha\nA tool.\n  ")
            })))
            .mount(&server)
            .await;

        let readme = client_for(&server, None).readme("octocat", "alpha", 600).await.unwrap();
        assert_eq!(readme, "# Alpha\nA tool.");
    }
}
