//! Application configuration for Footprint.
//!
//! User config lives at `~/.footprint/footprint.toml`.
//! CLI flags (and their env vars) override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FootprintError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "footprint.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".footprint";

/// Account used when no username is configured.
const DEFAULT_USERNAME: &str = "amannkumar";

// ---------------------------------------------------------------------------
// Config structs (matching footprint.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// GitHub pipeline settings.
    #[serde(default)]
    pub github: GitHubSection,

    /// LeetCode pipeline settings.
    #[serde(default)]
    pub leetcode: LeetCodeSection,

    /// Artifact output settings.
    #[serde(default)]
    pub output: OutputSection,
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubSection {
    /// Account whose footprint is collected.
    #[serde(default = "default_username")]
    pub username: String,

    /// Name of the env var holding the bearer token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// REST/GraphQL API base URL.
    #[serde(default = "default_github_api")]
    pub api_base: String,

    /// Maximum repositories listed for the profile document.
    #[serde(default = "default_max_repos")]
    pub max_repos: u32,

    /// README excerpt length, in characters.
    #[serde(default = "default_readme_max_chars")]
    pub readme_max_chars: usize,

    /// Page size for the public events feed.
    #[serde(default = "default_events_per_page")]
    pub events_per_page: u32,

    /// Maximum event-feed pages read before giving up.
    #[serde(default = "default_events_max_pages")]
    pub events_max_pages: u32,

    /// Repositories searched when the event feed is empty.
    #[serde(default = "default_fallback_repo_limit")]
    pub fallback_repo_limit: u32,

    /// Commits kept per repository during the fallback search.
    #[serde(default = "default_fallback_commits_per_repo")]
    pub fallback_commits_per_repo: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// README request timeout in seconds.
    #[serde(default = "default_readme_timeout_secs")]
    pub readme_timeout_secs: u64,
}

impl Default for GitHubSection {
    fn default() -> Self {
        Self {
            username: default_username(),
            token_env: default_token_env(),
            api_base: default_github_api(),
            max_repos: default_max_repos(),
            readme_max_chars: default_readme_max_chars(),
            events_per_page: default_events_per_page(),
            events_max_pages: default_events_max_pages(),
            fallback_repo_limit: default_fallback_repo_limit(),
            fallback_commits_per_repo: default_fallback_commits_per_repo(),
            timeout_secs: default_timeout_secs(),
            readme_timeout_secs: default_readme_timeout_secs(),
        }
    }
}

fn default_username() -> String {
    DEFAULT_USERNAME.into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_github_api() -> String {
    "https://api.github.com".into()
}
fn default_max_repos() -> u32 {
    30
}
fn default_readme_max_chars() -> usize {
    600
}
fn default_events_per_page() -> u32 {
    100
}
fn default_events_max_pages() -> u32 {
    3
}
fn default_fallback_repo_limit() -> u32 {
    10
}
fn default_fallback_commits_per_repo() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_readme_timeout_secs() -> u64 {
    15
}

/// `[leetcode]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeetCodeSection {
    /// Account whose profile is collected.
    #[serde(default = "default_username")]
    pub username: String,

    /// GraphQL endpoint for profile, stats, and contest data.
    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    /// Public aggregation API serving recent accepted submissions.
    #[serde(default = "default_submissions_base")]
    pub submissions_base: String,

    /// Maximum recent submissions requested.
    #[serde(default = "default_submission_limit")]
    pub submission_limit: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LeetCodeSection {
    fn default() -> Self {
        Self {
            username: default_username(),
            graphql_url: default_graphql_url(),
            submissions_base: default_submissions_base(),
            submission_limit: default_submission_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_graphql_url() -> String {
    "https://leetcode.com/graphql/".into()
}
fn default_submissions_base() -> String {
    "https://alfa-leetcode-api.onrender.com".into()
}
fn default_submission_limit() -> u32 {
    20
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Root directory; JSON goes to `json_files/`, text to `text_files/`.
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> String {
    "data".into()
}

// ---------------------------------------------------------------------------
// Runtime pipeline configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for the GitHub pipeline.
#[derive(Clone)]
pub struct GitHubConfig {
    pub username: String,
    /// Bearer token; `None` means unauthenticated calls.
    pub token: Option<String>,
    pub api_base: String,
    pub max_repos: u32,
    pub readme_max_chars: usize,
    pub events_per_page: u32,
    pub events_max_pages: u32,
    pub fallback_repo_limit: u32,
    pub fallback_commits_per_repo: u32,
    pub timeout_secs: u64,
    pub readme_timeout_secs: u64,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("max_repos", &self.max_repos)
            .finish_non_exhaustive()
    }
}

impl From<&AppConfig> for GitHubConfig {
    fn from(config: &AppConfig) -> Self {
        let gh = &config.github;
        Self {
            username: gh.username.clone(),
            token: read_token(&gh.token_env),
            api_base: gh.api_base.clone(),
            max_repos: gh.max_repos,
            readme_max_chars: gh.readme_max_chars,
            events_per_page: gh.events_per_page,
            events_max_pages: gh.events_max_pages,
            fallback_repo_limit: gh.fallback_repo_limit,
            fallback_commits_per_repo: gh.fallback_commits_per_repo,
            timeout_secs: gh.timeout_secs,
            readme_timeout_secs: gh.readme_timeout_secs,
        }
    }
}

/// Runtime configuration for the LeetCode pipeline.
#[derive(Debug, Clone)]
pub struct LeetCodeConfig {
    pub username: String,
    pub graphql_url: String,
    pub submissions_base: String,
    pub submission_limit: u32,
    pub timeout_secs: u64,
}

impl From<&AppConfig> for LeetCodeConfig {
    fn from(config: &AppConfig) -> Self {
        let lc = &config.leetcode;
        Self {
            username: lc.username.clone(),
            graphql_url: lc.graphql_url.clone(),
            submissions_base: lc.submissions_base.clone(),
            submission_limit: lc.submission_limit,
            timeout_secs: lc.timeout_secs,
        }
    }
}

/// Read a token from the named env var; empty values count as unset.
fn read_token(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val.trim().to_string()),
        _ => {
            tracing::debug!(var_name, "no GitHub token set, using unauthenticated requests");
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.footprint/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FootprintError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.footprint/footprint.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FootprintError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        FootprintError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FootprintError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FootprintError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FootprintError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check endpoint URLs parse and the fetch bounds are usable.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let endpoints = [
        ("github.api_base", &config.github.api_base),
        ("leetcode.graphql_url", &config.leetcode.graphql_url),
        ("leetcode.submissions_base", &config.leetcode.submissions_base),
    ];
    for (key, value) in endpoints {
        Url::parse(value)
            .map_err(|e| FootprintError::config(format!("{key} = '{value}' is not a URL: {e}")))?;
    }

    let bounds = [
        ("github.max_repos", u64::from(config.github.max_repos)),
        ("github.events_per_page", u64::from(config.github.events_per_page)),
        ("github.events_max_pages", u64::from(config.github.events_max_pages)),
        ("github.timeout_secs", config.github.timeout_secs),
        ("leetcode.timeout_secs", config.leetcode.timeout_secs),
    ];
    for (key, value) in bounds {
        if value == 0 {
            return Err(FootprintError::config(format!("{key} must be greater than zero")));
        }
    }

    if config.github.username.trim().is_empty() || config.leetcode.username.trim().is_empty() {
        return Err(FootprintError::config("usernames must not be empty"));
    }

    Ok(())
}
