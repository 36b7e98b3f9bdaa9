//! GitHub profile and repository documents.

use footprint_github::{CommitRecord, Repository, UserProfile};
use footprint_shared::{OutputDocument, Provenance, SourceType};

use super::{TextBlock, present_text};

/// Commits listed in the profile document.
pub const PROFILE_COMMIT_LIMIT: usize = 20;

/// Rendered in place of a missing primary language.
const NO_LANGUAGE: &str = "N/A";

const PROFILE_URL_BASE: &str = "https://github.com";

/// Profile document first, then one document per repository in input order.
pub fn render_github_documents(
    username: &str,
    profile: &UserProfile,
    repos: &[Repository],
    commits: &[CommitRecord],
) -> Vec<OutputDocument> {
    let mut docs = Vec::with_capacity(repos.len() + 1);
    docs.push(render_profile_document(username, profile, repos, commits));
    docs.extend(repos.iter().map(|repo| render_repository_document(username, repo)));
    docs
}

/// Profile attributes, repository count, language tally, and recent commits.
pub fn render_profile_document(
    username: &str,
    profile: &UserProfile,
    repos: &[Repository],
    commits: &[CommitRecord],
) -> OutputDocument {
    let mut block = TextBlock::new(format!("GitHub Profile Summary for @{username}"));
    block.blank();
    block.line("Profile:");
    for (key, value) in profile_attributes(profile) {
        block.attr(key, value);
    }

    block.blank();
    block.line(format!("Total public repos (non-fork): {}", repos.len()));

    let languages = language_tally(repos);
    if !languages.is_empty() {
        let names: Vec<&str> = languages.iter().map(|(lang, _)| lang.as_str()).collect();
        block.line(format!("Languages used: {}", names.join(", ")));
    }

    if !commits.is_empty() {
        block.blank();
        block.line(format!("Recent Commits (last {}):", commits.len()));
        for c in commits.iter().take(PROFILE_COMMIT_LIMIT) {
            block.line(format!("  - [{}] {}: {}", c.date, c.repo, c.message));
        }
    }

    OutputDocument {
        body: block.finish(),
        metadata: Provenance::new(
            format!("{PROFILE_URL_BASE}/{username}"),
            SourceType::GithubProfile,
            username,
        ),
    }
}

/// One repository: summary lines, topics, and the README excerpt.
pub fn render_repository_document(username: &str, repo: &Repository) -> OutputDocument {
    let language = repo.language().unwrap_or(NO_LANGUAGE);

    let mut block = TextBlock::new(format!("GitHub Repository: {}", repo.name));
    block.line(format!("  URL:         {}", repo.html_url));
    if let Some(description) = repo.description() {
        block.line(format!("  Description: {description}"));
    }
    block.line(format!("  Language:    {language}"));
    block.line(format!(
        "  Stars:       {}  |  Forks: {}",
        repo.stargazers_count, repo.forks_count
    ));
    block.line(format!("  Last pushed: {}", repo.pushed_date()));
    if !repo.topics.is_empty() {
        block.line(format!("  Topics:      {}", repo.topics.join(", ")));
    }
    if !repo.readme.is_empty() {
        block.blank();
        block.line("  README (excerpt):");
        for line in repo.readme.lines() {
            block.line(format!("    {line}"));
        }
    }

    let source = if repo.html_url.is_empty() {
        format!("{PROFILE_URL_BASE}/{}", repo.full_name)
    } else {
        repo.html_url.clone()
    };

    let mut metadata = Provenance::new(source, SourceType::GithubRepo, username);
    metadata.repo = Some(repo.name.clone());
    metadata.language = Some(language.to_string());
    metadata.stars = Some(repo.stargazers_count);

    OutputDocument {
        body: block.finish(),
        metadata,
    }
}

/// Languages by descending repository count; ties keep first-seen order.
pub fn language_tally(repos: &[Repository]) -> Vec<(String, usize)> {
    let mut tally: Vec<(String, usize)> = Vec::new();
    for lang in repos.iter().filter_map(Repository::language) {
        match tally.iter_mut().find(|(seen, _)| seen == lang) {
            Some((_, count)) => *count += 1,
            None => tally.push((lang.to_string(), 1)),
        }
    }
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally
}

/// Present attributes in display order; empty strings and zero counts are skipped.
fn profile_attributes(profile: &UserProfile) -> Vec<(&'static str, String)> {
    let text = [
        ("name", &profile.name),
        ("bio", &profile.bio),
        ("company", &profile.company),
        ("location", &profile.location),
        ("blog", &profile.blog),
        ("email", &profile.email),
        ("twitter_username", &profile.twitter_username),
    ];
    let counts = [
        ("public_repos", profile.public_repos),
        ("followers", profile.followers),
        ("following", profile.following),
    ];

    let mut attrs: Vec<(&'static str, String)> = text
        .into_iter()
        .filter_map(|(key, value)| present_text(value).map(|v| (key, v.to_string())))
        .collect();
    attrs.extend(
        counts
            .into_iter()
            .filter_map(|(key, value)| value.filter(|n| *n != 0).map(|n| (key, n.to_string()))),
    );
    attrs
}
