//! Output document types shared by the assembler and the artifact writer.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Discriminates which kind of record an [`OutputDocument`] was rendered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Profile-level aggregate for a GitHub account.
    GithubProfile,
    /// One GitHub repository.
    GithubRepo,
    /// LeetCode profile, stats, and recent submissions.
    LeetcodeProfile,
}

impl SourceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GithubProfile => "github_profile",
            Self::GithubRepo => "github_repo",
            Self::LeetcodeProfile => "leetcode_profile",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Provenance
// ---------------------------------------------------------------------------

/// Metadata attached to every document so downstream retrieval can cite it.
///
/// Serializes to a flat mapping; the repository fields are only present on
/// [`SourceType::GithubRepo`] documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Canonical, human-navigable URL of the origin.
    pub source: String,
    pub source_type: SourceType,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u64>,
}

impl Provenance {
    /// Provenance for a document that is not tied to a single repository.
    pub fn new(source: impl Into<String>, source_type: SourceType, username: &str) -> Self {
        Self {
            source: source.into(),
            source_type,
            username: username.to_string(),
            repo: None,
            language: None,
            stars: None,
        }
    }
}

// ---------------------------------------------------------------------------
// OutputDocument
// ---------------------------------------------------------------------------

/// A rendered text block plus its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    /// Rendered, human-readable body.
    pub body: String,
    pub metadata: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provenance_omits_repo_fields_for_profiles() {
        let meta = Provenance::new(
            "https://github.com/octocat",
            SourceType::GithubProfile,
            "octocat",
        );
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["source_type"], "github_profile");
        assert_eq!(value["username"], "octocat");
        assert!(value.get("repo").is_none());
        assert!(value.get("stars").is_none());
    }

    #[test]
    fn source_type_display_matches_serde() {
        for st in [
            SourceType::GithubProfile,
            SourceType::GithubRepo,
            SourceType::LeetcodeProfile,
        ] {
            let json = serde_json::to_value(st).unwrap();
            assert_eq!(json, st.to_string());
        }
    }
}
