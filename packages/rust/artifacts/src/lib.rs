//! On-disk artifacts for pipeline runs.
//!
//! ```text
//! {root}/
//! ├── manifest.json           run record per pipeline stem
//! ├── json_files/{stem}.json  verbatim archive (pretty JSON)
//! └── text_files/{stem}.txt   documents joined by a divider
//! ```
//!
//! Files are written to a temp name and renamed into place, so a reader never
//! sees a half-written artifact. A run's files are all staged before any is
//! renamed: if one cannot be written, none of the previous run's files change.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use footprint_shared::{FootprintError, OutputDocument, Result};

/// Current schema version of `manifest.json`.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

const MANIFEST_FILE: &str = "manifest.json";
const JSON_DIR: &str = "json_files";
const TEXT_DIR: &str = "text_files";

/// Width of the divider between documents in text artifacts.
const DIVIDER_WIDTH: usize = 60;

/// Join document bodies in emission order, separated by a divider line.
pub fn render_text(documents: &[OutputDocument]) -> String {
    let divider = format!("\n\n{}\n\n", "─".repeat(DIVIDER_WIDTH));
    documents
        .iter()
        .map(|d| d.body.as_str())
        .collect::<Vec<_>>()
        .join(&divider)
}

/// One written file, relative to the artifact root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub path: String,
    pub sha256: String,
    pub size_bytes: usize,
}

/// The latest run of one pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub run_id: Uuid,
    pub username: String,
    pub generated_at: DateTime<Utc>,
    pub document_count: usize,
    pub artifacts: Vec<ArtifactMeta>,
}

/// `manifest.json` at the artifact root, keyed by pipeline stem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub tool_version: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub pipelines: BTreeMap<String, PipelineRecord>,
}

/// Writes pipeline output under one root directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    root: PathBuf,
    tool_version: String,
}

impl ArtifactWriter {
    pub fn new(root: impl Into<PathBuf>, tool_version: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            tool_version: tool_version.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the archive as `json_files/{stem}.json` and the documents as
    /// `text_files/{stem}.txt`, then record the run in the manifest.
    #[instrument(
        skip(self, archive, documents),
        fields(root = %self.root.display(), documents = documents.len())
    )]
    pub fn write_documents(
        &self,
        stem: &str,
        username: &str,
        archive: &serde_json::Value,
        documents: &[OutputDocument],
    ) -> Result<PipelineRecord> {
        let json = to_pretty_json(archive)?;
        let text = render_text(documents);

        let (json_file, json_meta) =
            self.stage_artifact(JSON_DIR, &format!("{stem}.json"), &json)?;
        let staged_text = self.stage_artifact(TEXT_DIR, &format!("{stem}.txt"), &text);
        let (text_file, text_meta) = match staged_text {
            Ok(staged) => staged,
            Err(e) => {
                json_file.discard();
                return Err(e);
            }
        };

        json_file.commit()?;
        text_file.commit()?;

        self.record_run(stem, username, documents.len(), vec![json_meta, text_meta])
    }

    /// Write a JSON-only artifact (`json_files/{stem}.json`) and record it.
    #[instrument(skip(self, value), fields(root = %self.root.display()))]
    pub fn write_json<T: Serialize>(
        &self,
        stem: &str,
        username: &str,
        value: &T,
    ) -> Result<PipelineRecord> {
        let json = to_pretty_json(value)?;
        let (file, meta) = self.stage_artifact(JSON_DIR, &format!("{stem}.json"), &json)?;
        file.commit()?;
        self.record_run(stem, username, 0, vec![meta])
    }

    /// Current manifest, or `None` before the first run.
    pub fn read_manifest(&self) -> Result<Option<RunManifest>> {
        let path = self.root.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| FootprintError::io(&path, e))?;
        let manifest = serde_json::from_str(&content)
            .map_err(|e| FootprintError::parse(format!("{}: {e}", path.display())))?;
        Ok(Some(manifest))
    }

    /// Absolute path of an artifact recorded with a root-relative path.
    pub fn resolve(&self, artifact: &ArtifactMeta) -> PathBuf {
        self.root.join(&artifact.path)
    }

    fn stage_artifact(
        &self,
        dir: &str,
        filename: &str,
        content: &str,
    ) -> Result<(StagedFile, ArtifactMeta)> {
        let staged = StagedFile::write(&self.root.join(dir).join(filename), content)?;

        let meta = ArtifactMeta {
            path: format!("{dir}/{filename}"),
            sha256: sha256_hex(content),
            size_bytes: content.len(),
        };
        Ok((staged, meta))
    }

    fn record_run(
        &self,
        stem: &str,
        username: &str,
        document_count: usize,
        artifacts: Vec<ArtifactMeta>,
    ) -> Result<PipelineRecord> {
        let now = Utc::now();
        let record = PipelineRecord {
            run_id: Uuid::now_v7(),
            username: username.to_string(),
            generated_at: now,
            document_count,
            artifacts,
        };

        let mut manifest = self.read_manifest()?.unwrap_or_else(|| RunManifest {
            schema_version: MANIFEST_SCHEMA_VERSION,
            tool_version: self.tool_version.clone(),
            updated_at: now,
            pipelines: BTreeMap::new(),
        });
        manifest.tool_version.clone_from(&self.tool_version);
        manifest.updated_at = now;
        manifest.pipelines.insert(stem.to_string(), record.clone());

        let json = to_pretty_json(&manifest)?;
        StagedFile::write(&self.root.join(MANIFEST_FILE), &json)?.commit()?;

        info!(stem, run_id = %record.run_id, "manifest updated");
        Ok(record)
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| FootprintError::validation(format!("JSON serialization failed: {e}")))
}

/// Content written to `.{name}.tmp` beside its target, not yet renamed over it.
struct StagedFile {
    temp: PathBuf,
    target: PathBuf,
}

impl StagedFile {
    fn write(target: &Path, content: &str) -> Result<Self> {
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).map_err(|e| FootprintError::io(parent, e))?;

        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = parent.join(format!(".{name}.tmp"));

        std::fs::write(&temp, content).map_err(|e| FootprintError::io(&temp, e))?;
        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    fn commit(self) -> Result<()> {
        std::fs::rename(&self.temp, &self.target)
            .map_err(|e| FootprintError::io(&self.target, e))?;
        debug!(file = %self.target.display(), "wrote artifact");
        Ok(())
    }

    fn discard(self) {
        if let Err(e) = std::fs::remove_file(&self.temp) {
            debug!(file = %self.temp.display(), error = %e, "could not remove staged file");
        }
    }
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
