//! Skillpub - Type Definitions
//!
//! Shared types for the skill-corpus publish pipeline: the document model,
//! per-stage result types, the batch report, and the registry collaborator
//! trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata mapping as parsed from a document's frontmatter block.
pub type Metadata = Map<String, Value>;

// ─── Documents ───────────────────────────────────────────────────

/// One unit of publishable content: a skill directory's document file,
/// split into its metadata block and body lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillDocument {
    /// Unique slug derived from the skill directory name. Immutable once
    /// assigned; also the registry key.
    pub identifier: String,
    /// Frontmatter keys and values. Unknown keys survive parsing so the
    /// normalizer can see them.
    pub metadata: Metadata,
    /// Body lines following the metadata block, in file order.
    pub body: Vec<String>,
}

impl SkillDocument {
    /// Fetch a metadata value as a string, if present and string-valued.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

// ─── Stage Results ───────────────────────────────────────────────

/// Outcome of canonicalizing one document's metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizationResult {
    /// The document, rewritten if any rule fired.
    pub document: SkillDocument,
    /// Whether any key was renamed, added, or removed.
    pub changed: bool,
    /// One human-readable note per rewrite applied, in application order.
    pub notes: Vec<String>,
}

/// Outcome of checking one document against the quality contract.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub identifier: String,
    /// Identifiers of failed rules, in rule order. Empty means publishable.
    pub violations: Vec<String>,
}

impl ValidationResult {
    pub fn is_publishable(&self) -> bool {
        self.violations.is_empty()
    }
}

// ─── Publish Outcomes ────────────────────────────────────────────

/// Terminal status of one document's trip through the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishStatus {
    Published,
    SkippedInvalid,
    Failed,
}

/// Result of attempting to publish one document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub identifier: String,
    pub status: PublishStatus,
    /// Free-text reason. Always present when status is not `published`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl PublishOutcome {
    pub fn published(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            status: PublishStatus::Published,
            detail: None,
        }
    }

    pub fn skipped(identifier: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            status: PublishStatus::SkippedInvalid,
            detail: Some(detail.into()),
        }
    }

    pub fn failed(identifier: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            status: PublishStatus::Failed,
            detail: Some(detail.into()),
        }
    }
}

/// Derived tally of each terminal status in a batch report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub published: usize,
    pub skipped_invalid: usize,
    pub failed: usize,
}

/// Aggregate record of a full batch run. One outcome per discovered
/// document, in discovery order, regardless of how many failed.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// RFC3339 timestamp of run start.
    pub started_at: String,
    /// RFC3339 timestamp of run end.
    pub finished_at: String,
    pub outcomes: Vec<PublishOutcome>,
}

impl BatchReport {
    /// Tally outcomes by terminal status.
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for outcome in &self.outcomes {
            match outcome.status {
                PublishStatus::Published => counts.published += 1,
                PublishStatus::SkippedInvalid => counts.skipped_invalid += 1,
                PublishStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// A run succeeds only when every document published.
    pub fn is_success(&self) -> bool {
        let counts = self.counts();
        counts.failed == 0 && counts.skipped_invalid == 0
    }
}

// ─── Registry Collaborator ───────────────────────────────────────

/// Narrow interface to the external registry. The pipeline treats it as
/// opaque and handles both synchronous errors and timeouts at the call
/// site.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Publish one document. Publishing an already-published, unchanged
    /// document must be an overwrite with identical content, never a
    /// duplicate.
    async fn publish(
        &self,
        identifier: &str,
        metadata: &Metadata,
        body: &str,
    ) -> anyhow::Result<()>;
}
