//! Corpus Loader
//!
//! Discovers skill directories under a root, locates each one's document
//! file, and parses it into a [`SkillDocument`]. Discovery order is
//! lexicographic by identifier so batch reports are reproducible and
//! diffable across runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, warn};

use crate::corpus::frontmatter::{split_document, ParseError};
use crate::types::SkillDocument;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Why a discovered document could not be loaded. A load failure is a
/// per-document outcome, never fatal to the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unreadable file: {0}")]
    Unreadable(#[source] std::io::Error),
    #[error("{0}")]
    Parse(#[from] ParseError),
}

/// One discovered skill directory: its identifier, the document file it
/// holds, and the parse result for that file.
#[derive(Debug)]
pub struct LoadedItem {
    /// Slug derived from the skill directory name.
    pub identifier: String,
    /// Path of the document file, kept so fix mode can write back.
    pub path: PathBuf,
    pub result: Result<SkillDocument, LoadError>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Scan `root` for skill directories and load each one's document file.
///
/// A skill directory is any direct subdirectory containing a recognized
/// document file (`SKILL.md`, then `<dir-name>.md`, then `README.md`).
/// Directories without one are skipped. Results are sorted
/// lexicographically by identifier.
pub fn load_corpus(root: &Path) -> Result<Vec<LoadedItem>> {
    let entries = fs::read_dir(root)
        .with_context(|| format!("Failed to read corpus root {}", root.display()))?;

    let mut items: Vec<LoadedItem> = Vec::new();

    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }

        let identifier = match dir.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => {
                warn!("Skipping directory with non-UTF8 name: {}", dir.display());
                continue;
            }
        };

        let doc_path = match find_document_file(&dir, &identifier) {
            Some(p) => p,
            None => {
                debug!("No document file in {}, skipping", dir.display());
                continue;
            }
        };

        let result = load_document(&doc_path, &identifier);
        items.push(LoadedItem {
            identifier,
            path: doc_path,
            result,
        });
    }

    items.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    Ok(items)
}

/// Write a document back to its file in canonical form. Fix mode's single
/// write path.
pub fn write_document(path: &Path, document: &SkillDocument) -> Result<()> {
    let content =
        crate::corpus::frontmatter::render_document(&document.metadata, &document.body);
    fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Read and parse one document file.
fn load_document(path: &Path, identifier: &str) -> Result<SkillDocument, LoadError> {
    let content = fs::read_to_string(path).map_err(LoadError::Unreadable)?;
    let parsed = split_document(&content)?;

    Ok(SkillDocument {
        identifier: identifier.to_string(),
        metadata: parsed.metadata,
        body: parsed.body,
    })
}

/// Look for a skill document file inside a directory. Tries `SKILL.md`
/// first, then `<name>.md`, then `README.md`.
fn find_document_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidates = [
        dir.join("SKILL.md"),
        dir.join(format!("{}.md", name)),
        dir.join("README.md"),
    ];

    candidates.into_iter().find(|c| c.is_file())
}
