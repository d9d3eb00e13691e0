//! Check Mode
//!
//! Runs loader -> normalizer -> validator over a corpus without touching
//! the registry. With `fix` set, normalized documents are written back to
//! storage in canonical form. This is the dry-run surface authors use
//! before a publish run.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::category::CategoryMap;
use crate::corpus::loader::{load_corpus, write_document};
use crate::normalize::normalize;
use crate::validate::{validate, ValidationLimits};

/// Per-document check result.
#[derive(Clone, Debug)]
pub struct CheckOutcome {
    pub identifier: String,
    /// Parse reason when the document could not be loaded at all.
    pub load_error: Option<String>,
    pub notes: Vec<String>,
    pub violations: Vec<String>,
    /// Whether fix mode rewrote the file on disk.
    pub fixed: bool,
    /// Reason fix mode could not write the file back. Local to this
    /// document; the rest of the run continues.
    pub write_error: Option<String>,
}

/// Aggregate of a check run, in discovery order.
#[derive(Debug, Default)]
pub struct CheckReport {
    pub outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    /// Clean means every document loaded, validated with no violations,
    /// and (in fix mode) wrote back without error. Normalization
    /// rewrites alone do not make a corpus dirty.
    pub fn is_clean(&self) -> bool {
        self.outcomes.iter().all(|o| {
            o.load_error.is_none() && o.violations.is_empty() && o.write_error.is_none()
        })
    }
}

/// Check every skill document under `root`; optionally write normalized
/// documents back to storage.
pub fn run_check(
    root: &Path,
    categories: &CategoryMap,
    limits: &ValidationLimits,
    fix: bool,
) -> Result<CheckReport> {
    let items = load_corpus(root)?;
    info!("Checking {} skill document(s) under {}", items.len(), root.display());

    let mut report = CheckReport::default();
    for item in items {
        report.outcomes.push(check_item(item, categories, limits, fix));
    }

    Ok(report)
}

/// Take one loaded item through normalize -> validate, plus the optional
/// write-back. Every failure stays local to the item's outcome.
fn check_item(
    item: crate::corpus::loader::LoadedItem,
    categories: &CategoryMap,
    limits: &ValidationLimits,
    fix: bool,
) -> CheckOutcome {
    let document = match item.result {
        Ok(doc) => doc,
        Err(e) => {
            return CheckOutcome {
                identifier: item.identifier,
                load_error: Some(e.to_string()),
                notes: Vec::new(),
                violations: Vec::new(),
                fixed: false,
                write_error: None,
            };
        }
    };

    let normalized = normalize(document);
    let validation = validate(&normalized.document, categories, limits);

    let mut fixed = false;
    let mut write_error = None;
    if fix && normalized.changed {
        match write_document(&item.path, &normalized.document) {
            Ok(()) => fixed = true,
            Err(e) => {
                warn!("Could not write '{}' back: {:#}", item.identifier, e);
                write_error = Some(format!("{:#}", e));
            }
        }
    }

    CheckOutcome {
        identifier: item.identifier,
        load_error: None,
        notes: normalized.notes,
        violations: validation.violations,
        fixed,
        write_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn limits() -> ValidationLimits {
        ValidationLimits::default()
    }

    fn long_description() -> String {
        "Explains the whole procedure end to end, including the recovery steps for partial runs."
            .to_string()
    }

    #[test]
    fn test_clean_corpus_reports_clean() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("tidy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("SKILL.md"),
            format!(
                "---\nname: tidy\ndescription: {}\nlicense: MIT\ncategory: coding\n---\nbody\n",
                long_description()
            ),
        )
        .unwrap();

        let report = run_check(tmp.path(), &CategoryMap::builtin(), &limits(), false).unwrap();
        assert!(report.is_clean());
        assert!(!report.outcomes[0].fixed);
    }

    #[test]
    fn test_violations_make_corpus_dirty() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("gappy");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("SKILL.md"), "---\nname: gappy\n---\nbody\n").unwrap();

        let report = run_check(tmp.path(), &CategoryMap::builtin(), &limits(), false).unwrap();
        assert!(!report.is_clean());
        assert!(report.outcomes[0]
            .violations
            .contains(&"missing-description".to_string()));
    }

    #[test]
    fn test_fix_mode_rewrites_legacy_document() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("legacy");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("SKILL.md");
        fs::write(
            &path,
            format!(
                "---\ndesc: {}\nlicense: MIT\ncategory: ops\n---\nbody\n",
                long_description()
            ),
        )
        .unwrap();

        let report = run_check(tmp.path(), &CategoryMap::builtin(), &limits(), true).unwrap();
        assert!(report.outcomes[0].fixed);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("description:"));
        assert!(!rewritten.contains("desc:"));
        assert!(rewritten.contains("name: legacy"));

        // A second check pass finds nothing left to fix.
        let again = run_check(tmp.path(), &CategoryMap::builtin(), &limits(), true).unwrap();
        assert!(!again.outcomes[0].fixed);
        assert!(again.outcomes[0].notes.is_empty());
    }

    #[test]
    fn test_write_failure_is_local_to_the_document() {
        use crate::corpus::loader::LoadedItem;
        use serde_json::{json, Map};
        use std::path::PathBuf;

        // A legacy document whose file path cannot be written back: the
        // outcome records the write error instead of erroring the run.
        let mut metadata = Map::new();
        metadata.insert("desc".to_string(), json!(long_description()));
        let item = LoadedItem {
            identifier: "unwritable".to_string(),
            path: PathBuf::from("/no/such/dir/SKILL.md"),
            result: Ok(crate::types::SkillDocument {
                identifier: "unwritable".to_string(),
                metadata,
                body: vec!["body".to_string()],
            }),
        };

        let outcome = check_item(item, &CategoryMap::builtin(), &limits(), true);
        assert!(!outcome.fixed);
        assert!(outcome.write_error.is_some());
        assert!(!outcome.notes.is_empty());

        let report = CheckReport {
            outcomes: vec![outcome],
        };
        assert!(!report.is_clean());
    }

    #[test]
    fn test_load_failure_recorded_without_aborting() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("broken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("SKILL.md"), "just markdown").unwrap();

        let report = run_check(tmp.path(), &CategoryMap::builtin(), &limits(), false).unwrap();
        assert_eq!(report.outcomes.len(), 1);
        assert!(report.outcomes[0]
            .load_error
            .as_deref()
            .unwrap()
            .contains("delimiter"));
        assert!(!report.is_clean());
    }
}
