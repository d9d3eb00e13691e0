//! Frontmatter Normalizer
//!
//! Brings documents written against legacy metadata schemas into the
//! canonical shape `{name, description, license, category?}`. Rewrites are
//! expressed as an ordered set of pure rules, each independently testable;
//! every rule is idempotent so repeated runs converge.
//!
//! The normalizer never errors and never invents required content it
//! cannot infer from existing fields. A document no rule can reconcile
//! passes through unchanged for the validator to reject.

pub mod rules;

use crate::types::{NormalizationResult, SkillDocument};

/// Keys of the canonical metadata schema.
pub const CANONICAL_KEYS: [&str; 4] = ["name", "description", "license", "category"];

/// Bucket key for retained non-canonical metadata.
pub const EXTRA_KEY: &str = "extra";

/// Canonicalize one document's metadata.
///
/// Applies [`rules::REWRITE_RULES`] in their fixed order. `changed` is
/// true iff at least one rule fired; `notes` records each rewrite in
/// application order.
pub fn normalize(document: SkillDocument) -> NormalizationResult {
    let mut doc = document;
    let mut notes: Vec<String> = Vec::new();

    for rule in rules::REWRITE_RULES {
        if let Some(outcome) = (rule.apply)(&doc) {
            doc.metadata = outcome.metadata;
            notes.extend(outcome.notes);
        }
    }

    NormalizationResult {
        document: doc,
        changed: !notes.is_empty(),
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn doc(identifier: &str, pairs: &[(&str, Value)]) -> SkillDocument {
        let mut metadata = Map::new();
        for (k, v) in pairs {
            metadata.insert(k.to_string(), v.clone());
        }
        SkillDocument {
            identifier: identifier.to_string(),
            metadata,
            body: vec!["body".to_string()],
        }
    }

    #[test]
    fn test_canonical_document_unchanged() {
        let d = doc(
            "tidy",
            &[
                ("name", json!("tidy")),
                ("description", json!("does things")),
                ("license", json!("MIT")),
            ],
        );
        let result = normalize(d.clone());
        assert!(!result.changed);
        assert!(result.notes.is_empty());
        assert_eq!(result.document, d);
    }

    #[test]
    fn test_desc_alias_rewritten() {
        let d = doc("aliased", &[("desc", json!("short form key"))]);
        let result = normalize(d);
        assert!(result.changed);
        assert_eq!(
            result.document.meta_str("description"),
            Some("short form key")
        );
        assert!(!result.document.metadata.contains_key("desc"));
    }

    #[test]
    fn test_miscased_key_folded() {
        let d = doc("cased", &[("Description", json!("was upper-cased"))]);
        let result = normalize(d);
        assert!(result.changed);
        assert_eq!(
            result.document.meta_str("description"),
            Some("was upper-cased")
        );
    }

    #[test]
    fn test_nested_meta_block_hoisted() {
        let d = doc(
            "nested",
            &[("meta", json!({"name": "inner", "license": "MIT"}))],
        );
        let result = normalize(d);
        assert!(result.changed);
        assert_eq!(result.document.meta_str("name"), Some("inner"));
        assert_eq!(result.document.meta_str("license"), Some("MIT"));
        assert!(!result.document.metadata.contains_key("meta"));
    }

    #[test]
    fn test_missing_name_inferred_from_identifier() {
        let d = doc("my-skill", &[("description", json!("something"))]);
        let result = normalize(d);
        assert!(result.changed);
        assert_eq!(result.document.meta_str("name"), Some("my-skill"));
    }

    #[test]
    fn test_unknown_keys_bucketed_not_dropped() {
        let d = doc(
            "extras",
            &[("name", json!("extras")), ("author", json!("someone"))],
        );
        let result = normalize(d);
        assert!(result.changed);
        assert!(!result.document.metadata.contains_key("author"));
        assert_eq!(result.document.metadata["extra"]["author"], "someone");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let d = doc(
            "legacy",
            &[
                ("Title", json!("Legacy Skill")),
                ("desc", json!("legacy description")),
                ("author", json!("someone")),
                ("meta", json!({"licence": "MIT"})),
            ],
        );
        let once = normalize(d);
        let twice = normalize(once.document.clone());
        assert!(!twice.changed, "second pass fired rules: {:?}", twice.notes);
        assert_eq!(once.document, twice.document);
    }

    #[test]
    fn test_unreconcilable_description_passes_through() {
        // No description and nothing to infer one from: the normalizer
        // leaves the gap for the validator.
        let d = doc("bare", &[("name", json!("bare"))]);
        let result = normalize(d);
        assert!(!result.document.metadata.contains_key("description"));
    }

    #[test]
    fn test_notes_describe_each_rewrite() {
        let d = doc("noted", &[("desc", json!("via alias"))]);
        let result = normalize(d);
        assert!(result.notes.iter().any(|n| n.contains("desc")));
        assert!(result.notes.iter().any(|n| n.contains("description")));
    }
}
