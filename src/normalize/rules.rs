//! Rewrite Rules
//!
//! Each rule recognizes one non-standard metadata shape and produces a
//! rewritten mapping plus audit notes. Rules return `None` when they have
//! nothing to do, which is what makes the set idempotent: a rule applied
//! to its own output never fires again.

use serde_json::{Map, Value};

use crate::normalize::{CANONICAL_KEYS, EXTRA_KEY};
use crate::types::{Metadata, SkillDocument};

/// Legacy key aliases, in rename order. Renames apply only when the
/// canonical key is absent; a clashing alias is left for `bucket_extra`.
const KEY_ALIASES: [(&str, &str); 8] = [
    ("title", "name"),
    ("skill_name", "name"),
    ("desc", "description"),
    ("summary", "description"),
    ("licence", "license"),
    ("licence_id", "license"),
    ("topic", "category"),
    ("group", "category"),
];

/// Nested block keys whose children get hoisted to the top level.
const NESTED_KEYS: [&str; 2] = ["metadata", "meta"];

/// Result of one rule firing: the rewritten mapping and what changed.
pub struct RewriteOutcome {
    pub metadata: Metadata,
    pub notes: Vec<String>,
}

/// One rewrite rule. Pure: reads the document, returns a new mapping.
pub struct RewriteRule {
    pub name: &'static str,
    pub apply: fn(&SkillDocument) -> Option<RewriteOutcome>,
}

/// The ordered rule set. Order matters: case folding runs before alias
/// renaming so mis-cased aliases get renamed too, and the extra bucket
/// runs last to sweep whatever the other rules left unrecognized.
pub const REWRITE_RULES: &[RewriteRule] = &[
    RewriteRule {
        name: "hoist-nested",
        apply: hoist_nested,
    },
    RewriteRule {
        name: "fold-case",
        apply: fold_case,
    },
    RewriteRule {
        name: "alias-keys",
        apply: alias_keys,
    },
    RewriteRule {
        name: "infer-name",
        apply: infer_name,
    },
    RewriteRule {
        name: "bucket-extra",
        apply: bucket_extra,
    },
];

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Hoist fields out of a nested `metadata:`/`meta:` block mapping.
///
/// Children whose top-level key is absent move up; clashing children stay
/// nested and the pruned block survives for `bucket_extra` to sweep. An
/// emptied block is removed outright.
fn hoist_nested(doc: &SkillDocument) -> Option<RewriteOutcome> {
    let mut metadata = doc.metadata.clone();
    let mut notes = Vec::new();

    for nested_key in NESTED_KEYS {
        let Some(Value::Object(children)) = metadata.get(nested_key).cloned() else {
            continue;
        };

        let mut remaining = Map::new();
        for (child_key, child_value) in children {
            if metadata.contains_key(&child_key) {
                remaining.insert(child_key, child_value);
            } else {
                notes.push(format!(
                    "hoisted '{}' out of nested '{}' block",
                    child_key, nested_key
                ));
                metadata.insert(child_key, child_value);
            }
        }

        if remaining.is_empty() {
            metadata.remove(nested_key);
        } else {
            metadata.insert(nested_key.to_string(), Value::Object(remaining));
        }
    }

    if notes.is_empty() {
        None
    } else {
        Some(RewriteOutcome { metadata, notes })
    }
}

/// Fold mis-cased canonical or alias keys to lowercase.
fn fold_case(doc: &SkillDocument) -> Option<RewriteOutcome> {
    let mut metadata = doc.metadata.clone();
    let mut notes = Vec::new();

    let recognized: Vec<&str> = CANONICAL_KEYS
        .iter()
        .copied()
        .chain(KEY_ALIASES.iter().map(|(alias, _)| *alias))
        .collect();

    let candidates: Vec<String> = metadata.keys().cloned().collect();
    for key in candidates {
        let lower = key.to_lowercase();
        if lower != key && recognized.contains(&lower.as_str()) && !metadata.contains_key(&lower)
        {
            if let Some(value) = metadata.remove(&key) {
                notes.push(format!("folded mis-cased key '{}' to '{}'", key, lower));
                metadata.insert(lower, value);
            }
        }
    }

    if notes.is_empty() {
        None
    } else {
        Some(RewriteOutcome { metadata, notes })
    }
}

/// Rename known legacy alias keys to their canonical names.
fn alias_keys(doc: &SkillDocument) -> Option<RewriteOutcome> {
    let mut metadata = doc.metadata.clone();
    let mut notes = Vec::new();

    for (alias, canonical) in KEY_ALIASES {
        if metadata.contains_key(alias) && !metadata.contains_key(canonical) {
            if let Some(value) = metadata.remove(alias) {
                notes.push(format!("renamed alias '{}' to '{}'", alias, canonical));
                metadata.insert(canonical.to_string(), value);
            }
        }
    }

    if notes.is_empty() {
        None
    } else {
        Some(RewriteOutcome { metadata, notes })
    }
}

/// Fill a missing or empty `name` from the identifier slug. The name is
/// the one required key inferable from another field; a description never
/// is, so no rule invents one.
fn infer_name(doc: &SkillDocument) -> Option<RewriteOutcome> {
    let has_name = doc
        .metadata
        .get("name")
        .and_then(|v| v.as_str())
        .map(|s| !s.is_empty())
        .unwrap_or(false);
    if has_name {
        return None;
    }

    let mut metadata = doc.metadata.clone();
    metadata.insert(
        "name".to_string(),
        Value::String(doc.identifier.clone()),
    );

    Some(RewriteOutcome {
        metadata,
        notes: vec![format!(
            "inferred missing 'name' from identifier '{}'",
            doc.identifier
        )],
    })
}

/// Move keys outside the canonical schema under the `extra` bucket.
/// Nothing is deleted: unrecognized metadata is retained for audit, not
/// silently discarded.
fn bucket_extra(doc: &SkillDocument) -> Option<RewriteOutcome> {
    let mut metadata = doc.metadata.clone();
    let mut notes = Vec::new();

    let mut extra = match metadata.remove(EXTRA_KEY) {
        Some(Value::Object(map)) => map,
        Some(other) => {
            // A scalar `extra` key is itself unrecognized; nest it.
            let mut map = Map::new();
            map.insert(EXTRA_KEY.to_string(), other);
            notes.push(format!("moved scalar '{}' key into the bucket", EXTRA_KEY));
            map
        }
        None => Map::new(),
    };

    let unrecognized: Vec<String> = metadata
        .keys()
        .filter(|k| !CANONICAL_KEYS.contains(&k.as_str()))
        .cloned()
        .collect();

    for key in unrecognized {
        if let Some(value) = metadata.remove(&key) {
            notes.push(format!("retained unrecognized key '{}' under '{}'", key, EXTRA_KEY));
            extra.insert(key, value);
        }
    }

    if notes.is_empty() {
        return None;
    }

    metadata.insert(EXTRA_KEY.to_string(), Value::Object(extra));
    Some(RewriteOutcome { metadata, notes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_with(pairs: &[(&str, Value)]) -> SkillDocument {
        let mut metadata = Map::new();
        for (k, v) in pairs {
            metadata.insert(k.to_string(), v.clone());
        }
        SkillDocument {
            identifier: "rule-test".to_string(),
            metadata,
            body: Vec::new(),
        }
    }

    #[test]
    fn test_alias_does_not_overwrite_canonical() {
        let doc = doc_with(&[
            ("description", json!("the real one")),
            ("desc", json!("the stale alias")),
        ]);
        assert!(alias_keys(&doc).is_none());
    }

    #[test]
    fn test_hoist_leaves_clashing_children_nested() {
        let doc = doc_with(&[
            ("name", json!("outer")),
            ("meta", json!({"name": "inner", "license": "MIT"})),
        ]);
        let outcome = hoist_nested(&doc).unwrap();
        assert_eq!(outcome.metadata["name"], "outer");
        assert_eq!(outcome.metadata["license"], "MIT");
        assert_eq!(outcome.metadata["meta"]["name"], "inner");
    }

    #[test]
    fn test_fold_case_covers_aliases() {
        let doc = doc_with(&[("Title", json!("Mis-Cased"))]);
        let outcome = fold_case(&doc).unwrap();
        assert_eq!(outcome.metadata["title"], "Mis-Cased");
    }

    #[test]
    fn test_infer_name_fires_on_empty_string() {
        let doc = doc_with(&[("name", json!(""))]);
        let outcome = infer_name(&doc).unwrap();
        assert_eq!(outcome.metadata["name"], "rule-test");
    }

    #[test]
    fn test_bucket_extra_merges_existing_bucket() {
        let doc = doc_with(&[
            ("extra", json!({"earlier": 1})),
            ("author", json!("someone")),
        ]);
        let outcome = bucket_extra(&doc).unwrap();
        assert_eq!(outcome.metadata["extra"]["earlier"], 1);
        assert_eq!(outcome.metadata["extra"]["author"], "someone");
    }

    #[test]
    fn test_each_rule_is_idempotent() {
        let doc = doc_with(&[
            ("Title", json!("x")),
            ("desc", json!("y")),
            ("meta", json!({"licence": "MIT"})),
            ("stray", json!("z")),
        ]);

        for rule in crate::normalize::rules::REWRITE_RULES {
            if let Some(outcome) = (rule.apply)(&doc) {
                let rewritten = SkillDocument {
                    metadata: outcome.metadata,
                    ..doc.clone()
                };
                assert!(
                    (rule.apply)(&rewritten).is_none(),
                    "rule '{}' fired on its own output",
                    rule.name
                );
            }
        }
    }
}
