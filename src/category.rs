//! Category Map
//!
//! Static mapping from skill identifier (or declared category key) to a
//! category identifier. Built once at startup, read-only afterwards, and
//! passed explicitly to the validator and batch publisher. Lookup is exact
//! match only: no fuzzy matching, no case folding, no silent defaults. A
//! silently miscategorized skill is worse than a loud failure requiring
//! map maintenance.

use std::collections::HashMap;

/// The recognized category identifiers. Each maps to itself so a declared
/// `category` key resolves directly.
const CATEGORY_KEYS: [&str; 5] = ["workflow", "coding", "data", "writing", "ops"];

/// Builtin identifier-to-category assignments for the shipped corpus.
const BUILTIN_ASSIGNMENTS: [(&str, &str); 1] = [("project-migration", "workflow")];

/// Read-only category lookup table.
#[derive(Clone, Debug)]
pub struct CategoryMap {
    entries: HashMap<String, String>,
}

impl CategoryMap {
    /// Build the map from the builtin table.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        for key in CATEGORY_KEYS {
            entries.insert(key.to_string(), key.to_string());
        }
        for (identifier, category) in BUILTIN_ASSIGNMENTS {
            entries.insert(identifier.to_string(), category.to_string());
        }
        Self { entries }
    }

    /// Build the map from the builtin table plus config-supplied entries.
    /// Config entries win on key collision so deployments can re-map a
    /// shipped identifier without recompiling.
    pub fn with_entries(extra: &HashMap<String, String>) -> Self {
        let mut map = Self::builtin();
        for (key, category) in extra {
            map.entries.insert(key.clone(), category.clone());
        }
        map
    }

    /// Exact-match lookup of an identifier or declared category key.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_keys_resolve_to_themselves() {
        let map = CategoryMap::builtin();
        assert_eq!(map.resolve("workflow"), Some("workflow"));
        assert_eq!(map.resolve("coding"), Some("coding"));
    }

    #[test]
    fn test_builtin_identifier_resolves() {
        let map = CategoryMap::builtin();
        assert_eq!(map.resolve("project-migration"), Some("workflow"));
    }

    #[test]
    fn test_lookup_is_exact_match_only() {
        let map = CategoryMap::builtin();
        assert_eq!(map.resolve("Workflow"), None);
        assert_eq!(map.resolve("work"), None);
        assert_eq!(map.resolve("project-migration-v2"), None);
    }

    #[test]
    fn test_config_entries_extend_and_override() {
        let mut extra = HashMap::new();
        extra.insert("my-skill".to_string(), "coding".to_string());
        extra.insert("project-migration".to_string(), "ops".to_string());

        let map = CategoryMap::with_entries(&extra);
        assert_eq!(map.resolve("my-skill"), Some("coding"));
        assert_eq!(map.resolve("project-migration"), Some("ops"));
    }
}
