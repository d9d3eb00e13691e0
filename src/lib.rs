//! Skillpub -- Skill Corpus Publish Pipeline
//!
//! Validates, normalizes, and batch-publishes a corpus of skill
//! documents (YAML-frontmatter metadata + markdown body) to an external
//! registry, isolating per-document failures so one bad document never
//! aborts a run.

pub mod types;
pub mod config;
pub mod category;
pub mod corpus;
pub mod normalize;
pub mod validate;
pub mod registry;
pub mod publish;
