//! Corpus Access
//!
//! Discovers skill documents on storage and splits each into a metadata
//! block and a body. Nothing here mutates storage; the fix mode in
//! `loader::write_document` is the single write path.

pub mod frontmatter;
pub mod loader;

pub use frontmatter::{split_document, ParseError};
pub use loader::{load_corpus, write_document, LoadedItem};
