//! Registry Access
//!
//! The external registry that stores and serves published skill
//! documents, reached through the narrow [`RegistryClient`] publish
//! interface.
//!
//! [`RegistryClient`]: crate::types::RegistryClient

pub mod client;

pub use client::RegistryHttpClient;
