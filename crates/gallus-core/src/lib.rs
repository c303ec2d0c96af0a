//! # gallus-core
//!
//! Core types, traits, and abstractions for the gallus knowledge base.
//!
//! This crate provides the foundational data structures and trait
//! definitions that other gallus crates depend on: the classification
//! metadata model, the closed subject-matter taxonomy, the abstract filter
//! predicate, the workspace error type, and the shared default constants.

pub mod defaults;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod predicate;
pub mod schema;
pub mod taxonomy;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use metadata::{ClassificationMethod, MetadataRecord, PartialMetadata, VisibilityLevel};
pub use predicate::Predicate;
pub use taxonomy::{title_case, Category};
pub use traits::{GenerationBackend, MetadataSink};
