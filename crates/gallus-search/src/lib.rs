//! # gallus-search
//!
//! Query-time access filtering for the gallus knowledge base.
//!
//! This crate turns a caller's organizational identity and taxonomy
//! constraints into the boolean predicate that scopes every retrieval
//! query against the vector store. It is pure and synchronous: no I/O,
//! no shared state, callable on the hot query path.
//!
//! # Example
//!
//! ```
//! use gallus_search::{build_filter, CallerIdentity, TaxonomyConstraints};
//! use gallus_core::Category;
//!
//! let caller = CallerIdentity::org("AcmeFarms").with_site("North");
//! let constraints = TaxonomyConstraints::new()
//!     .with_category(Category::AnimalHealth)
//!     .with_species("broiler");
//!
//! let predicate = build_filter(Some(&caller), &constraints);
//! let weaviate_filter = gallus_search::to_where_filter(&predicate);
//! assert_eq!(weaviate_filter["operator"], "And");
//! ```

pub mod access;
pub mod constraints;
pub mod weaviate;

pub use access::{build_filter, CallerIdentity};
pub use constraints::TaxonomyConstraints;
pub use weaviate::to_where_filter;
