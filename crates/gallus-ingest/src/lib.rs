//! # gallus-ingest
//!
//! Batch classification and vector-store handoff for the gallus
//! knowledge base.
//!
//! This crate provides:
//! - Parallel batch classification with per-document failure isolation
//! - Quarantine reporting for documents that violate record invariants
//! - The in-memory [`MetadataSink`](gallus_core::MetadataSink) adapter
//!   used by tests and local tooling
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gallus_classify::{HybridClassifier, RuleTable};
//! use gallus_ingest::{BatchClassifier, DocumentInput, InMemorySink};
//!
//! #[tokio::main]
//! async fn main() -> gallus_core::Result<()> {
//!     gallus_ingest::init_tracing();
//!
//!     let table = Arc::new(RuleTable::from_path("rules/acme.yaml".as_ref())?);
//!     let batch = BatchClassifier::new(HybridClassifier::new(table));
//!
//!     let sink = Arc::new(InMemorySink::new());
//!     let report = batch
//!         .ingest_batch(
//!             vec![DocumentInput::new("/public/broiler/guide.pdf", "Guide", "…")],
//!             sink,
//!         )
//!         .await;
//!     println!("{} ok, {} quarantined", report.records.len(), report.quarantined.len());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod sink;

pub use batch::{
    BatchClassifier, BatchClassifierConfig, BatchReport, DocumentInput, QuarantinedDocument,
};
pub use sink::InMemorySink;

/// Initialize tracing with an env-filter subscriber.
///
/// Honors `RUST_LOG`; defaults to `info`. Safe to call more than once:
/// later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
