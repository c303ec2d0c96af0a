//! # gallus-classify
//!
//! Tiered metadata classification for the gallus knowledge base.
//!
//! This crate provides:
//! - Per-tenant, versioned rule tables loaded from YAML
//! - Deterministic path-based classification (tier 1)
//! - LLM content classification over a pluggable backend (tier 2)
//! - Conservative smart defaults (tier 3)
//! - The hybrid orchestrator that merges the tiers into an immutable,
//!   invariant-checked metadata record
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gallus_classify::{HybridClassifier, LlmClassifier, OllamaBackend, RuleTable};
//!
//! #[tokio::main]
//! async fn main() -> gallus_core::Result<()> {
//!     let table = Arc::new(RuleTable::from_path("rules/acme.yaml".as_ref())?);
//!     let classifier = HybridClassifier::new(table)
//!         .with_llm(LlmClassifier::new(Arc::new(OllamaBackend::from_env())));
//!
//!     let record = classifier
//!         .classify_document("/public/broiler/health/guide.pdf", "Guide", "…")
//!         .await?;
//!     println!("{} ({})", record.classification_method, record.classification_confidence);
//!     Ok(())
//! }
//! ```

pub mod hybrid;
pub mod llm;
pub mod mock;
pub mod ollama;
pub mod path;
pub mod rules;
pub mod smart_defaults;

pub use hybrid::HybridClassifier;
pub use llm::{DegradeReason, LlmClassifier, LlmClassifierConfig, LlmOutcome};
pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use path::PathClassifier;
pub use rules::{ClassificationRule, RuleTable};
pub use smart_defaults::SmartDefaults;
