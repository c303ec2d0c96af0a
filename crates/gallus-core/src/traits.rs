//! Core traits for gallus abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;

use crate::error::Result;
use crate::metadata::MetadataRecord;

// =============================================================================
// GENERATION BACKEND
// =============================================================================

/// Backend for text generation (LLM).
///
/// The LLM classification tier treats the language model as an
/// interchangeable capability: any provider implementing "prompt in → text
/// out" satisfies it. Provider-specific retry/backoff lives behind this
/// trait, not in front of it.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

// =============================================================================
// METADATA SINK
// =============================================================================

/// Write seam to the vector store.
///
/// One metadata record is attached to each content chunk at upsert time.
/// Implementations must write a record atomically or not at all; a
/// partially-persisted record is never observable.
#[async_trait]
pub trait MetadataSink: Send + Sync {
    /// Persist a record together with its chunk text.
    async fn upsert(&self, record: &MetadataRecord, chunk_text: &str) -> Result<()>;
}
