//! Centralized default constants for the gallus system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates reference these constants instead of defining their
//! own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// CLASSIFICATION CONFIDENCE
// =============================================================================

/// Confidence carried by every field the path tier resolves.
/// Path rules are deterministic, so individual fields are fully trusted.
pub const PATH_TIER_CONFIDENCE: f32 = 1.0;

/// Aggregate path-tier confidence when the security pair
/// (visibility + owner) was not resolved by rules. Security fields are the
/// highest-stakes fields, so an unresolved pair halves the aggregate.
pub const PATH_SECURITY_UNRESOLVED_CONFIDENCE: f32 = 0.5;

/// Static trust level for fields filled by the LLM tier.
pub const LLM_TIER_CONFIDENCE: f32 = 0.85;

/// Confidence reported by the LLM tier when its response could not be
/// parsed or the provider failed.
pub const LLM_DEGRADED_CONFIDENCE: f32 = 0.3;

/// Record-level confidence when the default tier carried the record.
pub const DEFAULT_TIER_CONFIDENCE: f32 = 0.5;

/// Path-tier aggregate confidence below which the LLM tier is invoked.
pub const LLM_TRIGGER_THRESHOLD: f32 = 0.8;

// =============================================================================
// LLM CLASSIFIER
// =============================================================================

/// Maximum characters of document content embedded in the classification
/// prompt. Bounds per-document inference cost.
pub const EXCERPT_CHAR_BUDGET: usize = 4_000;

/// Hard timeout for a single generation request (seconds). On expiry the
/// document continues through the default tier.
pub const GEN_TIMEOUT_SECS: u64 = 60;

/// Maximum concurrent in-flight generation requests across a batch,
/// sized to a typical provider rate limit.
pub const LLM_CONCURRENCY: usize = 4;

// =============================================================================
// INGESTION
// =============================================================================

/// Documents classified concurrently by a batch worker. Classification is
/// CPU-light; the LLM gate, not this, bounds provider load.
pub const INGEST_WORKERS: usize = 8;

// =============================================================================
// INFERENCE BACKEND
// =============================================================================

/// Default Ollama endpoint.
pub const OLLAMA_URL: &str = "http://localhost:11434";

/// Default generation model for content classification.
pub const GEN_MODEL: &str = "qwen3:8b";

/// Environment variable overriding the Ollama endpoint.
pub const ENV_OLLAMA_URL: &str = "GALLUS_OLLAMA_URL";

/// Environment variable overriding the generation model.
pub const ENV_GEN_MODEL: &str = "GALLUS_GEN_MODEL";

/// Environment variable overriding the generation timeout (seconds).
pub const ENV_GEN_TIMEOUT_SECS: &str = "GALLUS_GEN_TIMEOUT_SECS";

// =============================================================================
// PATH CLASSIFIER
// =============================================================================

/// Path segment prefix that identifies a tenant organization.
pub const TENANT_SEGMENT_PREFIX: &str = "tenant_";

/// Path segment prefix that identifies a site subdivision within a tenant.
pub const SITE_SEGMENT_PREFIX: &str = "site_";

/// Built-in known genetic lines, matched as whole path segments.
/// Open vocabulary: rule tables extend this list, and unrecognized values
/// reaching the field through other tiers are accepted verbatim.
pub const GENETIC_LINES: &[&str] = &[
    "ross", "cobb", "hubbard", "arbor_acres", "lohmann", "hyline", "isa", "bovans", "sasso",
];

// =============================================================================
// SMART-DEFAULT FIELD VALUES
// =============================================================================

/// Default visibility for content with no explicit tenant signal.
/// Over-restriction (content invisible to everyone) is a worse failure mode
/// here than over-exposure of non-secret technical content; genuinely
/// private content is always reachable via an explicit tenant path segment,
/// which the path tier resolves with full confidence before defaults apply.
pub const DEFAULT_VISIBILITY: &str = "public_global";

/// Default geographic scope.
pub const DEFAULT_GEO_REGION: &str = "global";

/// Default production stage coverage.
pub const DEFAULT_PRODUCTION_STAGE: &str = "all_stages";

/// Default site-type coverage.
pub const DEFAULT_SITE_TYPE: &str = "all_sites";

/// Default source type.
pub const DEFAULT_SOURCE_TYPE: &str = "technical_guide";

/// Default document purpose.
pub const DEFAULT_DOCUMENT_PURPOSE: &str = "reference_guide";

/// Default content language (ISO 639-1).
pub const DEFAULT_LANGUAGE: &str = "en";

/// Default climate-zone coverage.
pub const DEFAULT_CLIMATE_ZONE: &str = "multiple_zones";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_constants_are_ordered() {
        assert!(PATH_TIER_CONFIDENCE > LLM_TIER_CONFIDENCE);
        assert!(LLM_TIER_CONFIDENCE > DEFAULT_TIER_CONFIDENCE);
        assert!(DEFAULT_TIER_CONFIDENCE > LLM_DEGRADED_CONFIDENCE);
        assert!(LLM_TRIGGER_THRESHOLD < PATH_TIER_CONFIDENCE);
        assert!(LLM_TRIGGER_THRESHOLD > PATH_SECURITY_UNRESOLVED_CONFIDENCE);
    }

    #[test]
    fn genetic_lines_are_lowercase() {
        for line in GENETIC_LINES {
            assert_eq!(*line, line.to_lowercase());
        }
    }
}
