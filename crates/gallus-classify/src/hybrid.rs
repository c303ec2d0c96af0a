//! Hybrid classification orchestrator.
//!
//! Sequences the three tiers (deterministic path rules, LLM content
//! inference, smart defaults), merges their output field-by-field with
//! strict precedence (an earlier tier is never overwritten by a later
//! one), and finalizes an invariant-checked, immutable metadata record.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use gallus_core::{
    defaults, ClassificationMethod, MetadataRecord, PartialMetadata, Result, VisibilityLevel,
};

use crate::llm::{LlmClassifier, LlmOutcome};
use crate::path::PathClassifier;
use crate::rules::RuleTable;
use crate::smart_defaults::SmartDefaults;

/// Orchestrates path → LLM → default classification for one document
/// chunk at a time.
///
/// Holds no mutable state; a single instance is safely shared across a
/// worker pool. The LLM tier is optional; without it, unmatched paths
/// fall through to defaults.
#[derive(Clone)]
pub struct HybridClassifier {
    path: PathClassifier,
    llm: Option<LlmClassifier>,
}

impl HybridClassifier {
    /// Classifier over a rule table, with the LLM tier disabled.
    pub fn new(table: Arc<RuleTable>) -> Self {
        Self {
            path: PathClassifier::new(table),
            llm: None,
        }
    }

    /// Enable the LLM tier.
    pub fn with_llm(mut self, llm: LlmClassifier) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Whether the LLM tier is configured.
    pub fn llm_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Classify one content chunk into a fully-populated metadata record.
    ///
    /// Never fails for lack of signal: a path matching zero rules with
    /// the LLM tier disabled or failing still produces a valid record from
    /// defaults alone. The only error is an invariant violation in the
    /// finished record, which indicates a rule-table bug and quarantines
    /// the document.
    pub async fn classify_document(
        &self,
        file_path: &str,
        title: &str,
        content_excerpt: &str,
    ) -> Result<MetadataRecord> {
        self.classify_versioned(file_path, title, content_excerpt, None)
            .await
    }

    /// Re-classify a chunk that already has a persisted record.
    ///
    /// Produces a new record version for the same chunk; the previous
    /// record is never mutated. Retiring superseded versions from the
    /// vector store is the sink's concern.
    pub async fn reclassify(
        &self,
        previous: &MetadataRecord,
        title: &str,
        content_excerpt: &str,
    ) -> Result<MetadataRecord> {
        self.classify_versioned(
            &previous.source_file,
            title,
            content_excerpt,
            Some((previous.chunk_id, previous.next_version())),
        )
        .await
    }

    async fn classify_versioned(
        &self,
        file_path: &str,
        title: &str,
        content_excerpt: &str,
        identity: Option<(Uuid, u32)>,
    ) -> Result<MetadataRecord> {
        let start = Instant::now();

        // Tier 1: deterministic path rules.
        let mut fields = self.path.classify_path(file_path);
        let path_field_count = fields.field_count();
        let security_by_path = security_resolved(&fields);
        let path_confidence = if security_by_path {
            defaults::PATH_TIER_CONFIDENCE
        } else {
            defaults::PATH_SECURITY_UNRESOLVED_CONFIDENCE
        };

        // Tier 2: LLM content inference, only when path confidence is
        // insufficient. Path-derived fields are never overwritten;
        // deterministic rules outrank inference.
        let mut llm_field_count = 0usize;
        if path_confidence < defaults::LLM_TRIGGER_THRESHOLD {
            if let Some(llm) = &self.llm {
                match llm.classify_content(title, content_excerpt, &fields).await {
                    LlmOutcome::Parsed { fields: inferred } => {
                        let before = fields.field_count();
                        fields.merge_missing(&inferred);
                        llm_field_count = fields.field_count() - before;
                    }
                    LlmOutcome::Degraded { reason } => {
                        warn!(
                            source_file = file_path,
                            reason = %reason,
                            "LLM tier degraded; continuing with defaults"
                        );
                    }
                }
            } else {
                debug!(
                    source_file = file_path,
                    "Path confidence insufficient and no LLM tier configured"
                );
            }
        }

        // Tier 3: conservative defaults for whatever is still absent.
        let defaulted = SmartDefaults::apply(&mut fields);

        let (method, confidence) =
            resolve_method(path_field_count, security_by_path, llm_field_count);

        let (chunk_id, version) =
            identity.unwrap_or_else(|| (derive_chunk_id(file_path, content_excerpt), 1));

        let record =
            MetadataRecord::from_partial(fields, method, confidence, file_path, chunk_id, version)?;

        info!(
            source_file = file_path,
            method = %record.classification_method,
            confidence = record.classification_confidence,
            path_fields = path_field_count,
            llm_fields = llm_field_count,
            defaulted_fields = defaulted.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Document classified"
        );
        Ok(record)
    }
}

/// Whether the path tier resolved the security pair: visibility present
/// and, unless public, an owner to attach it to.
fn security_resolved(fields: &PartialMetadata) -> bool {
    match fields.visibility_level {
        Some(VisibilityLevel::PublicGlobal) => true,
        Some(_) => fields.owner_org_id.is_some(),
        None => false,
    }
}

/// Method and record-level confidence from tier contributions.
///
/// Ambient default fill-ins do not demote a path-resolved record: a record
/// whose security fields came from rules stays `path_based` even when
/// defaults supplied language or geo scope.
fn resolve_method(
    path_field_count: usize,
    security_by_path: bool,
    llm_field_count: usize,
) -> (ClassificationMethod, f32) {
    if llm_field_count > 0 {
        let method = if path_field_count == 0 {
            ClassificationMethod::LlmBased
        } else {
            ClassificationMethod::Hybrid
        };
        (method, defaults::LLM_TIER_CONFIDENCE)
    } else if path_field_count > 0 && security_by_path {
        (
            ClassificationMethod::PathBased,
            defaults::PATH_TIER_CONFIDENCE,
        )
    } else {
        (
            ClassificationMethod::Default,
            defaults::DEFAULT_TIER_CONFIDENCE,
        )
    }
}

/// Deterministic chunk identity from the classification input, so an
/// unchanged input re-classifies to a bit-identical record.
fn derive_chunk_id(file_path: &str, content_excerpt: &str) -> Uuid {
    let mut name = Vec::with_capacity(file_path.len() + content_excerpt.len() + 1);
    name.extend_from_slice(file_path.as_bytes());
    name.push(0);
    name.extend_from_slice(content_excerpt.as_bytes());
    Uuid::new_v5(&Uuid::NAMESPACE_URL, &name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmClassifier;
    use crate::mock::MockBackend;
    use gallus_core::Error;

    fn table() -> Arc<RuleTable> {
        Arc::new(
            RuleTable::from_yaml_str(
                r#"
version: 1
rules:
  - pattern: /public/
    set:
      visibility_level: public_global
  - pattern: /broiler/
    set:
      species: [broiler]
  - pattern: /health/
    set:
      category: Animal_Health
  - pattern: performancemetrics
    set:
      source_type: performance_data
  - pattern: /shared-drive/
    set:
      visibility_level: org_shared
"#,
            )
            .unwrap(),
        )
    }

    fn llm_with(response: &str) -> LlmClassifier {
        LlmClassifier::new(Arc::new(MockBackend::new().with_response(response)))
    }

    #[tokio::test]
    async fn public_path_classifies_without_llm() {
        // Scenario: fully path-resolved public document.
        let backend = MockBackend::new().with_response(r#"{"category": "Genetics"}"#);
        let classifier = HybridClassifier::new(table())
            .with_llm(LlmClassifier::new(Arc::new(backend.clone())));

        let record = classifier
            .classify_document(
                "/public/species/broiler/health/vaccination/guide.pdf",
                "Vaccination guide",
                "Gumboro schedule...",
            )
            .await
            .unwrap();

        assert_eq!(record.visibility_level, VisibilityLevel::PublicGlobal);
        assert!(record.species.contains("broiler"));
        assert_eq!(record.category.map(|c| c.as_str()), Some("Animal_Health"));
        assert_eq!(record.classification_method, ClassificationMethod::PathBased);
        assert!(record.classification_confidence >= 0.8);
        // Path confidence was sufficient, so the LLM was never consulted.
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn tenant_path_stays_path_based_despite_default_fill_ins() {
        let classifier = HybridClassifier::new(table());
        let record = classifier
            .classify_document(
                "/tenant_AcmeFarms/PerformanceMetrics/Broiler/Ross/q3.json",
                "Q3 performance",
                "",
            )
            .await
            .unwrap();

        assert_eq!(record.owner_org_id.as_deref(), Some("AcmeFarms"));
        assert_eq!(record.visibility_level, VisibilityLevel::OrgShared);
        assert_eq!(record.source_type.as_deref(), Some("performance_data"));
        assert_eq!(record.genetic_line.as_deref(), Some("Ross"));
        assert_eq!(record.classification_method, ClassificationMethod::PathBased);
        assert_eq!(record.classification_confidence, 1.0);
        // Ambient defaults still applied without demoting the method.
        assert_eq!(record.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn site_scoped_path_produces_org_internal_record() {
        let classifier = HybridClassifier::new(table());
        let record = classifier
            .classify_document("/tenant_AcmeFarms/site_North/internal_report.pdf", "Report", "")
            .await
            .unwrap();

        assert_eq!(record.visibility_level, VisibilityLevel::OrgInternal);
        assert_eq!(
            record.allowed_org_ids.iter().collect::<Vec<_>>(),
            vec!["AcmeFarms_North"]
        );
    }

    #[tokio::test]
    async fn ambiguous_path_with_failing_llm_falls_back_to_defaults() {
        // Scenario: LLM parse failure on an unmatched path.
        let classifier =
            HybridClassifier::new(table()).with_llm(llm_with("sorry, no JSON today"));
        let record = classifier
            .classify_document("/uploads/misc_doc.pdf", "Misc", "who knows")
            .await
            .unwrap();

        assert_eq!(record.classification_method, ClassificationMethod::Default);
        assert_eq!(record.classification_confidence, 0.5);
        assert_eq!(record.visibility_level, VisibilityLevel::PublicGlobal);
        assert!(record.geo_region.contains("global"));
        assert!(record.production_stage.contains("all_stages"));
    }

    #[tokio::test]
    async fn unmatched_path_without_llm_defaults_cleanly() {
        let classifier = HybridClassifier::new(table());
        let record = classifier
            .classify_document("/uploads/misc_doc.pdf", "Misc", "")
            .await
            .unwrap();
        assert_eq!(record.classification_method, ClassificationMethod::Default);
        assert_eq!(record.classification_confidence, 0.5);
    }

    #[tokio::test]
    async fn llm_contribution_produces_hybrid_method() {
        let classifier = HybridClassifier::new(table()).with_llm(llm_with(
            r#"{"category": "Nutrition", "topic": "feed conversion", "production_stage": ["rearing"]}"#,
        ));
        // Path resolves species but not security, so the LLM runs.
        let record = classifier
            .classify_document("/drafts/broiler/feed_notes.md", "Feed notes", "FCR...")
            .await
            .unwrap();

        assert!(record.species.contains("broiler"));
        assert_eq!(record.topic.as_deref(), Some("feed conversion"));
        assert_eq!(record.classification_method, ClassificationMethod::Hybrid);
        assert_eq!(record.classification_confidence, 0.85);
    }

    #[tokio::test]
    async fn llm_only_contribution_produces_llm_based_method() {
        let classifier = HybridClassifier::new(table())
            .with_llm(llm_with(r#"{"topic": "ventilation", "category": "Environment"}"#));
        let record = classifier
            .classify_document("/inbox/doc42.pdf", "Ventilation", "air flow")
            .await
            .unwrap();
        assert_eq!(record.classification_method, ClassificationMethod::LlmBased);
        assert_eq!(record.classification_confidence, 0.85);
    }

    #[tokio::test]
    async fn path_fields_outrank_llm_response() {
        // The mock insists on a different category and species; the
        // path-derived values must survive untouched.
        let classifier = HybridClassifier::new(table()).with_llm(llm_with(
            r#"{"category": "Genetics", "topic": "breeding", "site_type": ["lab"]}"#,
        ));
        let record = classifier
            .classify_document("/archive/broiler/health/notes.md", "Notes", "...")
            .await
            .unwrap();

        // category came from the /health/ rule, not the model.
        assert_eq!(record.category.map(|c| c.as_str()), Some("Animal_Health"));
        assert!(record.species.contains("broiler"));
        // Fields the path left open were taken from the model.
        assert_eq!(record.topic.as_deref(), Some("breeding"));
        assert!(record.site_type.contains("lab"));
    }

    #[tokio::test]
    async fn classification_is_idempotent() {
        let classifier = HybridClassifier::new(table()).with_llm(llm_with(
            r#"{"topic": "water quality", "category": "Environment"}"#,
        ));
        let first = classifier
            .classify_document("/drafts/broiler/water.md", "Water", "ppm...")
            .await
            .unwrap();
        let second = classifier
            .classify_document("/drafts/broiler/water.md", "Water", "ppm...")
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn rule_induced_invariant_violation_is_fatal_for_the_chunk() {
        // org_shared from a rule with no tenant segment to supply an owner.
        let classifier = HybridClassifier::new(table());
        let err = classifier
            .classify_document("/shared-drive/doc.pdf", "Doc", "")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Invariant(_)));
    }

    #[tokio::test]
    async fn reclassification_increments_version_and_keeps_chunk_id() {
        let classifier = HybridClassifier::new(table());
        let original = classifier
            .classify_document("/public/broiler/guide.pdf", "Guide", "v1 text")
            .await
            .unwrap();
        let revised = classifier
            .reclassify(&original, "Guide", "v1 text")
            .await
            .unwrap();

        assert_eq!(revised.chunk_id, original.chunk_id);
        assert_eq!(revised.record_version, 2);
        assert_eq!(original.record_version, 1);
    }

    #[tokio::test]
    async fn distinct_excerpts_get_distinct_chunk_ids() {
        let classifier = HybridClassifier::new(table());
        let a = classifier
            .classify_document("/public/guide.pdf", "Guide", "chunk one")
            .await
            .unwrap();
        let b = classifier
            .classify_document("/public/guide.pdf", "Guide", "chunk two")
            .await
            .unwrap();
        assert_ne!(a.chunk_id, b.chunk_id);
    }

    #[test]
    fn confidence_is_monotone_across_methods() {
        let (_, path) = resolve_method(3, true, 0);
        let (_, hybrid) = resolve_method(3, false, 2);
        let (_, fallback) = resolve_method(0, false, 0);
        assert!(path > hybrid);
        assert!(hybrid > fallback);
    }
}
