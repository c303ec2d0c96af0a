//! Content-based classification through a language model (tier 2).
//!
//! Invoked only for fields still missing after the path tier, and only
//! when the orchestrator judges path confidence insufficient. The model is
//! asked for a single JSON object over the open taxonomy fields; anything
//! that goes wrong (transport failure, timeout, unparseable response)
//! degrades the outcome instead of propagating, because a malformed model
//! response must never abort ingestion.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use gallus_core::{defaults, Category, GenerationBackend, PartialMetadata};

/// Why an LLM classification degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The response did not contain a parseable JSON object.
    ParseFailure,
    /// The provider call failed.
    Transport,
    /// The hard timeout elapsed.
    Timeout,
}

impl std::fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegradeReason::ParseFailure => write!(f, "parse_failure"),
            DegradeReason::Transport => write!(f, "transport"),
            DegradeReason::Timeout => write!(f, "timeout"),
        }
    }
}

/// Tagged outcome of an LLM classification attempt.
///
/// Callers pattern-match on the variant; there is no partially-trusted
/// in-between state.
#[derive(Debug, Clone)]
pub enum LlmOutcome {
    /// The model answered with a parseable field object.
    Parsed { fields: PartialMetadata },
    /// The attempt degraded; no fields were produced.
    Degraded { reason: DegradeReason },
}

impl LlmOutcome {
    /// Static trust level of this outcome's tier.
    pub fn confidence(&self) -> f32 {
        match self {
            LlmOutcome::Parsed { .. } => defaults::LLM_TIER_CONFIDENCE,
            LlmOutcome::Degraded { .. } => defaults::LLM_DEGRADED_CONFIDENCE,
        }
    }
}

/// Configuration for the LLM classification tier.
#[derive(Debug, Clone)]
pub struct LlmClassifierConfig {
    /// Maximum characters of content embedded in the prompt.
    pub excerpt_char_budget: usize,
    /// Hard timeout for one generation call.
    pub timeout: Duration,
}

impl Default for LlmClassifierConfig {
    fn default() -> Self {
        Self {
            excerpt_char_budget: defaults::EXCERPT_CHAR_BUDGET,
            timeout: Duration::from_secs(defaults::GEN_TIMEOUT_SECS),
        }
    }
}

/// LLM classifier over an interchangeable generation backend.
#[derive(Clone)]
pub struct LlmClassifier {
    backend: Arc<dyn GenerationBackend>,
    config: LlmClassifierConfig,
    /// Bounded-concurrency gate shared across workers, sized to the
    /// provider's concurrent-request budget.
    gate: Option<Arc<Semaphore>>,
}

impl LlmClassifier {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            config: LlmClassifierConfig::default(),
            gate: None,
        }
    }

    pub fn with_config(mut self, config: LlmClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Gate generation calls through a shared semaphore. Only the network
    /// call waits on a permit; the path and default tiers never block.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Classify document content into the fields path rules cannot see.
    ///
    /// `known_fields` are embedded in the prompt so the model does not
    /// re-derive what is already certain; the caller's merge discards any
    /// field the model returns for an already-resolved slot.
    pub async fn classify_content(
        &self,
        title: &str,
        content_excerpt: &str,
        known_fields: &PartialMetadata,
    ) -> LlmOutcome {
        let prompt = build_prompt(
            title,
            content_excerpt,
            known_fields,
            self.config.excerpt_char_budget,
        );

        // Permit held for the duration of the generation call only.
        let _permit = match &self.gate {
            Some(gate) => match gate.clone().acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    warn!("LLM concurrency gate closed; degrading");
                    return LlmOutcome::Degraded {
                        reason: DegradeReason::Transport,
                    };
                }
            },
            None => None,
        };

        let response =
            match tokio::time::timeout(self.config.timeout, self.backend.generate(&prompt)).await {
                Err(_) => {
                    warn!(
                        model = self.backend.model_name(),
                        timeout_secs = self.config.timeout.as_secs(),
                        "LLM classification timed out"
                    );
                    return LlmOutcome::Degraded {
                        reason: DegradeReason::Timeout,
                    };
                }
                Ok(Err(e)) => {
                    warn!(
                        model = self.backend.model_name(),
                        error = %e,
                        "LLM classification transport failure"
                    );
                    return LlmOutcome::Degraded {
                        reason: DegradeReason::Transport,
                    };
                }
                Ok(Ok(text)) => text,
            };

        match parse_response(&response) {
            Some(fields) => {
                debug!(
                    model = self.backend.model_name(),
                    field_count = fields.field_count(),
                    "LLM classification parsed"
                );
                LlmOutcome::Parsed { fields }
            }
            None => {
                warn!(
                    model = self.backend.model_name(),
                    response_len = response.len(),
                    "LLM response was not a parseable field object"
                );
                LlmOutcome::Degraded {
                    reason: DegradeReason::ParseFailure,
                }
            }
        }
    }
}

/// Build the classification prompt.
pub fn build_prompt(
    title: &str,
    content_excerpt: &str,
    known_fields: &PartialMetadata,
    excerpt_char_budget: usize,
) -> String {
    let excerpt = truncate_chars(content_excerpt, excerpt_char_budget);
    let known = serde_json::to_string(known_fields).unwrap_or_else(|_| "{}".to_string());
    let categories = Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a metadata classifier for a poultry-production knowledge base.

Document title:
{title}

Document content (excerpt):
{excerpt}

Already-known fields (use as context, do not re-derive):
{known}

Classify the document. Respond with a single JSON object and nothing else.
Use exactly these keys, omitting any key the content gives no signal for:
- "production_stage": array of strings (e.g. ["rearing", "laying"])
- "site_type": array of strings (e.g. ["broiler_farm", "hatchery"])
- "category": one of: {categories}
- "subcategory": string, free-form within the category
- "topic": string, specific subject of the document
- "attributes": object of structured parameters specific to the topic
- "technical_tags": array of short lowercase tags
- "geo_region": array of strings (e.g. ["europe"])
- "document_purpose": string (e.g. "reference_guide", "troubleshooting")"#
    )
}

/// Truncate to a character budget without splitting a code point.
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Parse a model response into partial metadata.
///
/// Tolerates markdown fences and surrounding prose by extracting the
/// outermost JSON object. Returns `None` when no such object exists or it
/// does not deserialize.
fn parse_response(response: &str) -> Option<PartialMetadata> {
    let json_text = extract_json_object(response)?;
    let value: JsonValue = serde_json::from_str(json_text).ok()?;
    let object = value.as_object()?;

    let mut fields = PartialMetadata::new();
    fields.production_stage = string_set(object.get("production_stage"));
    fields.site_type = string_set(object.get("site_type"));
    fields.subcategory = opt_string(object.get("subcategory"));
    fields.topic = opt_string(object.get("topic"));
    fields.technical_tags = string_set(object.get("technical_tags"));
    fields.geo_region = string_set(object.get("geo_region"));
    fields.document_purpose = opt_string(object.get("document_purpose"));

    if let Some(attrs) = object.get("attributes").and_then(JsonValue::as_object) {
        fields.attributes = attrs.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    }

    // The model's category is held to the closed set, but leniently: an
    // unknown value is dropped, not fatal; fatality is reserved for the
    // finished record.
    if let Some(raw) = opt_string(object.get("category")) {
        match Category::parse(&raw) {
            Ok(category) => fields.category = Some(category.as_str().to_string()),
            Err(_) => warn!(category = raw.as_str(), "Dropping unknown category from model"),
        }
    }

    Some(fields)
}

/// Extract the outermost `{...}` span, stripping markdown fences first.
fn extract_json_object(response: &str) -> Option<&str> {
    let stripped = response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    (end > start).then(|| &stripped[start..=end])
}

/// A trimmed, non-empty string value.
fn opt_string(value: Option<&JsonValue>) -> Option<String> {
    value
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Lenient set extraction: accepts an array of strings or a bare string.
fn string_set(value: Option<&JsonValue>) -> BTreeSet<String> {
    match value {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => {
            BTreeSet::from([s.trim().to_string()])
        }
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => BTreeSet::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use async_trait::async_trait;
    use gallus_core::{Error, Result};

    const GOOD_RESPONSE: &str = r#"{
        "production_stage": ["rearing"],
        "site_type": "broiler_farm",
        "category": "animal_health",
        "subcategory": "Vaccination",
        "topic": "Gumboro vaccination schedule",
        "attributes": {"vaccine": "IBD", "age_days": 14},
        "technical_tags": ["vaccination", "ibd"],
        "geo_region": ["europe"],
        "document_purpose": "reference_guide"
    }"#;

    fn classifier(backend: MockBackend) -> LlmClassifier {
        LlmClassifier::new(Arc::new(backend))
    }

    #[test]
    fn prompt_embeds_title_excerpt_and_known_fields() {
        let mut known = PartialMetadata::new();
        known.species.insert("broiler".to_string());
        let prompt = build_prompt("Vaccination guide", "Day 14 Gumboro...", &known, 100);
        assert!(prompt.contains("Vaccination guide"));
        assert!(prompt.contains("Day 14 Gumboro..."));
        assert!(prompt.contains("\"species\":[\"broiler\"]"));
        assert!(prompt.contains("Animal_Health"));
    }

    #[test]
    fn prompt_truncates_excerpt_on_char_boundary() {
        let excerpt = "é".repeat(50);
        let prompt = build_prompt("t", &excerpt, &PartialMetadata::new(), 10);
        assert!(prompt.contains(&"é".repeat(10)));
        assert!(!prompt.contains(&"é".repeat(11)));
    }

    #[test]
    fn parse_accepts_clean_json() {
        let fields = parse_response(GOOD_RESPONSE).unwrap();
        assert!(fields.production_stage.contains("rearing"));
        assert!(fields.site_type.contains("broiler_farm"));
        assert_eq!(fields.category.as_deref(), Some("Animal_Health"));
        assert_eq!(fields.subcategory.as_deref(), Some("Vaccination"));
        assert_eq!(fields.attributes.get("age_days"), Some(&serde_json::json!(14)));
        assert!(fields.technical_tags.contains("ibd"));
    }

    #[test]
    fn parse_accepts_fenced_json_with_prose() {
        let wrapped = format!("Here is the classification:\n```json\n{}\n```", GOOD_RESPONSE);
        let fields = parse_response(&wrapped).unwrap();
        assert_eq!(fields.topic.as_deref(), Some("Gumboro vaccination schedule"));
    }

    #[test]
    fn parse_drops_unknown_category_but_keeps_rest() {
        let fields =
            parse_response(r#"{"category": "Astrology", "topic": "star signs for hens"}"#).unwrap();
        assert!(fields.category.is_none());
        assert_eq!(fields.topic.as_deref(), Some("star signs for hens"));
    }

    #[test]
    fn parse_rejects_non_object_responses() {
        assert!(parse_response("I cannot classify this document.").is_none());
        assert!(parse_response("[1, 2, 3]").is_none());
        assert!(parse_response("{broken json").is_none());
        assert!(parse_response("").is_none());
    }

    #[tokio::test]
    async fn classify_content_parses_mock_response() {
        let llm = classifier(MockBackend::new().with_response(GOOD_RESPONSE));
        let outcome = llm
            .classify_content("Vaccination guide", "Day 14...", &PartialMetadata::new())
            .await;
        match outcome {
            LlmOutcome::Parsed { fields } => {
                assert_eq!(fields.category.as_deref(), Some("Animal_Health"));
            }
            LlmOutcome::Degraded { reason } => panic!("Unexpected degrade: {}", reason),
        }
    }

    #[tokio::test]
    async fn garbage_response_degrades_to_parse_failure() {
        let llm = classifier(MockBackend::new().with_response("no json here"));
        let outcome = llm
            .classify_content("t", "c", &PartialMetadata::new())
            .await;
        assert!(matches!(
            outcome,
            LlmOutcome::Degraded {
                reason: DegradeReason::ParseFailure
            }
        ));
        assert_eq!(outcome.confidence(), defaults::LLM_DEGRADED_CONFIDENCE);
    }

    #[tokio::test]
    async fn transport_failure_degrades() {
        let llm = classifier(MockBackend::new().failing("connection refused"));
        let outcome = llm
            .classify_content("t", "c", &PartialMetadata::new())
            .await;
        assert!(matches!(
            outcome,
            LlmOutcome::Degraded {
                reason: DegradeReason::Transport
            }
        ));
    }

    struct StalledBackend;

    #[async_trait]
    impl GenerationBackend for StalledBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(Error::Inference("unreachable".to_string()))
        }

        fn model_name(&self) -> &str {
            "stalled"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_degrades_to_timeout() {
        let llm = LlmClassifier::new(Arc::new(StalledBackend)).with_config(LlmClassifierConfig {
            timeout: Duration::from_secs(5),
            ..Default::default()
        });
        let outcome = llm
            .classify_content("t", "c", &PartialMetadata::new())
            .await;
        assert!(matches!(
            outcome,
            LlmOutcome::Degraded {
                reason: DegradeReason::Timeout
            }
        ));
    }

    #[tokio::test]
    async fn gated_calls_complete_under_a_single_permit() {
        let gate = Arc::new(Semaphore::new(1));
        let llm = classifier(MockBackend::new().with_response(GOOD_RESPONSE)).with_gate(gate);
        let meta_a = PartialMetadata::new();
        let meta_b = PartialMetadata::new();
        let (a, b) = tokio::join!(
            llm.classify_content("a", "x", &meta_a),
            llm.classify_content("b", "y", &meta_b),
        );
        assert!(matches!(a, LlmOutcome::Parsed { .. }));
        assert!(matches!(b, LlmOutcome::Parsed { .. }));
    }

    #[test]
    fn parsed_outcome_reports_llm_confidence() {
        let outcome = LlmOutcome::Parsed {
            fields: PartialMetadata::new(),
        };
        assert_eq!(outcome.confidence(), defaults::LLM_TIER_CONFIDENCE);
    }
}
