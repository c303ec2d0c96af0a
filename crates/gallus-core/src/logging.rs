//! Structured logging schema and field name constants for gallus.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized field names across
//! every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (rule matches, chunks) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "classify", "search", "ingest", "inference"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "path_classifier", "llm_classifier", "hybrid", "ollama", "batch"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "classify_document", "classify_content", "build_filter"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Source file path of the document being classified.
pub const SOURCE_FILE: &str = "source_file";

/// Chunk UUID being operated on.
pub const CHUNK_ID: &str = "chunk_id";

/// Tenant organization ID in scope.
pub const ORG_ID: &str = "org_id";

// ─── Classification fields ─────────────────────────────────────────────────

/// Classification method of a finished record.
pub const METHOD: &str = "method";

/// Aggregate classification confidence of a finished record.
pub const CONFIDENCE: &str = "confidence";

/// Number of fields a tier resolved.
pub const FIELD_COUNT: &str = "field_count";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of documents in a batch.
pub const BATCH_SIZE: &str = "batch_size";

/// Number of documents quarantined from a batch.
pub const QUARANTINED_COUNT: &str = "quarantined_count";
