//! Batch classification worker.
//!
//! Classifies independent documents in parallel (there is no
//! cross-document ordering requirement and no shared mutable state) with
//! per-document failure isolation: an invariant violation quarantines that
//! one document and the batch continues. The LLM tier's provider budget is
//! enforced inside the classifier by its semaphore gate; this worker only
//! bounds how many documents are in flight at once.
//!
//! If a batch future is dropped mid-run, in-flight classifications are
//! cancelled with it; the sink contract keeps persistence atomic per
//! record, so nothing partial is ever written.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};

use gallus_classify::HybridClassifier;
use gallus_core::{defaults, MetadataRecord, MetadataSink};

/// One document chunk handed over by the extraction layer.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    pub file_path: String,
    pub title: String,
    pub content_excerpt: String,
}

impl DocumentInput {
    pub fn new(
        file_path: impl Into<String>,
        title: impl Into<String>,
        content_excerpt: impl Into<String>,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            title: title.into(),
            content_excerpt: content_excerpt.into(),
        }
    }
}

/// A document excluded from ingestion, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct QuarantinedDocument {
    pub source_file: String,
    pub error: String,
}

/// Per-batch outcome report.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    /// Successfully classified (and, when a sink was involved, persisted)
    /// records, in input order.
    pub records: Vec<MetadataRecord>,
    /// Documents excluded from ingestion, in input order.
    pub quarantined: Vec<QuarantinedDocument>,
    pub completed_at: DateTime<Utc>,
}

impl BatchReport {
    /// Total number of documents the batch covered.
    pub fn total(&self) -> usize {
        self.records.len() + self.quarantined.len()
    }
}

/// Configuration for batch classification.
#[derive(Debug, Clone)]
pub struct BatchClassifierConfig {
    /// Documents classified concurrently.
    pub worker_concurrency: usize,
}

impl Default for BatchClassifierConfig {
    fn default() -> Self {
        Self {
            worker_concurrency: defaults::INGEST_WORKERS,
        }
    }
}

/// Parallel batch front-end over a [`HybridClassifier`].
#[derive(Clone)]
pub struct BatchClassifier {
    classifier: HybridClassifier,
    config: BatchClassifierConfig,
}

impl BatchClassifier {
    pub fn new(classifier: HybridClassifier) -> Self {
        Self {
            classifier,
            config: BatchClassifierConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BatchClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// Classify a batch of documents without persisting anything.
    pub async fn classify_batch(&self, docs: Vec<DocumentInput>) -> BatchReport {
        let start = Instant::now();
        let batch_size = docs.len();

        let outcomes: Vec<Result<MetadataRecord, QuarantinedDocument>> = stream::iter(docs)
            .map(|doc| {
                let classifier = self.classifier.clone();
                async move {
                    classifier
                        .classify_document(&doc.file_path, &doc.title, &doc.content_excerpt)
                        .await
                        .map_err(|e| {
                            warn!(
                                source_file = doc.file_path.as_str(),
                                error = %e,
                                "Document quarantined"
                            );
                            QuarantinedDocument {
                                source_file: doc.file_path,
                                error: e.to_string(),
                            }
                        })
                }
            })
            .buffered(self.config.worker_concurrency.max(1))
            .collect()
            .await;

        let report = collect_report(outcomes);
        info!(
            batch_size,
            quarantined_count = report.quarantined.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch classification complete"
        );
        report
    }

    /// Classify a batch and persist each valid record with its chunk text.
    ///
    /// A record appears in the report only after the sink accepted it; a
    /// sink failure quarantines that document like a classification
    /// failure would, and the batch continues.
    pub async fn ingest_batch(
        &self,
        docs: Vec<DocumentInput>,
        sink: Arc<dyn MetadataSink>,
    ) -> BatchReport {
        let start = Instant::now();
        let batch_size = docs.len();

        let outcomes: Vec<Result<MetadataRecord, QuarantinedDocument>> = stream::iter(docs)
            .map(|doc| {
                let classifier = self.classifier.clone();
                let sink = sink.clone();
                async move {
                    let record = classifier
                        .classify_document(&doc.file_path, &doc.title, &doc.content_excerpt)
                        .await
                        .map_err(|e| {
                            warn!(
                                source_file = doc.file_path.as_str(),
                                error = %e,
                                "Document quarantined"
                            );
                            QuarantinedDocument {
                                source_file: doc.file_path.clone(),
                                error: e.to_string(),
                            }
                        })?;

                    sink.upsert(&record, &doc.content_excerpt)
                        .await
                        .map_err(|e| {
                            error!(
                                source_file = doc.file_path.as_str(),
                                error = %e,
                                "Sink rejected record"
                            );
                            QuarantinedDocument {
                                source_file: doc.file_path,
                                error: e.to_string(),
                            }
                        })?;

                    Ok(record)
                }
            })
            .buffered(self.config.worker_concurrency.max(1))
            .collect()
            .await;

        let report = collect_report(outcomes);
        info!(
            batch_size,
            quarantined_count = report.quarantined.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch ingestion complete"
        );
        report
    }
}

fn collect_report(
    outcomes: Vec<Result<MetadataRecord, QuarantinedDocument>>,
) -> BatchReport {
    let mut records = Vec::new();
    let mut quarantined = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(doc) => quarantined.push(doc),
        }
    }
    BatchReport {
        records,
        quarantined,
        completed_at: Utc::now(),
    }
}
