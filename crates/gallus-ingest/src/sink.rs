//! In-memory metadata sink.
//!
//! Test and local-tooling stand-in for the vector-store adapter. Each
//! upsert appends atomically under one lock acquisition, so a partially
//! written record is never observable.

use async_trait::async_trait;
use tokio::sync::Mutex;

use gallus_core::{MetadataRecord, MetadataSink, Result};

/// Metadata sink backed by a vector in memory.
#[derive(Default)]
pub struct InMemorySink {
    entries: Mutex<Vec<(MetadataRecord, String)>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All persisted records, in upsert order.
    pub async fn records(&self) -> Vec<MetadataRecord> {
        self.entries
            .lock()
            .await
            .iter()
            .map(|(record, _)| record.clone())
            .collect()
    }

    /// Number of persisted entries.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl MetadataSink for InMemorySink {
    async fn upsert(&self, record: &MetadataRecord, chunk_text: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .push((record.clone(), chunk_text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallus_core::{ClassificationMethod, PartialMetadata, VisibilityLevel};
    use uuid::Uuid;

    fn record() -> MetadataRecord {
        let mut fields = PartialMetadata::new();
        fields.visibility_level = Some(VisibilityLevel::PublicGlobal);
        MetadataRecord::from_partial(
            fields,
            ClassificationMethod::Default,
            0.5,
            "/doc.pdf",
            Uuid::nil(),
            1,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn upsert_appends_entries() {
        let sink = InMemorySink::new();
        assert!(sink.is_empty().await);
        sink.upsert(&record(), "chunk text").await.unwrap();
        sink.upsert(&record(), "more text").await.unwrap();
        assert_eq!(sink.len().await, 2);
        assert_eq!(sink.records().await.len(), 2);
    }
}
