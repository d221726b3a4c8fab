//! In-memory [`DocumentCache`].

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use docman_core::{cache::DocumentCache, document::DocumentDto};

/// Unbounded id-keyed cache. Clones share entries.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDocumentCache {
    entries: Arc<DashMap<String, DocumentDto>>,
}

impl InMemoryDocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[async_trait]
impl DocumentCache for InMemoryDocumentCache {
    async fn get(&self, id: &str) -> Option<DocumentDto> {
        self.entries
            .get(id)
            .map(|entry| entry.value().clone())
    }

    async fn set(&self, document: DocumentDto) {
        self.entries.insert(document.id.clone(), document);
    }

    async fn invalidate(&self, id: &str) {
        self.entries.remove(id);
    }
}
