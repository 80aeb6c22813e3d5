//! In-process DocumentStore. Used for ephemeral sessions and tests.
//!
//! Holds the encoded blob rather than the typed document so every save/load
//! goes through the same codec as the file store.

use super::codec;
use crate::domain::{DatasetVersion, Document, DomainError};
use crate::ports::DocumentStore;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    document: RwLock<Option<String>>,
    version: RwLock<Option<String>>,
    document_writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a raw blob, e.g. one from an older schema.
    pub fn with_raw_document(raw: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(Some(raw.into())),
            ..Self::default()
        }
    }

    /// Successful document saves so far.
    pub fn document_writes(&self) -> usize {
        self.document_writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail, as a full disk or quota would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn raw_document(&self) -> Option<String> {
        self.document.read().await.clone()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(DomainError::Store("storage quota exceeded".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn load_document(&self) -> Result<Option<Document>, DomainError> {
        match self.document.read().await.as_deref() {
            Some(raw) => codec::decode(raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
        self.check_writable()?;
        let json = codec::encode(doc)?;
        *self.document.write().await = Some(json);
        self.document_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_document(&self) -> Result<(), DomainError> {
        self.check_writable()?;
        *self.document.write().await = None;
        Ok(())
    }

    async fn load_version(&self) -> Result<Option<DatasetVersion>, DomainError> {
        Ok(self
            .version
            .read()
            .await
            .as_deref()
            .map(|raw| raw.parse().unwrap_or_default()))
    }

    async fn save_version(&self, version: DatasetVersion) -> Result<(), DomainError> {
        self.check_writable()?;
        *self.version.write().await = Some(version.as_str().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_writes_and_fails_on_demand() {
        let store = MemoryStore::new();
        store.save_document(&Document::empty()).await.unwrap();
        assert_eq!(store.document_writes(), 1);

        store.set_fail_writes(true);
        assert!(store.save_document(&Document::empty()).await.is_err());
        assert_eq!(store.document_writes(), 1);
        assert!(store.load_document().await.unwrap().is_some());
    }
}
