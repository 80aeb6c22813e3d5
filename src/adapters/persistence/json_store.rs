//! Implements DocumentStore using JSON files in a data directory.
//!
//! `brand_kit.json` holds the document, `version` holds the dataset version as a
//! plain string.

use super::codec;
use crate::domain::{DatasetVersion, Document, DomainError};
use crate::ports::DocumentStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const DOCUMENT_FILE: &str = "brand_kit.json";
const VERSION_FILE: &str = "version";

/// File-based document store.
///
/// Writes are serialized: the autosaver and an immediate save (version switch)
/// share the same temp files.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    fn version_path(&self) -> PathBuf {
        self.dir.join(VERSION_FILE)
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, DomainError> {
        match fs::read_to_string(path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::Store(format!(
                "read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Atomic save using write-replace:
    /// write temp file, sync_all, then rename over the target.
    async fn write_atomic(&self, path: &Path, contents: &str) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().await;
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::Store(format!("create data dir: {}", e)))?;

        let temp_path = path.with_extension("tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Store(format!("create temp file: {}", e)))?;
        f.write_all(contents.as_bytes())
            .await
            .map_err(|e| DomainError::Store(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Store(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, path)
            .await
            .map_err(|e| DomainError::Store(format!("atomic rename failed: {}", e)))
    }
}

#[async_trait::async_trait]
impl DocumentStore for JsonFileStore {
    async fn load_document(&self) -> Result<Option<Document>, DomainError> {
        match Self::read_optional(&self.document_path()).await? {
            Some(raw) => codec::decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    async fn save_document(&self, doc: &Document) -> Result<(), DomainError> {
        let json = codec::encode(doc)?;
        let path = self.document_path();
        self.write_atomic(&path, &json).await?;
        debug!(path = %path.display(), bytes = json.len(), "saved document");
        Ok(())
    }

    async fn clear_document(&self) -> Result<(), DomainError> {
        match fs::remove_file(self.document_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Store(format!("remove document: {}", e))),
        }
    }

    async fn load_version(&self) -> Result<Option<DatasetVersion>, DomainError> {
        let Some(raw) = Self::read_optional(&self.version_path()).await? else {
            return Ok(None);
        };
        match raw.parse::<DatasetVersion>() {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(error = %e, "unknown stored version, using Default");
                Ok(Some(DatasetVersion::Default))
            }
        }
    }

    async fn save_version(&self, version: DatasetVersion) -> Result<(), DomainError> {
        self.write_atomic(&self.version_path(), version.as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Region, WritingRule};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_missing_files_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load_document().await.unwrap().is_none());
        assert!(store.load_version().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));

        let mut doc = Document::empty();
        let mut region = Region::named("EMEA");
        region
            .writing_rules
            .push(WritingRule::new("Spelling", "UK spelling", ["EMEA"]));
        doc.regions.push(region);

        store.save_document(&doc).await.unwrap();
        assert_eq!(store.load_document().await.unwrap(), Some(doc));
        assert!(!store.document_path().with_extension("tmp").exists());

        store.clear_document().await.unwrap();
        assert!(store.load_document().await.unwrap().is_none());
        store.clear_document().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_saves_leave_valid_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonFileStore::new(dir.path()));

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let mut doc = Document::empty();
                doc.brand_foundations.brand_name = format!("Brand {}", i);
                doc.brand_foundations.about_your_brand = "x".repeat(4096 * (i + 1));
                store.save_document(&doc).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = store.load_document().await.unwrap().unwrap();
        let n: usize = doc
            .brand_foundations
            .brand_name
            .trim_start_matches("Brand ")
            .parse()
            .unwrap();
        assert_eq!(doc.brand_foundations.about_your_brand.len(), 4096 * (n + 1));
        assert!(!store.document_path().with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_version_round_trip_and_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.save_version(DatasetVersion::Xero).await.unwrap();
        assert_eq!(
            store.load_version().await.unwrap(),
            Some(DatasetVersion::Xero)
        );

        std::fs::write(dir.path().join(VERSION_FILE), "Acme").unwrap();
        assert_eq!(
            store.load_version().await.unwrap(),
            Some(DatasetVersion::Default)
        );
    }

    #[tokio::test]
    async fn test_legacy_file_is_backfilled() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DOCUMENT_FILE),
            r#"{"brandFoundations": {"brandName": "Old Co"}}"#,
        )
        .unwrap();
        let store = JsonFileStore::new(dir.path());

        let doc = store.load_document().await.unwrap().unwrap();
        assert_eq!(doc.brand_foundations.brand_name, "Old Co");
        assert!(doc.brand_foundations.enable_audiences);
    }
}
