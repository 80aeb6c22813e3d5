//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DatasetVersion, Document, DomainError};

/// Durable storage for the one brand kit document plus the selected dataset version.
///
/// Each save replaces the previous blob wholesale; there are no partial writes.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Load the stored document. `Ok(None)` when nothing has been saved yet.
    /// Older blobs missing newer fields are backfilled with defaults.
    async fn load_document(&self) -> Result<Option<Document>, DomainError>;

    /// Replace the stored document.
    async fn save_document(&self, doc: &Document) -> Result<(), DomainError>;

    /// Remove the stored document entirely.
    async fn clear_document(&self) -> Result<(), DomainError>;

    /// Load the selected dataset version. `Ok(None)` when never set.
    async fn load_version(&self) -> Result<Option<DatasetVersion>, DomainError>;

    async fn save_version(&self, version: DatasetVersion) -> Result<(), DomainError>;
}

/// Best-effort lookups of brand imagery. Never fails: falls back to a guessed URL.
#[async_trait::async_trait]
pub trait BrandAssetPort: Send + Sync {
    /// Header image URL for `domain` (e.g. its `og:image`).
    async fn header_image(&self, domain: &str) -> String;

    /// Icon URL for `domain`.
    fn favicon(&self, domain: &str) -> String;
}
