//! Editor use case: owns the live document and routes every edit through the reducer.
//!
//! Subscribers (the autosaver, the UI) see the new state on every successful
//! dispatch. Version switches and clears persist directly and replace the state
//! without notifying, so they never schedule a debounced save of their own.

use crate::domain::{
    Action, AggregatedRule, DatasetVersion, Document, DomainError, ReduceOptions, TagGroup,
    collect_all_rules, group_by_tag, reduce, seed_document,
};
use crate::ports::DocumentStore;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{info, warn};

pub struct EditorService {
    store: Arc<dyn DocumentStore>,
    doc: watch::Sender<Document>,
    version: RwLock<DatasetVersion>,
    options: ReduceOptions,
}

impl EditorService {
    /// Loads the stored version and document. A missing document starts from the
    /// version's seed; an unreadable one starts empty.
    pub async fn load(store: Arc<dyn DocumentStore>, options: ReduceOptions) -> Self {
        let version = match store.load_version().await {
            Ok(v) => v.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "failed to load dataset version, using Default");
                DatasetVersion::Default
            }
        };
        let doc = match store.load_document().await {
            Ok(Some(doc)) => doc,
            Ok(None) => {
                info!(version = %version, "no stored document, starting from seed");
                seed_document(version)
            }
            Err(e) => {
                warn!(error = %e, "failed to load document, starting empty");
                Document::empty()
            }
        };
        let (doc, _) = watch::channel(doc);

        Self {
            store,
            doc,
            version: RwLock::new(version),
            options,
        }
    }

    pub fn snapshot(&self) -> Document {
        self.doc.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Document> {
        self.doc.subscribe()
    }

    pub async fn version(&self) -> DatasetVersion {
        *self.version.read().await
    }

    /// Applies `action`. On error the live document is left as it was.
    pub fn dispatch(&self, action: Action) -> Result<(), DomainError> {
        let mut result = Ok(());
        self.doc.send_if_modified(|doc| match reduce(doc, action, &self.options) {
            Ok(next) if next == *doc => false,
            Ok(next) => {
                *doc = next;
                true
            }
            Err(e) => {
                result = Err(e);
                false
            }
        });
        result
    }

    /// Replaces the document with `version`'s seed and persists both right away.
    pub async fn switch_version(&self, version: DatasetVersion) -> Result<(), DomainError> {
        let seed = seed_document(version);
        self.store.save_version(version).await?;
        self.store.save_document(&seed).await?;

        *self.version.write().await = version;
        self.replace_silently(seed);
        info!(version = %version, "switched dataset version");
        Ok(())
    }

    /// Removes the stored document and resets to an empty one without saving it.
    pub async fn clear(&self) -> Result<(), DomainError> {
        self.store.clear_document().await?;
        self.replace_silently(Document::empty());
        info!("cleared stored document");
        Ok(())
    }

    pub fn all_rules(&self) -> Vec<AggregatedRule> {
        collect_all_rules(&self.doc.borrow())
    }

    pub fn rules_by_tag(&self) -> Vec<TagGroup> {
        group_by_tag(&self.all_rules())
    }

    fn replace_silently(&self, doc: Document) {
        self.doc.send_if_modified(|current| {
            *current = doc;
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryStore;
    use crate::domain::{
        Audience, BrandField, EntityKind, GLOBAL_TAG, NewEntity, RuleDraft, RuleOwner,
    };
    use crate::usecases::autosave::Autosaver;
    use std::time::Duration;

    async fn editor_with(store: Arc<MemoryStore>) -> EditorService {
        EditorService::load(store, ReduceOptions::default()).await
    }

    #[tokio::test]
    async fn test_load_without_stored_data_uses_seed() {
        let store = Arc::new(MemoryStore::new());
        store.save_version(DatasetVersion::Klaviyo).await.unwrap();
        let editor = editor_with(store).await;

        assert_eq!(editor.version().await, DatasetVersion::Klaviyo);
        let doc = editor.snapshot();
        assert_eq!(doc.brand_foundations.brand_name, "Klaviyo");
        assert!(!doc.audiences.is_empty());
    }

    #[tokio::test]
    async fn test_load_unreadable_blob_starts_empty() {
        let store = Arc::new(MemoryStore::with_raw_document("{oops"));
        let editor = editor_with(store).await;
        assert_eq!(editor.snapshot(), Document::empty());
    }

    #[tokio::test]
    async fn test_load_backfills_legacy_blob() {
        let store = Arc::new(MemoryStore::with_raw_document(
            r##"{"brandFoundations": {"brandName": "Old Co", "brandColors": ["#000"]}}"##,
        ));
        let editor = editor_with(store).await;
        let doc = editor.snapshot();
        assert_eq!(doc.brand_foundations.brand_name, "Old Co");
        assert_eq!(doc.brand_foundations.brand_colors, vec!["#000"]);
        assert!(doc.brand_foundations.enable_regions);
    }

    #[tokio::test]
    async fn test_dispatch_notifies_subscribers() {
        let editor = editor_with(Arc::new(MemoryStore::new())).await;
        let mut rx = editor.subscribe();

        editor
            .dispatch(Action::SetBrandField(BrandField::Name, "Acme".to_string()))
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().brand_foundations.brand_name, "Acme");

        editor
            .dispatch(Action::SetBrandField(BrandField::Name, "Acme".to_string()))
            .unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_failed_dispatch_leaves_document_untouched() {
        let editor = editor_with(Arc::new(MemoryStore::new())).await;
        let rx = editor.subscribe();
        let before = editor.snapshot();

        let err = editor
            .dispatch(Action::DeleteEntity {
                kind: EntityKind::Audience,
                id: Default::default(),
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(editor.snapshot(), before);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_switch_version_persists_without_notifying() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor_with(store.clone()).await;
        let rx = editor.subscribe();

        editor.switch_version(DatasetVersion::Xero).await.unwrap();

        assert_eq!(editor.version().await, DatasetVersion::Xero);
        assert_eq!(store.load_version().await.unwrap(), Some(DatasetVersion::Xero));
        assert_eq!(store.document_writes(), 1);
        assert_eq!(store.load_document().await.unwrap(), Some(editor.snapshot()));
        assert_eq!(editor.snapshot().brand_foundations.brand_name, "Xero");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_switch_version_failure_keeps_current_state() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor_with(store.clone()).await;
        store.set_fail_writes(true);

        assert!(editor.switch_version(DatasetVersion::Xero).await.is_err());
        assert_eq!(editor.version().await, DatasetVersion::Default);
        assert_eq!(editor.snapshot(), Document::empty());
    }

    #[tokio::test]
    async fn test_clear_removes_blob_and_resets() {
        let store = Arc::new(MemoryStore::new());
        store
            .save_document(&seed_document(DatasetVersion::Klaviyo))
            .await
            .unwrap();
        let editor = editor_with(store.clone()).await;
        let rx = editor.subscribe();

        editor.clear().await.unwrap();
        assert!(store.raw_document().await.is_none());
        assert_eq!(editor.snapshot(), Document::empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_rule_views_follow_live_document() {
        let editor = editor_with(Arc::new(MemoryStore::new())).await;
        let audience = Audience::named("Gen Z");
        let id = audience.id;
        editor
            .dispatch(Action::AddEntity(NewEntity::Audience(audience)))
            .unwrap();

        let draft = RuleDraft::specific("Short", "Keep it short", ["Gen Z"]);
        editor
            .dispatch(Action::AddRule {
                owner: RuleOwner::Audience(id),
                draft,
            })
            .unwrap();

        let global = RuleDraft::global("Commas", "Oxford comma");
        editor
            .dispatch(Action::AddRule {
                owner: RuleOwner::Global,
                draft: global,
            })
            .unwrap();

        let rules = editor.all_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].rule.name, "Commas");

        let groups = editor.rules_by_tag();
        let tags: Vec<&str> = groups.iter().map(|g| g.tag.as_str()).collect();
        assert_eq!(tags, vec![GLOBAL_TAG, "Gen Z"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edits_reach_store_through_autosaver() {
        let store = Arc::new(MemoryStore::new());
        let editor = editor_with(store.clone()).await;
        let saver = Autosaver::new(
            store.clone(),
            editor.subscribe(),
            Duration::from_millis(500),
            Duration::from_millis(2000),
        );
        let handle = tokio::spawn(saver.run());

        editor
            .dispatch(Action::SetBrandField(BrandField::Name, "Acme".to_string()))
            .unwrap();
        editor.switch_version(DatasetVersion::Klaviyo).await.unwrap();
        assert_eq!(store.document_writes(), 1);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.document_writes(), 2);
        assert_eq!(store.load_document().await.unwrap(), Some(editor.snapshot()));

        drop(editor);
        handle.await.unwrap();
    }
}
