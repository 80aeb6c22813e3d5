//! Async task: watches the live document and writes it after a quiet period.
//!
//! Every change restarts the debounce, so a burst of edits costs one write of the
//! final state. Write failures are logged and dropped; the in-memory document
//! stays authoritative.

use crate::domain::Document;
use crate::ports::DocumentStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved { at: DateTime<Utc> },
}

impl SaveStatus {
    pub fn label(&self) -> String {
        match self {
            SaveStatus::Idle => String::new(),
            SaveStatus::Saving => "Saving…".to_string(),
            SaveStatus::Saved { at } => format!("Saved {}", at.format("%H:%M:%S")),
        }
    }
}

/// Autosave worker. Consumes document changes until the sender side is dropped.
pub struct Autosaver {
    store: Arc<dyn DocumentStore>,
    rx: watch::Receiver<Document>,
    status: watch::Sender<SaveStatus>,
    debounce: Duration,
    saved_hold: Duration,
}

impl Autosaver {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        rx: watch::Receiver<Document>,
        debounce: Duration,
        saved_hold: Duration,
    ) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            store,
            rx,
            status,
            debounce,
            saved_hold,
        }
    }

    /// Receiver for the save indicator. Take it before calling [`Autosaver::run`].
    pub fn status(&self) -> watch::Receiver<SaveStatus> {
        self.status.subscribe()
    }

    /// Run the worker. Flushes a pending change and returns once the document channel closes.
    pub async fn run(mut self) {
        let mut clear_at: Option<Instant> = None;

        loop {
            tokio::select! {
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    clear_at = None;
                    self.status.send_replace(SaveStatus::Saving);
                }
                _ = sleep_until_opt(clear_at), if clear_at.is_some() => {
                    clear_at = None;
                    self.status.send_replace(SaveStatus::Idle);
                    continue;
                }
            }

            let closed = self.wait_quiet().await;
            if self.save_latest().await {
                clear_at = Some(Instant::now() + self.saved_hold);
            }
            if closed {
                break;
            }
        }

        info!("autosaver finished (document channel closed)");
    }

    /// Sleeps until no change has arrived for `debounce`. Returns true if the channel closed meanwhile.
    async fn wait_quiet(&mut self) -> bool {
        loop {
            tokio::select! {
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        return true;
                    }
                    debug!("edit during debounce, restarting timer");
                }
                _ = tokio::time::sleep(self.debounce) => return false,
            }
        }
    }

    async fn save_latest(&mut self) -> bool {
        let doc = self.rx.borrow_and_update().clone();
        match self.store.save_document(&doc).await {
            Ok(()) => {
                let at = Utc::now();
                debug!(at = %at, "document saved");
                self.status.send_replace(SaveStatus::Saved { at });
                true
            }
            Err(e) => {
                error!(error = %e, "autosave failed");
                self.status.send_replace(SaveStatus::Idle);
                false
            }
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::MemoryStore;
    use crate::domain::{Action, BrandField, ReduceOptions, reduce};

    const DEBOUNCE: Duration = Duration::from_millis(500);
    const HOLD: Duration = Duration::from_millis(2000);

    fn edit(tx: &watch::Sender<Document>, value: &str) {
        tx.send_modify(|doc| {
            *doc = reduce(
                doc,
                Action::SetBrandField(BrandField::Name, value.to_string()),
                &ReduceOptions::default(),
            )
            .unwrap();
        });
    }

    fn spawn_saver(
        store: Arc<MemoryStore>,
    ) -> (
        watch::Sender<Document>,
        watch::Receiver<SaveStatus>,
        tokio::task::JoinHandle<()>,
    ) {
        let (tx, rx) = watch::channel(Document::empty());
        let saver = Autosaver::new(store, rx, DEBOUNCE, HOLD);
        let status = saver.status();
        let handle = tokio::spawn(saver.run());
        (tx, status, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_is_one_write_of_latest_state() {
        let store = Arc::new(MemoryStore::new());
        let (tx, _status, _handle) = spawn_saver(store.clone());

        for name in ["A", "Ac", "Acm", "Acme"] {
            edit(&tx, name);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(store.document_writes(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.document_writes(), 1);
        let saved = store.load_document().await.unwrap().unwrap();
        assert_eq!(saved.brand_foundations.brand_name, "Acme");
    }

    #[tokio::test(start_paused = true)]
    async fn test_saving_shown_during_debounce() {
        let store = Arc::new(MemoryStore::new());
        let (tx, status, _handle) = spawn_saver(store.clone());
        assert_eq!(*status.borrow(), SaveStatus::Idle);

        edit(&tx, "Acme");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*status.borrow(), SaveStatus::Saving);
        assert_eq!(store.document_writes(), 0);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(matches!(*status.borrow(), SaveStatus::Saved { .. }));

        // A new edit while "Saved" is held switches straight back to saving.
        edit(&tx, "Acme Inc");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*status.borrow(), SaveStatus::Saving);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_write_without_edits() {
        let store = Arc::new(MemoryStore::new());
        let (_tx, _status, _handle) = spawn_saver(store.clone());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.document_writes(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saved_status_clears_after_hold() {
        let store = Arc::new(MemoryStore::new());
        let (tx, status, _handle) = spawn_saver(store.clone());

        edit(&tx, "Acme");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(matches!(*status.borrow(), SaveStatus::Saved { .. }));

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(*status.borrow(), SaveStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_is_swallowed() {
        let store = Arc::new(MemoryStore::new());
        store.set_fail_writes(true);
        let (tx, status, handle) = spawn_saver(store.clone());

        edit(&tx, "Acme");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.document_writes(), 0);
        assert_eq!(*status.borrow(), SaveStatus::Idle);
        assert_eq!(tx.borrow().brand_foundations.brand_name, "Acme");
        assert!(!handle.is_finished());

        store.set_fail_writes(false);
        edit(&tx, "Acme Inc");
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(store.document_writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_change_is_flushed_on_close() {
        let store = Arc::new(MemoryStore::new());
        let (tx, _status, handle) = spawn_saver(store.clone());

        edit(&tx, "Acme");
        drop(tx);
        handle.await.unwrap();

        assert_eq!(store.document_writes(), 1);
        let saved = store.load_document().await.unwrap().unwrap();
        assert_eq!(saved.brand_foundations.brand_name, "Acme");
    }

    #[test]
    fn test_status_label() {
        assert_eq!(SaveStatus::Idle.label(), "");
        assert_eq!(SaveStatus::Saving.label(), "Saving…");
        assert!(SaveStatus::Saved { at: Utc::now() }.label().starts_with("Saved "));
    }
}
