//! Attachment store
//!
//! Process-local state of all attachments for one conversation context.
//! The store is the only mutator of the entry list; entries are replaced
//! whole under the lock so a reader never observes a partial update.

use std::pin::pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use convoy_core::{AttachmentId, LocalRef};
use tokio::sync::{Notify, RwLock};
use tracing::{debug, instrument, warn};

use crate::blob::BlobStore;
use crate::model::{Attachment, AttachmentState, CandidateFile};
use crate::policy::{self, LimitSpec};

/// Attachment state for one conversation context.
///
/// Cheap to clone; clones share the same entries. Construction and
/// teardown belong to the owning context: create one per conversation
/// and [`clear`](AttachmentStore::clear) it when the context resets.
#[derive(Clone)]
pub struct AttachmentStore {
    inner: Arc<Inner>,
}

struct Inner {
    blob: Arc<dyn BlobStore>,
    entries: RwLock<Vec<Attachment>>,
    next_ref: AtomicU64,
    settled: Notify,
}

impl AttachmentStore {
    pub fn new(blob: Arc<dyn BlobStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                blob,
                entries: RwLock::new(Vec::new()),
                next_ref: AtomicU64::new(1),
                settled: Notify::new(),
            }),
        }
    }

    /// Admit the candidates and begin uploading the accepted ones.
    ///
    /// An entry is created synchronously per candidate: accepted files
    /// enter `Uploading`, rejected ones enter `Errored` with the
    /// rejection message. Accepted files upload concurrently and settle
    /// independently; completion order is unspecified.
    #[instrument(skip_all, fields(candidates = files.len()))]
    pub async fn upload(&self, files: Vec<CandidateFile>, limit: &LimitSpec) {
        let current = self.occupied_count().await;
        let admission = policy::admit(files, limit, current);

        let mut pending = Vec::with_capacity(admission.accepted.len());
        {
            let mut entries = self.inner.entries.write().await;
            for file in admission.accepted {
                let local_ref = self.inner.next_ref.fetch_add(1, Ordering::SeqCst);
                entries.push(Attachment::pending(local_ref, &file));
                pending.push((local_ref, file));
            }
            for (file, reason) in admission.rejected {
                let message = reason.message(&file.name, limit);
                let local_ref = self.inner.next_ref.fetch_add(1, Ordering::SeqCst);
                debug!(name = %file.name, reason = %message, "Candidate rejected");
                entries.push(Attachment::rejected(local_ref, &file, message));
            }
        }

        for (local_ref, file) in pending {
            let store = self.clone();
            tokio::spawn(async move { store.run_upload(local_ref, file).await });
        }
    }

    #[instrument(skip(self, file), fields(name = %file.name))]
    async fn run_upload(self, local_ref: LocalRef, file: CandidateFile) {
        let encoded = STANDARD.encode(&file.data);
        self.replace_entry(local_ref, |a| a.encoded_content = encoded)
            .await;

        let content_type = file.resolved_content_type();
        match self
            .inner
            .blob
            .put_object(&file.name, &content_type, file.data.clone())
            .await
        {
            Ok(stored) => {
                debug!(id = %stored.id, key = %stored.key, "Upload settled");
                self.replace_entry(local_ref, |a| {
                    a.id = Some(stored.id);
                    a.state = AttachmentState::Healthy;
                })
                .await;
            }
            Err(e) => {
                warn!(name = %file.name, error = %e, "Upload failed");
                let message = format!("Failed to upload {}: {}", file.name, e);
                self.replace_entry(local_ref, |a| {
                    a.state = AttachmentState::Errored(vec![message]);
                })
                .await;
            }
        }
        self.inner.settled.notify_waiters();
    }

    /// Delete one attachment by its remote identifier.
    ///
    /// A delete issued while the target's upload is still in flight is
    /// queued: it waits for uploads to settle before resolving the id,
    /// so the in-flight upload is never pre-empted. An id that never
    /// materializes is a no-op. The local entry is removed whether or
    /// not the remote delete succeeds, and the remaining entries are
    /// re-checked against the limit.
    #[instrument(skip(self, limit))]
    pub async fn delete_one(&self, id: &str, limit: &LimitSpec) {
        loop {
            let mut notified = pin!(self.inner.settled.notified());
            notified.as_mut().enable();
            {
                let entries = self.inner.entries.read().await;
                if entries.iter().any(|a| a.id.as_deref() == Some(id)) {
                    break;
                }
                if !entries.iter().any(|a| a.state.is_uploading()) {
                    debug!(id = id, "Delete target not present; nothing to do");
                    return;
                }
            }
            notified.await;
        }

        let marked = {
            let mut entries = self.inner.entries.write().await;
            match entries.iter().position(|a| a.id.as_deref() == Some(id)) {
                Some(pos) if !entries[pos].state.is_deleting() => {
                    let mut updated = entries[pos].clone();
                    updated.state = AttachmentState::Deleting;
                    entries[pos] = updated;
                    true
                }
                // gone in the meantime, or another delete owns it
                _ => false,
            }
        };
        if !marked {
            return;
        }

        if let Err(e) = self.inner.blob.delete_object(id).await {
            warn!(id = id, error = %e, "Remote delete failed; removing local entry anyway");
        }

        let mut entries = self.inner.entries.write().await;
        entries.retain(|a| a.id.as_deref() != Some(id));
        recheck_entries(&mut entries, limit);
    }

    /// Delete a batch of attachments, sequentially and best-effort: a
    /// failing or already-absent target never aborts the rest.
    #[instrument(skip_all, fields(count = ids.len()))]
    pub async fn delete_many(&self, ids: &[AttachmentId], limit: &LimitSpec) {
        for id in ids {
            self.delete_one(id, limit).await;
        }
    }

    /// Remove an entry that has no remote object (failed admission or
    /// failed upload). Local removal only; anything else is a no-op.
    pub async fn remove_local(&self, local_ref: LocalRef, limit: &LimitSpec) {
        let mut entries = self.inner.entries.write().await;
        let before = entries.len();
        entries.retain(|a| {
            !(a.local_ref == local_ref && a.id.is_none() && a.state.is_settled())
        });
        if entries.len() != before {
            recheck_entries(&mut entries, limit);
        }
    }

    /// Recompute error messages for settled entries against a (possibly
    /// changed) limit. In-flight entries are left alone.
    pub async fn check(&self, limit: &LimitSpec) {
        let mut entries = self.inner.entries.write().await;
        recheck_entries(&mut entries, limit);
    }

    /// Snapshot of all entries, in creation order
    pub async fn uploaded_files(&self) -> Vec<Attachment> {
        self.inner.entries.read().await.clone()
    }

    /// True while any upload is in flight
    pub async fn uploading(&self) -> bool {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .any(|a| a.state.is_uploading())
    }

    /// All outstanding error messages, in entry order
    pub async fn error_messages(&self) -> Vec<String> {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .flat_map(|a| a.error_messages().iter().cloned())
            .collect()
    }

    /// Remote identifiers of all entries that have one
    pub async fn ids(&self) -> Vec<AttachmentId> {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .filter_map(|a| a.id.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// Wait until no upload is in flight
    pub async fn wait_idle(&self) {
        loop {
            let mut notified = pin!(self.inner.settled.notified());
            notified.as_mut().enable();
            if !self.uploading().await {
                return;
            }
            notified.await;
        }
    }

    /// Drop all entries. Called when the owning conversation context
    /// resets.
    pub async fn clear(&self) {
        self.inner.entries.write().await.clear();
    }

    /// Entries counted against the limit: errored ones do not hold a slot
    async fn occupied_count(&self) -> usize {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .filter(|a| !a.state.is_errored())
            .count()
    }

    async fn replace_entry<F>(&self, local_ref: LocalRef, mutate: F)
    where
        F: FnOnce(&mut Attachment),
    {
        let mut entries = self.inner.entries.write().await;
        if let Some(pos) = entries.iter().position(|a| a.local_ref == local_ref) {
            let mut updated = entries[pos].clone();
            mutate(&mut updated);
            entries[pos] = updated;
        }
    }
}

/// Re-run the admission predicate over admitted entries, positionally in
/// entry order. Entries that never passed admission keep their original
/// message; in-flight entries occupy their slot but are not mutated.
fn recheck_entries(entries: &mut [Attachment], limit: &LimitSpec) {
    let mut slot = 0usize;
    for pos in 0..entries.len() {
        if !entries[pos].was_admitted() {
            continue;
        }
        let current = slot;
        slot += 1;
        if !entries[pos].state.is_settled() {
            continue;
        }
        let messages = policy::check_entry(&entries[pos], limit, current);
        let mut updated = entries[pos].clone();
        updated.state = if messages.is_empty() {
            AttachmentState::Healthy
        } else {
            AttachmentState::Errored(messages)
        };
        entries[pos] = updated;
    }
}
