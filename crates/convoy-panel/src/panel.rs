//! Attachment panel
//!
//! Presentation model for the composer's attachment strip. Dispatches
//! each entry to a card view by kind, wires deletes and selection, and
//! gates the send action on the store's aggregate state.

use convoy_attachments::{AttachmentStore, CandidateFile, FileKind, LimitSpec};
use convoy_core::{AttachmentId, LocalRef};
use tracing::debug;

use crate::selection::SelectionController;

/// What a card renders for its attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardView {
    ImagePreview { encoded: String },
    VideoPreview { encoded: String },
    DocumentTile { file_name: String },
}

/// Where a card's delete action goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// Entry with a remote object, deleted through the blob store
    Remote(AttachmentId),
    /// Entry that never got a remote object, removed locally
    Local(LocalRef),
}

/// One rendered attachment
#[derive(Debug, Clone)]
pub struct AttachmentCard {
    pub view: CardView,
    pub target: DeleteTarget,
    pub uploading: bool,
    pub deleting: bool,
    pub errored: bool,
    /// Checkbox shown instead of delete-on-hover while selection mode is on
    pub selectable: bool,
    pub selected: bool,
}

/// The attachment strip of one composer instance
pub struct AttachmentPanel {
    store: AttachmentStore,
    selection: SelectionController,
    limit: LimitSpec,
    content: String,
    disabled: bool,
    loading: bool,
}

impl AttachmentPanel {
    pub fn new(store: AttachmentStore, limit: LimitSpec) -> Self {
        Self {
            store,
            selection: SelectionController::new(),
            limit,
            content: String::new(),
            disabled: false,
            loading: false,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn store(&self) -> &AttachmentStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Swap the limit (e.g., on model switch) and recompute error text
    /// for the stored entries without re-uploading anything.
    pub async fn set_limit(&mut self, limit: LimitSpec) {
        self.limit = limit;
        self.store.check(&self.limit).await;
    }

    /// Re-run the limit check with the current limit
    pub async fn recheck(&self) {
        self.store.check(&self.limit).await;
    }

    /// Files chosen through the picker
    pub async fn attach(&self, files: Vec<CandidateFile>) {
        self.store.upload(files, &self.limit).await;
    }

    /// Files pasted into the composer. Pasting without files is a no-op
    /// here so the text paste falls through to the editor.
    pub async fn paste(&self, files: Vec<CandidateFile>) {
        if files.is_empty() {
            return;
        }
        self.store.upload(files, &self.limit).await;
    }

    /// Whether the send action is currently blocked
    pub async fn send_disabled(&self) -> bool {
        (!self.loading && self.content.trim().is_empty())
            || self.disabled
            || self.store.uploading().await
            || !self.store.error_messages().await.is_empty()
    }

    /// One card per entry, dispatched by kind
    pub async fn cards(&self) -> Vec<AttachmentCard> {
        self.store
            .uploaded_files()
            .await
            .iter()
            .map(|a| {
                let view = match a.kind {
                    FileKind::Image => CardView::ImagePreview {
                        encoded: a.encoded_content.clone(),
                    },
                    FileKind::Video => CardView::VideoPreview {
                        encoded: a.encoded_content.clone(),
                    },
                    FileKind::Document => CardView::DocumentTile {
                        file_name: a.name.clone(),
                    },
                };
                let target = match &a.id {
                    Some(id) => DeleteTarget::Remote(id.clone()),
                    None => DeleteTarget::Local(a.local_ref),
                };
                let selected = a
                    .id
                    .as_deref()
                    .map(|id| self.selection.is_selected(id))
                    .unwrap_or(false);
                AttachmentCard {
                    view,
                    target,
                    uploading: a.state.is_uploading(),
                    deleting: a.state.is_deleting(),
                    errored: a.state.is_errored(),
                    selectable: self.selection.is_active(),
                    selected,
                }
            })
            .collect()
    }

    /// Delete one attachment through its card target
    pub async fn delete(&self, target: DeleteTarget) {
        match target {
            DeleteTarget::Remote(id) => self.store.delete_one(&id, &self.limit).await,
            DeleteTarget::Local(local_ref) => {
                self.store.remove_local(local_ref, &self.limit).await
            }
        }
    }

    pub fn toggle_selection_mode(&mut self) {
        self.selection.toggle_mode();
    }

    /// Toggle one entry's checkbox; ignored outside selection mode
    pub fn toggle_selected(&mut self, id: impl Into<AttachmentId>) {
        if self.selection.is_active() {
            self.selection.toggle(id);
        }
    }

    /// Select every entry that has a remote identifier
    pub async fn select_all(&mut self) {
        if !self.selection.is_active() {
            return;
        }
        let ids = self.store.ids().await;
        self.selection.select_all(ids);
    }

    /// Delete the selected attachments. Refused while the selection is
    /// empty; stale ids are skipped by the store. On completion the
    /// selection is cleared and selection mode exits.
    pub async fn delete_selected(&mut self) {
        if !self.selection.is_active() || self.selection.is_empty() {
            return;
        }
        let ids = self.selection.selected_ids();
        debug!(count = ids.len(), "Deleting selected attachments");
        self.store.delete_many(&ids, &self.limit).await;
        self.selection.toggle_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy_attachments::MemoryBlobStore;
    use std::sync::Arc;

    fn limit(count: usize) -> LimitSpec {
        LimitSpec::new(count, 1024 * 1024, ["image/*", "video/*", "application/pdf"])
    }

    fn panel(count: usize) -> AttachmentPanel {
        let store = AttachmentStore::new(Arc::new(MemoryBlobStore::new()));
        AttachmentPanel::new(store, limit(count))
    }

    fn png(name: &str) -> CandidateFile {
        CandidateFile::new(name, "pixels").with_content_type("image/png")
    }

    #[tokio::test]
    async fn test_send_gating_on_content() {
        let mut panel = panel(5);
        assert!(panel.send_disabled().await);

        panel.set_content("   ");
        assert!(panel.send_disabled().await);

        panel.set_content("hello");
        assert!(!panel.send_disabled().await);

        panel.set_disabled(true);
        assert!(panel.send_disabled().await);
    }

    #[tokio::test]
    async fn test_loading_overrides_empty_content() {
        let mut panel = panel(5);
        panel.set_loading(true);
        assert!(!panel.send_disabled().await);
    }

    #[tokio::test]
    async fn test_send_blocked_while_uploading_and_on_errors() {
        let mut panel = panel(5);
        panel.set_content("hello");

        panel.attach(vec![png("a.png")]).await;
        assert!(panel.send_disabled().await);

        panel.store().wait_idle().await;
        assert!(!panel.send_disabled().await);

        // a rejected file leaves an outstanding error, blocking send
        panel.attach(vec![CandidateFile::new("notes.xyz", "x")]).await;
        panel.store().wait_idle().await;
        assert!(panel.send_disabled().await);
    }

    #[tokio::test]
    async fn test_cards_dispatch_by_kind() {
        let panel = panel(5);
        panel
            .attach(vec![
                png("photo.png"),
                CandidateFile::new("clip.mp4", "frames").with_content_type("video/mp4"),
                CandidateFile::new("report.pdf", "pages").with_content_type("application/pdf"),
            ])
            .await;
        panel.store().wait_idle().await;

        let cards = panel.cards().await;
        assert_eq!(cards.len(), 3);
        assert!(matches!(cards[0].view, CardView::ImagePreview { .. }));
        assert!(matches!(cards[1].view, CardView::VideoPreview { .. }));
        assert!(
            matches!(&cards[2].view, CardView::DocumentTile { file_name } if file_name == "report.pdf")
        );
        assert!(cards.iter().all(|c| !c.selectable && !c.selected));
        assert!(cards
            .iter()
            .all(|c| matches!(c.target, DeleteTarget::Remote(_))));
    }

    #[tokio::test]
    async fn test_failed_entry_gets_local_delete_target() {
        let panel = panel(5);
        panel.attach(vec![CandidateFile::new("notes.xyz", "x")]).await;
        panel.store().wait_idle().await;

        let cards = panel.cards().await;
        assert!(cards[0].errored);
        let target = cards[0].target.clone();
        assert!(matches!(target, DeleteTarget::Local(_)));

        panel.delete(target).await;
        assert!(panel.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_selection_mode_marks_cards() {
        let mut panel = panel(5);
        panel.attach(vec![png("a.png"), png("b.png")]).await;
        panel.store().wait_idle().await;

        panel.toggle_selection_mode();
        panel.select_all().await;

        let cards = panel.cards().await;
        assert!(cards.iter().all(|c| c.selectable && c.selected));

        // toggling one off keeps the other selected
        let first = panel.store().ids().await.remove(0);
        panel.toggle_selected(first.clone());
        let cards = panel.cards().await;
        assert_eq!(cards.iter().filter(|c| c.selected).count(), 1);
        assert!(!panel.selection().is_selected(&first));
    }

    #[tokio::test]
    async fn test_batch_delete_clears_selection_and_exits_mode() {
        let mut panel = panel(5);
        panel
            .attach(vec![png("a.png"), png("b.png"), png("c.png")])
            .await;
        panel.store().wait_idle().await;

        panel.toggle_selection_mode();
        panel.select_all().await;
        assert_eq!(panel.selection().len(), 3);

        panel.delete_selected().await;

        assert!(panel.store().is_empty().await);
        assert!(panel.selection().is_empty());
        assert!(!panel.selection().is_active());
    }

    #[tokio::test]
    async fn test_batch_delete_refused_while_selection_empty() {
        let mut panel = panel(5);
        panel.attach(vec![png("a.png")]).await;
        panel.store().wait_idle().await;

        panel.toggle_selection_mode();
        panel.delete_selected().await;

        assert_eq!(panel.store().len().await, 1);
        assert!(panel.selection().is_active());
    }

    #[tokio::test]
    async fn test_batch_delete_skips_stale_ids() {
        let mut panel = panel(5);
        panel.attach(vec![png("a.png"), png("b.png")]).await;
        panel.store().wait_idle().await;

        panel.toggle_selection_mode();
        panel.select_all().await;

        // one entry disappears between selection and the batch action
        let stale = panel.store().ids().await.remove(0);
        panel.delete(DeleteTarget::Remote(stale)).await;

        panel.delete_selected().await;
        assert!(panel.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_set_limit_recomputes_errors() {
        let mut panel = panel(3);
        panel
            .attach(vec![png("a.png"), png("b.png"), png("c.png")])
            .await;
        panel.store().wait_idle().await;
        assert!(panel.store().error_messages().await.is_empty());

        panel.set_limit(limit(2)).await;
        assert_eq!(panel.store().error_messages().await.len(), 1);

        panel.set_limit(limit(3)).await;
        assert!(panel.store().error_messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_paste_without_files_is_noop() {
        let panel = panel(5);
        panel.paste(vec![]).await;
        assert!(panel.store().is_empty().await);

        panel.paste(vec![png("a.png")]).await;
        panel.store().wait_idle().await;
        assert_eq!(panel.store().len().await, 1);
    }
}
