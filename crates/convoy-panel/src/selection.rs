//! Selection state for batch actions

use std::collections::BTreeSet;

use convoy_core::AttachmentId;

/// Tracks which attachments are selected for a batch action.
///
/// The set is only meaningful while selection mode is active; it is
/// cleared on every mode toggle. Targets are validated against the store
/// at action time, not here.
#[derive(Debug, Default)]
pub struct SelectionController {
    active: bool,
    selected: BTreeSet<AttachmentId>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flip selection mode, clearing the set either way
    pub fn toggle_mode(&mut self) {
        self.active = !self.active;
        self.selected.clear();
    }

    /// Add the id if absent, remove it if present
    pub fn toggle(&mut self, id: impl Into<AttachmentId>) {
        let id = id.into();
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn select_all<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = AttachmentId>,
    {
        self.selected = ids.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Selected ids in stable (sorted) order
    pub fn selected_ids(&self) -> Vec<AttachmentId> {
        self.selected.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_symmetric_difference() {
        let mut selection = SelectionController::new();
        selection.toggle_mode();

        selection.toggle("a");
        selection.toggle("b");
        assert_eq!(selection.len(), 2);

        selection.toggle("a");
        assert!(!selection.is_selected("a"));
        assert!(selection.is_selected("b"));
    }

    #[test]
    fn test_toggle_mode_always_clears() {
        let mut selection = SelectionController::new();
        selection.toggle_mode();
        selection.toggle("a");

        selection.toggle_mode();
        assert!(!selection.is_active());
        assert!(selection.is_empty());

        // and entering again starts empty too
        selection.toggle_mode();
        assert!(selection.is_active());
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_all_replaces_set() {
        let mut selection = SelectionController::new();
        selection.toggle_mode();
        selection.toggle("stale");

        selection.select_all(["a".to_string(), "b".to_string()]);
        assert_eq!(selection.selected_ids(), ["a", "b"]);
        assert!(!selection.is_selected("stale"));
    }

    #[test]
    fn test_clear() {
        let mut selection = SelectionController::new();
        selection.toggle_mode();
        selection.toggle("a");
        selection.clear();
        assert!(selection.is_empty());
        assert!(selection.is_active());
    }
}
