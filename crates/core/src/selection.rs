//! Row selection state for a rendered list page.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::types::RecordId;

/// Tri-state of the "select all" header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// The set of selected row ids on the current page.
///
/// Selection does not survive page navigation; callers clear it whenever a
/// new page is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one row. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.selected.remove(&id) {
            false
        } else {
            self.selected.insert(id);
            true
        }
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selected.contains(id)
    }

    /// Header checkbox click: selects every page row unless all of them are
    /// already selected, in which case it clears them.
    pub fn toggle_all(&mut self, page_ids: &[RecordId]) {
        if self.header_state(page_ids) == HeaderState::Checked {
            for id in page_ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(page_ids.iter().cloned());
        }
    }

    pub fn header_state(&self, page_ids: &[RecordId]) -> HeaderState {
        let selected = page_ids.iter().filter(|id| self.selected.contains(id)).count();
        if selected == 0 {
            HeaderState::Unchecked
        } else if selected == page_ids.len() {
            HeaderState::Checked
        } else {
            HeaderState::Indeterminate
        }
    }

    pub fn selected_ids(&self) -> &BTreeSet<RecordId> {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}
