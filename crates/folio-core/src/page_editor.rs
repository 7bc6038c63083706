//! Page-level undo/redo: title, properties and blocks watched as one unit.
//!
//! Unlike the block editor, captures here are deep-equality gated: callers
//! report "something may have changed" after editing the page, and a
//! capture is skipped when the serialized state is identical to the last
//! one, so no-op edits never produce empty undo steps.

use std::collections::BTreeMap;

use folio_api::{Block, Localized, Page, StoredGroup};
use tracing::debug;

use crate::history::{History, DEFAULT_MAX_HISTORY};

/// The slice of a page that participates in history.
#[derive(Debug, Clone, PartialEq)]
struct PageState {
    title: Localized,
    properties: BTreeMap<String, StoredGroup>,
    blocks: Vec<Block>,
}

impl PageState {
    fn of(page: &Page) -> Self {
        Self {
            title: page.title.clone(),
            properties: page.properties.clone(),
            blocks: page.blocks.clone(),
        }
    }

    fn apply(self, page: &mut Page) {
        page.title = self.title;
        page.properties = self.properties;
        page.blocks = self.blocks;
    }
}

/// Editing session over a whole page.
pub struct PageEditor {
    page: Page,
    history: History<PageState>,
    last_captured: PageState,
    paused: bool,
}

impl PageEditor {
    pub fn new(page: Page) -> Self {
        Self::with_max_history(page, DEFAULT_MAX_HISTORY)
    }

    pub fn with_max_history(page: Page, max_history: usize) -> Self {
        Self {
            last_captured: PageState::of(&page),
            page,
            history: History::with_max_size(max_history),
            paused: false,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutable access for edits; call [`Self::capture`] afterwards so the
    /// pre-edit state lands in history.
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Record the state preceding the latest edit. Skipped while paused
    /// and when nothing actually changed since the last capture.
    pub fn capture(&mut self) {
        if self.paused {
            debug!("history paused, skipping snapshot");
            return;
        }
        let current = PageState::of(&self.page);
        if current == self.last_captured {
            return;
        }
        self.history
            .record(std::mem::replace(&mut self.last_captured, current));
    }

    pub fn undo(&mut self) {
        let current = PageState::of(&self.page);
        if let Some(previous) = self.history.undo(current) {
            self.last_captured = previous.clone();
            previous.apply(&mut self.page);
        }
    }

    pub fn redo(&mut self) {
        let current = PageState::of(&self.page);
        if let Some(next) = self.history.redo(current) {
            self.last_captured = next.clone();
            next.apply(&mut self.page);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Suspend snapshotting during bulk programmatic updates.
    pub fn pause_history(&mut self) {
        self.paused = true;
    }

    /// Resume snapshotting. The current state becomes the new baseline,
    /// so the paused edits never enter the undo stack.
    pub fn resume_history(&mut self) {
        self.paused = false;
        self.last_captured = PageState::of(&self.page);
    }

    /// Drop all history; the current state becomes the baseline.
    pub fn reset_history(&mut self) {
        self.history.clear();
        self.last_captured = PageState::of(&self.page);
    }

    /// Replace the page wholesale (e.g. restoring a stored version)
    /// without polluting the undo stack.
    pub fn revert_to(&mut self, page: Page) {
        self.pause_history();
        self.page = page;
        self.resume_history();
        debug!(page = %self.page.id, "page replaced outside history");
    }

    /// Deep, independent snapshot of the page for persistence.
    pub fn save(&self) -> Page {
        self.page.clone()
    }
}
