//! Structural mutations over a page's block tree, with bounded undo/redo.
//!
//! Every public mutation funnels through [`BlockEditor::begin_mutation`],
//! which snapshots the pre-mutation tree into the history before anything
//! is touched. Mutating the tree through any other path breaks the
//! undo/redo contract, which is why the editor owns its `Vec<Block>`.

use folio_api::{Block, BlockProps, BlockType, ContentError};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::history::{History, DEFAULT_MAX_HISTORY};
use crate::tree::{
    locate_mut, locate_owner, new_block, regenerate_ids, resolve_container_mut,
    validate_unique_ids,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    fn offset(self) -> isize {
        match self {
            MoveDirection::Up => -1,
            MoveDirection::Down => 1,
        }
    }
}

/// In-memory editing session over one page's block tree.
pub struct BlockEditor {
    blocks: Vec<Block>,
    history: History<Vec<Block>>,
    committed: Vec<Block>,
}

impl BlockEditor {
    /// Start a session over `blocks`. The supplied tree becomes the
    /// committed baseline. Ids must already be unique; use
    /// [`Self::try_new`] for trees that have not been validated.
    pub fn new(blocks: Vec<Block>) -> Self {
        Self::with_max_history(blocks, DEFAULT_MAX_HISTORY)
    }

    /// Fallible constructor for trees of unknown provenance: rejects a
    /// tree with duplicate ids instead of silently editing it.
    pub fn try_new(blocks: Vec<Block>) -> Result<Self, ContentError> {
        validate_unique_ids(&blocks)?;
        Ok(Self::with_max_history(blocks, DEFAULT_MAX_HISTORY))
    }

    pub fn with_max_history(blocks: Vec<Block>, max_history: usize) -> Self {
        debug_assert!(
            validate_unique_ids(&blocks).is_ok(),
            "block tree with duplicate ids handed to editor"
        );
        Self {
            committed: blocks.clone(),
            blocks,
            history: History::with_max_size(max_history),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Snapshot the pre-mutation state. Called exactly once at the top of
    /// every mutation, before the tree is touched.
    fn begin_mutation(&mut self) {
        self.history.record(self.blocks.clone());
    }

    /// Insert a default-initialized block of `block_type`. With no target
    /// the block is appended at the tree root; otherwise it is spliced
    /// immediately before/after the target in the target's own container.
    /// Returns the new block's id, or `None` when the target is missing.
    pub fn insert(
        &mut self,
        block_type: BlockType,
        target_id: Option<&str>,
        position: InsertPosition,
    ) -> Option<String> {
        self.begin_mutation();
        let block = new_block(block_type);
        let id = block.id.clone();

        match target_id {
            None => {
                self.blocks.push(block);
            }
            Some(target) => {
                let Some((owner, index)) = locate_mut(&mut self.blocks, target) else {
                    warn!(target, "insert target not found");
                    return None;
                };
                let insert_at = match position {
                    InsertPosition::After => index + 1,
                    InsertPosition::Before => index,
                };
                owner.insert(insert_at, block);
            }
        }
        debug!(%id, ?block_type, "block inserted");
        Some(id)
    }

    /// Splice out the block and its entire subtree. Silent no-op when the
    /// id is not present.
    pub fn remove(&mut self, id: &str) {
        self.begin_mutation();
        let Some((owner, index)) = locate_mut(&mut self.blocks, id) else {
            warn!(id, "block not found for removal");
            return;
        };
        owner.remove(index);
        debug!(id, "block removed");
    }

    /// Swap the block with its immediate sibling in `direction`, staying
    /// within its own container. No-op at either end of the array.
    pub fn move_block(&mut self, id: &str, direction: MoveDirection) {
        self.begin_mutation();
        let Some((owner, index)) = locate_mut(&mut self.blocks, id) else {
            warn!(id, "block not found for move");
            return;
        };
        let new_index = index as isize + direction.offset();
        if new_index >= 0 && (new_index as usize) < owner.len() {
            owner.swap(index, new_index as usize);
        }
    }

    /// Deep-clone the block and its subtree, regenerate every id in the
    /// clone, and insert it immediately after the original. Returns the
    /// clone's new root id.
    pub fn duplicate(&mut self, id: &str) -> Option<String> {
        self.begin_mutation();
        let Some((owner, index)) = locate_mut(&mut self.blocks, id) else {
            warn!(id, "block not found for duplication");
            return None;
        };
        let mut clone = owner[index].clone();
        regenerate_ids(&mut clone);
        let clone_id = clone.id.clone();
        owner.insert(index + 1, clone);
        debug!(original = id, clone = %clone_id, "block duplicated");
        Some(clone_id)
    }

    /// Cross-container move: remove the block, then splice it into the
    /// target container (the root array for `None`) at `target_index`,
    /// clamped into bounds. When the target cannot be resolved, the block
    /// is re-inserted at its original location; the tree is never left
    /// with a node missing.
    pub fn relocate(&mut self, id: &str, target_container: Option<&str>, target_index: usize) {
        self.begin_mutation();
        let Some((source_container, source_index)) = locate_owner(&self.blocks, id) else {
            warn!(id, "block not found for relocation");
            return;
        };

        let block = match resolve_container_mut(&mut self.blocks, source_container.as_deref()) {
            Some(owner) => owner.remove(source_index),
            // Unreachable: the owner was just resolved from this tree.
            None => return,
        };

        match resolve_container_mut(&mut self.blocks, target_container) {
            Some(target) => {
                let index = target_index.min(target.len());
                target.insert(index, block);
                debug!(id, ?target_container, index, "block relocated");
            }
            None => {
                warn!(id, ?target_container, "relocation target unusable, rolling back");
                if let Some(owner) =
                    resolve_container_mut(&mut self.blocks, source_container.as_deref())
                {
                    let index = source_index.min(owner.len());
                    owner.insert(index, block);
                }
            }
        }
    }

    /// In-place edit of a block's props. The closure runs against the
    /// live props; children edited through it are part of the same undo
    /// step. Silent no-op when the id is not present.
    pub fn update_props(&mut self, id: &str, edit: impl FnOnce(&mut BlockProps)) {
        self.begin_mutation();
        let Some((owner, index)) = locate_mut(&mut self.blocks, id) else {
            warn!(id, "block not found for props update");
            return;
        };
        edit(&mut owner[index].props);
        debug!(id, "block props updated");
    }

    pub fn undo(&mut self) {
        if let Some(previous) = self.history.undo(self.blocks.clone()) {
            self.blocks = previous;
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.history.redo(self.blocks.clone()) {
            self.blocks = next;
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of retained undo steps.
    pub fn history_depth(&self) -> usize {
        self.history.depth()
    }

    /// Deep snapshot of the current tree for persistence. Also becomes
    /// the new baseline for [`Self::has_unsaved_changes`].
    pub fn commit(&mut self) -> Vec<Block> {
        let snapshot = self.blocks.clone();
        self.committed = snapshot.clone();
        snapshot
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.blocks != self.committed
    }
}
