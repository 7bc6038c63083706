//! Structural helpers over the recursive block tree.
//!
//! The central contract is [`locate_mut`]: a depth-first search that hands
//! back the owning array plus index instead of a node pointer, so callers
//! can splice siblings without parent-pointer bookkeeping.

use std::collections::HashSet;

use folio_api::{Block, BlockType, ContentError};
use uuid::Uuid;

/// Mint a fresh block id. V7 so ids sort roughly by creation time.
pub fn new_block_id() -> String {
    Uuid::now_v7().to_string()
}

/// Construct a default-initialized block of `block_type` with a fresh id.
pub fn new_block(block_type: BlockType) -> Block {
    Block::new(new_block_id(), block_type)
}

/// Depth-first search for `id`, returning the array that owns the node and
/// the node's index within it. Descends only through container children.
pub fn locate_mut<'a>(
    blocks: &'a mut Vec<Block>,
    id: &str,
) -> Option<(&'a mut Vec<Block>, usize)> {
    if let Some(index) = blocks.iter().position(|b| b.id == id) {
        return Some((blocks, index));
    }
    for block in blocks.iter_mut() {
        if let Some(children) = block.props.children_mut() {
            if let Some(found) = locate_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Non-borrowing locate: reports the id of the container owning `id`
/// (`None` for the root array) and the index within that container.
pub fn locate_owner(blocks: &[Block], id: &str) -> Option<(Option<String>, usize)> {
    fn walk(
        blocks: &[Block],
        id: &str,
        owner: Option<&str>,
    ) -> Option<(Option<String>, usize)> {
        for (index, block) in blocks.iter().enumerate() {
            if block.id == id {
                return Some((owner.map(str::to_string), index));
            }
            if let Some(children) = block.props.children() {
                if let Some(found) = walk(children, id, Some(&block.id)) {
                    return Some(found);
                }
            }
        }
        None
    }
    walk(blocks, id, None)
}

/// Resolve a container handle to its child array: the root array for
/// `None`, otherwise the children of the named block. Returns `None` when
/// the block is missing or not container-capable.
pub fn resolve_container_mut<'a>(
    blocks: &'a mut Vec<Block>,
    container_id: Option<&str>,
) -> Option<&'a mut Vec<Block>> {
    match container_id {
        None => Some(blocks),
        Some(id) => {
            let (owner, index) = locate_mut(blocks, id)?;
            owner[index].props.children_mut()
        }
    }
}

/// Immutable lookup of a block anywhere in the tree.
pub fn find_block<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(children) = block.props.children() {
            if let Some(found) = find_block(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Regenerate the id of `block` and every descendant. Used when cloning a
/// subtree so the copy never collides with the original.
pub fn regenerate_ids(block: &mut Block) {
    block.id = new_block_id();
    if let Some(children) = block.props.children_mut() {
        for child in children {
            regenerate_ids(child);
        }
    }
}

/// Collect every id in the tree, depth-first.
pub fn collect_ids(blocks: &[Block], out: &mut Vec<String>) {
    for block in blocks {
        out.push(block.id.clone());
        if let Some(children) = block.props.children() {
            collect_ids(children, out);
        }
    }
}

/// Reject trees that violate the id-uniqueness invariant. Such a tree
/// indicates a caller bug upstream and must fail fast rather than be
/// silently edited.
pub fn validate_unique_ids(blocks: &[Block]) -> Result<(), ContentError> {
    let mut ids = Vec::new();
    collect_ids(blocks, &mut ids);
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.clone()) {
            return Err(ContentError::DuplicateBlockId { id });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_api::BlockProps;

    fn sample_tree() -> Vec<Block> {
        vec![
            Block::new("p-1", BlockType::Paragraph),
            Block::section("s-1", 2, "Outer").with_children(vec![
                Block::new("p-2", BlockType::Paragraph),
                Block::new("c-1", BlockType::Callout)
                    .with_children(vec![Block::new("p-3", BlockType::Paragraph)]),
            ]),
        ]
    }

    #[test]
    fn test_locate_at_root() {
        let mut blocks = sample_tree();
        let (owner, index) = locate_mut(&mut blocks, "p-1").unwrap();
        assert_eq!(index, 0);
        assert_eq!(owner.len(), 2);
    }

    #[test]
    fn test_locate_nested() {
        let mut blocks = sample_tree();
        let (owner, index) = locate_mut(&mut blocks, "p-3").unwrap();
        assert_eq!(index, 0);
        assert_eq!(owner.len(), 1);
        assert!(locate_mut(&mut blocks, "nope").is_none());
    }

    #[test]
    fn test_locate_owner_reports_container() {
        let blocks = sample_tree();
        assert_eq!(locate_owner(&blocks, "p-1"), Some((None, 0)));
        assert_eq!(
            locate_owner(&blocks, "p-2"),
            Some((Some("s-1".to_string()), 0))
        );
        assert_eq!(
            locate_owner(&blocks, "p-3"),
            Some((Some("c-1".to_string()), 0))
        );
        assert_eq!(locate_owner(&blocks, "nope"), None);
    }

    #[test]
    fn test_resolve_container() {
        let mut blocks = sample_tree();
        assert_eq!(resolve_container_mut(&mut blocks, None).unwrap().len(), 2);
        assert_eq!(
            resolve_container_mut(&mut blocks, Some("s-1")).unwrap().len(),
            2
        );
        // An image/paragraph is not container-capable.
        assert!(resolve_container_mut(&mut blocks, Some("p-1")).is_none());
        assert!(resolve_container_mut(&mut blocks, Some("nope")).is_none());
    }

    #[test]
    fn test_regenerate_ids_recurses() {
        let mut blocks = sample_tree();
        let mut before = Vec::new();
        collect_ids(&blocks, &mut before);

        regenerate_ids(&mut blocks[1]);

        let mut after = Vec::new();
        collect_ids(&blocks, &mut after);
        assert_eq!(before.len(), after.len());
        // Every id under s-1 changed; p-1 kept its id.
        assert_eq!(after[0], "p-1");
        for id in &after[1..] {
            assert!(!before.contains(id));
        }
        // Shape untouched.
        match &blocks[1].props {
            BlockProps::Section(p) => assert_eq!(p.children.len(), 2),
            _ => panic!("expected section"),
        }
    }

    #[test]
    fn test_validate_unique_ids() {
        let blocks = sample_tree();
        assert!(validate_unique_ids(&blocks).is_ok());

        let duplicated = vec![
            Block::new("dup", BlockType::Paragraph),
            Block::section("s", 2, "S").with_children(vec![Block::new(
                "dup",
                BlockType::Paragraph,
            )]),
        ];
        assert_eq!(
            validate_unique_ids(&duplicated),
            Err(ContentError::DuplicateBlockId {
                id: "dup".to_string()
            })
        );
    }
}
