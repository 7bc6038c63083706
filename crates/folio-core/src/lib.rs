//! Engines for block-tree editing, undo history, and page/definition
//! synchronization.
//!
//! [`folio_api`] holds the plain data types; this crate holds the behavior:
//! the [`BlockEditor`] with its bounded [`History`], the page-level
//! [`PageEditor`], the definition-authoritative synchronizer in [`sync`],
//! and the [`DefinitionRegistry`] pages are created through.

pub mod display;
pub mod editor;
pub mod history;
pub mod locale;
pub mod page_editor;
pub mod registry;
pub mod slug;
pub mod sync;
pub mod tree;

pub use display::{group_is_visible, is_field_visible, sorted_fields, sorted_groups};
pub use editor::{BlockEditor, InsertPosition, MoveDirection};
pub use history::{History, DEFAULT_MAX_HISTORY};
pub use locale::{display_string, localize, FALLBACK_LOCALE};
pub use page_editor::PageEditor;
pub use registry::DefinitionRegistry;
pub use slug::slugify;
pub use sync::{dehydrate_properties, sync_page_with_definition};
pub use tree::{find_block, locate_mut, new_block, new_block_id, validate_unique_ids};
