//! Explicit registry of page definitions, keyed by page type.
//!
//! Host applications register their definitions at startup and pass the
//! registry by reference to whatever needs it; there is no ambient global
//! state.

use std::collections::HashMap;

use chrono::Utc;
use folio_api::{ContentError, Localized, Page, PageDefinition};
use tracing::debug;

use crate::slug::slugify;
use crate::sync::sync_page_with_definition;
use crate::tree::new_block_id;

#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: HashMap<String, PageDefinition>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition for `page_type`. Re-registering replaces the
    /// previous definition.
    pub fn register(&mut self, page_type: impl Into<String>, definition: PageDefinition) {
        let page_type = page_type.into();
        debug!(%page_type, "page definition registered");
        self.definitions.insert(page_type, definition);
    }

    pub fn register_all(
        &mut self,
        definitions: impl IntoIterator<Item = (String, PageDefinition)>,
    ) {
        for (page_type, definition) in definitions {
            self.register(page_type, definition);
        }
    }

    pub fn get(&self, page_type: &str) -> Option<&PageDefinition> {
        self.definitions.get(page_type)
    }

    pub fn contains(&self, page_type: &str) -> bool {
        self.definitions.contains_key(page_type)
    }

    /// Registered page types, sorted for stable presentation.
    pub fn page_types(&self) -> Vec<&str> {
        let mut types: Vec<_> = self.definitions.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Translation key for a page type's display label, with a
    /// conventional fallback for unregistered types.
    pub fn type_label_key(&self, page_type: &str) -> String {
        format!("page.type.{}", page_type.to_lowercase())
    }

    /// Create a fresh page of `page_type`: blocks seeded from the
    /// definition's starter layout, properties hydrated with schema
    /// defaults. Asking for an unregistered type is a caller bug and
    /// fails fast.
    pub fn create_page(&self, page_type: &str, slug: &str) -> Result<Page, ContentError> {
        let definition = self
            .get(page_type)
            .ok_or_else(|| ContentError::UnknownPageType {
                page_type: page_type.to_string(),
            })?;

        let now = Utc::now();
        let mut page = Page {
            id: new_block_id(),
            slug: slugify(slug),
            page_type: page_type.to_string(),
            title: Localized::new(),
            description: Localized::new(),
            tags: Vec::new(),
            properties: Default::default(),
            blocks: definition.initial_blocks().unwrap_or_default(),
            posted_at: None,
            created_at: now,
            updated_at: now,
        };
        sync_page_with_definition(&mut page, Some(definition));
        debug!(id = %page.id, page_type, "page created");
        Ok(page)
    }
}
