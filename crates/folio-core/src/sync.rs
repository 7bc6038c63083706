//! Reconciles a stored page against its current page definition.
//!
//! The definition is authoritative for shape: groups and fields it does
//! not declare are dropped, ones the page lacks are added with schema
//! defaults. Values the user already set always win over defaults. Stored
//! data may be stale or loosely shaped (flat value maps, mismatched key
//! casing); every such case degrades to a default, never to an error.

use std::collections::BTreeMap;

use chrono::Utc;
use folio_api::{
    Block, BlockProps, Page, PageDefinition, Property, StoredGroup, Value,
};
use tracing::debug;

/// Bring `page.properties` and `page.blocks` into conformance with
/// `definition`, preserving every user-set value and all user-authored
/// blocks. `updated_at` is bumped only when something actually changed.
/// With no definition the page passes through untouched.
///
/// Applying this twice in a row yields the same page as applying it once.
pub fn sync_page_with_definition(page: &mut Page, definition: Option<&PageDefinition>) {
    let Some(definition) = definition else {
        return;
    };

    let mut changed = false;

    let existing = std::mem::take(&mut page.properties);
    let mut updated: BTreeMap<String, StoredGroup> = BTreeMap::new();

    for (group_id, definition_group) in &definition.properties {
        let existing_group = find_group(&existing, group_id);

        let mut fields = BTreeMap::new();
        for (field_id, definition_field) in &definition_group.fields {
            let value = resolve_field_value(existing_group, field_id, definition_field);
            let mut field = definition_field.clone();
            field.default_value = value;
            fields.insert(field_id.clone(), field);
        }

        let mut group = definition_group.clone();
        group.fields = fields;
        updated.insert(group_id.clone(), StoredGroup::Hydrated(group));
    }
    // Any shape drift counts: added or dropped groups, flat groups
    // hydrated, values resolved away from legacy casing.
    if updated != existing {
        changed = true;
    }
    page.properties = updated;

    if let Some(template) = definition.initial_blocks() {
        sync_blocks(&mut page.blocks, &template, &mut changed);
    }

    if changed {
        page.updated_at = Utc::now();
    }
}

/// Locate an existing group by exact key, falling back to a
/// case-insensitive match for legacy data.
fn find_group<'a>(
    properties: &'a BTreeMap<String, StoredGroup>,
    group_id: &str,
) -> Option<&'a StoredGroup> {
    properties.get(group_id).or_else(|| {
        properties
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(group_id))
            .map(|(_, group)| group)
    })
}

/// Resolve the live value for one field: schema default, overridden by a
/// hydrated value, then a flat value, then a case-insensitive flat match.
fn resolve_field_value(
    existing_group: Option<&StoredGroup>,
    field_id: &str,
    definition_field: &Property,
) -> Value {
    let Some(group) = existing_group else {
        return definition_field.default_value.clone();
    };
    match group {
        StoredGroup::Hydrated(hydrated) => {
            if let Some(field) = hydrated.fields.get(field_id) {
                return field.default_value.clone();
            }
        }
        StoredGroup::Flat(values) => {
            if let Some(value) = values.get(field_id) {
                return value.clone();
            }
            if let Some((_, value)) = values
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(field_id))
            {
                return value.clone();
            }
        }
    }
    definition_field.default_value.clone()
}

/// Two blocks are the same for merge purposes when their ids match, or
/// when both are sections with the same title. The title heuristic is a
/// deliberate policy: definitions may mint fresh ids per evaluation, and
/// a renamed id must not wipe a section the user already filled in.
/// First match wins when two template sections share a title.
fn same_block(a: &Block, b: &Block) -> bool {
    if a.id == b.id {
        return true;
    }
    match (&a.props, &b.props) {
        (BlockProps::Section(x), BlockProps::Section(y)) => x.title == y.title,
        _ => false,
    }
}

fn sync_blocks(current: &mut Vec<Block>, template: &[Block], changed: &mut bool) {
    // Keep every user-authored block unconditionally; keep a templated
    // block only while its definition entry still exists.
    let mut merged: Vec<Block> = Vec::with_capacity(current.len());
    for block in current.drain(..) {
        if !block.is_templated || template.iter().any(|t| same_block(&block, t)) {
            merged.push(block);
        } else {
            debug!(id = %block.id, "pruning stale templated block");
            *changed = true;
        }
    }

    // Walk template blocks in declared order: missing ones are inserted
    // right after the previously matched position, matched ones are
    // refreshed in place without touching user-nested children.
    let mut last_matched: isize = -1;
    for template_block in template {
        if let Some(index) = merged.iter().position(|b| same_block(b, template_block)) {
            let before = merged[index].props.clone();
            merged[index].props.merge_template(&template_block.props);
            if merged[index].props != before {
                *changed = true;
            }
            last_matched = index as isize;
        } else {
            let insert_at = ((last_matched + 1) as usize).min(merged.len());
            debug!(id = %template_block.id, "inserting missing templated block");
            merged.insert(insert_at, template_block.clone());
            last_matched = insert_at as isize;
            *changed = true;
        }
    }

    *current = merged;
}

/// Strip schema descriptors from hydrated properties, leaving bare values
/// per group, the shape an external store persists.
pub fn dehydrate_properties(
    properties: &BTreeMap<String, StoredGroup>,
) -> BTreeMap<String, BTreeMap<String, Value>> {
    properties
        .iter()
        .map(|(group_id, group)| {
            let values = match group {
                StoredGroup::Hydrated(hydrated) => hydrated
                    .fields
                    .iter()
                    .map(|(field_id, field)| (field_id.clone(), field.default_value.clone()))
                    .collect(),
                StoredGroup::Flat(values) => values.clone(),
            };
            (group_id.clone(), values)
        })
        .collect()
}
