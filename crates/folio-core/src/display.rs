//! Presentation-order and visibility logic for hydrated properties.
//!
//! Pure data decisions only; actual rendering belongs to the host
//! application.

use std::collections::BTreeMap;

use folio_api::{Property, PropertyGroup, PropertyType, StoredGroup, Value};

/// Hydrated groups sorted by their `order` key. Flat (unsynced) groups
/// carry no schema and are not displayable, so they are skipped.
pub fn sorted_groups(
    properties: &BTreeMap<String, StoredGroup>,
) -> Vec<(&str, &PropertyGroup)> {
    let mut groups: Vec<_> = properties
        .iter()
        .filter_map(|(id, stored)| stored.as_hydrated().map(|g| (id.as_str(), g)))
        .collect();
    groups.sort_by_key(|(_, group)| group.order);
    groups
}

/// Fields of one group sorted by their `order` key.
pub fn sorted_fields(fields: &BTreeMap<String, Property>) -> Vec<(&str, &Property)> {
    let mut sorted: Vec<_> = fields
        .iter()
        .map(|(id, field)| (id.as_str(), field))
        .collect();
    sorted.sort_by_key(|(_, field)| field.order);
    sorted
}

/// Whether a field should be shown. A `visible_if` rule always gates
/// first; in read-only mode, empty values are additionally hidden (text
/// needs a value for the requested locale, arrays need elements).
pub fn is_field_visible(
    field: &Property,
    properties: &BTreeMap<String, StoredGroup>,
    locale: &str,
    read_only: bool,
) -> bool {
    if let Some(rule) = &field.visible_if {
        if !rule.evaluate(properties) {
            return false;
        }
    }
    if !read_only {
        return true;
    }

    let value = &field.default_value;
    match field.prop_type {
        PropertyType::Text => match value {
            Value::Object(map) => map.get(locale).map(|v| !v.is_unset()).unwrap_or(false),
            Value::String(s) => !s.is_empty(),
            _ => false,
        },
        PropertyType::TextArray | PropertyType::PageReferenceArray => {
            matches!(value, Value::Array(items) if !items.is_empty())
        }
        _ => !value.is_unset(),
    }
}

/// A group is rendered only when at least one of its fields is visible.
pub fn group_is_visible(
    group: &PropertyGroup,
    properties: &BTreeMap<String, StoredGroup>,
    locale: &str,
    read_only: bool,
) -> bool {
    group
        .fields
        .values()
        .any(|field| is_field_visible(field, properties, locale, read_only))
}
