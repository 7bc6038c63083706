//! Resolving possibly-localized values to display strings.
//!
//! Stored values may be plain scalars, `{locale: string}` maps, or nested
//! localed structures written by older shapes. Resolution always degrades
//! to the empty string; malformed input is never an error.

use std::collections::BTreeMap;

use folio_api::{Localized, Value};

/// Fallback locale consulted whenever the requested one is absent.
pub const FALLBACK_LOCALE: &str = "en";

/// Resolve a plain locale-keyed label map: requested locale, then the
/// fallback, then the first non-empty entry, then the empty string.
/// An empty entry counts as absent at every step.
pub fn localize<'a>(field: &'a Localized, locale: &str) -> &'a str {
    let non_empty = |s: &&String| !s.is_empty();
    field
        .get(locale)
        .filter(non_empty)
        .or_else(|| field.get(FALLBACK_LOCALE).filter(non_empty))
        .or_else(|| field.values().find(non_empty))
        .map(String::as_str)
        .unwrap_or("")
}

/// Resolve an arbitrary value to a display string for `locale`.
///
/// Scalars stringify directly. Objects are treated as locale maps:
/// requested locale then `"en"`; a nested object gets one more level of
/// the same lookup before falling back to its first string-typed value.
/// When the lookup fails entirely, the first non-empty string among the
/// object's own values is used. Anything else resolves to `""`.
pub fn display_string(value: &Value, locale: &str) -> String {
    let object = match value {
        Value::Null => return String::new(),
        Value::String(s) => return s.clone(),
        Value::Integer(i) => return i.to_string(),
        Value::Float(f) => return f.to_string(),
        Value::Boolean(b) => return b.to_string(),
        Value::Array(items) => {
            return items
                .iter()
                .map(|item| display_string(item, locale))
                .find(|s| !s.is_empty())
                .unwrap_or_default();
        }
        Value::Object(map) => map,
    };

    if let Some(found) = object.get(locale).or_else(|| object.get(FALLBACK_LOCALE)) {
        match found {
            Value::String(s) => return s.clone(),
            Value::Object(nested) => {
                if let Some(Value::String(s)) =
                    nested.get(locale).or_else(|| nested.get(FALLBACK_LOCALE))
                {
                    return s.clone();
                }
                if let Some(s) = first_string(nested) {
                    return s.to_string();
                }
            }
            Value::Integer(i) => return i.to_string(),
            Value::Float(f) => return f.to_string(),
            Value::Boolean(b) => return b.to_string(),
            _ => {}
        }
    }

    object
        .values()
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_default()
}

fn first_string(map: &BTreeMap<String, Value>) -> Option<&str> {
    map.values().find_map(Value::as_str)
}
