use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::Value;

/// Locale-keyed display strings, e.g. `{"en": "Title", "de": "Titel"}`.
pub type Localized = BTreeMap<String, String>;

/// Build a `Localized` map holding a single English value.
pub fn localized_en(value: impl Into<String>) -> Localized {
    let mut map = Localized::new();
    map.insert("en".to_string(), value.into());
    map
}

/// The renderer/validator to use for a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    Number,
    Text,
    TextArray,
    Enum,
    PageReference,
    PageReferenceArray,
}

/// Declarative conditional-visibility rule evaluated against the full
/// property set. Kept as data (rather than a closure) so definitions
/// deep-copy and serialize like everything else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum VisibleIf {
    FieldEquals {
        group: String,
        field: String,
        value: Value,
    },
    FieldNotEmpty {
        group: String,
        field: String,
    },
}

impl VisibleIf {
    pub fn evaluate(&self, properties: &BTreeMap<String, StoredGroup>) -> bool {
        match self {
            VisibleIf::FieldEquals {
                group,
                field,
                value,
            } => properties
                .get(group)
                .and_then(|g| g.value_of(field))
                .map(|v| v == value)
                .unwrap_or(false),
            VisibleIf::FieldNotEmpty { group, field } => properties
                .get(group)
                .and_then(|g| g.value_of(field))
                .map(|v| !v.is_unset())
                .unwrap_or(false),
        }
    }
}

/// A single schema-described field. In a hydrated page the live value sits
/// in `default_value`; on an unhydrated definition it is the schema default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub label: Localized,
    #[serde(rename = "type")]
    pub prop_type: PropertyType,
    #[serde(default)]
    pub default_value: Value,
    /// Allowed values; required when `prop_type` is `Enum`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Page types a reference may point at; required for reference types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_page_types: Vec<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<VisibleIf>,
}

impl Property {
    pub fn new(label: Localized, prop_type: PropertyType) -> Self {
        Self {
            label,
            prop_type,
            default_value: Value::Null,
            options: Vec::new(),
            allowed_page_types: Vec::new(),
            order: 0,
            visible_if: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn with_allowed_page_types(mut self, page_types: Vec<String>) -> Self {
        self.allowed_page_types = page_types;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_visible_if(mut self, rule: VisibleIf) -> Self {
        self.visible_if = Some(rule);
        self
    }
}

/// A named group of properties, rendered together.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyGroup {
    pub label: Localized,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_open")]
    pub default_open: bool,
    pub fields: BTreeMap<String, Property>,
}

fn default_open() -> bool {
    true
}

impl PropertyGroup {
    pub fn new(label: Localized) -> Self {
        Self {
            label,
            order: 0,
            default_open: true,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_field(mut self, id: impl Into<String>, field: Property) -> Self {
        self.fields.insert(id.into(), field);
        self
    }
}

/// One entry of a page's stored properties.
///
/// Pages loaded from an external store may predate their current
/// definition: a group is either hydrated (full schema descriptors with
/// live values) or a flat map of bare values written by an older shape.
/// The synchronizer accepts both and always emits hydrated groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredGroup {
    Hydrated(PropertyGroup),
    Flat(BTreeMap<String, Value>),
}

impl StoredGroup {
    pub fn as_hydrated(&self) -> Option<&PropertyGroup> {
        match self {
            StoredGroup::Hydrated(group) => Some(group),
            _ => None,
        }
    }

    /// Look up a field's live value regardless of storage shape.
    pub fn value_of(&self, field_id: &str) -> Option<&Value> {
        match self {
            StoredGroup::Hydrated(group) => {
                group.fields.get(field_id).map(|f| &f.default_value)
            }
            StoredGroup::Flat(values) => values.get(field_id),
        }
    }
}

/// Factory producing the canonical templated-block skeleton for a page type.
///
/// A factory (not a static list) because definitions may mint fresh ids per
/// evaluation; the synchronizer's identity rules tolerate that for sections.
pub type InitialBlocks = Arc<dyn Fn() -> Vec<Block> + Send + Sync>;

/// The schema for one page type: property groups plus an optional starter
/// block layout.
#[derive(Clone, Default)]
pub struct PageDefinition {
    pub properties: BTreeMap<String, PropertyGroup>,
    pub initial_blocks: Option<InitialBlocks>,
}

impl PageDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, id: impl Into<String>, group: PropertyGroup) -> Self {
        self.properties.insert(id.into(), group);
        self
    }

    pub fn with_initial_blocks<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> Vec<Block> + Send + Sync + 'static,
    {
        self.initial_blocks = Some(Arc::new(factory));
        self
    }

    /// Evaluate the starter-block factory, if one is declared.
    pub fn initial_blocks(&self) -> Option<Vec<Block>> {
        self.initial_blocks.as_ref().map(|factory| factory())
    }
}

// Arc<dyn Fn> has no Debug; render presence only.
impl fmt::Debug for PageDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageDefinition")
            .field("properties", &self.properties)
            .field("initial_blocks", &self.initial_blocks.is_some())
            .finish()
    }
}

/// A page document: hydrated properties plus the recursive block tree,
/// with the bookkeeping fields an external store tracks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: String,
    pub slug: String,
    pub page_type: String,
    #[serde(default)]
    pub title: Localized,
    #[serde(default)]
    pub description: Localized,
    #[serde(default)]
    pub tags: Vec<Localized>,
    #[serde(default)]
    pub properties: BTreeMap<String, StoredGroup>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    #[test]
    fn test_stored_group_deserializes_hydrated() {
        let json = serde_json::json!({
            "label": { "en": "Meta" },
            "fields": {
                "category": {
                    "label": { "en": "Category" },
                    "type": "text",
                    "default_value": "News"
                }
            }
        });
        let group: StoredGroup = serde_json::from_value(json).unwrap();
        assert!(group.as_hydrated().is_some());
        assert_eq!(
            group.value_of("category"),
            Some(&Value::String("News".to_string()))
        );
    }

    #[test]
    fn test_stored_group_deserializes_flat() {
        let json = serde_json::json!({ "category": "News", "readingTime": 5 });
        let group: StoredGroup = serde_json::from_value(json).unwrap();
        assert!(group.as_hydrated().is_none());
        assert_eq!(group.value_of("readingTime"), Some(&Value::Integer(5)));
    }

    #[test]
    fn test_visible_if_field_equals() {
        let mut properties = BTreeMap::new();
        properties.insert(
            "meta".to_string(),
            StoredGroup::Flat(BTreeMap::from([(
                "kind".to_string(),
                Value::String("weapon".to_string()),
            )])),
        );

        let rule = VisibleIf::FieldEquals {
            group: "meta".to_string(),
            field: "kind".to_string(),
            value: Value::String("weapon".to_string()),
        };
        assert!(rule.evaluate(&properties));

        let rule = VisibleIf::FieldEquals {
            group: "meta".to_string(),
            field: "kind".to_string(),
            value: Value::String("armor".to_string()),
        };
        assert!(!rule.evaluate(&properties));

        let rule = VisibleIf::FieldNotEmpty {
            group: "meta".to_string(),
            field: "missing".to_string(),
        };
        assert!(!rule.evaluate(&properties));
    }

    #[test]
    fn test_definition_initial_blocks_factory() {
        let definition = PageDefinition::new().with_initial_blocks(|| {
            vec![Block::section("tpl-1", 2, "History").templated()]
        });

        let blocks = definition.initial_blocks().unwrap();
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].is_templated);
        assert_eq!(blocks[0].block_type(), BlockType::Section);

        assert!(PageDefinition::new().initial_blocks().is_none());
    }

    #[test]
    fn test_page_serde_roundtrip() {
        let page = Page {
            id: "p-1".to_string(),
            slug: "my-page".to_string(),
            page_type: "Character".to_string(),
            title: localized_en("My Page"),
            description: Localized::new(),
            tags: vec![],
            properties: BTreeMap::new(),
            blocks: vec![Block::new("b-1", BlockType::Paragraph)],
            posted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&page).unwrap();
        let parsed: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(page, parsed);
    }
}
