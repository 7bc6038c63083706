use serde::{Deserialize, Serialize};

/// Discriminant tags for the closed set of block types.
///
/// Adding a new block type means extending this enum, its default-props
/// factory in [`BlockProps::default_for`], and (for nesting containers)
/// [`BlockType::is_container`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Section,
    Paragraph,
    Callout,
    Image,
}

impl BlockType {
    /// Only container-capable types may hold nested blocks.
    pub fn is_container(&self) -> bool {
        matches!(self, BlockType::Section | BlockType::Callout)
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockType::Section => "Section",
            BlockType::Paragraph => "Paragraph",
            BlockType::Callout => "Callout",
            BlockType::Image => "Image",
        };
        write!(f, "{}", name)
    }
}

/// A single inline element of a rich text run.
///
/// This is the minimal contract the editor needs: inline content is opaque
/// plain data that deep-copies and round-trips through serde. Rendering
/// fidelity is the host application's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text {
        id: String,
        content: String,
    },
    Link {
        id: String,
        href: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
        content: String,
    },
    Mention {
        id: String,
        page_id: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalloutVariant {
    #[default]
    Info,
    Success,
    Warning,
    Error,
    Commentary,
    Ideation,
    Source,
}

/// A heading section; one of the two container-capable block types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionProps {
    pub level: u8,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParagraphProps {
    #[serde(default)]
    pub text: Vec<Inline>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalloutProps {
    pub variant: CalloutVariant,
    #[serde(default)]
    pub children: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageProps {
    pub src: String,
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Type-dependent block payload. Exactly two variants carry `children`,
/// which is what makes the block tree recursive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BlockProps {
    Section(SectionProps),
    Paragraph(ParagraphProps),
    Callout(CalloutProps),
    Image(ImageProps),
}

impl BlockProps {
    /// Default-initialized props for a freshly inserted block of `block_type`.
    pub fn default_for(block_type: BlockType) -> Self {
        match block_type {
            BlockType::Section => BlockProps::Section(SectionProps {
                level: 2,
                title: "New Section".to_string(),
                description: None,
                children: Vec::new(),
            }),
            BlockType::Paragraph => BlockProps::Paragraph(ParagraphProps { text: Vec::new() }),
            BlockType::Callout => BlockProps::Callout(CalloutProps {
                variant: CalloutVariant::Info,
                children: Vec::new(),
                to: None,
                target: None,
            }),
            BlockType::Image => BlockProps::Image(ImageProps {
                src: "https://placehold.co/600x400".to_string(),
                alt: "Placeholder Image".to_string(),
                caption: None,
            }),
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockProps::Section(_) => BlockType::Section,
            BlockProps::Paragraph(_) => BlockType::Paragraph,
            BlockProps::Callout(_) => BlockType::Callout,
            BlockProps::Image(_) => BlockType::Image,
        }
    }

    pub fn children(&self) -> Option<&Vec<Block>> {
        match self {
            BlockProps::Section(p) => Some(&p.children),
            BlockProps::Callout(p) => Some(&p.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            BlockProps::Section(p) => Some(&mut p.children),
            BlockProps::Callout(p) => Some(&mut p.children),
            _ => None,
        }
    }

    /// Merges a template's props into ours. Scalar fields take the
    /// template's values; `children` keeps whatever the user already
    /// nested, so a template refresh never wipes nested content.
    pub fn merge_template(&mut self, template: &BlockProps) {
        match (self, template) {
            (BlockProps::Section(current), BlockProps::Section(incoming)) => {
                current.level = incoming.level;
                current.title = incoming.title.clone();
                current.description = incoming.description.clone();
            }
            (BlockProps::Callout(current), BlockProps::Callout(incoming)) => {
                current.variant = incoming.variant;
                current.to = incoming.to.clone();
                current.target = incoming.target.clone();
            }
            (current, incoming) => {
                *current = incoming.clone();
            }
        }
    }
}

/// A node in the recursive content tree of a page.
///
/// Ids are stable across saves and regenerated only on duplication. The
/// `is_templated` flag marks blocks seeded from a page definition rather
/// than authored by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub id: String,
    #[serde(default)]
    pub is_templated: bool,
    #[serde(flatten)]
    pub props: BlockProps,
}

impl Block {
    /// Create a default-initialized block of the given type.
    pub fn new(id: impl Into<String>, block_type: BlockType) -> Self {
        Self {
            id: id.into(),
            is_templated: false,
            props: BlockProps::default_for(block_type),
        }
    }

    /// Create a section block with an explicit level and title.
    pub fn section(id: impl Into<String>, level: u8, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_templated: false,
            props: BlockProps::Section(SectionProps {
                level,
                title: title.into(),
                description: None,
                children: Vec::new(),
            }),
        }
    }

    /// Builder: mark this block as originating from a page definition.
    pub fn templated(mut self) -> Self {
        self.is_templated = true;
        self
    }

    /// Builder: replace the nested children. No-op for non-container types.
    pub fn with_children(mut self, children: Vec<Block>) -> Self {
        if let Some(slot) = self.props.children_mut() {
            *slot = children;
        }
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.props.block_type()
    }

    pub fn is_container(&self) -> bool {
        self.block_type().is_container()
    }

    /// The section title, when this block is a section.
    pub fn section_title(&self) -> Option<&str> {
        match &self.props {
            BlockProps::Section(p) => Some(&p.title),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_serialization() {
        let block = Block::section("b-1", 2, "History").with_children(vec![Block::new(
            "b-2",
            BlockType::Paragraph,
        )]);

        let json = serde_json::to_string(&block).expect("Failed to serialize");
        let deserialized: Block = serde_json::from_str(&json).expect("Failed to deserialize");

        assert_eq!(block, deserialized);
    }

    #[test]
    fn test_templated_flag_defaults_to_false() {
        let json = r#"{"id":"b-1","type":"Paragraph","text":[]}"#;
        let block: Block = serde_json::from_str(json).unwrap();
        assert!(!block.is_templated);
        assert_eq!(block.block_type(), BlockType::Paragraph);
    }

    #[test]
    fn test_default_props_per_type() {
        let section = Block::new("s", BlockType::Section);
        match &section.props {
            BlockProps::Section(p) => {
                assert_eq!(p.level, 2);
                assert_eq!(p.title, "New Section");
                assert!(p.children.is_empty());
            }
            _ => panic!("expected section props"),
        }

        let callout = Block::new("c", BlockType::Callout);
        match &callout.props {
            BlockProps::Callout(p) => assert_eq!(p.variant, CalloutVariant::Info),
            _ => panic!("expected callout props"),
        }

        let image = Block::new("i", BlockType::Image);
        match &image.props {
            BlockProps::Image(p) => assert!(!p.src.is_empty()),
            _ => panic!("expected image props"),
        }
    }

    #[test]
    fn test_container_predicate() {
        assert!(BlockType::Section.is_container());
        assert!(BlockType::Callout.is_container());
        assert!(!BlockType::Paragraph.is_container());
        assert!(!BlockType::Image.is_container());

        assert!(Block::new("a", BlockType::Section).props.children().is_some());
        assert!(Block::new("b", BlockType::Image).props.children().is_none());
    }

    #[test]
    fn test_merge_template_preserves_children() {
        let mut existing = Block::section("s-1", 2, "Old Title")
            .with_children(vec![Block::new("p-1", BlockType::Paragraph)]);
        let template = Block::section("s-1", 3, "New Title").templated();

        existing.props.merge_template(&template.props);

        match &existing.props {
            BlockProps::Section(p) => {
                assert_eq!(p.level, 3);
                assert_eq!(p.title, "New Title");
                assert_eq!(p.children.len(), 1, "user-nested content must survive");
            }
            _ => panic!("expected section props"),
        }
    }

    #[test]
    fn test_merge_template_replaces_mismatched_variant() {
        let mut existing = Block::new("x", BlockType::Paragraph);
        let template = Block::new("x", BlockType::Image);
        existing.props.merge_template(&template.props);
        assert_eq!(existing.props.block_type(), BlockType::Image);
    }

    #[test]
    fn test_inline_serialization() {
        let text = vec![
            Inline::Text {
                id: "i-1".to_string(),
                content: "See ".to_string(),
            },
            Inline::Link {
                id: "i-2".to_string(),
                href: "https://example.com".to_string(),
                target: Some("_blank".to_string()),
                content: "this".to_string(),
            },
            Inline::Mention {
                id: "i-3".to_string(),
                page_id: "page-9".to_string(),
            },
        ];
        let json = serde_json::to_string(&text).unwrap();
        let parsed: Vec<Inline> = serde_json::from_str(&json).unwrap();
        assert_eq!(text, parsed);
    }
}
