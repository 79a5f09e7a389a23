//! Generic XML element tree.
//!
//! The tree is produced once by [`parse`] (backed by `roxmltree`) and is only
//! read afterwards.

use crate::error::SvgError;

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Source position of an element's start tag (1-based).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// An XML element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// Local tag name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<Element>,
    /// Concatenated character data of a `<text>` element and its descendants.
    /// Empty for every other element.
    pub text: String,
    /// Where the element starts in the source.
    pub location: Location,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an attribute (builder style).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse XML text into an element tree rooted at the document element.
pub fn parse(text: &str) -> Result<Element, SvgError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = roxmltree::Document::parse_with_options(text, options)?;
    Ok(convert(&doc, doc.root_element()))
}

fn convert(doc: &roxmltree::Document<'_>, node: roxmltree::Node<'_, '_>) -> Element {
    let pos = doc.text_pos_at(node.range().start);

    let attributes = node
        .attributes()
        .map(|attr| {
            let name = match attr.namespace() {
                Some(XLINK_NS) => format!("xlink:{}", attr.name()),
                _ => attr.name().to_string(),
            };
            (name, attr.value().to_string())
        })
        .collect();

    let children = node
        .children()
        .filter(|n| n.is_element())
        .map(|n| convert(doc, n))
        .collect();

    let name = node.tag_name().name();
    let text = if name == "text" {
        node.descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect::<String>()
    } else {
        String::new()
    };

    Element {
        name: name.to_string(),
        attributes,
        children,
        text,
        location: Location {
            line: pos.row,
            column: pos.col,
        },
    }
}
