//! Error types for SVG parsing.

use thiserror::Error;

/// A scanner failure at an exact byte offset of the scanned text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} at offset {index}")]
pub struct ScanError {
    /// What the scanner was looking for.
    pub expected: &'static str,
    /// Byte offset of the cursor when the scan failed.
    pub index: usize,
}

/// Errors that can occur while parsing an SVG document.
#[derive(Error, Debug)]
pub enum SvgError {
    #[error("Invalid value for attribute `{name}`: {value:?}")]
    InvalidAttributeValue { name: String, value: String },

    #[error("Missing attribute `{0}`")]
    MissingAttribute(String),

    #[error("Invalid element <{name}> at {line}:{column}: {source}")]
    InvalidElement {
        name: String,
        line: u32,
        column: u32,
        #[source]
        source: Box<SvgError>,
    },

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Unresolved reference: #{0}")]
    UnresolvedReference(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Invalid style declaration: {0}")]
    Style(#[from] rustkit_cssparser::ParseError),
}

impl SvgError {
    pub(crate) fn invalid_value(name: &str, value: &str) -> Self {
        SvgError::InvalidAttributeValue {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

impl From<roxmltree::Error> for SvgError {
    fn from(err: roxmltree::Error) -> Self {
        SvgError::Xml(err.to_string())
    }
}
