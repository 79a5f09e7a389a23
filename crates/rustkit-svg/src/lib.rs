//! # RustKit SVG
//!
//! Parses SVG documents and converts them into a stream of backend-agnostic
//! drawing commands.
//!
//! ## Features
//!
//! - **Parsing**: XML into an immutable document model, with per-element error
//!   positions and an option to skip invalid elements
//! - **Shapes**: line, circle, ellipse, rect, polyline, polygon, path, text, image
//! - **Structure**: g, switch, defs, use, clipPath, mask, linearGradient
//! - **Styling**: inline `style` over presentation attributes, inherited down the tree
//! - **Rendering**: commands generic over a backend's own value types
//!
//! ## Architecture
//!
//! ```text
//! SVG text
//!    └── xml::parse ──► xml::Element tree
//!           └── XmlParser ──► Svg (dom)
//!                  └── CommandBuilder + RendererTypeProvider
//!                         └── Vec<RendererCommand<T>> ──► Renderer
//! ```
//!
//! ## Example
//!
//! ```
//! use rustkit_svg::{BasicProvider, RendererCommand, Svg};
//!
//! let svg = Svg::parse(r#"<svg width="10" height="10"><rect width="5" height="5"/></svg>"#)?;
//! let commands = svg.commands(&BasicProvider::new());
//! assert!(matches!(commands[1], RendererCommand::Fill { .. }));
//! # Ok::<(), rustkit_svg::SvgError>(())
//! ```

pub mod attributes;
pub mod builder;
pub mod color;
pub mod dom;
pub mod error;
pub mod geometry;
pub mod image;
pub mod parser;
pub mod path;
pub mod provider;
pub mod renderer;
pub mod scanner;
pub mod state;
pub mod transform;
pub mod xml;

pub use builder::{build_commands, CommandBuilder};
pub use dom::{Definitions, Element, ElementKind, PresentationAttributes, Svg, ViewBox};
pub use error::{ScanError, SvgError};
pub use parser::{ParseOptions, XmlParser};
pub use provider::{BasicProvider, BasicTypes, TextShaper};
pub use renderer::{Renderer, RendererCommand, RendererTypeProvider, RendererTypes};

impl Svg {
    /// Parse SVG text with default options.
    pub fn parse(text: &str) -> Result<Self, SvgError> {
        Self::parse_with_options(text, ParseOptions::default())
    }

    /// Parse SVG text.
    pub fn parse_with_options(text: &str, options: ParseOptions) -> Result<Self, SvgError> {
        let root = xml::parse(text)?;
        XmlParser::new(options).parse_svg(&root)
    }

    /// Drawing commands for this document, using `provider`'s value types.
    pub fn commands<P: RendererTypeProvider>(
        &self,
        provider: &P,
    ) -> Vec<RendererCommand<P::Types>> {
        build_commands(self, provider)
    }
}
