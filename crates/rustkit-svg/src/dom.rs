//! The SVG document model.
//!
//! A parsed [`Svg`] is an immutable tree of [`Element`]s. Every element carries
//! its own [`PresentationAttributes`], exactly as written; inheritance is
//! resolved later, while commands are built.

use std::collections::HashMap;
use std::str::FromStr;

use crate::geometry::{FillRule, LineCap, LineJoin, Point};
use crate::path::Segment;

pub use crate::color::Color;
pub use crate::transform::Transform;

// ==================== Document ====================

/// A parsed SVG document.
#[derive(Debug, Clone, PartialEq)]
pub struct Svg {
    /// Intrinsic width in user units.
    pub width: f32,
    /// Intrinsic height in user units.
    pub height: f32,
    pub view_box: Option<ViewBox>,
    /// The `<svg>` element itself, as a group holding the top-level children.
    pub root: Element,
    /// Every identified element, plus indexes of paint servers.
    pub defs: Definitions,
}

impl Svg {
    /// Top-level children in document order.
    pub fn children(&self) -> &[Element] {
        self.root.children()
    }

    /// The element with `id`, anywhere in the document.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.defs.element(&self.root, id)
    }

    /// Children of the `<clipPath>` with `id`.
    pub fn clip_path(&self, id: &str) -> Option<&[Element]> {
        self.defs.clip_path(&self.root, id)
    }

    /// Children of the `<mask>` with `id`.
    pub fn mask(&self, id: &str) -> Option<&[Element]> {
        self.defs.mask(&self.root, id)
    }

    pub fn linear_gradient(&self, id: &str) -> Option<&LinearGradient> {
        self.defs.linear_gradient(&self.root, id)
    }
}

/// The `viewBox` rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Identified elements of a document.
///
/// Built in a second pass over the finished tree. Each entry is the path of
/// child indexes leading from the root to the element, so lookups go through
/// the owning [`Svg`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    /// Every element with an `id`. The first occurrence of an id wins.
    pub elements: HashMap<String, Vec<usize>>,
    pub clip_paths: HashMap<String, Vec<usize>>,
    pub masks: HashMap<String, Vec<usize>>,
    pub linear_gradients: HashMap<String, Vec<usize>>,
}

impl Definitions {
    /// Index every identified element reachable from `root`, including `root`.
    pub fn index(root: &Element) -> Self {
        let mut defs = Definitions::default();
        defs.visit(root, &mut Vec::new());
        defs
    }

    fn visit(&mut self, element: &Element, path: &mut Vec<usize>) {
        if let Some(id) = &element.id {
            let table = match element.kind {
                ElementKind::ClipPath(_) => Some(&mut self.clip_paths),
                ElementKind::Mask(_) => Some(&mut self.masks),
                ElementKind::LinearGradient(_) => Some(&mut self.linear_gradients),
                _ => None,
            };
            if let Some(table) = table {
                table.entry(id.clone()).or_insert_with(|| path.clone());
            }
            self.elements
                .entry(id.clone())
                .or_insert_with(|| path.clone());
        }
        for (i, child) in element.children().iter().enumerate() {
            path.push(i);
            self.visit(child, path);
            path.pop();
        }
    }

    /// Look up any element by id.
    pub fn element<'a>(&self, root: &'a Element, id: &str) -> Option<&'a Element> {
        resolve(root, self.elements.get(id)?)
    }

    /// Children of the clip path with `id`.
    pub fn clip_path<'a>(&self, root: &'a Element, id: &str) -> Option<&'a [Element]> {
        resolve(root, self.clip_paths.get(id)?).map(Element::children)
    }

    /// Children of the mask with `id`.
    pub fn mask<'a>(&self, root: &'a Element, id: &str) -> Option<&'a [Element]> {
        resolve(root, self.masks.get(id)?).map(Element::children)
    }

    pub fn linear_gradient<'a>(&self, root: &'a Element, id: &str) -> Option<&'a LinearGradient> {
        match resolve(root, self.linear_gradients.get(id)?).map(|e| &e.kind) {
            Some(ElementKind::LinearGradient(gradient)) => Some(gradient),
            _ => None,
        }
    }
}

fn resolve<'a>(root: &'a Element, path: &[usize]) -> Option<&'a Element> {
    path.iter()
        .try_fold(root, |element, &i| element.children().get(i))
}

// ==================== Elements ====================

/// A graphics, container or definition element.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: Option<String>,
    pub attributes: PresentationAttributes,
    pub kind: ElementKind,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: None,
            attributes: PresentationAttributes::default(),
            kind,
        }
    }

    /// Child elements; empty for anything that is not a container.
    pub fn children(&self) -> &[Element] {
        match &self.kind {
            ElementKind::Group(c)
            | ElementKind::Switch(c)
            | ElementKind::Defs(c)
            | ElementKind::ClipPath(c)
            | ElementKind::Mask(c) => &c.children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Group(Container),
    Switch(Container),
    Defs(Container),
    ClipPath(Container),
    Mask(Container),
    Use(Use),
    Line(Line),
    Circle(Circle),
    Ellipse(Ellipse),
    Rect(Rect),
    Polyline(Polyline),
    Polygon(Polygon),
    Path(Path),
    Text(Text),
    Image(Image),
    LinearGradient(LinearGradient),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    pub children: Vec<Element>,
}

/// `<use>`: a reference to another element, drawn at an offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Use {
    /// Raw reference, usually `#id`.
    pub href: String,
    pub x: f32,
    pub y: f32,
}

impl Use {
    /// The referenced id (the fragment after `#`).
    pub fn target(&self) -> Option<&str> {
        self.href
            .split_once('#')
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Circle {
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ellipse {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rx: Option<f32>,
    pub ry: Option<f32>,
}

impl Rect {
    /// Corner radii; a missing radius takes the value of the other one.
    pub fn radii(&self) -> (f32, f32) {
        let rx = self.rx.or(self.ry).unwrap_or(0.0);
        let ry = self.ry.or(self.rx).unwrap_or(0.0);
        (rx, ry)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Text {
    pub x: f32,
    pub y: f32,
    /// Trimmed character content, never empty.
    pub value: String,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
}

/// `<image>` with an inline `data:` URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub x: f32,
    pub y: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearGradient {
    pub stops: Vec<Stop>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Position along the gradient vector, `0.0..=1.0`.
    pub offset: f32,
    pub color: Color,
    pub opacity: f32,
}

// ==================== Presentation attributes ====================

/// Styling attributes as declared on one element. `None` means "inherit".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationAttributes {
    pub opacity: Option<f32>,
    pub display: Option<Display>,
    pub fill: Option<Color>,
    pub fill_opacity: Option<f32>,
    pub fill_rule: Option<FillRule>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f32>,
    pub stroke_opacity: Option<f32>,
    pub stroke_linecap: Option<LineCap>,
    pub stroke_linejoin: Option<LineJoin>,
    pub stroke_miterlimit: Option<f32>,
    /// `none` is stored as an empty list.
    pub stroke_dasharray: Option<Vec<f32>>,
    /// Not inherited.
    pub transform: Option<Vec<Transform>>,
    /// Id of the referenced `<clipPath>`. Not inherited.
    pub clip_path: Option<String>,
    /// Id of the referenced `<mask>`. Not inherited.
    pub mask: Option<String>,
}

/// The `display` property. Only `none` affects rendering; every other display
/// type behaves as `inline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    #[default]
    Inline,
    None,
}

/// A keyword that did not match any allowed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKeyword;

impl FromStr for Display {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inline" | "block" | "inline-block" | "list-item" | "table" | "flex" | "grid" => {
                Ok(Display::Inline)
            }
            "none" => Ok(Display::None),
            _ => Err(UnknownKeyword),
        }
    }
}

impl FromStr for FillRule {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nonzero" => Ok(FillRule::NonZero),
            "evenodd" => Ok(FillRule::EvenOdd),
            _ => Err(UnknownKeyword),
        }
    }
}

impl FromStr for LineCap {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "round" => Ok(LineCap::Round),
            "square" => Ok(LineCap::Square),
            _ => Err(UnknownKeyword),
        }
    }
}

impl FromStr for LineJoin {
    type Err = UnknownKeyword;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "miter" => Ok(LineJoin::Miter),
            "round" => Ok(LineJoin::Round),
            "bevel" => Ok(LineJoin::Bevel),
            _ => Err(UnknownKeyword),
        }
    }
}
