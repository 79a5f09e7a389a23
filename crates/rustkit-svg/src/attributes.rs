//! Typed access to an element's attributes.
//!
//! Values come from two sources: the inline `style` declarations and the XML
//! attributes. A property set in `style` takes precedence over the attribute
//! of the same name.

use std::collections::HashMap;
use std::str::FromStr;

use crate::color::Color;
use crate::error::SvgError;
use crate::geometry::Point;
use crate::scanner::{CharSet, Scanner};
use crate::transform::Transform;
use crate::xml;

/// Attribute lookup for one element.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    element: HashMap<String, String>,
    style: HashMap<String, String>,
}

impl Attributes {
    /// Collect the attributes of `element`, parsing its `style` attribute.
    pub fn new(element: &xml::Element) -> Result<Self, SvgError> {
        let mut style = HashMap::new();
        if let Some(text) = element.attribute("style") {
            for decl in rustkit_cssparser::parse_declarations(text)? {
                style.insert(decl.property, decl.value);
            }
        }

        Ok(Self {
            element: element.attributes.iter().cloned().collect(),
            style,
        })
    }

    /// Raw value of `name`, style first. `inherit` reads as absent.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.style
            .get(name)
            .or_else(|| self.element.get(name))
            .map(|v| v.trim())
            .filter(|v| *v != "inherit")
    }

    pub fn parse_string(&self, name: &str) -> Option<String> {
        self.value(name).map(str::to_string)
    }

    /// A number, optionally suffixed with `px`.
    pub fn parse_coordinate(&self, name: &str) -> Result<Option<f32>, SvgError> {
        self.parse_with(name, |text| {
            let mut scanner = Scanner::new(text);
            let value = scanner.scan_coordinate().ok()?;
            scanner.scan_literal("px");
            scanner.is_at_end().then_some(value)
        })
    }

    pub fn parse_float(&self, name: &str) -> Result<Option<f32>, SvgError> {
        self.parse_with(name, |text| {
            let mut scanner = Scanner::new(text);
            let value = scanner.scan_coordinate().ok()?;
            scanner.is_at_end().then_some(value)
        })
    }

    /// A number or percentage; `50%` reads as `0.5`.
    pub fn parse_percentage(&self, name: &str) -> Result<Option<f32>, SvgError> {
        self.parse_with(name, |text| {
            let mut scanner = Scanner::new(text);
            let value = scanner.scan_percentage().ok()?;
            scanner.is_at_end().then_some(value)
        })
    }

    pub fn parse_color(&self, name: &str) -> Result<Option<Color>, SvgError> {
        self.parse_with(name, Color::parse)
    }

    /// A `fill` or `stroke` value. Paint server references are not painted:
    /// `url(#id) <color>` uses the fallback color and a bare `url(#id)` is `none`.
    pub fn parse_paint(&self, name: &str) -> Result<Option<Color>, SvgError> {
        self.parse_with(name, |text| match text.strip_prefix("url(") {
            Some(rest) => {
                let (_, fallback) = rest.split_once(')')?;
                match fallback.trim() {
                    "" => Some(Color::None),
                    fallback => Color::parse(fallback),
                }
            }
            None => Color::parse(text),
        })
    }

    /// A keyword attribute.
    pub fn parse_raw<T: FromStr>(&self, name: &str) -> Result<Option<T>, SvgError> {
        self.parse_with(name, |text| text.parse().ok())
    }

    /// A whitespace or comma separated list of numbers.
    pub fn parse_floats(&self, name: &str) -> Result<Option<Vec<f32>>, SvgError> {
        self.parse_with(name, parse_floats)
    }

    /// A list of `x,y` pairs. A trailing unpaired number is dropped.
    pub fn parse_points(&self, name: &str) -> Result<Option<Vec<Point>>, SvgError> {
        self.parse_with(name, |text| {
            let values = parse_floats(text)?;
            Some(
                values
                    .chunks_exact(2)
                    .map(|pair| Point::new(pair[0], pair[1]))
                    .collect(),
            )
        })
    }

    /// An element reference: `url(#id)`, `url('#id')` or `#id`.
    /// `none` reads as absent.
    pub fn parse_url_selector(&self, name: &str) -> Result<Option<String>, SvgError> {
        match self.value(name) {
            Some("none") | None => Ok(None),
            Some(text) => parse_url_selector(text)
                .map(Some)
                .ok_or_else(|| SvgError::invalid_value(name, text)),
        }
    }

    pub fn parse_transform(&self, name: &str) -> Result<Option<Vec<Transform>>, SvgError> {
        self.parse_with(name, Transform::parse_list)
    }

    fn parse_with<T>(
        &self,
        name: &str,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<Option<T>, SvgError> {
        match self.value(name) {
            Some(text) => parse(text)
                .map(Some)
                .ok_or_else(|| SvgError::invalid_value(name, text)),
            None => Ok(None),
        }
    }
}

fn parse_floats(text: &str) -> Option<Vec<f32>> {
    let mut scanner = Scanner::new(text);
    let mut values = Vec::new();
    while !scanner.is_at_end() {
        values.push(scanner.scan_coordinate().ok()?);
        scanner.scan_first(CharSet::Chars(","));
    }
    Some(values)
}

fn parse_url_selector(text: &str) -> Option<String> {
    let mut scanner = Scanner::new(text);
    let id = if scanner.scan_literal("url(").is_some() {
        let quote = scanner.scan_first(CharSet::Chars("'\""));
        scanner.scan_literal("#")?;
        let id = scanner.scan_up_to(CharSet::Chars(")'\" \t"))?;
        if let Some(quote) = quote {
            scanner.scan_first(CharSet::Chars(if quote == '"' { "\"" } else { "'" }))?;
        }
        scanner.scan_literal(")")?;
        id
    } else {
        scanner.scan_literal("#")?;
        scanner.scan_up_to(CharSet::Whitespace)?
    };
    scanner.is_at_end().then(|| id.to_string())
}
