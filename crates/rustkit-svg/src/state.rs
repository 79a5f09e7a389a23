//! Inherited drawing state.

use crate::dom::{Color, Display, PresentationAttributes};
use crate::geometry::{self, FillRule, LineCap, LineJoin};

/// Fully resolved presentation values in effect for an element.
///
/// Transform, clip path and mask are not part of the state: they apply to the
/// element that declares them and reach descendants through the command
/// stream.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub opacity: f32,
    pub display: Display,
    pub fill: Color,
    pub fill_opacity: f32,
    pub fill_rule: FillRule,
    pub stroke: Color,
    pub stroke_width: f32,
    pub stroke_opacity: f32,
    pub stroke_linecap: LineCap,
    pub stroke_linejoin: LineJoin,
    pub stroke_miterlimit: f32,
    pub stroke_dasharray: Vec<f32>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            display: Display::Inline,
            fill: Color::Keyword("black".to_string()),
            fill_opacity: 1.0,
            fill_rule: FillRule::NonZero,
            stroke: Color::None,
            stroke_width: 1.0,
            stroke_opacity: 1.0,
            stroke_linecap: LineCap::Butt,
            stroke_linejoin: LineJoin::Miter,
            stroke_miterlimit: 4.0,
            stroke_dasharray: Vec::new(),
        }
    }
}

impl State {
    /// State of a child declaring `attributes` under `self`. Declared values win.
    pub fn merge(&self, attributes: &PresentationAttributes) -> State {
        State {
            opacity: attributes.opacity.unwrap_or(self.opacity),
            display: attributes.display.unwrap_or(self.display),
            fill: attributes.fill.clone().unwrap_or_else(|| self.fill.clone()),
            fill_opacity: attributes.fill_opacity.unwrap_or(self.fill_opacity),
            fill_rule: attributes.fill_rule.unwrap_or(self.fill_rule),
            stroke: attributes
                .stroke
                .clone()
                .unwrap_or_else(|| self.stroke.clone()),
            stroke_width: attributes.stroke_width.unwrap_or(self.stroke_width),
            stroke_opacity: attributes.stroke_opacity.unwrap_or(self.stroke_opacity),
            stroke_linecap: attributes.stroke_linecap.unwrap_or(self.stroke_linecap),
            stroke_linejoin: attributes.stroke_linejoin.unwrap_or(self.stroke_linejoin),
            stroke_miterlimit: attributes
                .stroke_miterlimit
                .unwrap_or(self.stroke_miterlimit),
            stroke_dasharray: attributes
                .stroke_dasharray
                .clone()
                .unwrap_or_else(|| self.stroke_dasharray.clone()),
        }
    }

    /// Fill color with fill opacity and opacity applied, or `None` for no fill.
    pub fn fill_color(&self) -> Option<geometry::Color> {
        self.fill
            .rgba()
            .map(|c| c.with_alpha(self.fill_opacity * self.opacity))
    }

    /// Stroke color with stroke opacity and opacity applied, or `None` for no stroke.
    pub fn stroke_color(&self) -> Option<geometry::Color> {
        self.stroke
            .rgba()
            .map(|c| c.with_alpha(self.stroke_opacity * self.opacity))
    }
}
