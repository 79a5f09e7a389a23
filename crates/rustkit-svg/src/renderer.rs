//! Backend-agnostic drawing commands.
//!
//! A backend names its own value types through [`RendererTypes`] and creates
//! them through a [`RendererTypeProvider`]. The command builder emits
//! [`RendererCommand`]s carrying those types, which a [`Renderer`] replays.

use std::fmt::Debug;

use crate::geometry::{BlendMode, Color, FillRule, Image, LineCap, LineJoin, Path, Point, Rect, Size};

/// The concrete value types of one backend.
pub trait RendererTypes {
    type Float: Debug + Clone + PartialEq;
    type Point: Debug + Clone + PartialEq;
    type Rect: Debug + Clone + PartialEq;
    type Size: Debug + Clone + PartialEq;
    type Color: Debug + Clone + PartialEq;
    type Transform: Debug + Clone + PartialEq;
    type Path: Debug + Clone + PartialEq;
    type BlendMode: Debug + Clone + PartialEq;
    type FillRule: Debug + Clone + PartialEq;
    type LineCap: Debug + Clone + PartialEq;
    type LineJoin: Debug + Clone + PartialEq;
    type Image: Debug + Clone + PartialEq;
}

/// Converts resolved values into backend values.
pub trait RendererTypeProvider {
    type Types: RendererTypes;

    fn create_float(&self, value: f32) -> <Self::Types as RendererTypes>::Float;
    fn create_point(&self, point: Point) -> <Self::Types as RendererTypes>::Point;
    fn create_rect(&self, rect: Rect) -> <Self::Types as RendererTypes>::Rect;
    fn create_size(&self, size: Size) -> <Self::Types as RendererTypes>::Size;
    fn create_color(&self, color: Color) -> <Self::Types as RendererTypes>::Color;
    fn create_transform(
        &self,
        transform: crate::geometry::Transform,
    ) -> <Self::Types as RendererTypes>::Transform;
    fn create_blend_mode(&self, mode: BlendMode) -> <Self::Types as RendererTypes>::BlendMode;
    fn create_fill_rule(&self, rule: FillRule) -> <Self::Types as RendererTypes>::FillRule;
    fn create_line_cap(&self, cap: LineCap) -> <Self::Types as RendererTypes>::LineCap;
    fn create_line_join(&self, join: LineJoin) -> <Self::Types as RendererTypes>::LineJoin;

    /// `None` if the backend cannot represent the image.
    fn create_image(&self, image: &Image) -> Option<<Self::Types as RendererTypes>::Image>;

    fn create_path(&self, path: &Path) -> <Self::Types as RendererTypes>::Path;

    /// A single path made of all `paths`.
    fn create_path_from_subpaths(
        &self,
        paths: &[<Self::Types as RendererTypes>::Path],
    ) -> <Self::Types as RendererTypes>::Path;

    /// Ellipse inscribed in `rect`.
    fn create_ellipse(
        &self,
        rect: &<Self::Types as RendererTypes>::Rect,
    ) -> <Self::Types as RendererTypes>::Path;

    fn create_line(
        &self,
        from: &<Self::Types as RendererTypes>::Point,
        to: &<Self::Types as RendererTypes>::Point,
    ) -> <Self::Types as RendererTypes>::Path;

    fn create_polyline(
        &self,
        points: &[<Self::Types as RendererTypes>::Point],
    ) -> <Self::Types as RendererTypes>::Path;

    /// Closed polyline.
    fn create_polygon(
        &self,
        points: &[<Self::Types as RendererTypes>::Point],
    ) -> <Self::Types as RendererTypes>::Path;

    fn create_rounded_rect(
        &self,
        rect: &<Self::Types as RendererTypes>::Rect,
        radii: &<Self::Types as RendererTypes>::Size,
    ) -> <Self::Types as RendererTypes>::Path;

    /// Outline of `text` with its baseline starting at `origin`, or `None` if
    /// the backend has no text support.
    fn create_text(
        &self,
        text: &str,
        font: &str,
        origin: &<Self::Types as RendererTypes>::Point,
        size: &<Self::Types as RendererTypes>::Float,
    ) -> Option<<Self::Types as RendererTypes>::Path>;
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RendererCommand<T: RendererTypes> {
    PushState,
    PopState,
    PushTransparencyLayer,
    PopTransparencyLayer,

    Concatenate(T::Transform),
    Translate { tx: T::Float, ty: T::Float },
    Rotate(T::Float),
    Scale { sx: T::Float, sy: T::Float },

    SetFill(T::Color),
    SetStroke(T::Color),
    SetLineWidth(T::Float),
    SetLineCap(T::LineCap),
    SetLineJoin(T::LineJoin),
    SetLineMiterLimit(T::Float),
    SetClip(T::Path),
    SetBlendMode(T::BlendMode),

    Stroke(T::Path),
    Fill { path: T::Path, rule: T::FillRule },
    DrawImage(T::Image),
}

/// A sink for [`RendererCommand`]s.
///
/// Every command has its own method, defaulting to a no-op, so a backend
/// implements only what it supports. [`Renderer::perform`] dispatches one
/// command to its method.
pub trait Renderer {
    type Types: RendererTypes;

    fn push_state(&mut self) {}
    fn pop_state(&mut self) {}
    fn push_transparency_layer(&mut self) {}
    fn pop_transparency_layer(&mut self) {}

    fn concatenate(&mut self, _transform: &<Self::Types as RendererTypes>::Transform) {}
    fn translate(
        &mut self,
        _tx: &<Self::Types as RendererTypes>::Float,
        _ty: &<Self::Types as RendererTypes>::Float,
    ) {
    }
    /// Rotate by `angle` radians.
    fn rotate(&mut self, _angle: &<Self::Types as RendererTypes>::Float) {}
    fn scale(
        &mut self,
        _sx: &<Self::Types as RendererTypes>::Float,
        _sy: &<Self::Types as RendererTypes>::Float,
    ) {
    }

    fn set_fill_color(&mut self, _color: &<Self::Types as RendererTypes>::Color) {}
    fn set_stroke_color(&mut self, _color: &<Self::Types as RendererTypes>::Color) {}
    fn set_line_width(&mut self, _width: &<Self::Types as RendererTypes>::Float) {}
    fn set_line_cap(&mut self, _cap: &<Self::Types as RendererTypes>::LineCap) {}
    fn set_line_join(&mut self, _join: &<Self::Types as RendererTypes>::LineJoin) {}
    fn set_line_miter_limit(&mut self, _limit: &<Self::Types as RendererTypes>::Float) {}
    fn set_clip(&mut self, _path: &<Self::Types as RendererTypes>::Path) {}
    fn set_blend_mode(&mut self, _mode: &<Self::Types as RendererTypes>::BlendMode) {}

    fn stroke(&mut self, _path: &<Self::Types as RendererTypes>::Path) {}
    fn fill(
        &mut self,
        _path: &<Self::Types as RendererTypes>::Path,
        _rule: &<Self::Types as RendererTypes>::FillRule,
    ) {
    }
    fn draw_image(&mut self, _image: &<Self::Types as RendererTypes>::Image) {}

    fn perform(&mut self, command: &RendererCommand<Self::Types>) {
        match command {
            RendererCommand::PushState => self.push_state(),
            RendererCommand::PopState => self.pop_state(),
            RendererCommand::PushTransparencyLayer => self.push_transparency_layer(),
            RendererCommand::PopTransparencyLayer => self.pop_transparency_layer(),
            RendererCommand::Concatenate(transform) => self.concatenate(transform),
            RendererCommand::Translate { tx, ty } => self.translate(tx, ty),
            RendererCommand::Rotate(angle) => self.rotate(angle),
            RendererCommand::Scale { sx, sy } => self.scale(sx, sy),
            RendererCommand::SetFill(color) => self.set_fill_color(color),
            RendererCommand::SetStroke(color) => self.set_stroke_color(color),
            RendererCommand::SetLineWidth(width) => self.set_line_width(width),
            RendererCommand::SetLineCap(cap) => self.set_line_cap(cap),
            RendererCommand::SetLineJoin(join) => self.set_line_join(join),
            RendererCommand::SetLineMiterLimit(limit) => self.set_line_miter_limit(limit),
            RendererCommand::SetClip(path) => self.set_clip(path),
            RendererCommand::SetBlendMode(mode) => self.set_blend_mode(mode),
            RendererCommand::Stroke(path) => self.stroke(path),
            RendererCommand::Fill { path, rule } => self.fill(path, rule),
            RendererCommand::DrawImage(image) => self.draw_image(image),
        }
    }

    fn perform_all(&mut self, commands: &[RendererCommand<Self::Types>]) {
        for command in commands {
            self.perform(command);
        }
    }
}
