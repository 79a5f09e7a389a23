//! Resolved, backend-neutral values handed to a type provider.

use rustkit_codecs::RgbaImage;

/// A point in user space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Reflect `self` through `center`.
    pub fn reflected(self, center: Point) -> Point {
        Point::new(2.0 * center.x - self.x, 2.0 * center.y - self.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }

    pub fn min_y(&self) -> f32 {
        self.y
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn mid_y(&self) -> f32 {
        self.y + self.height / 2.0
    }
}

/// An RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
            a: 1.0,
        }
    }

    /// Multiply alpha by `opacity`.
    pub fn with_alpha(self, opacity: f32) -> Self {
        Self {
            a: (self.a * opacity).clamp(0.0, 1.0),
            ..self
        }
    }

    /// Black with alpha set to this color's relative luminance.
    ///
    /// Uses the `luminanceToAlpha` coefficients from the SVG filter spec.
    pub fn luminance_to_alpha(self) -> Self {
        let luminance = 0.2125 * self.r + 0.7154 * self.g + 0.0721 * self.b;
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: (luminance * self.a).clamp(0.0, 1.0),
        }
    }
}

/// 2D affine transform matrix.
///
/// Represents: `[a c tx]`
///             `[b d ty]`
///             `[0 0 1 ]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    pub fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Rotation by `angle` radians.
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Apply `other` in this transform's coordinate space (`self * other`).
    pub fn concatenating(&self, other: &Transform) -> Self {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One absolute path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Move(Point),
    Line(Point),
    Quad(Point, Point),
    Cubic(Point, Point, Point),
    Close,
}

/// A path of absolute segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn move_to(&mut self, p: Point) {
        self.segments.push(PathSegment::Move(p));
    }

    pub fn line_to(&mut self, p: Point) {
        self.segments.push(PathSegment::Line(p));
    }

    pub fn quad_to(&mut self, control: Point, p: Point) {
        self.segments.push(PathSegment::Quad(control, p));
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, p: Point) {
        self.segments.push(PathSegment::Cubic(c1, c2, p));
    }

    pub fn close(&mut self) {
        self.segments.push(PathSegment::Close);
    }

    /// Append all segments of `other`.
    pub fn extend(&mut self, other: &Path) {
        self.segments.extend_from_slice(&other.segments);
    }
}

/// Fill rule for path interiors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// Line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Compositing mode for subsequent drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Normal,
    Copy,
    SourceIn,
    DestinationIn,
}

/// A decoded raster image placed in user space.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub bounds: Rect,
    pub pixels: RgbaImage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_concatenating() {
        let t = Transform::translation(5.0, 10.0).concatenating(&Transform::scaling(2.0, 3.0));
        assert_eq!(t.apply(Point::new(10.0, 20.0)), Point::new(25.0, 70.0));
    }

    #[test]
    fn test_transform_rotation() {
        let p = Transform::rotation(std::f32::consts::FRAC_PI_2).apply(Point::new(1.0, 0.0));
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_color_alpha() {
        let c = Color::from_rgb8(255, 0, 0).with_alpha(0.5);
        assert_eq!(c, Color::new(1.0, 0.0, 0.0, 0.5));
    }

    #[test]
    fn test_luminance_to_alpha() {
        assert!((Color::from_rgb8(255, 255, 255).luminance_to_alpha().a - 1.0).abs() < 1e-6);
        assert_eq!(Color::BLACK.luminance_to_alpha().a, 0.0);
        let green = Color::from_rgb8(0, 255, 0).luminance_to_alpha();
        assert_eq!((green.r, green.g, green.b), (0.0, 0.0, 0.0));
        assert!((green.a - 0.7154).abs() < 1e-6);
    }
}
