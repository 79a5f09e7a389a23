//! A provider backed by the crate's own geometry types.

use std::fmt;

use crate::geometry::{
    BlendMode, Color, FillRule, Image, LineCap, LineJoin, Path, Point, Rect, Size, Transform,
};
use crate::renderer::{RendererTypeProvider, RendererTypes};

/// Control point distance for a quarter circle drawn with one cubic.
const KAPPA: f32 = 0.552_284_8;

/// [`RendererTypes`] using [`crate::geometry`] values unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicTypes;

impl RendererTypes for BasicTypes {
    type Float = f32;
    type Point = Point;
    type Rect = Rect;
    type Size = Size;
    type Color = Color;
    type Transform = Transform;
    type Path = Path;
    type BlendMode = BlendMode;
    type FillRule = FillRule;
    type LineCap = LineCap;
    type LineJoin = LineJoin;
    type Image = Image;
}

/// Turns text into outlines for [`BasicProvider`].
pub trait TextShaper {
    fn shape(&self, text: &str, font: &str, origin: Point, size: f32) -> Option<Path>;
}

/// Provider for [`BasicTypes`].
///
/// Text produces no path unless a [`TextShaper`] is installed.
#[derive(Default)]
pub struct BasicProvider {
    shaper: Option<Box<dyn TextShaper>>,
}

impl BasicProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_shaper(mut self, shaper: impl TextShaper + 'static) -> Self {
        self.shaper = Some(Box::new(shaper));
        self
    }
}

impl fmt::Debug for BasicProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicProvider")
            .field("shaper", &self.shaper.is_some())
            .finish()
    }
}

impl RendererTypeProvider for BasicProvider {
    type Types = BasicTypes;

    fn create_float(&self, value: f32) -> f32 {
        value
    }

    fn create_point(&self, point: Point) -> Point {
        point
    }

    fn create_rect(&self, rect: Rect) -> Rect {
        rect
    }

    fn create_size(&self, size: Size) -> Size {
        size
    }

    fn create_color(&self, color: Color) -> Color {
        color
    }

    fn create_transform(&self, transform: Transform) -> Transform {
        transform
    }

    fn create_blend_mode(&self, mode: BlendMode) -> BlendMode {
        mode
    }

    fn create_fill_rule(&self, rule: FillRule) -> FillRule {
        rule
    }

    fn create_line_cap(&self, cap: LineCap) -> LineCap {
        cap
    }

    fn create_line_join(&self, join: LineJoin) -> LineJoin {
        join
    }

    fn create_image(&self, image: &Image) -> Option<Image> {
        Some(image.clone())
    }

    fn create_path(&self, path: &Path) -> Path {
        path.clone()
    }

    fn create_path_from_subpaths(&self, paths: &[Path]) -> Path {
        let mut combined = Path::new();
        for path in paths {
            combined.extend(path);
        }
        combined
    }

    fn create_ellipse(&self, rect: &Rect) -> Path {
        let (cx, cy) = (rect.mid_x(), rect.mid_y());
        let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);

        let mut path = Path::new();
        path.move_to(Point::new(cx + rx, cy));
        path.cubic_to(
            Point::new(cx + rx, cy + ky),
            Point::new(cx + kx, cy + ry),
            Point::new(cx, cy + ry),
        );
        path.cubic_to(
            Point::new(cx - kx, cy + ry),
            Point::new(cx - rx, cy + ky),
            Point::new(cx - rx, cy),
        );
        path.cubic_to(
            Point::new(cx - rx, cy - ky),
            Point::new(cx - kx, cy - ry),
            Point::new(cx, cy - ry),
        );
        path.cubic_to(
            Point::new(cx + kx, cy - ry),
            Point::new(cx + rx, cy - ky),
            Point::new(cx + rx, cy),
        );
        path.close();
        path
    }

    fn create_line(&self, from: &Point, to: &Point) -> Path {
        let mut path = Path::new();
        path.move_to(*from);
        path.line_to(*to);
        path
    }

    fn create_polyline(&self, points: &[Point]) -> Path {
        let mut path = Path::new();
        if let Some((first, rest)) = points.split_first() {
            path.move_to(*first);
            for point in rest {
                path.line_to(*point);
            }
        }
        path
    }

    fn create_polygon(&self, points: &[Point]) -> Path {
        let mut path = self.create_polyline(points);
        if !path.is_empty() {
            path.close();
        }
        path
    }

    fn create_rounded_rect(&self, rect: &Rect, radii: &Size) -> Path {
        // `clamp` would panic on a negative extent.
        let rx = radii.width.min(rect.width / 2.0).max(0.0);
        let ry = radii.height.min(rect.height / 2.0).max(0.0);

        let mut path = Path::new();
        if rx == 0.0 || ry == 0.0 {
            path.move_to(Point::new(rect.min_x(), rect.min_y()));
            path.line_to(Point::new(rect.max_x(), rect.min_y()));
            path.line_to(Point::new(rect.max_x(), rect.max_y()));
            path.line_to(Point::new(rect.min_x(), rect.max_y()));
            path.close();
            return path;
        }

        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        let (x0, y0, x1, y1) = (rect.min_x(), rect.min_y(), rect.max_x(), rect.max_y());

        path.move_to(Point::new(x0 + rx, y0));
        path.line_to(Point::new(x1 - rx, y0));
        path.cubic_to(
            Point::new(x1 - rx + kx, y0),
            Point::new(x1, y0 + ry - ky),
            Point::new(x1, y0 + ry),
        );
        path.line_to(Point::new(x1, y1 - ry));
        path.cubic_to(
            Point::new(x1, y1 - ry + ky),
            Point::new(x1 - rx + kx, y1),
            Point::new(x1 - rx, y1),
        );
        path.line_to(Point::new(x0 + rx, y1));
        path.cubic_to(
            Point::new(x0 + rx - kx, y1),
            Point::new(x0, y1 - ry + ky),
            Point::new(x0, y1 - ry),
        );
        path.line_to(Point::new(x0, y0 + ry));
        path.cubic_to(
            Point::new(x0, y0 + ry - ky),
            Point::new(x0 + rx - kx, y0),
            Point::new(x0 + rx, y0),
        );
        path.close();
        path
    }

    fn create_text(&self, text: &str, font: &str, origin: &Point, size: &f32) -> Option<Path> {
        self.shaper
            .as_ref()
            .and_then(|shaper| shaper.shape(text, font, *origin, *size))
    }
}
