//! Shared helpers: a provider whose paths record how they were built, and a
//! renderer that records what it was asked to do.

#![allow(dead_code)]

use rustkit_svg::geometry::{
    BlendMode, Color, FillRule, Image, LineCap, LineJoin, Path, Point, Rect, Size, Transform,
};
use rustkit_svg::{
    ParseOptions, Renderer, RendererCommand, RendererTypeProvider, RendererTypes, Svg,
};

/// A path described by the provider call that created it.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Ellipse(Rect),
    Line(Point, Point),
    Polyline(Vec<Point>),
    Polygon(Vec<Point>),
    RoundedRect(Rect, Size),
    Path(Path),
    Text { text: String, font: String, origin: Point, size: f32 },
    Compound(Vec<Shape>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbols;

impl RendererTypes for Symbols {
    type Float = f32;
    type Point = Point;
    type Rect = Rect;
    type Size = Size;
    type Color = Color;
    type Transform = Transform;
    type Path = Shape;
    type BlendMode = BlendMode;
    type FillRule = FillRule;
    type LineCap = LineCap;
    type LineJoin = LineJoin;
    /// Pixel size and placement.
    type Image = (u32, u32, Rect);
}

#[derive(Debug, Default)]
pub struct SymbolProvider {
    pub supports_text: bool,
}

impl RendererTypeProvider for SymbolProvider {
    type Types = Symbols;

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
    fn create_image(&self, image: &Image) -> Option<(u32, u32, Rect)> {
        Some((image.pixels.width(), image.pixels.height(), image.bounds))
    }
    fn create_path(&self, path: &Path) -> Shape {
        Shape::Path(path.clone())
    }
    fn create_path_from_subpaths(&self, paths: &[Shape]) -> Shape {
        Shape::Compound(paths.to_vec())
    }
    fn create_ellipse(&self, rect: &Rect) -> Shape {
        Shape::Ellipse(*rect)
    }
    fn create_line(&self, from: &Point, to: &Point) -> Shape {
        Shape::Line(*from, *to)
    }
    fn create_polyline(&self, points: &[Point]) -> Shape {
        Shape::Polyline(points.to_vec())
    }
    fn create_polygon(&self, points: &[Point]) -> Shape {
        Shape::Polygon(points.to_vec())
    }
    fn create_rounded_rect(&self, rect: &Rect, radii: &Size) -> Shape {
        Shape::RoundedRect(*rect, *radii)
    }
    fn create_text(&self, text: &str, font: &str, origin: &Point, size: &f32) -> Option<Shape> {
        self.supports_text.then(|| Shape::Text {
            text: text.to_string(),
            font: font.to_string(),
            origin: *origin,
            size: *size,
        })
    }
}

pub type Command = RendererCommand<Symbols>;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn parse(source: &str) -> Svg {
    init_tracing();
    Svg::parse(source).unwrap()
}

pub fn parse_skipping(source: &str) -> Svg {
    init_tracing();
    Svg::parse_with_options(source, ParseOptions::default().skip_invalid_elements(true))
        .unwrap()
}

pub fn commands(source: &str) -> Vec<Command> {
    parse(source).commands(&SymbolProvider::default())
}

/// Tracks state and layer nesting, failing on any unbalanced pop.
#[derive(Debug, Default)]
pub struct DepthRecorder {
    pub state: usize,
    pub layers: usize,
    pub fills: Vec<(Shape, Color)>,
    pub strokes: Vec<(Shape, Color)>,
    fill: Option<Color>,
    stroke: Option<Color>,
}

impl Renderer for DepthRecorder {
    type Types = Symbols;

    fn push_state(&mut self) {
        self.state += 1;
    }

    fn pop_state(&mut self) {
        self.state = self.state.checked_sub(1).expect("unbalanced PopState");
    }

    fn push_transparency_layer(&mut self) {
        self.layers += 1;
    }

    fn pop_transparency_layer(&mut self) {
        self.layers = self
            .layers
            .checked_sub(1)
            .expect("unbalanced PopTransparencyLayer");
    }

    fn set_fill_color(&mut self, color: &Color) {
        self.fill = Some(*color);
    }

    fn set_stroke_color(&mut self, color: &Color) {
        self.stroke = Some(*color);
    }

    fn fill(&mut self, path: &Shape, _rule: &FillRule) {
        let color = self.fill.expect("fill without color");
        self.fills.push((path.clone(), color));
    }

    fn stroke(&mut self, path: &Shape) {
        let color = self.stroke.expect("stroke without color");
        self.strokes.push((path.clone(), color));
    }
}

pub fn render(source: &str) -> DepthRecorder {
    let mut recorder = DepthRecorder::default();
    recorder.perform_all(&commands(source));
    assert_eq!(recorder.state, 0, "unbalanced PushState");
    assert_eq!(recorder.layers, 0, "unbalanced PushTransparencyLayer");
    recorder
}

pub fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgb8(r, g, b)
}
