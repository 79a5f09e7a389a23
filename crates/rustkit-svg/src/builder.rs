//! Turns a document into a flat list of renderer commands.
//!
//! Elements are visited depth first. For each element the builder emits, in
//! order: mask commands, `PushState` (only when a transform or clip follows),
//! transform commands, clip commands, fill then stroke, the image, the
//! children, and the matching pops.

use tracing::{debug, warn};

use crate::dom::{self, Display, Element, ElementKind, Svg};
use crate::geometry::{self, BlendMode, Point, Size};
use crate::path;
use crate::renderer::{RendererCommand, RendererTypeProvider, RendererTypes};
use crate::state::State;
use crate::transform::Transform;

const DEFAULT_FONT: &str = "sans-serif";
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Most `<use>` references expanded while building one document. Nested
/// fan-out otherwise grows the output exponentially in the input size.
pub const MAX_USE_EXPANSIONS: usize = 10_000;

type Types<P> = <P as RendererTypeProvider>::Types;
type Command<P> = RendererCommand<Types<P>>;
type PathOf<P> = <Types<P> as RendererTypes>::Path;
type ImageOf<P> = <Types<P> as RendererTypes>::Image;

/// Build the full command list for `svg`.
pub fn build_commands<P: RendererTypeProvider>(svg: &Svg, provider: &P) -> Vec<Command<P>> {
    CommandBuilder::new(svg, provider).build()
}

/// What an element contributes between its push and pop commands.
enum Content<'a, P: RendererTypeProvider> {
    Shape(PathOf<P>),
    Image(ImageOf<P>),
    Children(&'a [Element]),
    Use(&'a str, &'a Element),
}

/// Walks a document, carrying the inherited [`State`].
pub struct CommandBuilder<'a, P: RendererTypeProvider> {
    svg: &'a Svg,
    provider: &'a P,
    /// Ids of `<use>` targets currently being expanded.
    use_stack: Vec<&'a str>,
    /// `<use>` references expanded so far.
    use_expansions: usize,
    commands: Vec<Command<P>>,
}

impl<'a, P: RendererTypeProvider> CommandBuilder<'a, P> {
    pub fn new(svg: &'a Svg, provider: &'a P) -> Self {
        Self {
            svg,
            provider,
            use_stack: Vec::new(),
            use_expansions: 0,
            commands: Vec::new(),
        }
    }

    pub fn build(mut self) -> Vec<Command<P>> {
        let svg = self.svg;
        self.view_box_commands();
        self.render_element(&svg.root, &State::default());
        self.commands
    }

    /// Map the viewBox onto the width/height viewport.
    fn view_box_commands(&mut self) {
        let svg = self.svg;
        let Some(vb) = svg.view_box else {
            return;
        };
        if vb.width <= 0.0 || vb.height <= 0.0 {
            return;
        }

        if vb.width != svg.width || vb.height != svg.height {
            self.commands.push(RendererCommand::Scale {
                sx: self.provider.create_float(svg.width / vb.width),
                sy: self.provider.create_float(svg.height / vb.height),
            });
        }
        if vb.x != 0.0 || vb.y != 0.0 {
            self.commands.push(RendererCommand::Translate {
                tx: self.provider.create_float(-vb.x),
                ty: self.provider.create_float(-vb.y),
            });
        }
    }

    fn render_element(&mut self, element: &'a Element, parent: &State) {
        let state = parent.merge(&element.attributes);
        if state.display != Display::Inline {
            return;
        }

        // Resolve first: an element that contributes nothing emits nothing.
        let content: Content<'a, P> = match &element.kind {
            ElementKind::Defs(_)
            | ElementKind::ClipPath(_)
            | ElementKind::Mask(_)
            | ElementKind::LinearGradient(_) => return,
            ElementKind::Group(group) => Content::Children(&group.children),
            ElementKind::Switch(switch) => match switch.children.first() {
                Some(first) => Content::Children(std::slice::from_ref(first)),
                None => return,
            },
            ElementKind::Use(reference) => match self.resolve_use(reference) {
                Some((id, target)) => Content::Use(id, target),
                None => return,
            },
            ElementKind::Image(image) => match self.image(image) {
                Some(image) => Content::Image(image),
                None => return,
            },
            _ => match self.shape_path(element) {
                Some(path) => Content::Shape(path),
                None => return,
            },
        };

        let mask = match &element.attributes.mask {
            Some(id) => self.mask_commands(id, element),
            None => Vec::new(),
        };
        let transform = self.transform_commands(element);
        let clip = match &element.attributes.clip_path {
            Some(id) => self.clip_commands(id),
            None => Vec::new(),
        };
        let has_mask = !mask.is_empty();
        let has_state = !transform.is_empty() || !clip.is_empty();

        self.commands.extend(mask);
        if has_state {
            self.commands.push(RendererCommand::PushState);
        }
        self.commands.extend(transform);
        self.commands.extend(clip);

        match content {
            Content::Shape(path) => {
                self.fill_commands(&path, &state);
                self.stroke_commands(path, &state);
            }
            Content::Image(image) => self.commands.push(RendererCommand::DrawImage(image)),
            Content::Children(children) => {
                for child in children {
                    self.render_element(child, &state);
                }
            }
            Content::Use(id, target) => {
                self.use_stack.push(id);
                self.render_element(target, &state);
                self.use_stack.pop();
            }
        }

        if has_state {
            self.commands.push(RendererCommand::PopState);
        }
        if has_mask {
            self.commands.push(RendererCommand::PopTransparencyLayer);
        }
    }

    fn resolve_use(&mut self, reference: &'a dom::Use) -> Option<(&'a str, &'a Element)> {
        let Some(id) = reference.target() else {
            debug!(href = %reference.href, "Ignoring use without a fragment reference");
            return None;
        };
        if self.use_stack.contains(&id) {
            warn!(id, "Skipping recursive use reference");
            return None;
        }
        if self.use_expansions >= MAX_USE_EXPANSIONS {
            if self.use_expansions == MAX_USE_EXPANSIONS {
                warn!(id, limit = MAX_USE_EXPANSIONS, "Use expansion limit reached");
                self.use_expansions += 1;
            }
            return None;
        }
        let svg = self.svg;
        match svg.element(id) {
            Some(target) => {
                self.use_expansions += 1;
                Some((id, target))
            }
            None => {
                debug!(id, "Unresolved use reference");
                None
            }
        }
    }

    fn transform_commands(&self, element: &Element) -> Vec<Command<P>> {
        let p = self.provider;
        let mut commands = Vec::new();

        for transform in element.attributes.transform.iter().flatten() {
            match *transform {
                Transform::Translate { tx, ty } => commands.push(RendererCommand::Translate {
                    tx: p.create_float(tx),
                    ty: p.create_float(ty),
                }),
                Transform::Scale { sx, sy } => commands.push(RendererCommand::Scale {
                    sx: p.create_float(sx),
                    sy: p.create_float(sy),
                }),
                Transform::Rotate { angle } => {
                    commands.push(RendererCommand::Rotate(p.create_float(angle.to_radians())))
                }
                Transform::RotatePoint { angle, cx, cy } => {
                    commands.push(RendererCommand::Translate {
                        tx: p.create_float(cx),
                        ty: p.create_float(cy),
                    });
                    commands.push(RendererCommand::Rotate(p.create_float(angle.to_radians())));
                    commands.push(RendererCommand::Translate {
                        tx: p.create_float(-cx),
                        ty: p.create_float(-cy),
                    });
                }
                Transform::Matrix { .. } | Transform::SkewX { .. } | Transform::SkewY { .. } => {
                    commands.push(RendererCommand::Concatenate(
                        p.create_transform(transform.matrix()),
                    ))
                }
            }
        }

        if let ElementKind::Use(reference) = &element.kind {
            if reference.x != 0.0 || reference.y != 0.0 {
                commands.push(RendererCommand::Translate {
                    tx: p.create_float(reference.x),
                    ty: p.create_float(reference.y),
                });
            }
        }

        commands
    }

    fn clip_commands(&self, id: &str) -> Vec<Command<P>> {
        let svg = self.svg;
        let Some(children) = svg.clip_path(id) else {
            debug!(id, "Unresolved clip-path reference");
            return Vec::new();
        };
        let paths: Vec<_> = children.iter().filter_map(|c| self.shape_path(c)).collect();
        vec![RendererCommand::SetClip(
            self.provider.create_path_from_subpaths(&paths),
        )]
    }

    /// Draw the mask into a new layer, leaving `SourceIn` blending active so
    /// the element only shows where the mask is opaque.
    fn mask_commands(&self, id: &str, element: &Element) -> Vec<Command<P>> {
        let svg = self.svg;
        let Some(children) = svg.mask(id) else {
            debug!(id, "Unresolved mask reference");
            return Vec::new();
        };
        let p = self.provider;

        let mut commands = vec![
            RendererCommand::PushTransparencyLayer,
            RendererCommand::PushState,
        ];
        commands.extend(self.transform_commands(element));
        commands.push(RendererCommand::SetBlendMode(
            p.create_blend_mode(BlendMode::Copy),
        ));

        for child in children {
            let Some(color) = child.attributes.fill.as_ref().and_then(dom::Color::rgba) else {
                continue;
            };
            let Some(path) = self.shape_path(child) else {
                continue;
            };
            commands.push(RendererCommand::SetFill(
                p.create_color(color.luminance_to_alpha()),
            ));
            commands.push(RendererCommand::Fill {
                path,
                rule: p.create_fill_rule(child.attributes.fill_rule.unwrap_or_default()),
            });
        }

        commands.push(RendererCommand::PopState);
        commands.push(RendererCommand::SetBlendMode(
            p.create_blend_mode(BlendMode::SourceIn),
        ));
        commands
    }

    fn fill_commands(&mut self, path: &PathOf<P>, state: &State) {
        let Some(color) = state.fill_color() else {
            return;
        };
        let p = self.provider;
        self.commands
            .push(RendererCommand::SetFill(p.create_color(color)));
        self.commands.push(RendererCommand::Fill {
            path: path.clone(),
            rule: p.create_fill_rule(state.fill_rule),
        });
    }

    fn stroke_commands(&mut self, path: PathOf<P>, state: &State) {
        let Some(color) = state.stroke_color() else {
            return;
        };
        if state.stroke_width <= 0.0 {
            return;
        }
        let p = self.provider;
        self.commands.extend([
            RendererCommand::SetLineCap(p.create_line_cap(state.stroke_linecap)),
            RendererCommand::SetLineJoin(p.create_line_join(state.stroke_linejoin)),
            RendererCommand::SetLineWidth(p.create_float(state.stroke_width)),
            RendererCommand::SetLineMiterLimit(p.create_float(state.stroke_miterlimit)),
            RendererCommand::SetStroke(p.create_color(color)),
            RendererCommand::Stroke(path),
        ]);
    }

    /// Outline of a shape or text element.
    fn shape_path(&self, element: &Element) -> Option<PathOf<P>> {
        let p = self.provider;
        let path = match &element.kind {
            ElementKind::Line(line) => p.create_line(
                &p.create_point(Point::new(line.x1, line.y1)),
                &p.create_point(Point::new(line.x2, line.y2)),
            ),
            ElementKind::Circle(circle) => p.create_ellipse(&p.create_rect(geometry::Rect::new(
                circle.cx - circle.r,
                circle.cy - circle.r,
                circle.r * 2.0,
                circle.r * 2.0,
            ))),
            ElementKind::Ellipse(ellipse) => {
                p.create_ellipse(&p.create_rect(geometry::Rect::new(
                    ellipse.cx - ellipse.rx,
                    ellipse.cy - ellipse.ry,
                    ellipse.rx * 2.0,
                    ellipse.ry * 2.0,
                )))
            }
            // A non-positive size disables rendering.
            ElementKind::Rect(rect) if rect.width <= 0.0 || rect.height <= 0.0 => return None,
            ElementKind::Rect(rect) => {
                let (rx, ry) = rect.radii();
                p.create_rounded_rect(
                    &p.create_rect(geometry::Rect::new(rect.x, rect.y, rect.width, rect.height)),
                    &p.create_size(Size::new(rx, ry)),
                )
            }
            ElementKind::Polyline(polyline) => {
                let points: Vec<_> = polyline.points.iter().map(|pt| p.create_point(*pt)).collect();
                p.create_polyline(&points)
            }
            ElementKind::Polygon(polygon) => {
                let points: Vec<_> = polygon.points.iter().map(|pt| p.create_point(*pt)).collect();
                p.create_polygon(&points)
            }
            ElementKind::Path(shape) => p.create_path(&path::to_path(&shape.segments)),
            ElementKind::Text(text) => {
                let path = p.create_text(
                    &text.value,
                    text.font_family.as_deref().unwrap_or(DEFAULT_FONT),
                    &p.create_point(Point::new(text.x, text.y)),
                    &p.create_float(text.font_size.unwrap_or(DEFAULT_FONT_SIZE)),
                );
                if path.is_none() {
                    debug!(text = %text.value, "Provider produced no outline for text");
                }
                return path;
            }
            _ => return None,
        };
        Some(path)
    }

    fn image(&self, image: &dom::Image) -> Option<ImageOf<P>> {
        match crate::image::load(image) {
            Ok(decoded) => self.provider.create_image(&decoded),
            Err(err) => {
                debug!(error = %err, "Skipping undecodable image");
                None
            }
        }
    }
}
