//! Builds the document model from an XML tree.

use tracing::{trace, warn};

use crate::attributes::Attributes;
use crate::dom::{
    Circle, Color, Container, Definitions, Element, ElementKind, Ellipse, Image, Line,
    LinearGradient, Path, Polygon, Polyline, PresentationAttributes, Rect, Stop, Svg, Text, Use,
    ViewBox,
};
use crate::error::SvgError;
use crate::path;
use crate::xml;

/// Elements that hold other graphics elements.
const CONTAINERS: &[&str] = &["svg", "g", "switch", "defs", "clipPath", "mask"];

/// Supported elements without element children.
const LEAVES: &[&str] = &[
    "use",
    "line",
    "circle",
    "ellipse",
    "rect",
    "polyline",
    "polygon",
    "path",
    "text",
    "image",
    "linearGradient",
];

/// Children allowed anywhere; they are never rendered.
const DESCRIPTIVE: &[&str] = &[
    "title",
    "desc",
    "metadata",
    "animate",
    "animateColor",
    "animateMotion",
    "animateTransform",
    "set",
];

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Drop elements that fail to parse instead of failing the document.
    pub skip_invalid_elements: bool,
}

impl ParseOptions {
    pub fn skip_invalid_elements(mut self, skip: bool) -> Self {
        self.skip_invalid_elements = skip;
        self
    }
}

/// Converts [`xml::Element`]s into [`Element`]s.
#[derive(Debug, Clone, Default)]
pub struct XmlParser {
    options: ParseOptions,
}

impl XmlParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse a document rooted at an `<svg>` element.
    ///
    /// Errors are reported as [`SvgError::InvalidElement`] naming the innermost
    /// element that failed.
    pub fn parse_svg(&self, element: &xml::Element) -> Result<Svg, SvgError> {
        if element.name != "svg" {
            return Err(SvgError::InvalidStructure(format!(
                "root element is <{}>, expected <svg>",
                element.name
            )));
        }
        self.parse_svg_root(element)
            .map_err(|err| wrap_error(element, err))
    }

    fn parse_svg_root(&self, element: &xml::Element) -> Result<Svg, SvgError> {
        let att = Attributes::new(element)?;

        let view_box = match att.parse_floats("viewBox")? {
            Some(values) => match values[..] {
                [x, y, width, height] => Some(ViewBox {
                    x,
                    y,
                    width,
                    height,
                }),
                _ => {
                    let raw = att.value("viewBox").unwrap_or_default();
                    return Err(SvgError::invalid_value("viewBox", raw));
                }
            },
            None => None,
        };

        // Percentage sizes are relative to an unknown viewport; fall back to the viewBox.
        let length = |name: &str| match att.value(name) {
            Some(value) if value.ends_with('%') => Ok(None),
            _ => att.parse_coordinate(name),
        };
        let width = length("width")?
            .or(view_box.map(|vb| vb.width))
            .ok_or_else(|| SvgError::MissingAttribute("width".into()))?;
        let height = length("height")?
            .or(view_box.map(|vb| vb.height))
            .ok_or_else(|| SvgError::MissingAttribute("height".into()))?;

        let root = Element {
            id: att.parse_string("id"),
            attributes: self.parse_presentation_attributes(&att)?,
            kind: ElementKind::Group(self.parse_container(element)?),
        };
        let defs = Definitions::index(&root);

        Ok(Svg {
            width,
            height,
            view_box,
            root,
            defs,
        })
    }

    /// Parse one element. Unsupported tags and empty text yield `Ok(None)`.
    pub fn parse_element(&self, element: &xml::Element) -> Result<Option<Element>, SvgError> {
        let name = element.name.as_str();
        let is_container = CONTAINERS.contains(&name);
        if !is_container && !LEAVES.contains(&name) {
            trace!(element = name, "Skipping unsupported element");
            return Ok(None);
        }
        if !is_container {
            check_leaf_children(element)?;
        }

        let att = Attributes::new(element)?;
        let kind = match name {
            "svg" | "g" => ElementKind::Group(self.parse_container(element)?),
            "switch" => ElementKind::Switch(self.parse_container(element)?),
            "defs" => ElementKind::Defs(self.parse_container(element)?),
            "clipPath" => ElementKind::ClipPath(self.parse_container(element)?),
            "mask" => ElementKind::Mask(self.parse_container(element)?),
            "use" => ElementKind::Use(parse_use(&att)?),
            "line" => ElementKind::Line(parse_line(&att)?),
            "circle" => ElementKind::Circle(parse_circle(&att)?),
            "ellipse" => ElementKind::Ellipse(parse_ellipse(&att)?),
            "rect" => ElementKind::Rect(parse_rect(&att)?),
            "polyline" => ElementKind::Polyline(Polyline {
                points: att.parse_points("points")?.unwrap_or_default(),
            }),
            "polygon" => ElementKind::Polygon(Polygon {
                points: att.parse_points("points")?.unwrap_or_default(),
            }),
            "path" => ElementKind::Path(parse_path(&att)?),
            "text" => match parse_text(element, &att)? {
                Some(text) => ElementKind::Text(text),
                None => return Ok(None),
            },
            "image" => ElementKind::Image(parse_image(&att)?),
            _ => ElementKind::LinearGradient(parse_linear_gradient(element)?),
        };

        Ok(Some(Element {
            id: att.parse_string("id"),
            attributes: self.parse_presentation_attributes(&att)?,
            kind,
        }))
    }

    fn parse_container(&self, element: &xml::Element) -> Result<Container, SvgError> {
        Ok(Container {
            children: self.parse_container_children(element)?,
        })
    }

    /// Parse the children of a container element in document order.
    ///
    /// A failing child either fails the container or, with
    /// [`ParseOptions::skip_invalid_elements`], is logged and dropped.
    pub fn parse_container_children(
        &self,
        element: &xml::Element,
    ) -> Result<Vec<Element>, SvgError> {
        if !CONTAINERS.contains(&element.name.as_str()) {
            return Err(SvgError::InvalidStructure(format!(
                "<{}> cannot contain child elements",
                element.name
            )));
        }

        let mut children = Vec::with_capacity(element.children.len());
        for child in &element.children {
            match self.parse_element(child) {
                Ok(Some(parsed)) => children.push(parsed),
                Ok(None) => {}
                Err(err) if self.options.skip_invalid_elements => {
                    warn!(
                        element = %child.name,
                        line = child.location.line,
                        column = child.location.column,
                        error = %err,
                        "Skipping invalid element"
                    );
                }
                Err(err) => return Err(wrap_error(child, err)),
            }
        }
        Ok(children)
    }

    pub fn parse_presentation_attributes(
        &self,
        att: &Attributes,
    ) -> Result<PresentationAttributes, SvgError> {
        let stroke_dasharray = match att.value("stroke-dasharray") {
            Some("none") => Some(Vec::new()),
            _ => att.parse_floats("stroke-dasharray")?,
        };

        Ok(PresentationAttributes {
            opacity: att.parse_percentage("opacity")?,
            display: att.parse_raw("display")?,
            fill: att.parse_paint("fill")?,
            fill_opacity: att.parse_percentage("fill-opacity")?,
            fill_rule: att.parse_raw("fill-rule")?,
            stroke: att.parse_paint("stroke")?,
            stroke_width: att.parse_coordinate("stroke-width")?,
            stroke_opacity: att.parse_percentage("stroke-opacity")?,
            stroke_linecap: att.parse_raw("stroke-linecap")?,
            stroke_linejoin: att.parse_raw("stroke-linejoin")?,
            stroke_miterlimit: att.parse_float("stroke-miterlimit")?,
            stroke_dasharray,
            transform: att.parse_transform("transform")?,
            clip_path: att.parse_url_selector("clip-path")?,
            mask: att.parse_url_selector("mask")?,
        })
    }
}

/// Attach the failing element's position, keeping an already attached one.
fn wrap_error(element: &xml::Element, err: SvgError) -> SvgError {
    match err {
        SvgError::InvalidElement { .. } => err,
        other => SvgError::InvalidElement {
            name: element.name.clone(),
            line: element.location.line,
            column: element.location.column,
            source: Box::new(other),
        },
    }
}

fn check_leaf_children(element: &xml::Element) -> Result<(), SvgError> {
    let allowed = match element.name.as_str() {
        "text" => &["tspan"][..],
        "linearGradient" => &["stop"][..],
        _ => &[][..],
    };
    match element
        .children
        .iter()
        .find(|c| !DESCRIPTIVE.contains(&c.name.as_str()) && !allowed.contains(&c.name.as_str()))
    {
        Some(child) => Err(SvgError::InvalidStructure(format!(
            "<{}> cannot contain <{}>",
            element.name, child.name
        ))),
        None => Ok(()),
    }
}

fn coordinate(att: &Attributes, name: &str) -> Result<f32, SvgError> {
    Ok(att.parse_coordinate(name)?.unwrap_or(0.0))
}

fn parse_use(att: &Attributes) -> Result<Use, SvgError> {
    let href = att
        .parse_string("xlink:href")
        .or_else(|| att.parse_string("href"))
        .ok_or_else(|| SvgError::MissingAttribute("xlink:href".into()))?;
    Ok(Use {
        href,
        x: coordinate(att, "x")?,
        y: coordinate(att, "y")?,
    })
}

fn parse_line(att: &Attributes) -> Result<Line, SvgError> {
    Ok(Line {
        x1: coordinate(att, "x1")?,
        y1: coordinate(att, "y1")?,
        x2: coordinate(att, "x2")?,
        y2: coordinate(att, "y2")?,
    })
}

fn parse_circle(att: &Attributes) -> Result<Circle, SvgError> {
    Ok(Circle {
        cx: coordinate(att, "cx")?,
        cy: coordinate(att, "cy")?,
        r: coordinate(att, "r")?,
    })
}

fn parse_ellipse(att: &Attributes) -> Result<Ellipse, SvgError> {
    Ok(Ellipse {
        cx: coordinate(att, "cx")?,
        cy: coordinate(att, "cy")?,
        rx: coordinate(att, "rx")?,
        ry: coordinate(att, "ry")?,
    })
}

fn parse_rect(att: &Attributes) -> Result<Rect, SvgError> {
    Ok(Rect {
        x: coordinate(att, "x")?,
        y: coordinate(att, "y")?,
        width: coordinate(att, "width")?,
        height: coordinate(att, "height")?,
        rx: att.parse_coordinate("rx")?,
        ry: att.parse_coordinate("ry")?,
    })
}

fn parse_path(att: &Attributes) -> Result<Path, SvgError> {
    let segments = match att.value("d") {
        Some(data) => path::parse(data)
            .map_err(|err| SvgError::InvalidStructure(format!("invalid path data: {}", err)))?,
        None => Vec::new(),
    };
    Ok(Path { segments })
}

fn parse_text(element: &xml::Element, att: &Attributes) -> Result<Option<Text>, SvgError> {
    let value = element.text.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(Text {
        x: coordinate(att, "x")?,
        y: coordinate(att, "y")?,
        value: value.to_string(),
        font_family: att.parse_string("font-family"),
        font_size: att.parse_coordinate("font-size")?,
    }))
}

fn parse_image(att: &Attributes) -> Result<Image, SvgError> {
    let href = att
        .parse_string("xlink:href")
        .or_else(|| att.parse_string("href"))
        .ok_or_else(|| SvgError::MissingAttribute("xlink:href".into()))?;
    Ok(Image {
        x: coordinate(att, "x")?,
        y: coordinate(att, "y")?,
        width: att.parse_coordinate("width")?,
        height: att.parse_coordinate("height")?,
        href,
    })
}

fn parse_linear_gradient(element: &xml::Element) -> Result<LinearGradient, SvgError> {
    let mut stops = Vec::new();
    for child in element.children.iter().filter(|c| c.name == "stop") {
        let att = Attributes::new(child).map_err(|err| wrap_error(child, err))?;
        let stop = parse_stop(&att).map_err(|err| wrap_error(child, err))?;
        stops.push(stop);
    }
    Ok(LinearGradient { stops })
}

fn parse_stop(att: &Attributes) -> Result<Stop, SvgError> {
    Ok(Stop {
        offset: att.parse_percentage("offset")?.unwrap_or(0.0).clamp(0.0, 1.0),
        color: att
            .parse_color("stop-color")?
            .unwrap_or_else(|| Color::Keyword("black".into())),
        opacity: att.parse_percentage("stop-opacity")?.unwrap_or(1.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{FillRule, Point};
    use crate::transform::Transform;

    fn parse(text: &str) -> Result<Svg, SvgError> {
        XmlParser::default().parse_svg(&xml::parse(text)?)
    }

    fn element(text: &str) -> Element {
        let root = xml::parse(text).unwrap();
        XmlParser::default().parse_element(&root).unwrap().unwrap()
    }

    #[test]
    fn test_svg_size() {
        let svg = parse(r#"<svg width="100px" height="50"/>"#).unwrap();
        assert_eq!((svg.width, svg.height), (100.0, 50.0));
        assert_eq!(svg.view_box, None);

        let svg = parse(r#"<svg viewBox="0 0 20 10"/>"#).unwrap();
        assert_eq!((svg.width, svg.height), (20.0, 10.0));

        let svg = parse(r#"<svg width="100%" height="100%" viewBox="0,0,20,10"/>"#).unwrap();
        assert_eq!((svg.width, svg.height), (20.0, 10.0));
    }

    #[test]
    fn test_svg_size_missing() {
        let err = parse(r#"<svg height="10"/>"#).unwrap_err();
        match err {
            SvgError::InvalidElement { name, source, .. } => {
                assert_eq!(name, "svg");
                assert!(matches!(*source, SvgError::MissingAttribute(ref a) if a == "width"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_root_must_be_svg() {
        assert!(matches!(
            parse("<g/>"),
            Err(SvgError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_shapes() {
        let e = element(r#"<rect x="1" y="2" width="3" height="4" rx="1"/>"#);
        assert_eq!(
            e.kind,
            ElementKind::Rect(Rect {
                x: 1.0,
                y: 2.0,
                width: 3.0,
                height: 4.0,
                rx: Some(1.0),
                ry: None
            })
        );

        let e = element(r#"<circle r="5"/>"#);
        assert_eq!(
            e.kind,
            ElementKind::Circle(Circle {
                cx: 0.0,
                cy: 0.0,
                r: 5.0
            })
        );

        let e = element(r#"<polygon points="0,0 1,0 1,1"/>"#);
        assert!(matches!(e.kind, ElementKind::Polygon(ref p) if p.points[2] == Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_presentation_attributes() {
        let e = element(
            r##"<path id="p" d="M0 0" fill="#f00" fill-rule="evenodd" stroke-dasharray="none"
                 transform="scale(2)" clip-path="url(#c)" style="opacity: 50%"/>"##,
        );
        assert_eq!(e.id.as_deref(), Some("p"));
        assert_eq!(e.attributes.fill, Some(Color::Hex(255, 0, 0)));
        assert_eq!(e.attributes.fill_rule, Some(FillRule::EvenOdd));
        assert_eq!(e.attributes.stroke_dasharray, Some(vec![]));
        assert_eq!(
            e.attributes.transform,
            Some(vec![Transform::Scale { sx: 2.0, sy: 2.0 }])
        );
        assert_eq!(e.attributes.clip_path.as_deref(), Some("c"));
        assert_eq!(e.attributes.opacity, Some(0.5));
        assert_eq!(e.attributes.stroke, None);
    }

    #[test]
    fn test_unknown_and_empty_elements_are_dropped() {
        let svg = parse(
            r#"<svg width="1" height="1"><foo/><text>   </text><title>t</title><g/></svg>"#,
        )
        .unwrap();
        assert_eq!(svg.children().len(), 1);
        assert!(matches!(svg.children()[0].kind, ElementKind::Group(_)));
    }

    #[test]
    fn test_text() {
        let e = element(r#"<text x="1" y="2" font-size="20">  Hello <tspan>World</tspan> </text>"#);
        match e.kind {
            ElementKind::Text(text) => {
                assert_eq!(text.value, "Hello World");
                assert_eq!(text.font_size, Some(20.0));
                assert_eq!(text.font_family, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_use_href_forms() {
        for source in [r##"<use xlink:href="#a" xmlns:xlink="http://www.w3.org/1999/xlink"/>"##, r##"<use href="#a" x="2"/>"##] {
            let e = element(source);
            assert!(matches!(e.kind, ElementKind::Use(ref u) if u.target() == Some("a")));
        }
        let root = xml::parse("<use/>").unwrap();
        assert!(matches!(
            XmlParser::default().parse_element(&root),
            Err(SvgError::MissingAttribute(_))
        ));
    }

    #[test]
    fn test_linear_gradient_stops() {
        let e = element(
            r#"<linearGradient id="g">
                 <stop offset="0%" stop-color="red"/>
                 <stop offset="0.5" stop-color="blue" stop-opacity="50%"/>
                 <stop/>
               </linearGradient>"#,
        );
        match e.kind {
            ElementKind::LinearGradient(gradient) => {
                assert_eq!(gradient.stops.len(), 3);
                assert_eq!(gradient.stops[0].offset, 0.0);
                assert_eq!(gradient.stops[1].offset, 0.5);
                assert_eq!(gradient.stops[1].opacity, 0.5);
                assert_eq!(gradient.stops[2].color, Color::Keyword("black".into()));
                assert_eq!(gradient.stops[2].opacity, 1.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_leaf_cannot_have_children() {
        let root = xml::parse(r#"<rect><circle/></rect>"#).unwrap();
        assert!(matches!(
            XmlParser::default().parse_element(&root),
            Err(SvgError::InvalidStructure(_))
        ));

        let root = xml::parse(r#"<rect><title>ok</title></rect>"#).unwrap();
        assert!(XmlParser::default().parse_element(&root).unwrap().is_some());

        let root = xml::parse(r#"<rect/>"#).unwrap();
        assert!(matches!(
            XmlParser::default().parse_container_children(&root),
            Err(SvgError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_malformed_path_data() {
        let root = xml::parse(r#"<path d="M 10"/>"#).unwrap();
        assert!(matches!(
            XmlParser::default().parse_element(&root),
            Err(SvgError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_invalid_child_reports_innermost_position() {
        let source = "<svg width=\"1\" height=\"1\">\n  <g>\n    <rect x=\"oops\"/>\n  </g>\n</svg>";
        match parse(source).unwrap_err() {
            SvgError::InvalidElement {
                name,
                line,
                column,
                source,
            } => {
                assert_eq!(name, "rect");
                assert_eq!((line, column), (3, 5));
                assert!(matches!(*source, SvgError::InvalidAttributeValue { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_skip_invalid_elements() {
        let source = r#"<svg width="1" height="1"><g><rect x="oops"/><circle r="1"/></g><line x1="?"/></svg>"#;
        let parser = XmlParser::new(ParseOptions::default().skip_invalid_elements(true));
        let svg = parser.parse_svg(&xml::parse(source).unwrap()).unwrap();
        assert_eq!(svg.children().len(), 1);
        assert_eq!(svg.children()[0].children().len(), 1);
        assert!(matches!(
            svg.children()[0].children()[0].kind,
            ElementKind::Circle(_)
        ));
    }

    #[test]
    fn test_definitions_are_indexed() {
        let svg = parse(
            r#"<svg width="1" height="1">
                 <defs>
                   <clipPath id="c"><rect width="1" height="1"/></clipPath>
                   <mask id="m"><rect width="1" height="1" fill="white"/></mask>
                   <linearGradient id="g"><stop offset="1"/></linearGradient>
                 </defs>
                 <g id="group"><circle id="dot" r="1"/></g>
               </svg>"#,
        )
        .unwrap();
        assert_eq!(svg.defs.elements.len(), 5);
        assert!(svg.clip_path("c").is_some());
        assert!(svg.mask("m").is_some());
        assert_eq!(svg.linear_gradient("g").map(|g| g.stops.len()), Some(1));
        assert!(svg.element("dot").is_some());
    }
}
