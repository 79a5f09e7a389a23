//! Path data (`d` attribute) parsing and normalization.

use std::f32::consts::{FRAC_PI_2, PI};

use crate::error::ScanError;
use crate::geometry::{self, Point};
use crate::scanner::{CharSet, Scanner};

const COMMANDS: &str = "MmLlHhVvCcSsQqTtAaZz";

/// Whether a segment's coordinates are absolute or relative to the current point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Space {
    Absolute,
    Relative,
}

/// Path segment as written in the path data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Move {
        point: Point,
        space: Space,
    },
    Line {
        point: Point,
        space: Space,
    },
    /// `H`/`h`.
    Horizontal {
        x: f32,
        space: Space,
    },
    /// `V`/`v`.
    Vertical {
        y: f32,
        space: Space,
    },
    Cubic {
        control1: Point,
        control2: Point,
        point: Point,
        space: Space,
    },
    /// `S`/`s`: first control point reflected from the previous cubic.
    CubicSmooth {
        control2: Point,
        point: Point,
        space: Space,
    },
    Quadratic {
        control: Point,
        point: Point,
        space: Space,
    },
    /// `T`/`t`: control point reflected from the previous quadratic.
    QuadraticSmooth {
        point: Point,
        space: Space,
    },
    Arc {
        rx: f32,
        ry: f32,
        /// Degrees.
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        point: Point,
        space: Space,
    },
    Close,
}

/// Parse path data into segments.
///
/// Commands may repeat implicitly: extra operand groups reuse the previous
/// command, except that pairs following a moveto are linetos.
pub fn parse(data: &str) -> Result<Vec<Segment>, ScanError> {
    let mut scanner = Scanner::new(data);
    let mut segments = Vec::new();
    let mut previous: Option<char> = None;

    while !scanner.is_at_end() {
        let command = match scanner.scan_first(CharSet::Chars(COMMANDS)) {
            Some(c) => c,
            None => match previous {
                Some('M') => 'L',
                Some('m') => 'l',
                Some('Z' | 'z') | None => {
                    return Err(ScanError {
                        expected: "path command",
                        index: scanner.index(),
                    })
                }
                Some(c) => c,
            },
        };

        segments.push(scan_segment(&mut scanner, command)?);
        scanner.scan_first(CharSet::Chars(","));
        previous = Some(command);
    }

    Ok(segments)
}

fn scan_segment(scanner: &mut Scanner<'_>, command: char) -> Result<Segment, ScanError> {
    let space = if command.is_ascii_lowercase() {
        Space::Relative
    } else {
        Space::Absolute
    };

    let segment = match command.to_ascii_uppercase() {
        'M' => Segment::Move {
            point: scan_point(scanner)?,
            space,
        },
        'L' => Segment::Line {
            point: scan_point(scanner)?,
            space,
        },
        'H' => Segment::Horizontal {
            x: scanner.scan_coordinate()?,
            space,
        },
        'V' => Segment::Vertical {
            y: scanner.scan_coordinate()?,
            space,
        },
        'C' => Segment::Cubic {
            control1: scan_point(scanner)?,
            control2: scan_point(scanner)?,
            point: scan_point(scanner)?,
            space,
        },
        'S' => Segment::CubicSmooth {
            control2: scan_point(scanner)?,
            point: scan_point(scanner)?,
            space,
        },
        'Q' => Segment::Quadratic {
            control: scan_point(scanner)?,
            point: scan_point(scanner)?,
            space,
        },
        'T' => Segment::QuadraticSmooth {
            point: scan_point(scanner)?,
            space,
        },
        'A' => {
            let rx = scan_number(scanner)?;
            let ry = scan_number(scanner)?;
            let rotation = scan_number(scanner)?;
            let large_arc = scanner.scan_bool()?;
            scanner.scan_first(CharSet::Chars(","));
            let sweep = scanner.scan_bool()?;
            scanner.scan_first(CharSet::Chars(","));
            Segment::Arc {
                rx,
                ry,
                rotation,
                large_arc,
                sweep,
                point: scan_point(scanner)?,
                space,
            }
        }
        _ => Segment::Close,
    };

    Ok(segment)
}

/// A number followed by an optional comma.
fn scan_number(scanner: &mut Scanner<'_>) -> Result<f32, ScanError> {
    let value = scanner.scan_coordinate()?;
    scanner.scan_first(CharSet::Chars(","));
    Ok(value)
}

fn scan_point(scanner: &mut Scanner<'_>) -> Result<Point, ScanError> {
    let x = scan_number(scanner)?;
    let y = scanner.scan_coordinate()?;
    scanner.scan_first(CharSet::Chars(","));
    Ok(Point::new(x, y))
}

// ==================== Normalization ====================

/// Resolve segments into an absolute path of moves, lines, curves and closes.
///
/// Horizontal and vertical lines become lines, smooth curves get explicit
/// control points and arcs are approximated with cubic curves.
pub fn to_path(segments: &[Segment]) -> geometry::Path {
    let mut path = geometry::Path::new();
    let mut current = Point::ZERO;
    let mut start = Point::ZERO;
    let mut last_cubic: Option<Point> = None;
    let mut last_quad: Option<Point> = None;

    let resolve = |current: Point, p: Point, space: Space| match space {
        Space::Absolute => p,
        Space::Relative => Point::new(current.x + p.x, current.y + p.y),
    };

    for segment in segments {
        let mut cubic_control = None;
        let mut quad_control = None;

        match *segment {
            Segment::Move { point, space } => {
                current = resolve(current, point, space);
                start = current;
                path.move_to(current);
            }
            Segment::Line { point, space } => {
                current = resolve(current, point, space);
                path.line_to(current);
            }
            Segment::Horizontal { x, space } => {
                current.x = match space {
                    Space::Absolute => x,
                    Space::Relative => current.x + x,
                };
                path.line_to(current);
            }
            Segment::Vertical { y, space } => {
                current.y = match space {
                    Space::Absolute => y,
                    Space::Relative => current.y + y,
                };
                path.line_to(current);
            }
            Segment::Cubic {
                control1,
                control2,
                point,
                space,
            } => {
                let c1 = resolve(current, control1, space);
                let c2 = resolve(current, control2, space);
                current = resolve(current, point, space);
                path.cubic_to(c1, c2, current);
                cubic_control = Some(c2);
            }
            Segment::CubicSmooth {
                control2,
                point,
                space,
            } => {
                let c1 = last_cubic.map_or(current, |c| c.reflected(current));
                let c2 = resolve(current, control2, space);
                current = resolve(current, point, space);
                path.cubic_to(c1, c2, current);
                cubic_control = Some(c2);
            }
            Segment::Quadratic {
                control,
                point,
                space,
            } => {
                let c = resolve(current, control, space);
                current = resolve(current, point, space);
                path.quad_to(c, current);
                quad_control = Some(c);
            }
            Segment::QuadraticSmooth { point, space } => {
                let c = last_quad.map_or(current, |c| c.reflected(current));
                current = resolve(current, point, space);
                path.quad_to(c, current);
                quad_control = Some(c);
            }
            Segment::Arc {
                rx,
                ry,
                rotation,
                large_arc,
                sweep,
                point,
                space,
            } => {
                let end = resolve(current, point, space);
                arc_to(&mut path, current, rx, ry, rotation, large_arc, sweep, end);
                current = end;
            }
            Segment::Close => {
                path.close();
                current = start;
            }
        }

        last_cubic = cubic_control;
        last_quad = quad_control;
    }

    path
}

/// Append an elliptical arc as cubic curves spanning at most 90 degrees each.
#[allow(clippy::too_many_arguments)]
fn arc_to(
    path: &mut geometry::Path,
    from: Point,
    rx: f32,
    ry: f32,
    rotation: f32,
    large_arc: bool,
    sweep: bool,
    to: Point,
) {
    if from == to {
        return;
    }
    let mut rx = rx.abs();
    let mut ry = ry.abs();
    if rx == 0.0 || ry == 0.0 {
        path.line_to(to);
        return;
    }

    let (sin, cos) = rotation.to_radians().sin_cos();

    // Endpoint to center parameterization.
    let dx2 = (from.x - to.x) / 2.0;
    let dy2 = (from.y - to.y) / 2.0;
    let x1 = cos * dx2 + sin * dy2;
    let y1 = -sin * dx2 + cos * dy2;

    let lambda = (x1 * x1) / (rx * rx) + (y1 * y1) / (ry * ry);
    if lambda > 1.0 {
        let s = lambda.sqrt();
        rx *= s;
        ry *= s;
    }

    let num = rx * rx * ry * ry - rx * rx * y1 * y1 - ry * ry * x1 * x1;
    let den = rx * rx * y1 * y1 + ry * ry * x1 * x1;
    let mut coef = if den == 0.0 {
        0.0
    } else {
        (num / den).max(0.0).sqrt()
    };
    if large_arc == sweep {
        coef = -coef;
    }
    let cx1 = coef * rx * y1 / ry;
    let cy1 = -coef * ry * x1 / rx;

    let cx = cos * cx1 - sin * cy1 + (from.x + to.x) / 2.0;
    let cy = sin * cx1 + cos * cy1 + (from.y + to.y) / 2.0;

    let theta1 = angle_between((1.0, 0.0), ((x1 - cx1) / rx, (y1 - cy1) / ry));
    let mut delta = angle_between(
        ((x1 - cx1) / rx, (y1 - cy1) / ry),
        ((-x1 - cx1) / rx, (-y1 - cy1) / ry),
    );
    if !sweep && delta > 0.0 {
        delta -= 2.0 * PI;
    } else if sweep && delta < 0.0 {
        delta += 2.0 * PI;
    }

    let count = (delta.abs() / FRAC_PI_2 - 1e-3).ceil().max(1.0) as usize;
    let step = delta / count as f32;
    let t = 4.0 / 3.0 * (step / 4.0).tan();

    let map = |ux: f32, uy: f32| {
        Point::new(
            cx + rx * ux * cos - ry * uy * sin,
            cy + rx * ux * sin + ry * uy * cos,
        )
    };

    for i in 0..count {
        let a1 = theta1 + step * i as f32;
        let a2 = a1 + step;
        let (s1, c1) = a1.sin_cos();
        let (s2, c2) = a2.sin_cos();

        let control1 = map(c1 - t * s1, s1 + t * c1);
        let control2 = map(c2 + t * s2, s2 - t * c2);
        let end = if i + 1 == count { to } else { map(c2, s2) };
        path.cubic_to(control1, control2, end);
    }
}

fn angle_between(u: (f32, f32), v: (f32, f32)) -> f32 {
    let cross = u.0 * v.1 - u.1 * v.0;
    let dot = u.0 * v.0 + u.1 * v.1;
    cross.atan2(dot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PathSegment;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn close_to(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    #[test]
    fn test_parse_basic() {
        let segments = parse("M 10 20 L 30 40 Z").unwrap();
        assert_eq!(
            segments,
            vec![
                Segment::Move {
                    point: p(10.0, 20.0),
                    space: Space::Absolute
                },
                Segment::Line {
                    point: p(30.0, 40.0),
                    space: Space::Absolute
                },
                Segment::Close,
            ]
        );
    }

    #[test]
    fn test_parse_cubic() {
        let segments = parse("M0,0 c10,20 30,40 50,60").unwrap();
        assert_eq!(
            segments[1],
            Segment::Cubic {
                control1: p(10.0, 20.0),
                control2: p(30.0, 40.0),
                point: p(50.0, 60.0),
                space: Space::Relative,
            }
        );
    }

    #[test]
    fn test_implicit_lineto_after_move() {
        let segments = parse("m 1 2 3 4 5 6").unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[1],
            Segment::Line {
                point: p(3.0, 4.0),
                space: Space::Relative
            }
        );
        assert_eq!(
            segments[2],
            Segment::Line {
                point: p(5.0, 6.0),
                space: Space::Relative
            }
        );
    }

    #[test]
    fn test_implicit_repeat() {
        let segments = parse("M0 0 H 10 20 V5").unwrap();
        assert_eq!(
            segments[2],
            Segment::Horizontal {
                x: 20.0,
                space: Space::Absolute
            }
        );
        assert_eq!(segments.len(), 4);
    }

    #[test]
    fn test_compact_arc_flags() {
        let segments = parse("M0 0a5 5 0 1 0 10 0").unwrap();
        assert_eq!(
            segments[1],
            Segment::Arc {
                rx: 5.0,
                ry: 5.0,
                rotation: 0.0,
                large_arc: true,
                sweep: false,
                point: p(10.0, 0.0),
                space: Space::Relative,
            }
        );
    }

    #[test]
    fn test_malformed() {
        assert!(parse("10 10").is_err());
        assert!(parse("M 10").is_err());
        assert!(parse("M 0 0 L 10 10 x").is_err());
        assert!(parse("M 0 0 Z 5 5").is_err());
        assert!(parse("M 0 0 A 5 5 0 2 0 10 10").is_err());
        assert_eq!(parse("").unwrap(), vec![]);
    }

    #[test]
    fn test_to_path_relative_and_lines() {
        let path = to_path(&parse("m 10 10 h 5 v 5 l -5 0 z").unwrap());
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Move(p(10.0, 10.0)),
                PathSegment::Line(p(15.0, 10.0)),
                PathSegment::Line(p(15.0, 15.0)),
                PathSegment::Line(p(10.0, 15.0)),
                PathSegment::Close,
            ]
        );
    }

    #[test]
    fn test_to_path_smooth_curves() {
        let path = to_path(&parse("M0 0 C 0 10 10 10 10 0 S 20 -10 20 0").unwrap());
        assert_eq!(
            path.segments[2],
            PathSegment::Cubic(p(10.0, -10.0), p(20.0, -10.0), p(20.0, 0.0))
        );

        let path = to_path(&parse("M0 0 Q 5 10 10 0 T 20 0").unwrap());
        assert_eq!(path.segments[2], PathSegment::Quad(p(15.0, -10.0), p(20.0, 0.0)));

        // Without a preceding curve the control point is the current point.
        let path = to_path(&parse("M0 0 L 5 5 T 10 0").unwrap());
        assert_eq!(path.segments[2], PathSegment::Quad(p(5.0, 5.0), p(10.0, 0.0)));
    }

    #[test]
    fn test_to_path_semicircle_arc() {
        let path = to_path(&parse("M0 0 A 10 10 0 0 1 20 0").unwrap());
        assert_eq!(path.segments.len(), 3);
        match (path.segments[1], path.segments[2]) {
            (PathSegment::Cubic(_, _, mid), PathSegment::Cubic(_, _, end)) => {
                assert!(close_to(mid, p(10.0, -10.0)), "{mid:?}");
                assert_eq!(end, p(20.0, 0.0));
            }
            other => panic!("expected cubics, got {other:?}"),
        }
    }

    #[test]
    fn test_to_path_degenerate_arc_is_line() {
        let path = to_path(&parse("M0 0 A 0 10 0 0 1 20 0").unwrap());
        assert_eq!(path.segments[1], PathSegment::Line(p(20.0, 0.0)));
    }

    #[test]
    fn test_close_resets_current_point() {
        let path = to_path(&parse("M 5 5 l 10 0 z l 0 10").unwrap());
        assert_eq!(path.segments[3], PathSegment::Line(p(5.0, 15.0)));
    }
}
