//! The `transform` attribute.

use crate::geometry;
use crate::scanner::{CharSet, Scanner};

/// One transform function as written. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Matrix {
        a: f32,
        b: f32,
        c: f32,
        d: f32,
        e: f32,
        f: f32,
    },
    Translate {
        tx: f32,
        ty: f32,
    },
    Scale {
        sx: f32,
        sy: f32,
    },
    Rotate {
        angle: f32,
    },
    RotatePoint {
        angle: f32,
        cx: f32,
        cy: f32,
    },
    SkewX {
        angle: f32,
    },
    SkewY {
        angle: f32,
    },
}

impl Transform {
    /// Parse a transform list such as `translate(10) rotate(45, 5 5)`.
    ///
    /// Returns `None` on an unknown function, a wrong argument count or
    /// trailing garbage.
    pub fn parse_list(text: &str) -> Option<Vec<Transform>> {
        let mut scanner = Scanner::new(text);
        let mut list = Vec::new();

        while !scanner.is_at_end() {
            let name = scanner.scan_up_to(CharSet::Chars("( \t\r\n"))?;
            scanner.scan_literal("(")?;

            let mut args = Vec::new();
            while let Ok(value) = scanner.scan_coordinate() {
                args.push(value);
                scanner.scan_first(CharSet::Chars(","));
            }
            scanner.scan_literal(")")?;
            scanner.scan_first(CharSet::Chars(","));

            list.push(Self::from_function(name, &args)?);
        }

        Some(list)
    }

    fn from_function(name: &str, args: &[f32]) -> Option<Transform> {
        let transform = match (name, args) {
            ("matrix", &[a, b, c, d, e, f]) => Transform::Matrix { a, b, c, d, e, f },
            ("translate", &[tx]) => Transform::Translate { tx, ty: 0.0 },
            ("translate", &[tx, ty]) => Transform::Translate { tx, ty },
            ("scale", &[s]) => Transform::Scale { sx: s, sy: s },
            ("scale", &[sx, sy]) => Transform::Scale { sx, sy },
            ("rotate", &[angle]) => Transform::Rotate { angle },
            ("rotate", &[angle, cx, cy]) => Transform::RotatePoint { angle, cx, cy },
            ("skewX", &[angle]) => Transform::SkewX { angle },
            ("skewY", &[angle]) => Transform::SkewY { angle },
            _ => return None,
        };
        Some(transform)
    }

    /// The equivalent affine matrix.
    pub fn matrix(&self) -> geometry::Transform {
        match *self {
            Transform::Matrix { a, b, c, d, e, f } => geometry::Transform::new(a, b, c, d, e, f),
            Transform::Translate { tx, ty } => geometry::Transform::translation(tx, ty),
            Transform::Scale { sx, sy } => geometry::Transform::scaling(sx, sy),
            Transform::Rotate { angle } => geometry::Transform::rotation(angle.to_radians()),
            Transform::RotatePoint { angle, cx, cy } => geometry::Transform::translation(cx, cy)
                .concatenating(&geometry::Transform::rotation(angle.to_radians()))
                .concatenating(&geometry::Transform::translation(-cx, -cy)),
            Transform::SkewX { angle } => {
                geometry::Transform::new(1.0, 0.0, angle.to_radians().tan(), 1.0, 0.0, 0.0)
            }
            Transform::SkewY { angle } => {
                geometry::Transform::new(1.0, angle.to_radians().tan(), 0.0, 1.0, 0.0, 0.0)
            }
        }
    }
}
