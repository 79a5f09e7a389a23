//! # RustKit CSS Parser
//!
//! RustKit-owned CSS parsing layer.
//!
//! Current implementation covers **declaration lists** only: the contents of an
//! inline `style` attribute such as `fill: red; stroke-width: 2 !important`.
//! Stylesheets with selectors and `@` rules are not handled here.

use thiserror::Error;

/// Errors that can occur while parsing CSS.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unexpected end of input")]
    UnexpectedEof,

    #[error("Missing ':' after property `{0}`")]
    MissingColon(String),

    #[error("Declaration has an empty property name")]
    EmptyProperty,
}

/// A parsed declaration AST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationAst {
    pub property: String,
    pub value: String,
    pub important: bool,
}

/// Parse a declaration list (`prop: value; prop: value`) into an AST.
///
/// Notes:
/// - Declarations are returned in source order; later duplicates are kept so
///   callers can apply "last one wins".
/// - Empty declarations (`;;`) and declarations with an empty value are skipped.
/// - `/* ... */` comments are ignored anywhere outside of values' quoted strings.
pub fn parse_declarations(input: &str) -> Result<Vec<DeclarationAst>, ParseError> {
    let mut out = Vec::new();

    let mut property = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut quote: Option<char> = None;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            value.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }

        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut closed = false;
            while let Some(cc) = chars.next() {
                if cc == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    closed = true;
                    break;
                }
            }
            if !closed {
                return Err(ParseError::UnexpectedEof);
            }
            continue;
        }

        if !in_value {
            match c {
                ':' => in_value = true,
                ';' => {
                    let name = property.trim();
                    if !name.is_empty() {
                        return Err(ParseError::MissingColon(name.to_string()));
                    }
                    property.clear();
                }
                _ => property.push(c),
            }
            continue;
        }

        match c {
            ';' => {
                flush_decl(&mut property, &mut value, &mut out)?;
                in_value = false;
            }
            '"' | '\'' => {
                quote = Some(c);
                value.push(c);
            }
            _ => value.push(c),
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnexpectedEof);
    }

    if in_value {
        flush_decl(&mut property, &mut value, &mut out)?;
    } else if !property.trim().is_empty() {
        return Err(ParseError::MissingColon(property.trim().to_string()));
    }

    Ok(out)
}

fn flush_decl(
    property: &mut String,
    value: &mut String,
    decls: &mut Vec<DeclarationAst>,
) -> Result<(), ParseError> {
    let name = property.trim();
    if name.is_empty() {
        return Err(ParseError::EmptyProperty);
    }

    let value_raw = value.trim();
    if !value_raw.is_empty() {
        let (v, important) = strip_important(value_raw);
        decls.push(DeclarationAst {
            property: name.to_string(),
            value: v.to_string(),
            important,
        });
    }

    property.clear();
    value.clear();
    Ok(())
}

fn strip_important(value: &str) -> (&str, bool) {
    let lower = value.to_ascii_lowercase();
    if let Some(idx) = lower.rfind("!important") {
        (value[..idx].trim_end(), true)
    } else {
        (value, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inline_style() {
        let decls = parse_declarations("fill: red; stroke:blue;stroke-width : 2").unwrap();
        assert_eq!(decls.len(), 3);
        assert_eq!(decls[0].property, "fill");
        assert_eq!(decls[0].value, "red");
        assert_eq!(decls[1].property, "stroke");
        assert_eq!(decls[1].value, "blue");
        assert_eq!(decls[2].property, "stroke-width");
        assert_eq!(decls[2].value, "2");
    }

    #[test]
    fn parse_with_comments_and_important() {
        let decls = parse_declarations("/* lead */ fill: #f00 !important; /* tail */").unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].value, "#f00");
        assert!(decls[0].important);
    }

    #[test]
    fn quoted_values_keep_semicolons() {
        let decls = parse_declarations("font-family: 'A;B'; fill: none").unwrap();
        assert_eq!(decls[0].value, "'A;B'");
        assert_eq!(decls[1].value, "none");
    }

    #[test]
    fn empty_declarations_are_skipped() {
        let decls = parse_declarations(" ; fill: red;; opacity: ;").unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, "fill");
    }

    #[test]
    fn missing_colon_is_error() {
        let err = parse_declarations("fill red").unwrap_err();
        assert_eq!(err, ParseError::MissingColon("fill red".into()));
    }

    #[test]
    fn empty_property_is_error() {
        let err = parse_declarations(": red").unwrap_err();
        assert_eq!(err, ParseError::EmptyProperty);
    }

    #[test]
    fn unclosed_comment_is_error() {
        let err = parse_declarations("fill: red; /* oops").unwrap_err();
        assert_eq!(err, ParseError::UnexpectedEof);
    }
}
