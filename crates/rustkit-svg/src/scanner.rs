//! Cursor-based text scanner.
//!
//! Every `scan_*` call either matches and advances the cursor, or leaves the
//! cursor exactly where it was. Parsers compose alternatives by trying one form
//! and falling back to the next without saving and restoring positions.

use crate::error::ScanError;

/// A set of characters to match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharSet<'a> {
    /// Unicode whitespace.
    Whitespace,
    /// ASCII digits `0-9`.
    Digits,
    /// ASCII hexadecimal digits.
    HexDigits,
    /// Any of the listed characters.
    Chars(&'a str),
}

impl CharSet<'_> {
    pub fn contains(&self, c: char) -> bool {
        match self {
            CharSet::Whitespace => c.is_whitespace(),
            CharSet::Digits => c.is_ascii_digit(),
            CharSet::HexDigits => c.is_ascii_hexdigit(),
            CharSet::Chars(chars) => chars.contains(c),
        }
    }
}

/// Forward-only scanner over an immutable string.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    text: &'a str,
    index: usize,
    /// Characters skipped before every scan. Defaults to whitespace.
    pub preceding_characters_to_skip: Option<CharSet<'static>>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            index: 0,
            preceding_characters_to_skip: Some(CharSet::Whitespace),
        }
    }

    /// Byte offset of the cursor.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Unscanned text, including any skippable prefix.
    pub fn remainder(&self) -> &'a str {
        &self.text[self.index..]
    }

    /// True once only skippable characters (or nothing) remain.
    pub fn is_at_end(&self) -> bool {
        self.token_start() == self.text.len()
    }

    /// Offset of the next token once skippable characters are passed over.
    fn token_start(&self) -> usize {
        let rest = &self.text[self.index..];
        match self.preceding_characters_to_skip {
            Some(skip) => {
                let skipped: usize = rest
                    .chars()
                    .take_while(|c| skip.contains(*c))
                    .map(char::len_utf8)
                    .sum();
                self.index + skipped
            }
            None => self.index,
        }
    }

    fn error(&self, expected: &'static str) -> ScanError {
        ScanError {
            expected,
            index: self.token_start(),
        }
    }

    /// Match a literal string.
    pub fn scan_literal(&mut self, literal: &str) -> Option<&'a str> {
        let start = self.token_start();
        let rest = &self.text[start..];
        if rest.starts_with(literal) {
            self.index = start + literal.len();
            Some(&rest[..literal.len()])
        } else {
            None
        }
    }

    /// Match exactly one character from `set`.
    pub fn scan_first(&mut self, set: CharSet<'_>) -> Option<char> {
        let start = self.token_start();
        let c = self.text[start..].chars().next()?;
        if set.contains(c) {
            self.index = start + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }

    /// Match the longest non-empty run of characters from `set`.
    pub fn scan_any(&mut self, set: CharSet<'_>) -> Option<&'a str> {
        self.scan_while(|c| set.contains(c))
    }

    /// Match everything up to (not including) the first character in `stop`.
    pub fn scan_up_to(&mut self, stop: CharSet<'_>) -> Option<&'a str> {
        self.scan_while(|c| !stop.contains(c))
    }

    /// Match all remaining text.
    pub fn scan_to_end(&mut self) -> Option<&'a str> {
        self.scan_while(|_| true)
    }

    fn scan_while(&mut self, pred: impl Fn(char) -> bool) -> Option<&'a str> {
        let start = self.token_start();
        let rest = &self.text[start..];
        let len: usize = rest
            .chars()
            .take_while(|c| pred(*c))
            .map(char::len_utf8)
            .sum();
        if len == 0 {
            return None;
        }
        self.index = start + len;
        Some(&rest[..len])
    }

    /// Match a decimal number: `[+-]?(\d+(\.\d+)?|\.\d+)([eE][+-]?\d+)?`.
    pub fn scan_coordinate(&mut self) -> Result<f32, ScanError> {
        let start = self.token_start();
        let end = number_end(self.text.as_bytes(), start).ok_or_else(|| self.error("number"))?;
        let value = self.text[start..end]
            .parse::<f32>()
            .map_err(|_| self.error("number"))?;
        self.index = end;
        Ok(value)
    }

    /// Match a number optionally followed by `%`, which divides it by 100.
    pub fn scan_percentage(&mut self) -> Result<f32, ScanError> {
        let value = self.scan_coordinate()?;
        if self.text[self.index..].starts_with('%') {
            self.index += 1;
            Ok(value / 100.0)
        } else {
            Ok(value)
        }
    }

    /// Match a single `0` or `1` flag.
    pub fn scan_bool(&mut self) -> Result<bool, ScanError> {
        match self.scan_first(CharSet::Chars("01")) {
            Some('1') => Ok(true),
            Some(_) => Ok(false),
            None => Err(self.error("0 or 1")),
        }
    }

    /// Match an unsigned decimal integer no greater than 255.
    pub fn scan_uint8(&mut self) -> Result<u8, ScanError> {
        let start = self.token_start();
        let digits: usize = self.text[start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits == 0 {
            return Err(self.error("integer 0-255"));
        }
        let value = self.text[start..start + digits]
            .parse::<u8>()
            .map_err(|_| self.error("integer 0-255"))?;
        self.index = start + digits;
        Ok(value)
    }
}

/// End offset of the number starting at `start`, if one is present.
fn number_end(bytes: &[u8], start: usize) -> Option<usize> {
    let digits_from = |i: usize| bytes[i..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut i = start;
    if matches!(bytes.get(i), Some(b'-' | b'+')) {
        i += 1;
    }

    let int_digits = digits_from(i);
    i += int_digits;

    if bytes.get(i) == Some(&b'.') {
        let frac_digits = digits_from(i + 1);
        if frac_digits > 0 {
            i += 1 + frac_digits;
        } else if int_digits == 0 {
            return None;
        }
    } else if int_digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'-' | b'+')) {
            j += 1;
        }
        let exp_digits = digits_from(j);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    Some(i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coordinate(text: &str) -> Option<f32> {
        Scanner::new(text).scan_coordinate().ok()
    }

    #[test]
    fn test_char_sets() {
        let mut scanner = Scanner::new(" 29384 Az 2939  \t 4 ; 54 ");
        scanner.preceding_characters_to_skip = None;

        assert_eq!(scanner.scan_any(CharSet::Digits), None);
        assert_eq!(scanner.scan_any(CharSet::Whitespace), Some(" "));
        assert_eq!(scanner.scan_any(CharSet::Digits), Some("29384"));
        assert_eq!(scanner.scan_any(CharSet::Whitespace), Some(" "));
        assert_eq!(scanner.scan_any(CharSet::Chars("za")), None);
        assert_eq!(scanner.scan_any(CharSet::Chars("zA")), Some("Az"));
        assert_eq!(scanner.scan_any(CharSet::Whitespace), Some(" "));
        assert_eq!(scanner.scan_any(CharSet::Digits), Some("2939"));
        assert_eq!(scanner.scan_any(CharSet::Whitespace), Some("  \t "));
        assert_eq!(scanner.scan_literal("4"), Some("4"));
        assert_eq!(scanner.scan_any(CharSet::Whitespace), Some(" "));
        assert_eq!(scanner.scan_literal(";"), Some(";"));
        assert_eq!(scanner.scan_any(CharSet::Whitespace), Some(" "));
        assert_eq!(scanner.scan_any(CharSet::Digits), Some("54"));
        assert_eq!(scanner.scan_any(CharSet::Whitespace), Some(" "));
        assert_eq!(scanner.scan_any(CharSet::Whitespace), None);
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_literals() {
        let mut scanner = Scanner::new("The quick brown  \tfox jumps over the lazy dog.");
        assert_eq!(scanner.scan_literal("THE quick"), None);
        assert_eq!(scanner.scan_literal("The quick brown"), Some("The quick brown"));
        assert_eq!(scanner.scan_literal("fox "), Some("fox "));
        assert_eq!(
            scanner.scan_literal("jumps over the lazy dog."),
            Some("jumps over the lazy dog.")
        );
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_empty_literal_always_matches() {
        let mut scanner = Scanner::new("Simon;");
        assert_eq!(scanner.scan_literal("Sim"), Some("Sim"));
        assert_eq!(scanner.scan_literal(""), Some(""));
        assert_eq!(scanner.scan_literal("on"), Some("on"));
        assert_eq!(scanner.scan_literal(";"), Some(";"));
        assert_eq!(scanner.scan_literal(""), Some(""));
        assert_eq!(scanner.scan_literal("Hi"), None);
    }

    #[test]
    fn test_up_to_and_to_end() {
        let mut scanner = Scanner::new("  fill : red; stroke");
        assert_eq!(scanner.scan_up_to(CharSet::Chars(" \t:")), Some("fill"));
        assert_eq!(scanner.scan_literal(":"), Some(":"));
        assert_eq!(scanner.scan_up_to(CharSet::Chars(";")), Some("red"));
        assert_eq!(scanner.scan_first(CharSet::Chars(";,")), Some(';'));
        assert_eq!(scanner.scan_up_to(CharSet::Chars(";")), Some("stroke"));
        assert_eq!(scanner.scan_to_end(), None);
    }

    #[test]
    fn test_coordinates() {
        assert_eq!(coordinate("30"), Some(30.0));
        assert_eq!(coordinate("30.05"), Some(30.05));
        assert_eq!(coordinate("-30"), Some(-30.0));
        assert_eq!(coordinate("-30.05"), Some(-30.05));
        assert_eq!(coordinate("3E3"), Some(3000.0));
        assert_eq!(coordinate("3e3"), Some(3000.0));
        assert_eq!(coordinate("-3E3"), Some(-3000.0));
        assert_eq!(coordinate("3E-3"), Some(0.003));
        assert_eq!(coordinate("-3e-3"), Some(-0.003));
        assert_eq!(coordinate(" 30 "), Some(30.0));
        assert_eq!(coordinate(".5"), Some(0.5));
        assert_eq!(coordinate("+2"), Some(2.0));
        assert_eq!(coordinate("abc"), None);
        assert_eq!(coordinate("-"), None);
        assert_eq!(coordinate("."), None);
    }

    #[test]
    fn test_coordinate_sequence() {
        let mut scanner = Scanner::new("  30 10 30.40;  0.04    -10; -0.124 4 7E3");
        assert_eq!(scanner.scan_coordinate(), Ok(30.0));
        assert_eq!(scanner.scan_coordinate(), Ok(10.0));
        assert_eq!(scanner.scan_coordinate(), Ok(30.40));
        assert_eq!(scanner.scan_literal(";"), Some(";"));
        assert_eq!(scanner.scan_coordinate(), Ok(0.04));
        assert_eq!(scanner.scan_coordinate(), Ok(-10.0));
        assert_eq!(scanner.scan_literal(";"), Some(";"));
        assert_eq!(scanner.scan_coordinate(), Ok(-0.124));
        assert_eq!(scanner.scan_coordinate(), Ok(4.0));
        assert_eq!(scanner.scan_coordinate(), Ok(7e3));
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_tight_coordinate_sequence() {
        let mut scanner = Scanner::new("10.05,12.04-49.05,30.02-10");
        let mut values = Vec::new();
        while let Ok(v) = scanner.scan_coordinate() {
            values.push(v);
            scanner.scan_first(CharSet::Chars(","));
        }
        assert_eq!(values, vec![10.05, 12.04, -49.05, 30.02, -10.0]);
    }

    #[test]
    fn test_exponent_needs_digits() {
        let mut scanner = Scanner::new("5em");
        assert_eq!(scanner.scan_coordinate(), Ok(5.0));
        assert_eq!(scanner.remainder(), "em");
    }

    #[test]
    fn test_failed_scan_does_not_move() {
        let mut scanner = Scanner::new("  x1");
        let err = scanner.scan_coordinate().unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(scanner.index(), 0);
        assert!(scanner.scan_bool().is_err());
        assert!(scanner.scan_uint8().is_err());
        assert_eq!(scanner.index(), 0);
    }

    #[test]
    fn test_bools() {
        let mut scanner = Scanner::new("0 1   1  0  1; 0;  0 ");
        assert_eq!(scanner.scan_bool(), Ok(false));
        assert_eq!(scanner.scan_bool(), Ok(true));
        assert_eq!(scanner.scan_bool(), Ok(true));
        assert_eq!(scanner.scan_bool(), Ok(false));
        assert_eq!(scanner.scan_bool(), Ok(true));
        assert_eq!(scanner.scan_literal(";"), Some(";"));
        assert_eq!(scanner.scan_bool(), Ok(false));
        assert_eq!(scanner.scan_literal(";"), Some(";"));
        assert_eq!(scanner.scan_bool(), Ok(false));
        assert!(Scanner::new("2").scan_bool().is_err());
        assert!(Scanner::new("true").scan_bool().is_err());
    }

    #[test]
    fn test_percentage() {
        assert_eq!(Scanner::new("50%").scan_percentage(), Ok(0.5));
        assert_eq!(Scanner::new("0.25").scan_percentage(), Ok(0.25));
    }

    #[test]
    fn test_uint8() {
        assert_eq!(Scanner::new("255").scan_uint8(), Ok(255));
        assert_eq!(Scanner::new(" 0,").scan_uint8(), Ok(0));
        assert!(Scanner::new("256").scan_uint8().is_err());
        assert!(Scanner::new("-1").scan_uint8().is_err());
    }

    proptest! {
        #[test]
        fn coordinate_round_trips(
            negative in any::<bool>(),
            int in 0u32..100_000,
            frac in proptest::option::of(0u32..1000),
            exp in proptest::option::of(-5i32..5),
        ) {
            let mut text = format!("{}{}", if negative { "-" } else { "" }, int);
            if let Some(frac) = frac {
                text.push_str(&format!(".{:03}", frac));
            }
            if let Some(exp) = exp {
                text.push_str(&format!("e{}", exp));
            }
            let expected: f32 = text.parse().unwrap();
            let mut scanner = Scanner::new(&text);
            prop_assert_eq!(scanner.scan_coordinate(), Ok(expected));
            prop_assert!(scanner.is_at_end());
        }
    }
}
