//! Inline images referenced from `<image>`.

use base64::Engine;
use rustkit_codecs::{CodecError, ImageFormat};

use crate::dom;
use crate::geometry::{self, Rect};

/// The payload of a `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Declared media type, if any.
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

/// Parse `data:[<mediatype>][;base64],<data>`.
pub fn parse_data_url(href: &str) -> Result<DataUrl, CodecError> {
    let rest = href
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| CodecError::Unsupported(format!("not a data URL: {}", truncate(href))))?;

    let (metadata, data) = rest
        .split_once(',')
        .ok_or_else(|| CodecError::Invalid("data URL has no ','".into()))?;

    let mut params = metadata.split(';');
    let mime = params
        .next()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_ascii_lowercase);
    let is_base64 = params.any(|p| p.trim().eq_ignore_ascii_case("base64"));

    let data = if is_base64 {
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| CodecError::Invalid(format!("base64 decode error: {}", e)))?
    } else {
        urlencoding::decode_binary(data.as_bytes()).into_owned()
    };

    Ok(DataUrl { mime, data })
}

/// Decode the pixels of `image` and place them in user space.
///
/// A missing width or height falls back to the decoded pixel size.
pub fn load(image: &dom::Image) -> Result<geometry::Image, CodecError> {
    let url = parse_data_url(&image.href)?;
    let format = url.mime.as_deref().and_then(ImageFormat::from_mime);
    let pixels = rustkit_codecs::decode(format, &url.data)?;

    let bounds = Rect::new(
        image.x,
        image.y,
        image.width.unwrap_or(pixels.width() as f32),
        image.height.unwrap_or(pixels.height() as f32),
    );
    Ok(geometry::Image { bounds, pixels })
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(32) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
