//! # RustKit Codecs
//!
//! Minimal image codec layer used by RustKit to decode raster payloads embedded
//! in vector documents (`<image href="data:...">`).
//!
//! Current support:
//! - PNG (via `png` crate)
//! - JPEG (via `jpeg-decoder` crate)

use thiserror::Error;

/// Supported image formats (detected by magic bytes or MIME type).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Parse a MIME type such as `image/png`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// MIME type for this format.
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Errors that can occur during decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unsupported image format: {0}")]
    Unsupported(String),

    #[error("Invalid image data: {0}")]
    Invalid(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

/// A simple RGBA8 image buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaImage {
    width: u32,
    height: u32,
    data: Vec<u8>, // RGBA8, row-major
}

impl RgbaImage {
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CodecError> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if data.len() != expected {
            return Err(CodecError::Invalid(format!(
                "RGBA buffer length mismatch: got {}, expected {}",
                data.len(),
                expected
            )));
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Detect image format by magic bytes.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(ImageFormat::Png);
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    None
}

/// Decode an image payload.
///
/// `declared` is the format named by the container (e.g. a data URL's MIME
/// type). The payload's magic bytes take precedence when they disagree, since
/// authoring tools frequently mislabel embedded images.
pub fn decode(declared: Option<ImageFormat>, bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    let format = detect_format(bytes)
        .or(declared)
        .ok_or_else(|| CodecError::Unsupported("unrecognised image signature".into()))?;

    match format {
        ImageFormat::Png => decode_png(bytes),
        ImageFormat::Jpeg => decode_jpeg(bytes),
    }
}

pub fn decode_png(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    let mut decoder = png::Decoder::new(bytes);
    // Expand palette/gray to RGB(A), strip 16-bit.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);

    let mut reader = decoder
        .read_info()
        .map_err(|e| CodecError::Decode(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let output = reader
        .next_frame(&mut buf)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    buf.truncate(output.buffer_size());

    let rgba = match output.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => expand(&buf, 3, |px| [px[0], px[1], px[2], 255]),
        png::ColorType::GrayscaleAlpha => expand(&buf, 2, |px| [px[0], px[0], px[0], px[1]]),
        png::ColorType::Grayscale => expand(&buf, 1, |px| [px[0], px[0], px[0], 255]),
        png::ColorType::Indexed => {
            return Err(CodecError::Decode(
                "Indexed PNG remained after EXPAND".to_string(),
            ))
        }
    };

    RgbaImage::from_rgba8(output.width, output.height, rgba)
}

pub fn decode_jpeg(bytes: &[u8]) -> Result<RgbaImage, CodecError> {
    let mut decoder = jpeg_decoder::Decoder::new(std::io::Cursor::new(bytes));
    let pixels = decoder
        .decode()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    let info = decoder
        .info()
        .ok_or_else(|| CodecError::Decode("Missing JPEG info".into()))?;

    let rgba = match info.pixel_format {
        jpeg_decoder::PixelFormat::RGB24 => expand(&pixels, 3, |px| [px[0], px[1], px[2], 255]),
        jpeg_decoder::PixelFormat::L8 => expand(&pixels, 1, |px| [px[0], px[0], px[0], 255]),
        other => {
            return Err(CodecError::Decode(format!(
                "Unsupported JPEG pixel format: {:?}",
                other
            )))
        }
    };

    RgbaImage::from_rgba8(u32::from(info.width), u32::from(info.height), rgba)
}

fn expand(src: &[u8], channels: usize, to_rgba: impl Fn(&[u8]) -> [u8; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() / channels * 4);
    for px in src.chunks_exact(channels) {
        out.extend_from_slice(&to_rgba(px));
    }
    out
}
