//! Stamping a QR code onto a certificate image.
//!
//! Geometry and pixels are kept apart: [`compute_placement`] is pure integer
//! math over the certificate dimensions, while [`RasterCompositor`] decodes,
//! draws, and re-encodes with the `image` crate. The pipeline talks to the
//! [`Compositor`] trait so tests can swap in a fake.

use std::fmt;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView};
use thiserror::Error;
use tracing::trace;

use crate::placement::{HorizontalAnchor, PlacementConfig, VerticalAnchor};

/// JPEG quality used for every composited output.
pub const OUTPUT_JPEG_QUALITY: u8 = 95;

/// Which input a decode error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    /// The certificate the QR code is drawn onto.
    Base,
    /// The QR code.
    Overlay,
}

impl fmt::Display for ImageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRole::Base => f.write_str("certificate"),
            ImageRole::Overlay => f.write_str("QR code"),
        }
    }
}

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("Failed to decode {role} image: {source}")]
    Decode {
        role: ImageRole,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to encode composited image: {0}")]
    Encode(#[source] image::ImageError),
}

/// Top-left corner and edge length of the QR code on the certificate.
///
/// Coordinates may be negative or past the far edge; nothing is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
    pub size: u32,
    pub margin: u32,
}

fn percent_of(width: u32, percent: f64) -> u32 {
    let value = (f64::from(width) * percent / 100.0).round();
    if value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}

/// Compute where the QR code lands on a `base_width × base_height` certificate.
///
/// Size and margin are both percentages of the width. Centered axes use floor
/// division of the leftover space.
pub fn compute_placement(base_width: u32, base_height: u32, config: &PlacementConfig) -> Placement {
    let size = percent_of(base_width, config.size_percent);
    let margin = percent_of(base_width, config.margin_percent);

    let (w, h, s, m) =
        (i64::from(base_width), i64::from(base_height), i64::from(size), i64::from(margin));

    let x = match config.horizontal {
        HorizontalAnchor::Left => m,
        HorizontalAnchor::Center => (w - s).div_euclid(2),
        HorizontalAnchor::Right => w - s - m,
    };
    let y = match config.vertical {
        VerticalAnchor::Top => m,
        VerticalAnchor::Middle => (h - s).div_euclid(2),
        VerticalAnchor::Bottom => h - s - m,
    };

    Placement { x, y, size, margin }
}

/// Renders one image onto another and returns encoded bytes.
pub trait Compositor: Send + Sync {
    /// Draw `overlay` onto `base` as placed by `config` and return the encoded result.
    fn composite(
        &self,
        base: &[u8],
        overlay: &[u8],
        config: &PlacementConfig,
    ) -> Result<Vec<u8>, CompositeError>;

    /// Render a single pair for interactive tuning. Nothing is retained.
    fn preview(
        &self,
        base: &[u8],
        overlay: &[u8],
        config: &PlacementConfig,
    ) -> Result<Vec<u8>, CompositeError> {
        self.composite(base, overlay, config)
    }

    fn name(&self) -> &'static str;
}

/// Production compositor backed by the `image` crate; always emits JPEG.
#[derive(Debug, Clone, Copy)]
pub struct RasterCompositor {
    pub quality: u8,
    pub filter: FilterType,
}

impl Default for RasterCompositor {
    fn default() -> Self {
        Self { quality: OUTPUT_JPEG_QUALITY, filter: FilterType::Lanczos3 }
    }
}

impl RasterCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite into a decoded RGBA surface without encoding.
    ///
    /// The returned surface has exactly the base image's dimensions.
    pub fn render(
        &self,
        base: &[u8],
        overlay: &[u8],
        config: &PlacementConfig,
    ) -> Result<(image::RgbaImage, Placement), CompositeError> {
        let base_image = decode(base, ImageRole::Base)?;
        let overlay_image = decode(overlay, ImageRole::Overlay)?;

        let (width, height) = base_image.dimensions();
        let placement = compute_placement(width, height, config);
        trace!(width, height, ?placement, "computed QR placement");

        let mut canvas = base_image.into_rgba8();
        if let Some(visible) = VisibleRegion::of(&placement, width, height) {
            let overlay_rgba = overlay_image.into_rgba8();
            let (src_w, src_h) = overlay_rgba.dimensions();
            let (sx, sw) = source_span(visible.x0, visible.x1, src_w, placement.size);
            let (sy, sh) = source_span(visible.y0, visible.y1, src_h, placement.size);

            // Only the visible part is resampled.
            let source = imageops::crop_imm(&overlay_rgba, sx, sy, sw, sh).to_image();
            let (dst_w, dst_h) = (visible.x1 - visible.x0, visible.y1 - visible.y0);
            let scaled = imageops::resize(&source, dst_w, dst_h, self.filter);
            imageops::overlay(
                &mut canvas,
                &scaled,
                placement.x + i64::from(visible.x0),
                placement.y + i64::from(visible.y0),
            );
        }

        Ok((canvas, placement))
    }
}

/// Part of the scaled QR square that lands on the canvas.
///
/// Offsets are relative to the square's top-left corner, so `x1 - x0` never
/// exceeds the canvas width however large the square is.
#[derive(Debug, Clone, Copy)]
struct VisibleRegion {
    x0: u32,
    x1: u32,
    y0: u32,
    y1: u32,
}

impl VisibleRegion {
    fn of(placement: &Placement, width: u32, height: u32) -> Option<Self> {
        let (x0, x1) = visible_span(placement.x, placement.size, width)?;
        let (y0, y1) = visible_span(placement.y, placement.size, height)?;
        Some(Self { x0, x1, y0, y1 })
    }
}

/// Source pixels `(start, len)` covering `[from, to)` of a square of edge `size`.
fn source_span(from: u32, to: u32, src_len: u32, size: u32) -> (u32, u32) {
    let (src, size) = (u64::from(src_len), u64::from(size));
    let start = (u64::from(from) * src / size).min(src.saturating_sub(1));
    let end = (u64::from(to) * src).div_ceil(size).clamp(start + 1, src);
    (start as u32, (end - start) as u32)
}

/// Clip `[origin, origin + size)` to `[0, limit)`, relative to `origin`.
fn visible_span(origin: i64, size: u32, limit: u32) -> Option<(u32, u32)> {
    let start = origin.max(0);
    let end = (origin + i64::from(size)).min(i64::from(limit));
    if start >= end {
        return None;
    }
    Some(((start - origin) as u32, (end - origin) as u32))
}

impl Compositor for RasterCompositor {
    fn composite(
        &self,
        base: &[u8],
        overlay: &[u8],
        config: &PlacementConfig,
    ) -> Result<Vec<u8>, CompositeError> {
        let (canvas, _placement) = self.render(base, overlay, config)?;
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();

        let mut encoded = Cursor::new(Vec::new());
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut encoded, self.quality);
            encoder.encode_image(&rgb).map_err(CompositeError::Encode)?;
        }
        Ok(encoded.into_inner())
    }

    fn name(&self) -> &'static str {
        "raster"
    }
}

fn decode(bytes: &[u8], role: ImageRole) -> Result<DynamicImage, CompositeError> {
    image::load_from_memory(bytes).map_err(|source| CompositeError::Decode { role, source })
}
