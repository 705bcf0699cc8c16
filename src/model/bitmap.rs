//! Rasterized content blocks.

use crate::error::{Error, Result};
use crate::units::RasterPixels;
use std::ops::Range;

/// Bytes per RGBA pixel.
pub const CHANNELS: usize = 4;

/// An RGBA8 pixel buffer produced by rasterizing one content block.
///
/// Pixels are stored row-major, top row first. The bitmap is immutable once
/// built; splitting produces new, independent values.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    sample_scale: f32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a bitmap from RGBA8 samples.
    pub fn from_rgba(width: u32, height: u32, sample_scale: f32, pixels: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidBitmap(format!(
                "empty bitmap ({}x{})",
                width, height
            )));
        }
        if !(sample_scale.is_finite() && sample_scale > 0.0) {
            return Err(Error::InvalidBitmap(format!(
                "sample scale must be positive, got {}",
                sample_scale
            )));
        }
        let expected = width as usize * height as usize * CHANNELS;
        if pixels.len() != expected {
            return Err(Error::InvalidBitmap(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            sample_scale,
            pixels,
        })
    }

    /// Create a bitmap from RGB8 samples, treating every pixel as opaque.
    pub fn from_rgb(width: u32, height: u32, sample_scale: f32, rgb: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(Error::InvalidBitmap(format!(
                "expected {} bytes for {}x{} RGB, got {}",
                expected,
                width,
                height,
                rgb.len()
            )));
        }
        let mut pixels = Vec::with_capacity(expected / 3 * CHANNELS);
        for px in rgb.chunks_exact(3) {
            pixels.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        Self::from_rgba(width, height, sample_scale, pixels)
    }

    /// Create a bitmap filled with a single color.
    pub fn solid(width: u32, height: u32, sample_scale: f32, rgba: [u8; 4]) -> Result<Self> {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self::from_rgba(width, height, sample_scale, pixels)
    }

    /// Width in supersampled pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in supersampled pixels (rows).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Supersampling multiplier applied during rasterization.
    pub fn sample_scale(&self) -> f32 {
        self.sample_scale
    }

    /// Raw RGBA8 samples.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Width with the sample scale divided out.
    pub fn nominal_width(&self) -> RasterPixels {
        RasterPixels(self.width as f32 / self.sample_scale)
    }

    /// Height with the sample scale divided out.
    pub fn nominal_height(&self) -> RasterPixels {
        RasterPixels(self.height as f32 / self.sample_scale)
    }

    /// Samples of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * CHANNELS;
        let start = y as usize * stride;
        &self.pixels[start..start + stride]
    }

    /// RGBA sample at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * CHANNELS;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Copy a range of rows into a new bitmap.
    ///
    /// The range is clamped to the bitmap. Returns `None` when nothing is left.
    pub fn crop_rows(&self, rows: Range<u32>) -> Option<Bitmap> {
        let start = rows.start.min(self.height);
        let end = rows.end.min(self.height);
        if start >= end {
            return None;
        }
        let stride = self.width as usize * CHANNELS;
        let pixels = self.pixels[start as usize * stride..end as usize * stride].to_vec();
        Some(Bitmap {
            width: self.width,
            height: end - start,
            sample_scale: self.sample_scale,
            pixels,
        })
    }
}
