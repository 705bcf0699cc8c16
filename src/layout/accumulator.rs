//! Page-sized pixel buffer that blocks are composited into.

use super::options::check_sample_scale;
use crate::error::{Error, Result};
use crate::model::{Bitmap, PageGeometry, PageImage, Placement, PlacementPart, Rect, CHANNELS};
use crate::units::PageUnits;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;
use std::ops::Range;

/// Bytes per pixel in the page buffer.
const PAGE_CHANNELS: usize = 3;

/// Largest page buffer, in pixels, that will be allocated.
const MAX_PAGE_PIXELS: u64 = 1 << 27;

/// Rounding slack tolerated before clipping is reported.
const CLIP_TOLERANCE: f32 = 0.5;

/// One page worth of RGB pixels at the run's sample scale.
///
/// The buffer spans the whole page including margins; destination rectangles
/// are given in content-area coordinates and are clipped to the content area
/// before anything is drawn.
#[derive(Debug)]
pub struct PageAccumulator {
    geometry: PageGeometry,
    sample_scale: f32,
    width: u32,
    height: u32,
    buffer: Vec<u8>,
    placements: Vec<Placement>,
    compression: Compression,
}

impl PageAccumulator {
    /// Create a blank page buffer.
    pub fn new(geometry: PageGeometry, sample_scale: f32) -> Result<Self> {
        geometry.validate()?;
        check_sample_scale(sample_scale)?;
        let width = ((geometry.page_width * sample_scale).round() as u32).max(1);
        let height = ((geometry.page_height * sample_scale).round() as u32).max(1);
        if width as u64 * height as u64 > MAX_PAGE_PIXELS {
            return Err(Error::InvalidOptions(format!(
                "page buffer of {}x{} pixels is too large",
                width, height
            )));
        }
        Ok(Self {
            geometry,
            sample_scale,
            width,
            height,
            buffer: vec![255; width as usize * height as usize * PAGE_CHANNELS],
            placements: Vec::new(),
            compression: Compression::default(),
        })
    }

    /// Set the zlib level used by [`flush`](Self::flush).
    pub fn with_compression(mut self, level: u32) -> Self {
        self.compression = Compression::new(level.min(9));
        self
    }

    /// Buffer width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether nothing has been drawn since the last flush.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Regions drawn since the last flush.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// RGB sample at page pixel `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * PAGE_CHANNELS;
        [self.buffer[i], self.buffer[i + 1], self.buffer[i + 2]]
    }

    /// Composite `src_rows` of `bitmap` into `dest`.
    ///
    /// The source rows are resampled (nearest neighbour) to the destination
    /// size and alpha-blended over what is already on the page. Returns the
    /// rectangle actually covered after clipping to the content area.
    pub fn draw(
        &mut self,
        bitmap: &Bitmap,
        src_rows: Range<u32>,
        dest: Rect,
        block: usize,
        part: PlacementPart,
    ) -> Rect {
        let content_width = self.geometry.content_width();
        let content_height = self.geometry.content_height();
        let clipped = dest.clip_to(content_width, content_height);
        if !dest.within(content_width, content_height, CLIP_TOLERANCE) {
            log::warn!(
                "block {} destination {:?} exceeds content area, clipped to {:?}",
                block,
                dest,
                clipped
            );
        }

        let src_start = src_rows.start.min(bitmap.height());
        let src_end = src_rows.end.min(bitmap.height());

        self.placements.push(Placement {
            block,
            part,
            src_start,
            src_end,
            dest: clipped,
        });

        if src_start >= src_end || clipped.width.get() <= 0.0 || clipped.height.get() <= 0.0 {
            return clipped;
        }

        let to_px = |v: PageUnits| (self.geometry.margin + v.get()) * self.sample_scale;
        // sampling follows the requested rectangle, iteration the clipped one
        let (x0, x1) = (to_px(dest.x), to_px(dest.right()));
        let (y0, y1) = (to_px(dest.y), to_px(dest.bottom()));
        let px_range = |a: f32, b: f32, limit: u32| {
            let lo = (a.round().max(0.0) as u32).min(limit);
            let hi = (b.round().max(0.0) as u32).min(limit);
            lo..hi
        };
        let cols = px_range(to_px(clipped.x), to_px(clipped.right()), self.width);
        let rows = px_range(to_px(clipped.y), to_px(clipped.bottom()), self.height);

        let src_height = (src_end - src_start) as f32;
        let src_width = bitmap.width() as f32;
        let span_x = (x1 - x0).max(f32::EPSILON);
        let span_y = (y1 - y0).max(f32::EPSILON);

        for py in rows {
            let t = ((py as f32 + 0.5 - y0) / span_y).clamp(0.0, 1.0);
            let sy = (src_start + (t * src_height) as u32).min(src_end - 1);
            let src_row = bitmap.row(sy);
            let dst_row_start = py as usize * self.width as usize * PAGE_CHANNELS;
            for px in cols.clone() {
                let u = ((px as f32 + 0.5 - x0) / span_x).clamp(0.0, 1.0);
                let sx = ((u * src_width) as u32).min(bitmap.width() - 1) as usize;
                let s = &src_row[sx * CHANNELS..(sx + 1) * CHANNELS];
                let alpha = s[3] as u32;
                if alpha == 0 {
                    continue;
                }
                let d = dst_row_start + px as usize * PAGE_CHANNELS;
                for c in 0..PAGE_CHANNELS {
                    let dst = self.buffer[d + c] as u32;
                    self.buffer[d + c] =
                        ((s[c] as u32 * alpha + dst * (255 - alpha) + 127) / 255) as u8;
                }
            }
        }

        clipped
    }

    /// Compress the page into an image and reset to a blank page.
    pub fn flush(&mut self) -> Result<PageImage> {
        let mut encoder = ZlibEncoder::new(
            Vec::with_capacity(self.buffer.len() / 8),
            self.compression,
        );
        encoder
            .write_all(&self.buffer)
            .map_err(|e| Error::Encode(e.to_string()))?;
        let data = encoder.finish().map_err(|e| Error::Encode(e.to_string()))?;

        let image = PageImage {
            width: self.width,
            height: self.height,
            data,
            placements: std::mem::take(&mut self.placements),
        };
        log::debug!(
            "flushed {}x{} page with {} placements ({} bytes compressed)",
            image.width,
            image.height,
            image.placements.len(),
            image.data.len()
        );
        self.clear();
        Ok(image)
    }

    /// Reset to a blank white page.
    pub fn clear(&mut self) {
        self.buffer.fill(255);
        self.placements.clear();
    }
}
