//! Pagination options and configuration.

use super::CutOptions;
use crate::error::{Error, Result};
use crate::model::{Language, PageGeometry};
use serde::{Deserialize, Serialize};

/// Largest accepted supersampling multiplier.
pub const MAX_SAMPLE_SCALE: f32 = 8.0;

/// Check a supersampling multiplier against `(0, MAX_SAMPLE_SCALE]`.
pub(crate) fn check_sample_scale(scale: f32) -> Result<()> {
    if !(scale.is_finite() && scale > 0.0 && scale <= MAX_SAMPLE_SCALE) {
        return Err(Error::InvalidOptions(format!(
            "sample scale must be in (0, {}], got {}",
            MAX_SAMPLE_SCALE, scale
        )));
    }
    Ok(())
}

/// Options for paginating content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginateOptions {
    /// Page size and margin
    pub geometry: PageGeometry,

    /// Supersampling multiplier handed to the rasterizer
    pub sample_scale: f32,

    /// Vertical gap inserted after each block, in points
    pub block_gap: f32,

    /// Document language
    pub language: Language,

    /// Title drawn on the first page (language default when `None`)
    ///
    /// The overlay uses the standard Times fonts with WinAnsi encoding;
    /// characters outside that set are drawn as `?`. The PDF metadata keeps
    /// the full text.
    pub title: Option<String>,

    /// Space kept free for the title at the top of the first page, in points
    ///
    /// Values below [`title_clearance`](crate::writer::title_clearance)
    /// let the first block run under the title.
    pub title_reserve: f32,

    /// Draw `-n-` page numbers
    pub page_numbers: bool,

    /// Safe-cut search settings
    pub cut: CutOptions,

    /// zlib level for page images (0-9)
    pub compression_level: u32,
}

impl PaginateOptions {
    /// Create new pagination options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page geometry.
    pub fn with_geometry(mut self, geometry: PageGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set the margin.
    pub fn with_margin(mut self, margin: f32) -> Self {
        self.geometry.margin = margin;
        self
    }

    /// Set the page size.
    pub fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.geometry.page_width = width;
        self.geometry.page_height = height;
        self
    }

    /// Set the supersampling multiplier.
    pub fn with_sample_scale(mut self, scale: f32) -> Self {
        self.sample_scale = scale;
        self
    }

    /// Set the gap between blocks.
    pub fn with_block_gap(mut self, gap: f32) -> Self {
        self.block_gap = gap;
        self
    }

    /// Set the document language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Set the title. Only WinAnsi characters are drawn on the page.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Reserve space for the title on the first page.
    pub fn with_title_reserve(mut self, reserve: f32) -> Self {
        self.title_reserve = reserve;
        self
    }

    /// Enable or disable page numbers.
    pub fn with_page_numbers(mut self, enabled: bool) -> Self {
        self.page_numbers = enabled;
        self
    }

    /// Set safe-cut options.
    pub fn with_cut_options(mut self, cut: CutOptions) -> Self {
        self.cut = cut;
        self
    }

    /// Set the zlib level for page images.
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    /// Title that will be drawn on the first page.
    pub fn effective_title(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or_else(|| self.language.default_title())
    }

    /// Check that the options describe a usable layout.
    pub fn validate(&self) -> Result<()> {
        self.geometry.validate()?;
        check_sample_scale(self.sample_scale)?;
        if !(self.block_gap.is_finite() && self.block_gap >= 0.0) {
            return Err(Error::InvalidOptions(format!(
                "block gap must be non-negative, got {}",
                self.block_gap
            )));
        }
        let content_height = self.geometry.content_height().get();
        if !(self.title_reserve >= 0.0 && self.title_reserve < content_height) {
            return Err(Error::InvalidOptions(format!(
                "title reserve {} must be within the content height {}",
                self.title_reserve, content_height
            )));
        }
        Ok(())
    }
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::a4(),
            sample_scale: 2.0,
            block_gap: 20.0,
            language: Language::English,
            title: None,
            title_reserve: 50.0,
            page_numbers: true,
            cut: CutOptions::default(),
            compression_level: 6,
        }
    }
}
