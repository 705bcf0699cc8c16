//! Coordinate units and the conversions between them.
//!
//! Three measuring spaces meet in the paginator:
//!
//! - [`SupersampledPixels`]: rows and columns of a rasterized [`Bitmap`],
//!   rendered at `sample_scale` times the nominal density.
//! - [`RasterPixels`]: the nominal size of the rendered content, i.e. bitmap
//!   pixels with the sample scale divided out.
//! - [`PageUnits`]: output page points after the fit-to-width scale.
//!
//! Arithmetic is only defined within a unit. Crossing spaces goes through a
//! [`Scaling`], which holds the two factors involved.
//!
//! [`Bitmap`]: crate::model::Bitmap

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

macro_rules! unit {
    ($(#[$meta:meta])* $name:ident, $suffix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub f32);

        impl $name {
            /// Zero length.
            pub const ZERO: Self = Self(0.0);

            /// Raw value.
            pub fn get(self) -> f32 {
                self.0
            }

            /// The smaller of two lengths.
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// The larger of two lengths.
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:.2}{}", self.0, $suffix)
            }
        }
    };
}

unit!(
    /// Length in supersampled bitmap pixels.
    SupersampledPixels,
    "spx"
);
unit!(
    /// Length in nominal (pre-supersampling) pixels.
    RasterPixels,
    "px"
);
unit!(
    /// Length in output page points (1/72 inch).
    PageUnits,
    "pt"
);

impl SupersampledPixels {
    /// Whole rows covered by this length, rounded down and never negative.
    pub fn whole_rows(self) -> u32 {
        if self.0 <= 0.0 {
            0
        } else {
            self.0.floor() as u32
        }
    }
}

impl From<u32> for SupersampledPixels {
    fn from(rows: u32) -> Self {
        Self(rows as f32)
    }
}

/// Conversion factors for one bitmap placed on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    /// Supersampling multiplier used during rasterization
    pub sample_scale: f32,
    /// Fit-to-width factor from nominal pixels to page units (never above 1)
    pub fit: f32,
}

impl Scaling {
    /// Scaling for content `nominal_width` wide placed into `content_width`.
    ///
    /// Narrow content is never upscaled.
    pub fn fit(nominal_width: RasterPixels, content_width: PageUnits, sample_scale: f32) -> Self {
        let fit = if nominal_width.0 > 0.0 {
            (content_width.0 / nominal_width.0).min(1.0)
        } else {
            1.0
        };
        Self { sample_scale, fit }
    }

    /// Supersampled pixels to nominal pixels.
    pub fn to_raster(&self, len: SupersampledPixels) -> RasterPixels {
        RasterPixels(len.0 / self.sample_scale)
    }

    /// Nominal pixels to page units.
    pub fn to_page(&self, len: RasterPixels) -> PageUnits {
        PageUnits(len.0 * self.fit)
    }

    /// Bitmap rows straight to page units.
    pub fn rows_to_page(&self, rows: u32) -> PageUnits {
        self.to_page(self.to_raster(SupersampledPixels::from(rows)))
    }

    /// Page units back to supersampled pixels of the source bitmap.
    pub fn page_to_supersampled(&self, len: PageUnits) -> SupersampledPixels {
        SupersampledPixels(len.0 * self.sample_scale / self.fit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_never_upscales() {
        let narrow = Scaling::fit(RasterPixels(100.0), PageUnits(555.0), 2.0);
        assert_eq!(narrow.fit, 1.0);

        let wide = Scaling::fit(RasterPixels(1110.0), PageUnits(555.0), 2.0);
        assert!((wide.fit - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rows_round_trip() {
        let scaling = Scaling::fit(RasterPixels(1110.0), PageUnits(555.0), 4.0);
        // 400 rows / 4 = 100px nominal, * 0.5 = 50pt
        assert_eq!(scaling.rows_to_page(400), PageUnits(50.0));
        assert_eq!(scaling.page_to_supersampled(PageUnits(50.0)).whole_rows(), 400);
    }

    #[test]
    fn test_whole_rows_clamps_negative() {
        assert_eq!(SupersampledPixels(-3.5).whole_rows(), 0);
        assert_eq!(SupersampledPixels(7.9).whole_rows(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(PageUnits(12.5).to_string(), "12.50pt");
    }
}
