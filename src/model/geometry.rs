//! Page geometry.

use crate::error::{Error, Result};
use crate::units::PageUnits;
use serde::{Deserialize, Serialize};

/// Fixed page dimensions for a whole document, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    /// Margin applied on all four sides
    pub margin: f32,

    /// Page width in points (1 point = 1/72 inch)
    pub page_width: f32,

    /// Page height in points
    pub page_height: f32,
}

impl PageGeometry {
    /// Create a geometry with the given dimensions.
    pub fn new(page_width: f32, page_height: f32, margin: f32) -> Self {
        Self {
            margin,
            page_width,
            page_height,
        }
    }

    /// A4 portrait (210 x 297 mm) with a 20pt margin.
    pub fn a4() -> Self {
        Self::new(595.0, 842.0, 20.0)
    }

    /// Width available for content.
    pub fn content_width(&self) -> PageUnits {
        PageUnits(self.page_width - 2.0 * self.margin)
    }

    /// Height available for content.
    pub fn content_height(&self) -> PageUnits {
        PageUnits(self.page_height - 2.0 * self.margin)
    }

    /// Check that the content area is non-empty.
    pub fn validate(&self) -> Result<()> {
        let finite = [self.margin, self.page_width, self.page_height]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.margin < 0.0 {
            return Err(Error::InvalidOptions(format!(
                "page geometry must be finite with a non-negative margin: {:?}",
                self
            )));
        }
        if self.content_width().get() <= 0.0 || self.content_height().get() <= 0.0 {
            return Err(Error::InvalidOptions(format!(
                "margin {} leaves no content area on a {}x{} page",
                self.margin, self.page_width, self.page_height
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}
