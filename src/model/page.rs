//! Page-level types.

use crate::units::PageUnits;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A rectangle in content-area coordinates (origin at the top-left corner of
/// the area inside the margins, y growing downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: PageUnits,
    pub y: PageUnits,
    pub width: PageUnits,
    pub height: PageUnits,
}

impl Rect {
    /// Create a rectangle.
    pub fn new(x: PageUnits, y: PageUnits, width: PageUnits, height: PageUnits) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    pub fn bottom(&self) -> PageUnits {
        self.y + self.height
    }

    /// Right edge.
    pub fn right(&self) -> PageUnits {
        self.x + self.width
    }

    /// Intersect with `[0, width] x [0, height]`.
    pub fn clip_to(&self, width: PageUnits, height: PageUnits) -> Rect {
        let x = self.x.max(PageUnits::ZERO);
        let y = self.y.max(PageUnits::ZERO);
        let right = self.right().min(width).max(x);
        let bottom = self.bottom().min(height).max(y);
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Whether the rectangle lies inside `[0, width] x [0, height]`,
    /// allowing `tolerance` of rounding slack.
    pub fn within(&self, width: PageUnits, height: PageUnits, tolerance: f32) -> bool {
        self.x.get() >= -tolerance
            && self.y.get() >= -tolerance
            && self.right().get() <= width.get() + tolerance
            && self.bottom().get() <= height.get() + tolerance
    }
}

/// Which portion of a block a placement carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPart {
    /// The block fit without splitting
    Whole,
    /// The first slice of a split block
    Head,
    /// A later slice of a split block (possibly split again)
    Tail,
}

/// One region drawn onto a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Zero-based index of the source block
    pub block: usize,

    /// Portion of the block drawn
    pub part: PlacementPart,

    /// First source row (in the block's original bitmap)
    pub src_start: u32,

    /// One past the last source row
    pub src_end: u32,

    /// Destination in content-area coordinates
    pub dest: Rect,
}

impl Placement {
    /// Source rows covered.
    pub fn src_rows(&self) -> Range<u32> {
        self.src_start..self.src_end
    }
}

/// Presentation overlay drawn on top of a page image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Decoration {
    /// Document title (first page only)
    Title(String),
    /// Page number, printed as `-n-`
    PageNumber(u32),
}

/// A flushed page raster.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// zlib-compressed RGB8 samples
    pub data: Vec<u8>,

    /// Regions drawn into this image, in drawing order
    pub placements: Vec<Placement>,
}

impl PageImage {
    /// Whether anything was drawn.
    pub fn is_blank(&self) -> bool {
        self.placements.is_empty()
    }
}

/// A page in the output document.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Rasterized page content
    pub image: PageImage,

    /// Overlays drawn at export time
    pub decorations: Vec<Decoration>,
}

impl Page {
    /// Create an undecorated page.
    pub fn new(number: u32, image: PageImage) -> Self {
        Self {
            number,
            image,
            decorations: Vec::new(),
        }
    }

    /// Blocks touched by this page, in order, without repeats.
    pub fn block_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = Vec::new();
        for placement in &self.image.placements {
            if indices.last() != Some(&placement.block) {
                indices.push(placement.block);
            }
        }
        indices
    }

    /// The title overlay, if present.
    pub fn title(&self) -> Option<&str> {
        self.decorations.iter().find_map(|d| match d {
            Decoration::Title(t) => Some(t.as_str()),
            _ => None,
        })
    }

    /// The page-number overlay, if present.
    pub fn page_number(&self) -> Option<u32> {
        self.decorations.iter().find_map(|d| match d {
            Decoration::PageNumber(n) => Some(*n),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(v: f32) -> PageUnits {
        PageUnits(v)
    }

    #[test]
    fn test_rect_clip() {
        let rect = Rect::new(pt(-5.0), pt(90.0), pt(50.0), pt(20.0));
        let clipped = rect.clip_to(pt(40.0), pt(100.0));
        assert_eq!(clipped, Rect::new(pt(0.0), pt(90.0), pt(40.0), pt(10.0)));
        assert!(clipped.within(pt(40.0), pt(100.0), 0.0));
        assert!(!rect.within(pt(40.0), pt(100.0), 0.5));
    }

    #[test]
    fn test_rect_clip_outside_is_empty() {
        let rect = Rect::new(pt(0.0), pt(120.0), pt(10.0), pt(10.0));
        let clipped = rect.clip_to(pt(40.0), pt(100.0));
        assert_eq!(clipped.height, pt(0.0));
    }

    #[test]
    fn test_page_block_indices() {
        let placement = |block, part| Placement {
            block,
            part,
            src_start: 0,
            src_end: 1,
            dest: Rect::new(pt(0.0), pt(0.0), pt(1.0), pt(1.0)),
        };
        let image = PageImage {
            width: 1,
            height: 1,
            data: Vec::new(),
            placements: vec![
                placement(0, PlacementPart::Tail),
                placement(1, PlacementPart::Whole),
                placement(2, PlacementPart::Head),
            ],
        };
        let mut page = Page::new(2, image);
        page.decorations.push(Decoration::PageNumber(2));

        assert_eq!(page.block_indices(), vec![0, 1, 2]);
        assert_eq!(page.page_number(), Some(2));
        assert_eq!(page.title(), None);
    }
}
