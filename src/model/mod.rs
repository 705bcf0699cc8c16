//! Document model types for paginated output.
//!
//! This module defines the values that flow through the paginator: rasterized
//! blocks going in, page images and their placements coming out.

mod bitmap;
mod document;
mod geometry;
mod page;

pub use bitmap::{Bitmap, CHANNELS};
pub use document::{Document, Language, LayoutReport, Metadata, PageLayout};
pub use geometry::PageGeometry;
pub use page::{Decoration, Page, PageImage, Placement, PlacementPart, Rect};
