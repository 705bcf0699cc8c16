//! # slicepdf
//!
//! Content-aware paginator for rendered content blocks.
//!
//! Given an ordered list of blocks of unknown height (rendered to pixels by
//! a [`Rasterizer`]), this library packs them onto fixed-size pages and
//! exports a PDF. When a block does not fit in the space left on a page, it is
//! split at a blank band of pixel rows so text and borders are not cut in
//! half, and the remainder is carried to the next page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slicepdf::{paginate_images, PaginateOptions};
//!
//! fn main() -> slicepdf::Result<()> {
//!     let options = PaginateOptions::new().with_sample_scale(2.0);
//!     let doc = paginate_images(&["q1.png", "q2.png", "q3.png"], options)?;
//!
//!     println!("Pages: {}", doc.page_count());
//!     doc.save("questions-en.pdf")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Safe cuts**: splits land in blank bands found by scanning pixel rows
//! - **Explicit units**: supersampled pixels, nominal pixels and page points
//!   never mix without a [`Scaling`]
//! - **Re-entrant splitting**: blocks taller than a page keep splitting
//! - **Overlays**: title and `-n-` page numbers drawn at export time
//! - **Async**: `paginate_async` behind the `async` feature

pub mod error;
pub mod layout;
pub mod model;
pub mod raster;
pub mod units;
pub mod writer;

// Re-export commonly used types
pub use error::{Error, RasterizeError, Result};
pub use layout::{
    CancellationToken, CutOptions, PageAccumulator, PaginateOptions, Paginator, Progress,
    RowPolicy, SafeCutFinder,
};
pub use model::{
    Bitmap, Decoration, Document, Language, LayoutReport, Metadata, Page, PageGeometry, PageImage,
    Placement, PlacementPart, Rect,
};
pub use raster::{FnRasterizer, ImageRasterizer, ImageSource, Rasterizer};
pub use units::{PageUnits, RasterPixels, Scaling, SupersampledPixels};
pub use writer::{title_clearance, DocumentWriter};

use std::path::Path;

/// Paginate blocks with the given rasterizer.
///
/// # Arguments
///
/// * `blocks` - Content blocks in document order
/// * `rasterizer` - Adapter that renders each block to a bitmap
/// * `options` - Page geometry and layout options
///
/// # Example
///
/// ```
/// use slicepdf::{paginate, Bitmap, FnRasterizer, PaginateOptions, RasterizeError};
///
/// let mut slabs = FnRasterizer::new(|height: &u32, scale: f32| {
///     Bitmap::solid(200, (*height as f32 * scale) as u32, scale, [255, 255, 255, 255])
///         .map_err(|e| RasterizeError::Malformed(e.to_string()))
/// });
/// let doc = paginate(&[50, 60], &mut slabs, PaginateOptions::default()).unwrap();
/// assert_eq!(doc.page_count(), 1);
/// ```
pub fn paginate<R: Rasterizer>(
    blocks: &[R::Block],
    rasterizer: &mut R,
    options: PaginateOptions,
) -> Result<Document> {
    Paginator::new(options)?.paginate(blocks, rasterizer)
}

/// Paginate pre-rendered image files (PNG or JPEG).
///
/// Images are taken to be rendered at `options.sample_scale`.
pub fn paginate_images<P: AsRef<Path>>(paths: &[P], options: PaginateOptions) -> Result<Document> {
    let blocks: Vec<ImageSource> = paths
        .iter()
        .map(|p| ImageSource::from(p.as_ref()))
        .collect();
    paginate(&blocks, &mut ImageRasterizer::new(), options)
}

/// Paginate pre-rendered images and write the PDF to `output`.
pub fn paginate_images_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
    paths: &[P],
    output: Q,
    options: PaginateOptions,
) -> Result<Document> {
    let doc = paginate_images(paths, options)?;
    doc.save(output)?;
    Ok(doc)
}
