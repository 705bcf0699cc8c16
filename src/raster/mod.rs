//! Rasterization adapters.
//!
//! The paginator never renders content itself. It asks a [`Rasterizer`] to
//! turn each content block into a [`Bitmap`] at the run's sample scale and
//! works on pixels from there.
//!
//! # Example
//!
//! ```
//! use slicepdf::raster::Rasterizer;
//! use slicepdf::{Bitmap, RasterizeError};
//!
//! /// Blocks are heights in nominal pixels; content is a grey slab.
//! struct Slabs;
//!
//! impl Rasterizer for Slabs {
//!     type Block = u32;
//!
//!     fn rasterize(&mut self, block: &u32, sample_scale: f32) -> Result<Bitmap, RasterizeError> {
//!         let rows = (*block as f32 * sample_scale) as u32;
//!         Bitmap::solid(100, rows, sample_scale, [128, 128, 128, 255])
//!             .map_err(|e| RasterizeError::Malformed(e.to_string()))
//!     }
//! }
//! ```

mod image;

pub use self::image::{ImageRasterizer, ImageSource};

use crate::error::RasterizeError;
use crate::model::Bitmap;

/// Turns content blocks into bitmaps.
pub trait Rasterizer {
    /// Opaque handle to one renderable unit.
    type Block;

    /// Render `block` at `sample_scale` times nominal density.
    fn rasterize(
        &mut self,
        block: &Self::Block,
        sample_scale: f32,
    ) -> Result<Bitmap, RasterizeError>;
}

impl<R: Rasterizer + ?Sized> Rasterizer for &mut R {
    type Block = R::Block;

    fn rasterize(
        &mut self,
        block: &Self::Block,
        sample_scale: f32,
    ) -> Result<Bitmap, RasterizeError> {
        (**self).rasterize(block, sample_scale)
    }
}

/// Rasterizer backed by a closure.
pub struct FnRasterizer<B, F> {
    render: F,
    _block: std::marker::PhantomData<fn(&B)>,
}

impl<B, F> FnRasterizer<B, F>
where
    F: FnMut(&B, f32) -> Result<Bitmap, RasterizeError>,
{
    /// Wrap a render function.
    pub fn new(render: F) -> Self {
        Self {
            render,
            _block: std::marker::PhantomData,
        }
    }
}

impl<B, F> Rasterizer for FnRasterizer<B, F>
where
    F: FnMut(&B, f32) -> Result<Bitmap, RasterizeError>,
{
    type Block = B;

    fn rasterize(&mut self, block: &B, sample_scale: f32) -> Result<Bitmap, RasterizeError> {
        (self.render)(block, sample_scale)
    }
}

/// Asynchronous counterpart of [`Rasterizer`] for latent render capabilities.
#[cfg(feature = "async")]
pub trait AsyncRasterizer {
    /// Opaque handle to one renderable unit.
    type Block;

    /// Render `block` at `sample_scale` times nominal density.
    fn rasterize(
        &mut self,
        block: &Self::Block,
        sample_scale: f32,
    ) -> impl std::future::Future<Output = Result<Bitmap, RasterizeError>>;
}
