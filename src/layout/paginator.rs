//! Pagination driver.

use super::{CancellationToken, PageFlow, PaginateOptions, Progress};
use crate::error::{Error, Result};
use crate::model::Document;
use crate::raster::Rasterizer;

#[cfg(feature = "async")]
use crate::raster::AsyncRasterizer;

/// Rasterizes blocks in order and packs them into pages.
///
/// Blocks are processed strictly one after another: block `i + 1` is not
/// rasterized until block `i` has been placed.
///
/// # Example
///
/// ```no_run
/// use slicepdf::raster::{ImageRasterizer, ImageSource};
/// use slicepdf::{PaginateOptions, Paginator};
///
/// fn main() -> slicepdf::Result<()> {
///     let blocks = vec![
///         ImageSource::Path("q1.png".into()),
///         ImageSource::Path("q2.png".into()),
///     ];
///
///     let mut paginator = Paginator::new(PaginateOptions::default())?
///         .on_progress(|p| println!("{}%", p.percent()));
///     let doc = paginator.paginate(&blocks, &mut ImageRasterizer::new())?;
///     doc.save("questions-en.pdf")?;
///     Ok(())
/// }
/// ```
pub struct Paginator<'a> {
    options: PaginateOptions,
    on_progress: Option<Box<dyn FnMut(Progress) + 'a>>,
    cancel: Option<CancellationToken>,
}

impl<'a> Paginator<'a> {
    /// Create a paginator, validating the options.
    pub fn new(options: PaginateOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            on_progress: None,
            cancel: None,
        })
    }

    /// Call `callback` after each block has been fully placed.
    pub fn on_progress(mut self, callback: impl FnMut(Progress) + 'a) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Stop before the next block once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Options in use.
    pub fn options(&self) -> &PaginateOptions {
        &self.options
    }

    /// Paginate `blocks`, rendering each through `rasterizer`.
    ///
    /// A rasterization failure aborts the run; no partial document is
    /// returned.
    pub fn paginate<R: Rasterizer>(
        &mut self,
        blocks: &[R::Block],
        rasterizer: &mut R,
    ) -> Result<Document> {
        let mut flow = PageFlow::new(&self.options)?;
        let mut state = flow.start();
        let total = blocks.len();

        for (index, block) in blocks.iter().enumerate() {
            self.check_cancelled(index)?;
            let bitmap = rasterizer
                .rasterize(block, self.options.sample_scale)
                .map_err(|source| Error::Rasterization { index, source })?;
            self.check_scale(index, bitmap.sample_scale());
            state = flow.place(state, index, &bitmap)?;
            self.report(index + 1, total);
        }

        self.finish(flow, state, total)
    }

    /// Asynchronous [`paginate`](Self::paginate); each block is awaited
    /// before the next one starts.
    #[cfg(feature = "async")]
    pub async fn paginate_async<R: AsyncRasterizer>(
        &mut self,
        blocks: &[R::Block],
        rasterizer: &mut R,
    ) -> Result<Document> {
        let mut flow = PageFlow::new(&self.options)?;
        let mut state = flow.start();
        let total = blocks.len();

        for (index, block) in blocks.iter().enumerate() {
            self.check_cancelled(index)?;
            let bitmap = rasterizer
                .rasterize(block, self.options.sample_scale)
                .await
                .map_err(|source| Error::Rasterization { index, source })?;
            self.check_scale(index, bitmap.sample_scale());
            state = flow.place(state, index, &bitmap)?;
            self.report(index + 1, total);
        }

        self.finish(flow, state, total)
    }

    fn finish(
        &mut self,
        flow: PageFlow,
        state: super::PaginationState,
        total: usize,
    ) -> Result<Document> {
        if total == 0 {
            log::debug!("no blocks to paginate, emitting a blank page");
            self.report(0, 0);
        }
        let doc = flow.finish(state)?;
        log::debug!("paginated {} blocks into {} pages", total, doc.page_count());
        Ok(doc)
    }

    fn check_cancelled(&self, index: usize) -> Result<()> {
        match self.cancel {
            Some(ref token) if token.is_cancelled() => {
                log::debug!("cancelled before block {}", index);
                Err(Error::Cancelled)
            }
            _ => Ok(()),
        }
    }

    fn check_scale(&self, index: usize, scale: f32) {
        if (scale - self.options.sample_scale).abs() > f32::EPSILON {
            log::warn!(
                "block {} rasterized at scale {} instead of {}",
                index,
                scale,
                self.options.sample_scale
            );
        }
    }

    fn report(&mut self, processed: usize, total: usize) {
        if let Some(ref mut callback) = self.on_progress {
            callback(Progress { processed, total });
        }
    }
}

impl std::fmt::Debug for Paginator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("options", &self.options)
            .field("on_progress", &self.on_progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}
