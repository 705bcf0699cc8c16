//! Block placement over explicit pagination state.
//!
//! [`PageFlow`] owns the page buffer, the cut finder and the document being
//! written. Each call to [`PageFlow::place`] takes the cursor state left by
//! the previous block and returns the state for the next one, so the only
//! mutable geometry lives in the values passed between steps.

use super::{PageAccumulator, PaginateOptions, SafeCutFinder};
use crate::error::Result;
use crate::model::{Bitmap, Document, Metadata, PageGeometry, PlacementPart, Rect};
use crate::units::{PageUnits, Scaling};
use crate::writer::{title_clearance, DocumentWriter};
use chrono::Utc;

/// Slack allowed when deciding whether a block fits, in points.
const FIT_EPSILON: f32 = 1e-3;

/// Cursor state carried from one block to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaginationState {
    /// Content height already used on the open page
    pub current_y: PageUnits,
    /// Zero-based index of the open page
    pub page_index: u32,
}

/// Places rasterized blocks onto pages.
#[derive(Debug)]
pub struct PageFlow {
    geometry: PageGeometry,
    block_gap: PageUnits,
    title_reserve: PageUnits,
    title: String,
    page_numbers: bool,
    finder: SafeCutFinder,
    page: PageAccumulator,
    writer: DocumentWriter,
}

impl PageFlow {
    /// Set up an empty first page.
    pub fn new(options: &PaginateOptions) -> Result<Self> {
        options.validate()?;
        if options.title_reserve < title_clearance().get() {
            log::warn!(
                "title reserve {}pt is smaller than the title's {}pt depth; the title will overlap the first block",
                options.title_reserve,
                title_clearance().get()
            );
        }
        let metadata = Metadata {
            title: Some(options.effective_title().to_string()),
            language: options.language,
            producer: None,
            created: Some(Utc::now()),
        };
        Ok(Self {
            geometry: options.geometry,
            block_gap: PageUnits(options.block_gap),
            title_reserve: PageUnits(options.title_reserve),
            title: options.effective_title().to_string(),
            page_numbers: options.page_numbers,
            finder: SafeCutFinder::new(options.cut),
            page: PageAccumulator::new(options.geometry, options.sample_scale)?
                .with_compression(options.compression_level),
            writer: DocumentWriter::new(options.geometry, metadata),
        })
    }

    /// State before the first block.
    pub fn start(&self) -> PaginationState {
        PaginationState {
            current_y: self.title_reserve,
            page_index: 0,
        }
    }

    /// Pages flushed so far.
    pub fn flushed_pages(&self) -> u32 {
        self.writer.page_count()
    }

    /// Place one block, splitting it across as many pages as needed.
    pub fn place(
        &mut self,
        state: PaginationState,
        index: usize,
        bitmap: &Bitmap,
    ) -> Result<PaginationState> {
        let content_width = self.geometry.content_width();
        let content_height = self.geometry.content_height();
        let scaling = Scaling::fit(bitmap.nominal_width(), content_width, bitmap.sample_scale());
        let scaled_width = scaling.to_page(bitmap.nominal_width());
        let x = PageUnits((content_width - scaled_width).get().max(0.0) / 2.0);
        let height = bitmap.height();

        log::debug!(
            "block {}: {}x{} rows, fit {:.3}, scaled height {} at y={} on page {}",
            index,
            bitmap.width(),
            height,
            scaling.fit,
            scaling.rows_to_page(height),
            state.current_y,
            state.page_index + 1
        );

        let mut state = state;
        // first row not yet placed
        let mut start = 0u32;
        while start < height {
            let remaining_rows = height - start;
            let remaining = scaling.rows_to_page(remaining_rows);
            let available = (content_height - state.current_y).max(PageUnits::ZERO);

            if (state.current_y + remaining).get() <= content_height.get() + FIT_EPSILON {
                let part = if start == 0 {
                    PlacementPart::Whole
                } else {
                    PlacementPart::Tail
                };
                let dest = Rect::new(x, state.current_y, scaled_width, remaining.min(available));
                self.page.draw(bitmap, start..height, dest, index, part);
                state.current_y = (state.current_y + remaining + self.block_gap).min(content_height);
                return Ok(state);
            }

            let available_rows = scaling
                .page_to_supersampled(available)
                .whole_rows()
                .min(remaining_rows);
            let mut cut = if available_rows == 0 {
                0
            } else {
                self.finder
                    .find_cut_in(bitmap, start..height, available_rows)
            };

            if cut == 0 {
                if self.page.is_empty() {
                    // nothing placed yet, so a fresh page would not help
                    cut = available_rows.max(1);
                    log::warn!(
                        "block {}: no blank rows within {} rows, cutting through content",
                        index,
                        available_rows
                    );
                } else {
                    log::debug!(
                        "block {}: no safe cut on page {}, moving to next page",
                        index,
                        state.page_index + 1
                    );
                    state = self.next_page(state)?;
                    continue;
                }
            }

            let part = if start == 0 {
                PlacementPart::Head
            } else {
                PlacementPart::Tail
            };
            let head_height = scaling.rows_to_page(cut);
            let dest = Rect::new(x, state.current_y, scaled_width, head_height.min(available));
            self.page.draw(bitmap, start..start + cut, dest, index, part);
            log::debug!(
                "block {}: split at row {} ({} on page {}, {} carried)",
                index,
                start + cut,
                head_height,
                state.page_index + 1,
                scaling.rows_to_page(remaining_rows - cut)
            );

            start += cut;
            state = self.next_page(state)?;
        }

        Ok(state)
    }

    /// Flush the open page and start a blank one.
    fn next_page(&mut self, state: PaginationState) -> Result<PaginationState> {
        let image = self.page.flush()?;
        let number = self.writer.add_page(image);
        if number == 1 {
            self.writer.add_title_overlay(self.title.clone())?;
        }
        if self.page_numbers {
            self.writer.add_page_number(number)?;
        }
        Ok(PaginationState {
            current_y: PageUnits::ZERO,
            page_index: state.page_index + 1,
        })
    }

    /// Flush the last page and return the document.
    ///
    /// A document always has at least one page, blank if no block was placed.
    pub fn finish(mut self, state: PaginationState) -> Result<Document> {
        if !self.page.is_empty() || self.writer.page_count() == 0 {
            self.next_page(state)?;
        }
        Ok(self.writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageGeometry;

    /// 100pt wide content, 200pt tall, no margin decorations in the way.
    fn options() -> PaginateOptions {
        PaginateOptions::new()
            .with_geometry(PageGeometry::new(120.0, 220.0, 10.0))
            .with_sample_scale(1.0)
            .with_block_gap(10.0)
            .with_title_reserve(0.0)
    }

    fn white(height: u32) -> Bitmap {
        Bitmap::solid(100, height, 1.0, [255, 255, 255, 255]).unwrap()
    }

    fn ink(height: u32) -> Bitmap {
        Bitmap::solid(100, height, 1.0, [0, 0, 0, 255]).unwrap()
    }

    #[test]
    fn test_fits_whole_advances_cursor() {
        let mut flow = PageFlow::new(&options()).unwrap();
        let state = flow.start();
        let state = flow.place(state, 0, &white(50)).unwrap();
        assert_eq!(state.current_y, PageUnits(60.0));
        assert_eq!(state.page_index, 0);
        assert_eq!(flow.flushed_pages(), 0);
    }

    #[test]
    fn test_cursor_clamped_to_content_height() {
        let mut flow = PageFlow::new(&options()).unwrap();
        let state = flow.place(flow.start(), 0, &white(195)).unwrap();
        assert_eq!(state.current_y, PageUnits(200.0));
    }

    #[test]
    fn test_blank_block_splits_at_limit() {
        let mut flow = PageFlow::new(&options()).unwrap();
        let state = flow.place(flow.start(), 0, &white(150)).unwrap();
        let state = flow.place(state, 1, &white(150)).unwrap();

        // 40pt left on page one, 110 carried
        assert_eq!(state.page_index, 1);
        assert_eq!(state.current_y, PageUnits(120.0));

        let doc = flow.finish(state).unwrap();
        assert_eq!(doc.page_count(), 2);
        let first = &doc.pages[0].image.placements;
        assert_eq!(first[1].part, PlacementPart::Head);
        assert_eq!(first[1].src_rows(), 0..40);
        let second = &doc.pages[1].image.placements;
        assert_eq!(second[0].part, PlacementPart::Tail);
        assert_eq!(second[0].src_rows(), 40..150);
        assert_eq!(second[0].dest.y, PageUnits(0.0));
    }

    #[test]
    fn test_dense_block_moves_to_next_page() {
        let mut flow = PageFlow::new(&options()).unwrap();
        let state = flow.place(flow.start(), 0, &white(100)).unwrap();
        let state = flow.place(state, 1, &ink(150)).unwrap();

        let doc = flow.finish(state).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].block_indices(), vec![0]);
        assert_eq!(doc.pages[1].image.placements[0].part, PlacementPart::Whole);
    }

    #[test]
    fn test_dense_block_on_empty_page_hard_cuts() {
        let mut flow = PageFlow::new(&options()).unwrap();
        let state = flow.place(flow.start(), 0, &ink(450)).unwrap();

        let doc = flow.finish(state).unwrap();
        assert_eq!(doc.page_count(), 3);
        let rows: Vec<_> = doc.placements().map(|p| p.src_rows()).collect();
        assert_eq!(rows, vec![0..200, 200..400, 400..450]);
    }

    #[test]
    fn test_empty_flow_yields_one_blank_page() {
        let flow = PageFlow::new(&options()).unwrap();
        let state = flow.start();
        let doc = flow.finish(state).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert!(doc.pages[0].image.is_blank());
        assert!(doc.pages[0].title().is_some());
        assert_eq!(doc.pages[0].page_number(), Some(1));
    }

    #[test]
    fn test_title_reserve_offsets_first_page_only() {
        let opts = options().with_title_reserve(50.0);
        let mut flow = PageFlow::new(&opts).unwrap();
        let state = flow.start();
        assert_eq!(state.current_y, PageUnits(50.0));

        let state = flow.place(state, 0, &white(100)).unwrap();
        let state = flow.place(state, 1, &white(100)).unwrap();
        let doc = flow.finish(state).unwrap();
        assert_eq!(doc.pages[0].image.placements[0].dest.y, PageUnits(50.0));
        assert_eq!(doc.pages[1].image.placements[0].dest.y, PageUnits(0.0));
    }
}
