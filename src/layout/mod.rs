//! Layout module: packing rasterized blocks into pages.
//!
//! The pieces, leaves first:
//!
//! - [`SafeCutFinder`] picks rows where a block can be split without cutting
//!   through content.
//! - [`PageAccumulator`] is the page-sized pixel buffer blocks are drawn into.
//! - [`PageFlow`] decides fit, split and carry-over for each block.
//! - [`Paginator`] drives rasterization, progress and cancellation.

mod accumulator;
mod cut;
mod flow;
mod options;
mod paginator;
mod progress;

pub use accumulator::PageAccumulator;
pub use cut::{CutOptions, RowPolicy, SafeCutFinder};
pub use flow::{PageFlow, PaginationState};
pub use options::{PaginateOptions, MAX_SAMPLE_SCALE};
pub use paginator::Paginator;
pub use progress::{CancellationToken, Progress};
