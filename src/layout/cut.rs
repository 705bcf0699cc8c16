//! Safe-cut search over rasterized blocks.
//!
//! When a block overflows the page, the paginator asks [`SafeCutFinder`] for
//! the lowest row above the page limit where a run of blank rows lets the
//! block be split without slicing through glyphs or borders.

use crate::model::{Bitmap, CHANNELS};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How rows are classified as blank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RowPolicy {
    /// Every pixel is transparent or brighter than `whiteness_threshold`.
    Strict {
        /// Luma (0-255) above which a pixel counts as white
        #[serde(default = "default_whiteness_threshold")]
        whiteness_threshold: u8,
    },
    /// Rows crossed only by thin vertical strokes (card borders, rules)
    /// still count as blank.
    Tolerant {
        /// Channel value below which a pixel counts as dark
        #[serde(default = "default_dark_threshold")]
        dark_threshold: u8,
        /// Alpha above which a pixel is considered visible
        #[serde(default = "default_min_alpha")]
        min_alpha: u8,
        /// Minimum separate dark groups for a row to hold content
        #[serde(default = "default_min_groups")]
        min_groups: u32,
        /// Dark pixel count a row must exceed to hold content
        #[serde(default = "default_min_dark_pixels")]
        min_dark_pixels: u32,
    },
}

fn default_whiteness_threshold() -> u8 {
    250
}

fn default_dark_threshold() -> u8 {
    200
}

fn default_min_alpha() -> u8 {
    50
}

fn default_min_groups() -> u32 {
    3
}

fn default_min_dark_pixels() -> u32 {
    5
}

impl RowPolicy {
    /// Strict policy with the default threshold.
    pub fn strict() -> Self {
        RowPolicy::Strict {
            whiteness_threshold: default_whiteness_threshold(),
        }
    }

    /// Tolerant policy with the default thresholds.
    pub fn tolerant() -> Self {
        RowPolicy::Tolerant {
            dark_threshold: default_dark_threshold(),
            min_alpha: default_min_alpha(),
            min_groups: default_min_groups(),
            min_dark_pixels: default_min_dark_pixels(),
        }
    }

    /// Whether a row of RGBA samples is blank.
    pub fn is_blank(&self, row: &[u8]) -> bool {
        match *self {
            RowPolicy::Strict {
                whiteness_threshold,
            } => row
                .chunks_exact(CHANNELS)
                .all(|px| is_white(px, whiteness_threshold)),
            RowPolicy::Tolerant {
                dark_threshold,
                min_alpha,
                min_groups,
                min_dark_pixels,
            } => {
                let mut dark_pixels = 0u32;
                let mut groups = 0u32;
                let mut run = 0u32;
                let mut in_group = false;
                for px in row.chunks_exact(CHANNELS) {
                    let dark = (px[0] < dark_threshold
                        || px[1] < dark_threshold
                        || px[2] < dark_threshold)
                        && px[3] > min_alpha;
                    if dark {
                        dark_pixels += 1;
                        run += 1;
                        if !in_group && run >= 2 {
                            groups += 1;
                            in_group = true;
                        }
                    } else {
                        run = 0;
                        in_group = false;
                    }
                }
                !(groups >= min_groups && dark_pixels > min_dark_pixels)
            }
        }
    }
}

impl Default for RowPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Rec.601 luma of a pixel composited over white.
fn is_white(px: &[u8], threshold: u8) -> bool {
    let alpha = px[3] as u32;
    if alpha == 0 {
        return true;
    }
    let over_white = |c: u8| 255 - (alpha * (255 - c as u32) + 127) / 255;
    let luma = 299 * over_white(px[0]) + 587 * over_white(px[1]) + 114 * over_white(px[2]);
    luma > threshold as u32 * 1000
}

/// Options for the safe-cut search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutOptions {
    /// Consecutive blank rows needed before a cut is accepted
    pub min_empty_run: u32,

    /// Row classification
    pub policy: RowPolicy,
}

impl CutOptions {
    /// Create cut options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum blank run.
    pub fn with_min_empty_run(mut self, rows: u32) -> Self {
        self.min_empty_run = rows.max(1);
        self
    }

    /// Set the row policy.
    pub fn with_policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use the tolerant row policy.
    pub fn tolerant(self) -> Self {
        self.with_policy(RowPolicy::tolerant())
    }
}

impl Default for CutOptions {
    fn default() -> Self {
        Self {
            min_empty_run: 3,
            policy: RowPolicy::default(),
        }
    }
}

/// Finds split rows that avoid visible content.
#[derive(Debug, Clone, Default)]
pub struct SafeCutFinder {
    options: CutOptions,
}

impl SafeCutFinder {
    /// Create a finder.
    pub fn new(options: CutOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &CutOptions {
        &self.options
    }

    /// Choose the row at which to split `bitmap` so that rows `0..cut` fit in
    /// `max_rows`.
    ///
    /// Rows are scanned from the limit upward. The first run of
    /// `min_empty_run` blank rows decides the cut: `max_rows` itself if the
    /// run starts at the limit, otherwise the middle of the run. Returns 0
    /// when no run qualifies (hard cut). The result never exceeds `max_rows`
    /// or the bitmap height.
    pub fn find_cut(&self, bitmap: &Bitmap, max_rows: u32) -> u32 {
        self.find_cut_in(bitmap, 0..bitmap.height(), max_rows)
    }

    /// [`find_cut`](Self::find_cut) over a window of rows.
    ///
    /// Row numbers, `max_rows` and the result are relative to `rows.start`.
    /// Used to keep cutting the remainder of a block without copying it.
    pub fn find_cut_in(&self, bitmap: &Bitmap, rows: Range<u32>, max_rows: u32) -> u32 {
        let first = rows.start.min(bitmap.height());
        let end = rows.end.min(bitmap.height());
        if first >= end {
            return 0;
        }
        let height = end - first;
        let start = max_rows.min(height - 1);
        let min_run = self.options.min_empty_run.max(1);

        let mut run = 0u32;
        let mut run_bottom = start;
        for y in (0..=start).rev() {
            if self.options.policy.is_blank(bitmap.row(first + y)) {
                if run == 0 {
                    run_bottom = y;
                }
                run += 1;
                if run >= min_run {
                    let cut = if run_bottom == start {
                        max_rows
                    } else {
                        y + run / 2
                    };
                    log::debug!(
                        "safe cut at row {} (blank rows {}..={}, limit {})",
                        cut,
                        y,
                        run_bottom,
                        max_rows
                    );
                    return cut.min(max_rows).min(height);
                }
            } else {
                run = 0;
            }
        }

        log::debug!("no blank run within {} rows, hard cut", max_rows);
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const INK: [u8; 4] = [20, 20, 20, 255];

    /// Bitmap `width` wide whose rows are ink where `ink(y)` holds.
    fn rows(width: u32, height: u32, ink: impl Fn(u32) -> bool) -> Bitmap {
        let mut pixels = Vec::new();
        for y in 0..height {
            let color = if ink(y) { INK } else { WHITE };
            for _ in 0..width {
                pixels.extend_from_slice(&color);
            }
        }
        Bitmap::from_rgba(width, height, 1.0, pixels).unwrap()
    }

    #[test]
    fn test_prefers_blank_band_before_limit() {
        // ink everywhere except rows 40..50
        let bmp = rows(10, 100, |y| !(40..50).contains(&y));
        let cut = SafeCutFinder::default().find_cut(&bmp, 80);
        assert!((40..50).contains(&cut), "cut {} outside band", cut);
    }

    #[test]
    fn test_picks_lowest_band() {
        let bmp = rows(10, 100, |y| !(10..20).contains(&y) && !(60..70).contains(&y));
        let cut = SafeCutFinder::default().find_cut(&bmp, 90);
        assert!((60..70).contains(&cut));
    }

    #[test]
    fn test_hard_cut_when_dense() {
        let bmp = rows(10, 100, |_| true);
        assert_eq!(SafeCutFinder::default().find_cut(&bmp, 80), 0);
        assert_eq!(SafeCutFinder::default().find_cut(&bmp, 500), 0);
    }

    #[test]
    fn test_all_blank_returns_limit() {
        let bmp = rows(10, 100, |_| false);
        assert_eq!(SafeCutFinder::default().find_cut(&bmp, 64), 64);
    }

    #[test]
    fn test_short_gap_ignored() {
        // two blank rows are below the default run of three
        let bmp = rows(10, 100, |y| !(30..32).contains(&y));
        assert_eq!(SafeCutFinder::default().find_cut(&bmp, 80), 0);

        let finder = SafeCutFinder::new(CutOptions::new().with_min_empty_run(2));
        assert!((30..32).contains(&finder.find_cut(&bmp, 80)));
    }

    #[test]
    fn test_band_beyond_limit_not_used() {
        let bmp = rows(10, 100, |y| !(85..95).contains(&y));
        assert_eq!(SafeCutFinder::default().find_cut(&bmp, 80), 0);
    }

    #[test]
    fn test_window_is_relative() {
        // blank rows 70..80 of the full bitmap are rows 20..30 of the window 50..100
        let bmp = rows(10, 100, |y| !(70..80).contains(&y));
        let finder = SafeCutFinder::default();
        let cut = finder.find_cut_in(&bmp, 50..100, 40);
        assert!((20..30).contains(&cut), "cut {}", cut);
        assert_eq!(finder.find_cut_in(&bmp, 50..100, 15), 0);
        assert_eq!(finder.find_cut_in(&bmp, 100..120, 15), 0);
    }

    #[test]
    fn test_transparent_and_faint_pixels_are_blank() {
        let strict = RowPolicy::strict();
        assert!(strict.is_blank(&[0, 0, 0, 0, 252, 252, 252, 255]));
        assert!(!strict.is_blank(&[0, 0, 0, 0, 240, 240, 240, 255]));
        // dark but almost fully transparent
        assert!(strict.is_blank(&[0, 0, 0, 3]));
    }

    #[test]
    fn test_tolerant_ignores_borders() {
        // a card border: one 2px stroke at each edge of an otherwise white row
        let mut row = Vec::new();
        for x in 0..40 {
            let edge = x < 2 || x >= 38;
            row.extend_from_slice(if edge { &INK } else { &WHITE });
        }
        assert!(!RowPolicy::strict().is_blank(&row));
        assert!(RowPolicy::tolerant().is_blank(&row));

        // text: many short strokes
        let mut text = Vec::new();
        for x in 0..40 {
            let stroke = x % 5 < 2;
            text.extend_from_slice(if stroke { &INK } else { &WHITE });
        }
        assert!(!RowPolicy::tolerant().is_blank(&text));
    }

    #[test]
    fn test_cut_options_deserialize() {
        let opts: CutOptions =
            serde_json::from_str(r#"{"min_empty_run": 5, "policy": {"mode": "strict", "whiteness_threshold": 240}}"#)
                .unwrap();
        assert_eq!(opts.min_empty_run, 5);
        assert_eq!(
            opts.policy,
            RowPolicy::Strict {
                whiteness_threshold: 240
            }
        );
    }

    #[test]
    fn test_policy_mode_alone_uses_defaults() {
        let opts: CutOptions = serde_json::from_str(r#"{"policy": {"mode": "tolerant"}}"#).unwrap();
        assert_eq!(opts, CutOptions::new().tolerant());

        let opts: CutOptions =
            serde_json::from_str(r#"{"policy": {"mode": "tolerant", "min_groups": 4}}"#).unwrap();
        match opts.policy {
            RowPolicy::Tolerant {
                min_groups,
                dark_threshold,
                ..
            } => {
                assert_eq!(min_groups, 4);
                assert_eq!(dark_threshold, 200);
            }
            other => panic!("unexpected policy {:?}", other),
        }

        let opts: CutOptions = serde_json::from_str(r#"{"policy": {"mode": "strict"}}"#).unwrap();
        assert_eq!(opts.policy, RowPolicy::strict());
    }
}
