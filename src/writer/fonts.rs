//! Standard Type 1 fonts used for overlays.

use unicode_normalization::UnicodeNormalization;

/// Width used for glyphs outside the metrics tables, in 1/1000 em.
const FALLBACK_WIDTH: u16 = 500;

/// Times-Roman advance widths for ASCII 32..=126.
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // space-/
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // 0-9
    278, 278, 564, 564, 564, 444, 921, // :-@
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611, // A-Z
    333, 278, 333, 469, 500, 333, // [-`
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444, // a-z
    480, 200, 480, 541, // {-~
];

/// Times-Bold advance widths for ASCII 32..=126.
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // space-/
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // 0-9
    333, 333, 570, 570, 570, 500, 930, // :-@
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778, 611, 778, 722,
    556, 667, 722, 722, 1000, 722, 722, 667, // A-Z
    333, 278, 333, 581, 500, 333, // [-`
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500, 556, 556, 444,
    389, 333, 556, 500, 722, 500, 500, 444, // a-z
    394, 220, 394, 520, // {-~
];

/// Base-14 font used for an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    TimesRoman,
    TimesBold,
}

impl StandardFont {
    /// PostScript name for the font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
        }
    }

    /// Resource name used in content streams.
    pub fn resource_name(&self) -> &'static str {
        match self {
            StandardFont::TimesRoman => "F1",
            StandardFont::TimesBold => "F2",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            StandardFont::TimesRoman => &TIMES_ROMAN,
            StandardFont::TimesBold => &TIMES_BOLD,
        }
    }

    /// Advance width of WinAnsi-encoded text at `size` points.
    pub fn text_width(&self, encoded: &[u8], size: f32) -> f32 {
        let widths = self.widths();
        let units: u32 = encoded
            .iter()
            .map(|&b| match b {
                32..=126 => widths[(b - 32) as usize] as u32,
                _ => FALLBACK_WIDTH as u32,
            })
            .sum();
        units as f32 * size / 1000.0
    }
}

/// Encode text to WinAnsiEncoding.
///
/// Returns the bytes and the number of characters replaced by `?`.
pub fn encode_win_ansi(text: &str) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(text.len());
    let mut replaced = 0;
    for ch in text.nfc() {
        match win_ansi_byte(ch) {
            Some(b) => out.push(b),
            None => {
                out.push(b'?');
                replaced += 1;
            }
        }
    }
    (out, replaced)
}

fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => Some(match ch {
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => return None,
        }),
    }
}
