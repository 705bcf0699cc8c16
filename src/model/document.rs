//! Document-level types.

use super::{Page, PageGeometry, Placement};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Language of the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    English,
    /// Korean
    Korean,
}

impl Language {
    /// BCP 47 tag, also used in file names.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Korean => "ko",
        }
    }

    /// Title used when none is configured.
    ///
    /// Every default is drawable in the WinAnsi-encoded standard fonts.
    pub fn default_title(&self) -> &'static str {
        match self {
            Language::English => "AWS Certified Solutions Architect Questions",
            Language::Korean => "AWS Certified Solutions Architect Questions (Korean)",
        }
    }

    /// Conventional output file name, e.g. `questions-en.pdf`.
    pub fn file_name(&self) -> String {
        format!("questions-{}.pdf", self.code())
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document language
    pub language: Language,

    /// Producer string written to the PDF info dictionary
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,
}

/// A paginated document ready for export.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document metadata
    pub metadata: Metadata,

    /// Page geometry shared by every page
    pub geometry: PageGeometry,

    /// Pages in output order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create an empty document.
    pub fn new(geometry: PageGeometry, metadata: Metadata) -> Self {
        Self {
            metadata,
            geometry,
            pages: Vec::new(),
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// All placements in document order.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.pages.iter().flat_map(|p| p.image.placements.iter())
    }

    /// Serializable summary of where every block landed.
    pub fn layout_report(&self) -> LayoutReport {
        LayoutReport {
            page_width: self.geometry.page_width,
            page_height: self.geometry.page_height,
            margin: self.geometry.margin,
            page_count: self.page_count(),
            pages: self
                .pages
                .iter()
                .map(|page| PageLayout {
                    number: page.number,
                    pixel_width: page.image.width,
                    pixel_height: page.image.height,
                    placements: page.image.placements.clone(),
                })
                .collect(),
        }
    }
}

/// Layout summary of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutReport {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub page_count: u32,
    pub pages: Vec<PageLayout>,
}

/// Layout of one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub number: u32,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub placements: Vec<Placement>,
}
