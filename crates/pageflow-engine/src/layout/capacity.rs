use serde::{Deserialize, Serialize};

/// Printable page geometry in CSS pixels.
///
/// The pagination budget is the page height minus vertical margins and the
/// page-number footer. Defaults describe A4 portrait at 96 dpi.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageCapacity {
    pub page_width: f64,
    pub page_height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub footer_height: f64,
}

impl Default for PageCapacity {
    fn default() -> Self {
        Self {
            page_width: 794.0,
            page_height: 1123.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
            footer_height: 32.0,
        }
    }
}

impl PageCapacity {
    /// Capacity with no margins or footer, so the whole height is content.
    ///
    /// Handy when heights come from a fixed table rather than a real layout.
    pub fn with_content_height(height: f64) -> Self {
        Self {
            page_height: height,
            margin_top: 0.0,
            margin_bottom: 0.0,
            footer_height: 0.0,
            ..Self::default()
        }
    }

    /// Height available to blocks on one page, never negative
    pub fn content_height(&self) -> f64 {
        (self.page_height - self.margin_top - self.margin_bottom - self.footer_height).max(0.0)
    }

    /// Width available to blocks on one page, never negative
    pub fn content_width(&self) -> f64 {
        (self.page_width - self.margin_left - self.margin_right).max(0.0)
    }
}
