use thiserror::Error;

use crate::layout::PageCapacity;
use crate::models::{Block, BlockKind};
use crate::parsing::markup;

/// Why a block's height could not be determined
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeasureError {
    #[error("block is not rendered on the surface")]
    NotRendered,
    #[error("measurement unavailable: {0}")]
    Unavailable(String),
}

/// Height measurement capability supplied by the rendering surface.
///
/// The paginator depends on this but never implements it; real surfaces
/// measure rendered boxes, tests supply fixed heights.
pub trait MeasureBlock {
    fn measure(&self, block: &Block) -> Result<f64, MeasureError>;
}

impl<F> MeasureBlock for F
where
    F: Fn(&Block) -> Result<f64, MeasureError>,
{
    fn measure(&self, block: &Block) -> Result<f64, MeasureError> {
        self(block)
    }
}

/// Heuristic measurer for when no rendered surface is available.
///
/// Estimates wrapped line counts from an average glyph width. Good enough
/// for command-line previews and benchmarks; not a layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMetrics {
    pub content_width: f64,
    pub line_height: f64,
    pub average_char_width: f64,
    pub block_spacing: f64,
    pub table_row_height: f64,
    pub rule_height: f64,
    pub default_image_height: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self::for_capacity(&PageCapacity::default())
    }
}

impl TextMetrics {
    pub fn for_capacity(capacity: &PageCapacity) -> Self {
        Self {
            content_width: capacity.content_width(),
            line_height: 22.0,
            average_char_width: 7.5,
            block_spacing: 12.0,
            table_row_height: 28.0,
            rule_height: 17.0,
            default_image_height: 240.0,
        }
    }

    fn wrapped_lines(&self, text: &str, scale: f64) -> usize {
        let per_line = (self.content_width / (self.average_char_width * scale))
            .floor()
            .max(1.0) as usize;
        text.split('\n')
            .map(|line| line.chars().count().div_ceil(per_line).max(1))
            .sum()
    }

    fn image_height(&self, block: &Block) -> f64 {
        let own = block.attribute("height");
        let nested = || {
            markup::inner_markup(&block.markup)
                .map(markup::parse_blocks)
                .and_then(|inner| inner.into_iter().find(|b| b.kind == BlockKind::Image))
                .and_then(|img| img.attribute("height"))
        };
        own.or_else(nested)
            .and_then(|h| h.trim_end_matches("px").parse::<f64>().ok())
            .unwrap_or(self.default_image_height)
    }
}

fn heading_scale(level: u8) -> f64 {
    match level {
        1 => 2.0,
        2 => 1.5,
        3 => 1.17,
        4 => 1.0,
        5 => 0.83,
        _ => 0.67,
    }
}

impl MeasureBlock for TextMetrics {
    fn measure(&self, block: &Block) -> Result<f64, MeasureError> {
        let height = match &block.kind {
            BlockKind::Comment => return Ok(0.0),
            BlockKind::Heading { level } => {
                let scale = heading_scale(*level);
                self.wrapped_lines(&block.text(), scale) as f64 * self.line_height * scale
            }
            BlockKind::Table => {
                let rows = block.markup.to_ascii_lowercase().matches("<tr").count().max(1);
                rows as f64 * self.table_row_height
            }
            BlockKind::Image => self.image_height(block),
            BlockKind::Rule => self.rule_height,
            BlockKind::CodeBlock => block.text().split('\n').count() as f64 * self.line_height,
            BlockKind::List { .. } => {
                let items = block.markup.to_ascii_lowercase().matches("<li").count();
                let lines = self.wrapped_lines(&block.text(), 1.0).max(items);
                lines as f64 * self.line_height
            }
            BlockKind::Paragraph
            | BlockKind::BlockQuote
            | BlockKind::Text
            | BlockKind::Other { .. } => {
                self.wrapped_lines(&block.text(), 1.0) as f64 * self.line_height
            }
        };
        Ok(height + self.block_spacing)
    }
}
