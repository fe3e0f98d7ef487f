//! Text layout metrics consumed by hit testing and highlight geometry.
//!
//! Metrics come from a [`LayoutMetricsProvider`]. They describe one string
//! under one style at one point in time and are never mutated afterwards: a
//! text or style change produces a fresh [`StoredTextLayoutMetrics`].
//!
//! All indices are char (Unicode scalar) indices into the source string. A
//! line's `end_index` is exclusive for content and is itself a valid caret
//! position.
use std::sync::Arc;

use crate::style::TextStyle;

/// Position metrics of one character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterMetrics {
    /// Index in the source string.
    pub index: usize,
    /// Line the character sits on.
    pub line_index: usize,
    /// Left edge within its line.
    pub x: f32,
    /// Glyph width.
    pub width: f32,
    /// Distance from `x` to the next character's start.
    pub advance: f32,
    /// Whether this is a hard line break (`\n`).
    pub is_line_break: bool,
}

impl CharacterMetrics {
    /// Right edge (`x + advance`), where the next character starts.
    pub fn right(&self) -> f32 {
        self.x + self.advance
    }

    /// Horizontal midpoint of the glyph.
    pub fn midpoint(&self) -> f32 {
        self.x + self.width * 0.5
    }

    fn scaled(&self, scale: f32) -> Self {
        Self {
            x: self.x * scale,
            width: self.width * scale,
            advance: self.advance * scale,
            ..*self
        }
    }
}

/// Metrics of one visual line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Line number, from the top.
    pub index: usize,
    /// First character index on the line.
    pub start_index: usize,
    /// One past the last content character; also the caret at line end.
    pub end_index: usize,
    /// Width of the line's content.
    pub width: f32,
    /// Top edge.
    pub top: f32,
    /// Bottom edge.
    pub bottom: f32,
    /// Baseline.
    pub baseline: f32,
}

impl LineMetrics {
    /// Height of the line box.
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Vertical midpoint of the line box.
    pub fn middle(&self) -> f32 {
        (self.top + self.bottom) * 0.5
    }

    fn scaled(&self, scale: f32) -> Self {
        Self {
            width: self.width * scale,
            top: self.top * scale,
            bottom: self.bottom * scale,
            baseline: self.baseline * scale,
            ..*self
        }
    }
}

/// Metrics of one laid-out string.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLayoutMetrics {
    /// Width of the widest line.
    pub total_width: f32,
    /// Height of all lines.
    pub total_height: f32,
    /// Line box height.
    pub line_height: f32,
    /// Font ascent.
    pub ascent: f32,
    /// Font descent.
    pub descent: f32,
    /// Lines, top to bottom.
    pub lines: Vec<LineMetrics>,
    /// Characters in source order.
    pub characters: Vec<CharacterMetrics>,
}

impl TextLayoutMetrics {
    /// Total width, falling back to the rightmost character edge when the
    /// provider reported none.
    pub fn effective_width(&self) -> f32 {
        if self.total_width > 0.0 {
            return self.total_width;
        }
        self.characters
            .iter()
            .filter(|character| !character.is_line_break)
            .map(CharacterMetrics::right)
            .fold(0.0, f32::max)
    }

    /// Largest valid caret index: the last line's end, or `None` when there
    /// are no lines.
    pub fn max_caret_index(&self) -> Option<usize> {
        self.lines.last().map(|line| line.end_index)
    }

    /// Top of the first line box.
    pub fn min_line_top(&self) -> f32 {
        self.lines
            .iter()
            .map(|line| line.top)
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// Bottom of the last line box.
    pub fn max_line_bottom(&self) -> f32 {
        self.lines
            .iter()
            .map(|line| line.bottom)
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Non-break characters on `line_index`, in order.
    pub fn line_characters(&self, line_index: usize) -> impl Iterator<Item = &CharacterMetrics> {
        self.characters
            .iter()
            .filter(move |character| character.line_index == line_index && !character.is_line_break)
    }

    /// Copy with every spatial field multiplied by `scale`.
    pub fn scaled(&self, scale: f32) -> Self {
        Self {
            total_width: self.total_width * scale,
            total_height: self.total_height * scale,
            line_height: self.line_height * scale,
            ascent: self.ascent * scale,
            descent: self.descent * scale,
            lines: self.lines.iter().map(|line| line.scaled(scale)).collect(),
            characters: self
                .characters
                .iter()
                .map(|character| character.scaled(scale))
                .collect(),
        }
    }
}

/// CSS-pixel metrics together with their world-unit copy.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTextLayoutMetrics {
    /// World units per CSS pixel.
    pub scale: f32,
    /// Metrics in CSS pixels.
    pub css: TextLayoutMetrics,
    /// Metrics in world units.
    pub world: TextLayoutMetrics,
}

impl StoredTextLayoutMetrics {
    /// Stores `css` and derives the world copy from it.
    pub fn new(css: TextLayoutMetrics, scale: f32) -> Self {
        let world = css.scaled(scale);
        Self { scale, css, world }
    }

    /// Same as [`Self::new`], wrapped for sharing between registry entries
    /// and the events that carry them.
    pub fn shared(css: TextLayoutMetrics, scale: f32) -> Arc<Self> {
        Arc::new(Self::new(css, scale))
    }
}

/// The external text layout engine.
pub trait LayoutMetricsProvider {
    /// Lays out `text` under `style`, wrapping at `max_width` CSS pixels when
    /// given.
    fn measure(
        &self,
        text: &str,
        style: &TextStyle,
        scale: f32,
        max_width: Option<f32>,
    ) -> StoredTextLayoutMetrics;
}
