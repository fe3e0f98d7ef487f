//! A fixed-advance layout engine.
//!
//! `MonospaceLayout` is the reference [`LayoutMetricsProvider`]: every glyph
//! has the same advance, hard breaks happen at `\n` and soft wraps happen on
//! word boundaries when a maximum width is given. Words wider than a whole
//! line are broken per character.
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    metrics::{
        CharacterMetrics, LayoutMetricsProvider, LineMetrics, StoredTextLayoutMetrics,
        TextLayoutMetrics,
    },
    style::TextStyle,
};

/// Ascent as a fraction of the line height.
const ASCENT_RATIO: f32 = 0.8;

/// Lays text out on a fixed character grid.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonospaceLayout {
    advance: Option<f32>,
    line_height: Option<f32>,
}

impl MonospaceLayout {
    /// Advance per font-size unit when derived from the style.
    pub const ADVANCE_EM: f32 = 0.6;

    /// A layout that derives its grid from each style's font size and line
    /// height.
    pub fn new() -> Self {
        Self::default()
    }

    /// A layout with a fixed advance and line height in CSS pixels,
    /// regardless of style.
    pub fn fixed(advance: f32, line_height: f32) -> Self {
        Self {
            advance: Some(advance),
            line_height: Some(line_height),
        }
    }

    fn grid(&self, style: &TextStyle) -> (f32, f32) {
        let advance = self
            .advance
            .unwrap_or(style.font_size * Self::ADVANCE_EM)
            .max(f32::EPSILON);
        let line_height = self.line_height.unwrap_or(style.line_height).max(0.0);
        (advance, line_height)
    }

    /// Lays `text` out in CSS pixels.
    pub fn layout(&self, text: &str, style: &TextStyle, max_width: Option<f32>) -> TextLayoutMetrics {
        let (advance, line_height) = self.grid(style);
        let per_line = max_width
            .filter(|width| width.is_finite() && *width > 0.0)
            .map(|width| ((width / advance).floor() as usize).max(1));

        let chars: Vec<char> = text.chars().collect();
        let mut ranges = Vec::new();
        let mut segment_start = 0;
        for segment in text.split('\n') {
            let len = segment.chars().count();
            match per_line {
                Some(per_line) => wrap_segment(segment, segment_start, per_line, &mut ranges),
                None => ranges.push((segment_start, segment_start + len)),
            }
            // skip the '\n' that ended this segment
            segment_start += len + 1;
        }

        let ascent = line_height * ASCENT_RATIO;
        let mut lines = Vec::with_capacity(ranges.len());
        let mut characters = Vec::with_capacity(chars.len());
        for (line_index, &(start, end)) in ranges.iter().enumerate() {
            let top = line_index as f32 * line_height;
            for index in start..end {
                characters.push(CharacterMetrics {
                    index,
                    line_index,
                    x: (index - start) as f32 * advance,
                    width: advance,
                    advance,
                    is_line_break: false,
                });
            }
            // trailing whitespace hangs past the line width
            let visible = chars[start..end]
                .iter()
                .rposition(|ch| !ch.is_whitespace())
                .map_or(0, |last| last + 1);
            let width = visible as f32 * advance;
            if chars.get(end) == Some(&'\n') {
                characters.push(CharacterMetrics {
                    index: end,
                    line_index,
                    x: (end - start) as f32 * advance,
                    width: 0.0,
                    advance: 0.0,
                    is_line_break: true,
                });
            }
            lines.push(LineMetrics {
                index: line_index,
                start_index: start,
                end_index: end,
                width,
                top,
                bottom: top + line_height,
                baseline: top + ascent,
            });
        }

        let total_width = lines.iter().map(|line| line.width).fold(0.0, f32::max);
        trace!(
            "monospace layout: {} chars, {} lines, {total_width}px wide",
            chars.len(),
            lines.len()
        );
        TextLayoutMetrics {
            total_width,
            total_height: lines.len() as f32 * line_height,
            line_height,
            ascent,
            descent: line_height - ascent,
            lines,
            characters,
        }
    }
}

/// Greedy word wrap of one hard line into `[start, end)` char ranges.
fn wrap_segment(segment: &str, first: usize, per_line: usize, ranges: &mut Vec<(usize, usize)>) {
    let mut line_start = first;
    let mut line_len = 0;
    let mut cursor = first;
    for token in segment.split_word_bounds() {
        let len = token.chars().count();
        let is_space = token.chars().all(char::is_whitespace);
        if is_space || line_len + len <= per_line {
            line_len += len;
            cursor += len;
            continue;
        }
        if line_len > 0 {
            ranges.push((line_start, cursor));
            line_start = cursor;
        }
        let mut remaining = len;
        while remaining > per_line {
            ranges.push((cursor, cursor + per_line));
            cursor += per_line;
            remaining -= per_line;
            line_start = cursor;
        }
        line_len = remaining;
        cursor += remaining;
    }
    ranges.push((line_start, cursor));
}

impl LayoutMetricsProvider for MonospaceLayout {
    fn measure(
        &self,
        text: &str,
        style: &TextStyle,
        scale: f32,
        max_width: Option<f32>,
    ) -> StoredTextLayoutMetrics {
        StoredTextLayoutMetrics::new(self.layout(text, style, max_width), scale)
    }
}
