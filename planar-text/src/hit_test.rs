//! Conversions between CSS-pixel points and caret indices.
//!
//! Points are relative to the text content box (not its container), with
//! `y` growing downwards. Every function here degrades to a safe default
//! when the metrics have no lines.
use glam::Vec2;
use unicode_segmentation::UnicodeSegmentation;

use crate::{
    metrics::{CharacterMetrics, LineMetrics, TextLayoutMetrics},
    style::TextAlign,
};

/// Slack, in CSS pixels, under which a point still counts as on a glyph's
/// midpoint. Points mapped back from world space drift by a few ulps.
pub const MIDPOINT_EPSILON: f32 = 1e-3;

/// Where a caret sits, in CSS pixels of the content box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretPosition {
    /// Horizontal position, alignment offset included.
    pub x: f32,
    /// Line the caret is on.
    pub line_index: usize,
    /// Top of that line.
    pub top: f32,
    /// Bottom of that line.
    pub bottom: f32,
}

/// Vertical caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMove {
    /// One visual line up.
    Up,
    /// One visual line down.
    Down,
}

/// Resolves the caret index closest to `point`.
///
/// The target line is the first one whose bottom reaches `point.y`. Within
/// it, a point left of a glyph's midpoint (or on it, within
/// [`MIDPOINT_EPSILON`]) lands before the glyph, anything else after it.
pub fn caret_index_for_point(metrics: &TextLayoutMetrics, align: TextAlign, point: Vec2) -> usize {
    let Some(last_line) = metrics.lines.last() else {
        return 0;
    };

    let total_width = metrics.effective_width();
    let x = point.x.clamp(0.0, total_width.max(0.0));
    let min_top = metrics.min_line_top();
    let y = point.y.clamp(min_top, metrics.max_line_bottom().max(min_top));

    let line = metrics
        .lines
        .iter()
        .find(|line| line.bottom >= y)
        .unwrap_or(last_line);

    index_on_line(metrics, line, align, total_width, x)
}

fn index_on_line(
    metrics: &TextLayoutMetrics,
    line: &LineMetrics,
    align: TextAlign,
    total_width: f32,
    x: f32,
) -> usize {
    let line_x = x - align.line_offset(total_width, line.width);
    if line_x <= 0.0 {
        return line.start_index;
    }

    for character in metrics.line_characters(line.index) {
        if character.right() >= line_x {
            return if line_x <= character.midpoint() + MIDPOINT_EPSILON {
                character.index
            } else {
                character.index + 1
            };
        }
    }
    line.end_index
}

/// The line a caret index belongs to: the first line whose end reaches it.
///
/// At a soft-wrap boundary this is the earlier line. Indices past the end
/// resolve to the last line.
pub fn line_for_index(metrics: &TextLayoutMetrics, index: usize) -> Option<&LineMetrics> {
    metrics
        .lines
        .iter()
        .find(|line| index <= line.end_index)
        .or_else(|| metrics.lines.last())
}

/// Horizontal offset of a caret boundary within its line, without
/// alignment.
///
/// A boundary at or before the line start is `0`; an exact character match
/// is that character's left edge; anything else snaps to the right edge of
/// the nearest preceding character. Nothing is interpolated inside a glyph.
pub fn boundary_offset<'a>(
    characters: impl IntoIterator<Item = &'a CharacterMetrics>,
    line: &LineMetrics,
    index: usize,
) -> f32 {
    if index <= line.start_index {
        return 0.0;
    }
    let mut offset = 0.0;
    for character in characters {
        if character.index == index {
            return character.x;
        }
        if character.index > index {
            break;
        }
        offset = character.right();
    }
    offset
}

/// Inverse of [`caret_index_for_point`]: where the caret for `index` is drawn.
pub fn caret_position(
    metrics: &TextLayoutMetrics,
    align: TextAlign,
    index: usize,
) -> Option<CaretPosition> {
    let line = line_for_index(metrics, index)?;
    let line_offset = align.line_offset(metrics.effective_width(), line.width);
    let x = line_offset + boundary_offset(metrics.line_characters(line.index), line, index);
    Some(CaretPosition {
        x,
        line_index: line.index,
        top: line.top,
        bottom: line.bottom,
    })
}

/// Moves a caret one visual line up or down, keeping its horizontal
/// position.
///
/// Moving up from the first line lands on `0`; moving down from the last
/// line lands on that line's end.
pub fn vertical_caret_index(
    metrics: &TextLayoutMetrics,
    align: TextAlign,
    index: usize,
    direction: VerticalMove,
) -> usize {
    let Some(caret) = caret_position(metrics, align, index) else {
        return 0;
    };

    let target = match direction {
        VerticalMove::Up => match caret.line_index.checked_sub(1) {
            Some(previous) => metrics.lines.get(previous),
            None => return 0,
        },
        VerticalMove::Down => match metrics.lines.get(caret.line_index + 1) {
            Some(next) => Some(next),
            None => return metrics.max_caret_index().unwrap_or(0),
        },
    };

    match target {
        Some(line) => caret_index_for_point(metrics, align, Vec2::new(caret.x, line.middle())),
        None => index,
    }
}

/// The `[start, end)` char range of the word (or whitespace run, or
/// punctuation) around `index`.
pub fn word_range_at(text: &str, index: usize) -> (usize, usize) {
    let mut start = 0;
    let mut last = (0, 0);
    for token in text.split_word_bounds() {
        let end = start + token.chars().count();
        if index >= start && index < end {
            return (start, end);
        }
        last = (start, end);
        start = end;
    }
    // past the end: the last token, if any
    if index >= start { last } else { (index, index) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metrics::LayoutMetricsProvider, monospace::MonospaceLayout, style::TextStyle,
    };

    fn layout(text: &str, max_width: Option<f32>) -> TextLayoutMetrics {
        MonospaceLayout::fixed(10.0, 20.0)
            .measure(text, &TextStyle::default(), 1.0, max_width)
            .css
    }

    #[test]
    fn caret_lands_on_glyph_boundaries() {
        let metrics = layout("hello", None);
        for k in 0..=5 {
            let x = k as f32 * 10.0;
            assert_eq!(
                caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(x, 5.0)),
                k
            );
        }
    }

    #[test]
    fn caret_rounds_at_glyph_midpoint() {
        let metrics = layout("hello", None);
        for k in 0..5 {
            let mid = k as f32 * 10.0 + 5.0;
            assert_eq!(
                caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(mid - 0.01, 5.0)),
                k
            );
            assert_eq!(
                caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(mid + 0.01, 5.0)),
                k + 1
            );
        }
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(15.0, 5.0)),
            1
        );
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(17.0, 5.0)),
            2
        );
    }

    #[test]
    fn midpoint_ties_survive_float_drift() {
        let metrics = layout("hello", None);
        let drifted = 15.0 + MIDPOINT_EPSILON * 0.5;
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(drifted, 5.0)),
            1
        );
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(15.000_001, 5.0)),
            1
        );
        let past = 15.0 + MIDPOINT_EPSILON * 2.0;
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(past, 5.0)),
            2
        );
    }

    #[test]
    fn points_outside_the_box_clamp() {
        let metrics = layout("ab\ncd", None);
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(-40.0, -40.0)),
            0
        );
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(500.0, 500.0)),
            5
        );
        // second line, left edge
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(0.0, 30.0)),
            3
        );
    }

    #[test]
    fn centered_lines_subtract_their_offset() {
        // "abcd" over "ef": second line is 20px wide inside a 40px box
        let metrics = layout("abcd\nef", None);
        let y = 30.0;
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Center, Vec2::new(10.0, y)),
            5
        );
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Center, Vec2::new(20.0, y)),
            6
        );
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Right, Vec2::new(40.0, y)),
            7
        );
    }

    #[test]
    fn empty_metrics_resolve_to_zero() {
        let metrics = TextLayoutMetrics::default();
        assert_eq!(
            caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(10.0, 10.0)),
            0
        );
        assert_eq!(caret_position(&metrics, TextAlign::Left, 3), None);
        assert_eq!(
            vertical_caret_index(&metrics, TextAlign::Left, 3, VerticalMove::Down),
            0
        );
    }

    #[test]
    fn caret_position_is_inverse_of_hit_test() {
        let metrics = layout("ab\ncde", None);
        for index in [0, 1, 2, 3, 4, 6] {
            let caret = caret_position(&metrics, TextAlign::Left, index)
                .expect("caret should resolve");
            let y = (caret.top + caret.bottom) * 0.5;
            assert_eq!(
                caret_index_for_point(&metrics, TextAlign::Left, Vec2::new(caret.x, y)),
                index
            );
        }
    }

    #[test]
    fn vertical_moves_keep_column_and_clamp_at_edges() {
        let metrics = layout("abc\ndefg\nhi", None);
        // 'b|c' (index 2) down to 'ef|g' (index 6)
        assert_eq!(
            vertical_caret_index(&metrics, TextAlign::Left, 2, VerticalMove::Down),
            6
        );
        // end of "defg" down onto the shorter "hi" clamps to its end
        assert_eq!(
            vertical_caret_index(&metrics, TextAlign::Left, 8, VerticalMove::Down),
            11
        );
        assert_eq!(
            vertical_caret_index(&metrics, TextAlign::Left, 6, VerticalMove::Up),
            2
        );
        assert_eq!(
            vertical_caret_index(&metrics, TextAlign::Left, 2, VerticalMove::Up),
            0
        );
        assert_eq!(
            vertical_caret_index(&metrics, TextAlign::Left, 10, VerticalMove::Down),
            11
        );
    }

    #[test]
    fn boundary_offsets_never_split_glyphs() {
        let metrics = layout("abc", None);
        let line = &metrics.lines[0];
        assert_eq!(boundary_offset(metrics.line_characters(0), line, 0), 0.0);
        assert_eq!(boundary_offset(metrics.line_characters(0), line, 2), 20.0);
        assert_eq!(boundary_offset(metrics.line_characters(0), line, 3), 30.0);
        assert_eq!(boundary_offset(metrics.line_characters(0), line, 99), 30.0);
    }

    #[test]
    fn word_ranges_follow_unicode_boundaries() {
        let text = "hello brave world";
        assert_eq!(word_range_at(text, 2), (0, 5));
        assert_eq!(word_range_at(text, 5), (5, 6));
        assert_eq!(word_range_at(text, 8), (6, 11));
        assert_eq!(word_range_at(text, 17), (12, 17));
        assert_eq!(word_range_at("", 0), (0, 0));
    }
}
