//! The horizontally scrolled window of a clipped text entry.
//!
//! Single-line inputs render only `width` CSS pixels of their content,
//! starting at `offset`. Unclipped text has a window the size of its
//! content and an offset of zero.
use crate::registry::TextInteractionEntry;

/// Visible part of a text entry's content, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleWindow {
    /// Content X at the window's left edge.
    pub offset: f32,
    /// Rendered width.
    pub width: f32,
    /// Full content width.
    pub content_width: f32,
}

impl VisibleWindow {
    /// Builds a window, clamping the offset into the scrollable range.
    pub fn new(content_width: f32, clip_width: Option<f32>, offset: f32) -> Self {
        let content_width = content_width.max(0.0);
        let width = clip_width.map_or(content_width, |clip| clip.clamp(0.0, content_width));
        let max_offset = (content_width - width).max(0.0);
        Self {
            offset: offset.clamp(0.0, max_offset),
            width,
            content_width,
        }
    }

    /// The window of a registered entry, or `None` without metrics.
    pub fn for_entry(entry: &TextInteractionEntry) -> Option<Self> {
        let metrics = entry.css_metrics()?;
        let clip = entry.style.as_ref().and_then(|style| style.clip_width);
        Some(Self::new(
            metrics.effective_width(),
            clip,
            entry.scroll_offset.unwrap_or(0.0),
        ))
    }

    /// Whether part of the content is hidden.
    pub fn is_clipped(&self) -> bool {
        self.width < self.content_width
    }

    /// Converts a window X into content X.
    pub fn to_content_x(&self, window_x: f32) -> f32 {
        window_x + self.offset
    }

    /// Clips the content span `[left, right]` to the window, returning it in
    /// window coordinates. `None` when nothing of it is visible.
    pub fn clip_span(&self, left: f32, right: f32) -> Option<(f32, f32)> {
        let left = (left - self.offset).max(0.0);
        let right = (right - self.offset).min(self.width);
        (right > left).then_some((left, right))
    }

    /// The smallest offset change that brings content X `x` into view.
    pub fn reveal(&self, x: f32) -> f32 {
        let offset = if x < self.offset {
            x
        } else if x > self.offset + self.width {
            x - self.width
        } else {
            self.offset
        };
        offset.clamp(0.0, (self.content_width - self.width).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclipped_window_covers_the_content() {
        let window = VisibleWindow::new(80.0, None, 12.0);
        assert_eq!(window.width, 80.0);
        assert_eq!(window.offset, 0.0);
        assert!(!window.is_clipped());
    }

    #[test]
    fn spans_are_shifted_and_cut_to_the_window() {
        let window = VisibleWindow::new(200.0, Some(50.0), 30.0);
        assert_eq!(window.clip_span(40.0, 60.0), Some((10.0, 30.0)));
        assert_eq!(window.clip_span(20.0, 100.0), Some((0.0, 50.0)));
        assert_eq!(window.clip_span(0.0, 30.0), None);
        assert_eq!(window.clip_span(80.0, 120.0), None);
        assert_eq!(window.to_content_x(5.0), 35.0);
    }

    #[test]
    fn reveal_scrolls_the_minimum_amount() {
        let window = VisibleWindow::new(200.0, Some(50.0), 30.0);
        assert_eq!(window.reveal(40.0), 30.0);
        assert_eq!(window.reveal(10.0), 10.0);
        assert_eq!(window.reveal(120.0), 70.0);
        assert_eq!(window.reveal(500.0), 150.0);
    }
}
