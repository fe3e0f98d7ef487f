//! Selection state values.
use planar_ui::ElementId;

/// A normalized `[start, end)` char range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    /// Inclusive start.
    pub start: usize,
    /// Exclusive end.
    pub end: usize,
}

impl SelectionRange {
    /// Range between two caret indices in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Number of selected chars.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the range selects nothing.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Published selection state.
///
/// `range` is derived from `anchor_index` and `focus_index`, and
/// `has_selection` is true exactly when that range is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextSelectionState {
    /// Element holding the selection.
    pub element_id: Option<ElementId>,
    /// Where the selection started.
    pub anchor_index: Option<usize>,
    /// Where the selection currently ends; also the caret.
    pub focus_index: Option<usize>,
    /// Normalized range between anchor and focus.
    pub range: Option<SelectionRange>,
    /// Whether a pointer gesture is in progress.
    pub is_pointer_down: bool,
    /// Whether `range` is non-empty.
    pub has_selection: bool,
}

impl TextSelectionState {
    /// State of an element with the given anchor and focus.
    pub fn new(element_id: ElementId, anchor: usize, focus: usize, is_pointer_down: bool) -> Self {
        let range = SelectionRange::new(anchor, focus);
        Self {
            element_id: Some(element_id),
            anchor_index: Some(anchor),
            focus_index: Some(focus),
            range: Some(range),
            is_pointer_down,
            has_selection: !range.is_empty(),
        }
    }

    /// A collapsed caret at `index`, no gesture.
    pub fn caret(element_id: ElementId, index: usize) -> Self {
        Self::new(element_id, index, index, false)
    }

    /// Whether nothing is selected and no element holds a caret.
    pub fn is_idle(&self) -> bool {
        self.element_id.is_none()
    }

    /// Number of selected chars.
    pub fn range_length(&self) -> usize {
        self.range.map_or(0, |range| range.len())
    }
}

/// Direction of a keyboard caret move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// One char towards the start.
    Left,
    /// One char towards the end.
    Right,
    /// One line up.
    Up,
    /// One line down.
    Down,
}

impl Direction {
    /// Whether the move heads towards the start of the text.
    pub fn is_backward(self) -> bool {
        matches!(self, Self::Left | Self::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_normalized() {
        let range = SelectionRange::new(5, 2);
        assert_eq!(range, SelectionRange { start: 2, end: 5 });
        assert_eq!(range.len(), 3);
        assert!(SelectionRange::new(4, 4).is_empty());
    }

    #[test]
    fn has_selection_tracks_the_range() {
        let backwards = TextSelectionState::new("a".into(), 4, 1, true);
        assert_eq!(backwards.range, Some(SelectionRange::new(1, 4)));
        assert!(backwards.has_selection);
        assert_eq!(backwards.range_length(), 3);

        let caret = TextSelectionState::caret("a".into(), 2);
        assert!(!caret.has_selection);
        assert!(!caret.is_pointer_down);
        assert!(TextSelectionState::default().is_idle());
    }
}
