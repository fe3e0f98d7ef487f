//! The selection state machine.
//!
//! A controller is `Idle` (no element), `Dragging` (pointer gesture in
//! progress) or `Settled` (caret or range on an element, no gesture).
//! Pointer gestures move it through `begin → update* → finalize`; keyboard
//! moves and programmatic selections only run outside a gesture. Every
//! change is published to subscribers as a [`TextSelectionState`] snapshot.
use glam::Vec2;
use planar_ui::{ElementId, EventBus, MeshId, SubscriptionId};
use tracing::{debug, trace};

use crate::{
    hit_test::{self, VerticalMove},
    registry::TextInteractionEntry,
    selection::{Direction, TextSelectionState},
};

#[derive(Debug, Clone, PartialEq)]
struct ActiveGesture {
    element_id: ElementId,
    mesh: MeshId,
}

impl ActiveGesture {
    fn of(entry: &TextInteractionEntry) -> Self {
        Self {
            element_id: entry.element_id.clone(),
            mesh: entry.mesh,
        }
    }

    fn matches(&self, entry: &TextInteractionEntry) -> bool {
        self.element_id == entry.element_id && self.mesh == entry.mesh
    }
}

/// Owns the selection state and its transitions.
#[derive(Debug, Default)]
pub struct SelectionController {
    state: TextSelectionState,
    gesture: Option<ActiveGesture>,
    changes: EventBus<TextSelectionState>,
}

impl SelectionController {
    /// Creates an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> &TextSelectionState {
        &self.state
    }

    /// Whether a pointer gesture is in progress.
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Element of the gesture in progress.
    pub fn gesture_element(&self) -> Option<&ElementId> {
        self.gesture.as_ref().map(|gesture| &gesture.element_id)
    }

    /// Caret index for a CSS point on `entry`, clamped to its caret range.
    /// Zero when the entry has no metrics.
    pub fn caret_index_for_point(&self, entry: &TextInteractionEntry, point: Vec2) -> usize {
        entry.css_metrics().map_or(0, |metrics| {
            hit_test::caret_index_for_point(metrics, entry.text_align(), point)
                .min(entry.max_caret_index())
        })
    }

    /// Starts a pointer gesture with a collapsed selection at `point`.
    pub fn begin_selection(&mut self, entry: &TextInteractionEntry, point: Vec2) -> usize {
        let caret = self.caret_index_for_point(entry, point);
        trace!("begin selection in {} at {caret}", entry.element_id);
        self.gesture = Some(ActiveGesture::of(entry));
        self.set_state(TextSelectionState::new(
            entry.element_id.clone(),
            caret,
            caret,
            true,
        ));
        caret
    }

    /// Moves the focus of the gesture in progress to `point`.
    ///
    /// A gesture on a different entry restarts at `point`. Without a gesture
    /// this does nothing. Returns whether the state changed.
    pub fn update_selection(&mut self, entry: &TextInteractionEntry, point: Vec2) -> bool {
        let Some(gesture) = &self.gesture else {
            return false;
        };
        if !gesture.matches(entry) {
            self.begin_selection(entry, point);
            return true;
        }

        let caret = self.caret_index_for_point(entry, point);
        let anchor = self.state.anchor_index.unwrap_or(caret);
        self.set_state(TextSelectionState::new(
            entry.element_id.clone(),
            anchor,
            caret,
            true,
        ))
    }

    /// Ends the gesture in progress, keeping its range.
    pub fn finalize_selection(&mut self) -> bool {
        if self.gesture.take().is_none() {
            return false;
        }
        let mut next = self.state.clone();
        next.is_pointer_down = false;
        next.has_selection = next.range.is_some_and(|range| !range.is_empty());
        if let Some(range) = next.range {
            debug!(
                "selection settled on {:?}: {}..{}",
                next.element_id, range.start, range.end
            );
        }
        self.set_state(next)
    }

    /// Abandons the gesture in progress, keeping whatever it had selected.
    /// Does nothing without a gesture.
    pub fn cancel_selection(&mut self) -> bool {
        if self.gesture.take().is_none() {
            return false;
        }
        let mut next = self.state.clone();
        next.is_pointer_down = false;
        self.set_state(next)
    }

    /// Returns to idle.
    pub fn clear_selection(&mut self) -> bool {
        self.gesture = None;
        self.set_state(TextSelectionState::default())
    }

    /// Moves or extends the selection on `entry` from the keyboard.
    ///
    /// Without `extend`, a non-empty range collapses to its start (left, up)
    /// or end (right, down). Otherwise the focus moves one char or one line,
    /// starting from 0 if `entry` held no caret. Ignored during a gesture.
    pub fn move_selection_with_keyboard(
        &mut self,
        entry: &TextInteractionEntry,
        direction: Direction,
        extend: bool,
    ) -> bool {
        if self.gesture.is_some() {
            return false;
        }

        let max = entry.max_caret_index();
        let same_element = self.state.element_id.as_ref() == Some(&entry.element_id);
        let (anchor, focus, range) = if same_element {
            (self.state.anchor_index, self.state.focus_index, self.state.range)
        } else {
            (None, None, None)
        };

        if !extend
            && let Some(range) = range
            && !range.is_empty()
        {
            let caret = if direction.is_backward() { range.start } else { range.end };
            return self.set_state(TextSelectionState::caret(
                entry.element_id.clone(),
                caret.min(max),
            ));
        }

        let current = focus.unwrap_or(0).min(max);
        let next = match direction {
            Direction::Left => current.saturating_sub(1),
            Direction::Right => (current + 1).min(max),
            Direction::Up | Direction::Down => {
                let vertical = if direction == Direction::Up {
                    VerticalMove::Up
                } else {
                    VerticalMove::Down
                };
                entry.css_metrics().map_or(current, |metrics| {
                    hit_test::vertical_caret_index(metrics, entry.text_align(), current, vertical)
                        .min(max)
                })
            }
        };
        let anchor = if extend {
            anchor.unwrap_or(current).min(max)
        } else {
            next
        };
        trace!("keyboard {direction:?} (extend: {extend}) to {anchor}..{next}");
        self.set_state(TextSelectionState::new(
            entry.element_id.clone(),
            anchor,
            next,
            false,
        ))
    }

    /// Selects `[anchor, focus]` on `entry`, clamped to its caret range.
    pub fn select_range(&mut self, entry: &TextInteractionEntry, anchor: usize, focus: usize) -> bool {
        let max = entry.max_caret_index();
        self.gesture = None;
        self.set_state(TextSelectionState::new(
            entry.element_id.clone(),
            anchor.min(max),
            focus.min(max),
            false,
        ))
    }

    /// Selects all of `entry`.
    pub fn select_all(&mut self, entry: &TextInteractionEntry) -> bool {
        self.select_range(entry, 0, entry.max_caret_index())
    }

    /// Selects the word around `index`.
    pub fn select_word_at(&mut self, entry: &TextInteractionEntry, index: usize) -> bool {
        let Some(text) = entry.text.as_deref() else {
            return self.select_range(entry, index, index);
        };
        let (start, end) = hit_test::word_range_at(text, index);
        self.select_range(entry, start, end)
    }

    /// Selects the visual line holding `index`.
    pub fn select_line_at(&mut self, entry: &TextInteractionEntry, index: usize) -> bool {
        let bounds = entry
            .css_metrics()
            .and_then(|metrics| hit_test::line_for_index(metrics, index))
            .map(|line| (line.start_index, line.end_index));
        match bounds {
            Some((start, end)) => self.select_range(entry, start, end),
            None => self.select_all(entry),
        }
    }

    /// Publishes the current state again without changing it.
    pub fn republish(&self) {
        self.changes.emit(&self.state);
    }

    /// Subscribes to state changes.
    ///
    /// Listeners run while the controller is borrowed for the change and
    /// must not access it again.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&TextSelectionState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.changes.subscribe(listener)
    }

    /// Removes a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.changes.unsubscribe(id)
    }

    fn set_state(&mut self, next: TextSelectionState) -> bool {
        if next == self.state {
            return false;
        }
        self.state = next;
        self.changes.emit(&self.state);
        true
    }
}
