//! # Focus State Management
//!
//! Tracks which document element owns keyboard focus.
//!
//! ## Overview
//!
//! Only one element can be focused at a time inside a scene. The state is
//! owned by the scene's interaction context rather than stored globally, so
//! several scenes can coexist, each with its own focused element.
//!
//! ## Usage
//!
//! ```
//! use planar_ui::{ElementId, FocusState};
//!
//! let mut focus = FocusState::default();
//! let name = ElementId::from("name-input");
//! let email = ElementId::from("email-input");
//!
//! assert!(focus.request_focus(name.clone()));
//! assert!(focus.is_focused(&name));
//!
//! // Requesting focus elsewhere moves it.
//! focus.request_focus(email.clone());
//! assert!(!focus.is_focused(&name));
//!
//! // Unfocusing an element that does not hold focus has no effect.
//! focus.unfocus(&name);
//! assert!(focus.is_focused(&email));
//! ```
use crate::ElementId;

/// Focus owner of one scene.
#[derive(Debug, Default, Clone)]
pub struct FocusState {
    focused: Option<ElementId>,
    generation: u64,
}

impl FocusState {
    /// Returns the focused element, if any.
    pub fn focused(&self) -> Option<&ElementId> {
        self.focused.as_ref()
    }

    /// Checks whether `id` currently has focus.
    pub fn is_focused(&self, id: &ElementId) -> bool {
        self.focused.as_ref() == Some(id)
    }

    /// Moves focus to `id`. Returns `true` if the focus owner changed.
    pub fn request_focus(&mut self, id: ElementId) -> bool {
        if self.focused.as_ref() == Some(&id) {
            return false;
        }
        self.focused = Some(id);
        self.generation = self.generation.wrapping_add(1);
        true
    }

    /// Clears focus if `id` currently has it.
    pub fn unfocus(&mut self, id: &ElementId) {
        if self.focused.as_ref() == Some(id) {
            self.blur();
        }
    }

    /// Clears focus unconditionally.
    pub fn blur(&mut self) {
        if self.focused.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }

    /// Counter bumped on every focus change.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_changes_only_on_real_transitions() {
        let mut focus = FocusState::default();
        let id = ElementId::from("a");

        focus.request_focus(id.clone());
        let after_focus = focus.generation();
        assert!(!focus.request_focus(id.clone()));
        assert_eq!(focus.generation(), after_focus);

        focus.blur();
        assert_eq!(focus.generation(), after_focus + 1);
        focus.blur();
        assert_eq!(focus.generation(), after_focus + 1);
        assert!(focus.focused().is_none());
    }
}
