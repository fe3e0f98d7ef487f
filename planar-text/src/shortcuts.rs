//! Keyboard shortcuts for the active selection.
//!
//! | Keys | Action |
//! |---|---|
//! | Ctrl/Cmd + C | copy the selected text |
//! | Arrows | move the caret |
//! | Shift + arrows | extend the selection |
//! | Escape | clear the selection |
//!
//! Keys that fire while a native editable control has focus are left alone,
//! as are keys with nothing to act on, so the host keeps its default
//! behavior for them.
use planar_platform::SharedClipboard;
use planar_ui::{
    KeyPress, Shared,
    keyboard::{Key, NamedKey},
};
use tracing::debug;

use crate::{controller::SelectionController, selection::Direction, store::SelectionStore};

/// Whether a key was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyHandling {
    /// Consumed; the host should prevent its default action and stop
    /// propagation.
    Handled,
    /// Not ours.
    Ignored,
}

impl KeyHandling {
    /// Whether the key was consumed.
    pub fn is_handled(self) -> bool {
        self == Self::Handled
    }
}

/// Copy and caret-navigation shortcuts.
pub struct ShortcutService {
    clipboard: SharedClipboard,
}

impl ShortcutService {
    /// Creates the service over a clipboard.
    pub fn new(clipboard: SharedClipboard) -> Self {
        Self { clipboard }
    }

    /// The clipboard copies go to.
    pub fn clipboard(&self) -> &SharedClipboard {
        &self.clipboard
    }

    /// Copies the selected text. Returns `false` when nothing is selected or
    /// every clipboard backend failed.
    pub fn copy_selected_text(&self, store: &SelectionStore) -> bool {
        // read before touching the clipboard so later changes cannot leak in
        let text = store.selected_text();
        if !store.has_selection() || text.is_empty() {
            return false;
        }
        let copied = self.clipboard.lock().write_text(&text);
        if copied {
            debug!("copied {} chars to the clipboard", text.chars().count());
        }
        copied
    }

    /// Handles a key-down.
    pub fn handle_key_down(
        &self,
        press: &KeyPress,
        store: &SelectionStore,
        controller: &Shared<SelectionController>,
    ) -> KeyHandling {
        if press.target.is_editable() {
            return KeyHandling::Ignored;
        }

        match &press.key {
            Key::Character(text) if press.is_command() && text.eq_ignore_ascii_case("c") => {
                if self.copy_selected_text(store) {
                    KeyHandling::Handled
                } else {
                    KeyHandling::Ignored
                }
            }
            Key::Named(NamedKey::Escape) => {
                if store.element_id().is_none() {
                    return KeyHandling::Ignored;
                }
                store.clear_selection();
                KeyHandling::Handled
            }
            Key::Named(named) => {
                let Some(direction) = arrow_direction(*named) else {
                    return KeyHandling::Ignored;
                };
                let Some(entry) = store.active_entry() else {
                    return KeyHandling::Ignored;
                };
                controller.with_mut(|controller| {
                    controller.move_selection_with_keyboard(&entry, direction, press.is_shift())
                });
                KeyHandling::Handled
            }
            _ => KeyHandling::Ignored,
        }
    }
}

fn arrow_direction(key: NamedKey) -> Option<Direction> {
    match key {
        NamedKey::ArrowLeft => Some(Direction::Left),
        NamedKey::ArrowRight => Some(Direction::Right),
        NamedKey::ArrowUp => Some(Direction::Up),
        NamedKey::ArrowDown => Some(Direction::Down),
        _ => None,
    }
}
