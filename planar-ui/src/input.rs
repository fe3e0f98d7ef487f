//! Pointer and keyboard event records handed to the interaction layer.
//!
//! The host translates native window events into these records, attaching the
//! scene's pick results (topmost first) and, when available, the camera ray
//! through the pointer.
use std::time::Instant;

use glam::{Vec2, Vec3};
use winit::keyboard::{Key, ModifiersState, NamedKey};

use crate::scene::{MeshId, Ray};

/// Which pointer button an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    /// Left mouse button, pen contact or touch.
    #[default]
    Primary,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Secondary,
    /// Any other button, by native index.
    Other(u16),
}

/// One pick result from the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickInfo {
    /// The mesh that was hit.
    pub mesh: MeshId,
    /// World-space hit point, when the picker computed one.
    pub point: Option<Vec3>,
}

impl PickInfo {
    /// A pick with a known hit point.
    pub fn at(mesh: MeshId, point: Vec3) -> Self {
        Self {
            mesh,
            point: Some(point),
        }
    }

    /// A pick that only identifies the mesh.
    pub fn mesh_only(mesh: MeshId) -> Self {
        Self { mesh, point: None }
    }
}

/// A pointer event with the scene's pick results attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Button the event refers to.
    pub button: PointerButton,
    /// Pointer position in client (screen) pixels.
    pub client_position: Vec2,
    /// Pick results, topmost first.
    pub picks: Vec<PickInfo>,
    /// Camera ray through the pointer, world space.
    pub pick_ray: Option<Ray>,
    /// When the native event fired.
    pub timestamp: Instant,
}

impl PointerEvent {
    /// A primary-button event without picks.
    pub fn new(client_position: Vec2, timestamp: Instant) -> Self {
        Self {
            button: PointerButton::Primary,
            client_position,
            picks: Vec::new(),
            pick_ray: None,
            timestamp,
        }
    }

    /// Sets the button.
    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    /// Appends a pick result below the existing ones.
    pub fn with_pick(mut self, pick: PickInfo) -> Self {
        self.picks.push(pick);
        self
    }

    /// Sets the camera ray.
    pub fn with_ray(mut self, ray: Ray) -> Self {
        self.pick_ray = Some(ray);
        self
    }
}

/// Where keyboard focus sits in the host document when a key fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyTarget {
    /// The render surface (or anything that is not an editable control).
    #[default]
    Canvas,
    /// A native `<input>`/`<textarea>`-like control.
    NativeTextEntry,
    /// A content-editable region.
    ContentEditable,
}

impl KeyTarget {
    /// Whether the target edits text natively.
    pub fn is_editable(self) -> bool {
        matches!(self, Self::NativeTextEntry | Self::ContentEditable)
    }
}

/// A key-down event.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPress {
    /// Logical key.
    pub key: Key,
    /// Modifier state when the key fired.
    pub modifiers: ModifiersState,
    /// Where focus was in the host document.
    pub target: KeyTarget,
}

impl KeyPress {
    /// A named key (arrows, Escape, ...) on the canvas.
    pub fn named(key: NamedKey) -> Self {
        Self {
            key: Key::Named(key),
            modifiers: ModifiersState::empty(),
            target: KeyTarget::Canvas,
        }
    }

    /// A character key on the canvas.
    pub fn character(text: &str) -> Self {
        Self {
            key: Key::Character(text.into()),
            modifiers: ModifiersState::empty(),
            target: KeyTarget::Canvas,
        }
    }

    /// Sets the modifier state.
    pub fn with_modifiers(mut self, modifiers: ModifiersState) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Sets the focus target.
    pub fn with_target(mut self, target: KeyTarget) -> Self {
        self.target = target;
        self
    }

    /// Whether Ctrl (or Cmd on macOS) is held.
    pub fn is_command(&self) -> bool {
        self.modifiers.control_key() || self.modifiers.super_key()
    }

    /// Whether Shift is held.
    pub fn is_shift(&self) -> bool {
        self.modifiers.shift_key()
    }
}
