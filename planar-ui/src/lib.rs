//! Primitives for planar, a UI framework that renders declarative documents
//! as flat meshes in a 3D scene under an orthographic camera.
//!
//! This crate holds what every layer above it shares: colors, element ids,
//! the scene contract ([`SceneBackend`]) with an in-memory implementation
//! ([`HeadlessScene`]), input event records, focus tracking, and the small
//! synchronous [`EventBus`] used to propagate state changes.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod color;
pub mod element;
pub mod event_bus;
pub mod focus_state;
pub mod headless;
pub mod input;
pub mod scene;
pub mod shared;

pub use glam;
pub use winit::keyboard;

pub use color::Color;
pub use element::ElementId;
pub use event_bus::{EventBus, SubscriptionId};
pub use focus_state::FocusState;
pub use headless::HeadlessScene;
pub use input::{KeyPress, KeyTarget, PickInfo, PointerButton, PointerEvent};
pub use scene::{Aabb, MaterialId, MeshId, QuadSpec, Ray, SceneBackend};
pub use shared::Shared;
