//! Orientation of a text texture on its mesh.
//!
//! Text meshes are authored with a roll that may flip the texture along the
//! local X axis. The vertical half of that roll is cancelled when the
//! texture is uploaded, so the first text row always sits at the top of the
//! box. `TextFrame` is the one place that knows this: pointer mapping, the
//! highlight factory and the caret renderer all go through it.
use glam::{Quat, Vec2, Vec3};

use planar_ui::Aabb;

/// Maps between mesh-local coordinates and normalized text coordinates.
///
/// Normalized coordinates run from `(0, 0)` at the first character of the
/// first line to `(1, 1)` at the far corner, whatever the mesh's
/// orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFrame {
    bounds: Aabb,
    mirror_x: bool,
}

impl TextFrame {
    /// Creates the frame for a mesh box and its text rotation.
    pub fn new(bounds: Aabb, text_rotation: Quat) -> Self {
        Self {
            bounds,
            mirror_x: (text_rotation * Vec3::X).x < 0.0,
        }
    }

    /// Whether text runs towards local −X.
    pub fn is_mirrored(&self) -> bool {
        self.mirror_x
    }

    /// The mesh box.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Normalizes a local point into text space. `None` for degenerate boxes.
    pub fn normalize(&self, local: Vec2) -> Option<Vec2> {
        if self.bounds.is_degenerate() {
            return None;
        }
        let (width, height) = (self.bounds.width(), self.bounds.height());
        let u = if self.mirror_x {
            (self.bounds.max.x - local.x) / width
        } else {
            (local.x - self.bounds.min.x) / width
        };
        let v = (self.bounds.max.y - local.y) / height;
        Some(Vec2::new(u, v))
    }

    /// Local X of a normalized horizontal position.
    pub fn local_x(&self, u: f32) -> f32 {
        let width = self.bounds.width();
        if self.mirror_x {
            self.bounds.max.x - u * width
        } else {
            self.bounds.min.x + u * width
        }
    }

    /// Local Y of a normalized vertical position.
    pub fn local_y(&self, v: f32) -> f32 {
        self.bounds.max.y - v * self.bounds.height()
    }

    /// Local point of a normalized position.
    pub fn local_point(&self, uv: Vec2) -> Vec2 {
        Vec2::new(self.local_x(uv.x), self.local_y(uv.y))
    }
}
