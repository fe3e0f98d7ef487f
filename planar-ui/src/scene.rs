//! The minimal scene contract the interaction layer consumes.
//!
//! ## Usage
//!
//! Implement [`SceneBackend`] over the engine's mesh store so text meshes can
//! be hit-tested and overlay quads (selection highlights, carets) can be
//! created as children of them.
use glam::{Mat4, Quat, Vec2, Vec3};

use crate::Color;

slotmap::new_key_type! {
    /// Stable identity of a mesh owned by a scene.
    pub struct MeshId;
    /// Identity of a material owned by a scene.
    pub struct MaterialId;
}

/// Extents below this size are treated as degenerate.
pub const DEGENERATE_EXTENT: f32 = 1e-6;

/// Axis-aligned bounding box in a mesh's local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Creates a box from its two corners.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// A flat box of the given size centered on the local origin.
    pub fn centered(width: f32, height: f32) -> Self {
        let half = Vec3::new(width * 0.5, height * 0.5, 0.0);
        Self::new(-half, half)
    }

    /// Extent along local X.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Extent along local Y.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center of the box.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Whether the box has no usable X/Y extent.
    pub fn is_degenerate(&self) -> bool {
        !(self.width() > DEGENERATE_EXTENT && self.height() > DEGENERATE_EXTENT)
    }
}

/// A ray, typically cast from the camera through a pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin.
    pub origin: Vec3,
    /// Ray direction, not necessarily normalized.
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray.
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Returns this ray expressed in another frame.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Intersects the ray with the plane `z = plane_z`.
    ///
    /// Returns `None` for rays parallel to the plane or pointing away from it.
    pub fn intersect_plane_z(&self, plane_z: f32) -> Option<Vec3> {
        if self.direction.z.abs() <= f32::EPSILON {
            return None;
        }
        let t = (plane_z - self.origin.z) / self.direction.z;
        if t < 0.0 {
            return None;
        }
        Some(self.origin + self.direction * t)
    }
}

/// Description of an overlay quad to create under a parent mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadSpec {
    /// Mesh the quad is parented to. `center` is in this mesh's local space.
    pub parent: MeshId,
    /// Quad center in parent-local space.
    pub center: Vec3,
    /// Quad width and height in parent-local units.
    pub size: Vec2,
    /// Material to render with.
    pub material: MaterialId,
    /// Whether scene picking may return this quad.
    pub pickable: bool,
}

/// Mesh store operations needed by the text interaction layer.
///
/// Every query returns `None` (or a neutral default) for meshes the scene no
/// longer knows, so callers can treat a disposed mesh as missing data.
pub trait SceneBackend {
    /// Whether the mesh is still alive.
    fn contains(&self, mesh: MeshId) -> bool;

    /// World transform of the mesh.
    fn world_matrix(&self, mesh: MeshId) -> Option<Mat4>;

    /// Local-space bounding box of the mesh.
    fn bounding_box(&self, mesh: MeshId) -> Option<Aabb>;

    /// Rotation the text texture was authored with relative to the mesh's
    /// local axes.
    fn text_rotation(&self, _mesh: MeshId) -> Quat {
        Quat::IDENTITY
    }

    /// For input containers, the text mesh rendered inside them.
    fn linked_text_mesh(&self, _mesh: MeshId) -> Option<MeshId> {
        None
    }

    /// Whether the mesh reacts to clicks (buttons, checkboxes, ...).
    fn is_clickable(&self, _mesh: MeshId) -> bool {
        false
    }

    /// Creates a flat material.
    fn create_material(&mut self, color: Color) -> MaterialId;

    /// Releases a material.
    fn dispose_material(&mut self, material: MaterialId);

    /// Creates a quad parented to `spec.parent`.
    fn create_quad(&mut self, spec: QuadSpec) -> MeshId;

    /// Moves and resizes an existing quad.
    fn update_quad(&mut self, quad: MeshId, center: Vec3, size: Vec2);

    /// Shows or hides a mesh without disposing it.
    fn set_visible(&mut self, mesh: MeshId, visible: bool);

    /// Disposes a mesh and its children.
    fn dispose(&mut self, mesh: MeshId);
}
