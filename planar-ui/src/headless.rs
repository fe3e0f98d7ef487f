//! An in-memory [`SceneBackend`] without a GPU.
//!
//! ## Usage
//!
//! Drive the interaction layer in tests, tools and scripted demos where no
//! renderer is running. Text planes are authored with the same 180° roll the
//! rendered text meshes use, so mirroring behaves exactly as on screen.
use std::f32::consts::PI;

use glam::{Mat4, Quat, Vec2, Vec3};
use slotmap::SlotMap;
use tracing::trace;

use crate::{
    Color,
    scene::{Aabb, MaterialId, MeshId, QuadSpec, SceneBackend},
};

/// What a headless mesh stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadlessMeshKind {
    /// A text plane or any other authored mesh.
    Surface,
    /// An overlay quad created through [`SceneBackend::create_quad`].
    Quad {
        /// Center in parent-local space.
        center: Vec3,
        /// Width and height in parent-local units.
        size: Vec2,
        /// Material the quad renders with.
        material: MaterialId,
    },
}

/// A mesh record in a [`HeadlessScene`].
#[derive(Debug, Clone)]
pub struct HeadlessMesh {
    /// Debug name.
    pub name: String,
    /// Mesh kind.
    pub kind: HeadlessMeshKind,
    /// Local transform (world transform for root meshes).
    pub transform: Mat4,
    /// Local bounding box.
    pub bounds: Aabb,
    /// Parent mesh, if any.
    pub parent: Option<MeshId>,
    /// Text texture rotation relative to local axes.
    pub text_rotation: Quat,
    /// Whether picking may return this mesh.
    pub pickable: bool,
    /// Whether the mesh reacts to clicks.
    pub clickable: bool,
    /// Visibility flag.
    pub visible: bool,
    /// Text mesh rendered inside this container.
    pub linked_text: Option<MeshId>,
}

/// Scene that keeps meshes and materials in slot maps.
#[derive(Default)]
pub struct HeadlessScene {
    meshes: SlotMap<MeshId, HeadlessMesh>,
    materials: SlotMap<MaterialId, Color>,
}

impl HeadlessScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flat text plane of `width` x `height` local units, centered on
    /// its origin and placed with `transform`.
    pub fn add_text_plane(&mut self, name: &str, width: f32, height: f32, transform: Mat4) -> MeshId {
        self.meshes.insert(HeadlessMesh {
            name: name.to_string(),
            kind: HeadlessMeshKind::Surface,
            transform,
            bounds: Aabb::centered(width, height),
            parent: None,
            text_rotation: Quat::from_rotation_z(PI),
            pickable: true,
            clickable: false,
            visible: true,
            linked_text: None,
        })
    }

    /// Adds a generic, non-text surface (a container, a button, ...).
    pub fn add_surface(&mut self, name: &str, bounds: Aabb, transform: Mat4) -> MeshId {
        self.meshes.insert(HeadlessMesh {
            name: name.to_string(),
            kind: HeadlessMeshKind::Surface,
            transform,
            bounds,
            parent: None,
            text_rotation: Quat::IDENTITY,
            pickable: true,
            clickable: false,
            visible: true,
            linked_text: None,
        })
    }

    /// Returns a mesh record.
    pub fn mesh(&self, mesh: MeshId) -> Option<&HeadlessMesh> {
        self.meshes.get(mesh)
    }

    /// Returns a mutable mesh record.
    pub fn mesh_mut(&mut self, mesh: MeshId) -> Option<&mut HeadlessMesh> {
        self.meshes.get_mut(mesh)
    }

    /// Replaces a mesh's local bounds, as a re-render at a new size would.
    pub fn set_bounds(&mut self, mesh: MeshId, bounds: Aabb) {
        if let Some(record) = self.meshes.get_mut(mesh) {
            record.bounds = bounds;
        }
    }

    /// Replaces a mesh's transform.
    pub fn set_transform(&mut self, mesh: MeshId, transform: Mat4) {
        if let Some(record) = self.meshes.get_mut(mesh) {
            record.transform = transform;
        }
    }

    /// Marks a mesh as clickable.
    pub fn set_clickable(&mut self, mesh: MeshId, clickable: bool) {
        if let Some(record) = self.meshes.get_mut(mesh) {
            record.clickable = clickable;
        }
    }

    /// Records that `container` renders its text through `text`.
    pub fn link_text_mesh(&mut self, container: MeshId, text: MeshId) {
        if let Some(record) = self.meshes.get_mut(container) {
            record.linked_text = Some(text);
        }
    }

    /// Children of `parent`, in creation order.
    pub fn children_of(&self, parent: MeshId) -> Vec<MeshId> {
        self.meshes
            .iter()
            .filter(|(_, record)| record.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of live meshes.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of live materials.
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Color of a material.
    pub fn material_color(&self, material: MaterialId) -> Option<Color> {
        self.materials.get(material).copied()
    }

    /// Maps a local point of `mesh` into world space.
    pub fn local_to_world(&self, mesh: MeshId, local: Vec3) -> Option<Vec3> {
        self.world_matrix(mesh)
            .map(|matrix| matrix.transform_point3(local))
    }
}

impl SceneBackend for HeadlessScene {
    fn contains(&self, mesh: MeshId) -> bool {
        self.meshes.contains_key(mesh)
    }

    fn world_matrix(&self, mesh: MeshId) -> Option<Mat4> {
        let record = self.meshes.get(mesh)?;
        match record.parent {
            Some(parent) => Some(self.world_matrix(parent)? * record.transform),
            None => Some(record.transform),
        }
    }

    fn bounding_box(&self, mesh: MeshId) -> Option<Aabb> {
        self.meshes.get(mesh).map(|record| record.bounds)
    }

    fn text_rotation(&self, mesh: MeshId) -> Quat {
        self.meshes
            .get(mesh)
            .map_or(Quat::IDENTITY, |record| record.text_rotation)
    }

    fn linked_text_mesh(&self, mesh: MeshId) -> Option<MeshId> {
        self.meshes.get(mesh).and_then(|record| record.linked_text)
    }

    fn is_clickable(&self, mesh: MeshId) -> bool {
        self.meshes.get(mesh).is_some_and(|record| record.clickable)
    }

    fn create_material(&mut self, color: Color) -> MaterialId {
        self.materials.insert(color)
    }

    fn dispose_material(&mut self, material: MaterialId) {
        self.materials.remove(material);
    }

    fn create_quad(&mut self, spec: QuadSpec) -> MeshId {
        let id = self.meshes.insert(HeadlessMesh {
            name: "overlay-quad".to_string(),
            kind: HeadlessMeshKind::Quad {
                center: spec.center,
                size: spec.size,
                material: spec.material,
            },
            transform: Mat4::from_translation(spec.center),
            bounds: Aabb::centered(spec.size.x, spec.size.y),
            parent: Some(spec.parent),
            text_rotation: Quat::IDENTITY,
            pickable: spec.pickable,
            clickable: false,
            visible: true,
            linked_text: None,
        });
        trace!("created quad {id:?} under {:?}", spec.parent);
        id
    }

    fn update_quad(&mut self, quad: MeshId, center: Vec3, size: Vec2) {
        if let Some(record) = self.meshes.get_mut(quad)
            && let HeadlessMeshKind::Quad {
                center: current_center,
                size: current_size,
                ..
            } = &mut record.kind
        {
            *current_center = center;
            *current_size = size;
            record.transform = Mat4::from_translation(center);
            record.bounds = Aabb::centered(size.x, size.y);
        }
    }

    fn set_visible(&mut self, mesh: MeshId, visible: bool) {
        if let Some(record) = self.meshes.get_mut(mesh) {
            record.visible = visible;
        }
    }

    fn dispose(&mut self, mesh: MeshId) {
        for child in self.children_of(mesh) {
            self.dispose(child);
        }
        if self.meshes.remove(mesh).is_some() {
            trace!("disposed mesh {mesh:?}");
        }
    }
}
