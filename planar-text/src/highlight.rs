//! Selection highlight geometry and the quads that render it.
//!
//! [`compute_segments`] turns a selection range into one rectangle per
//! visual line, in the text mesh's local space. [`HighlightFactory`] keeps a
//! pool of overlay quads in sync with those rectangles.
use glam::{Quat, Vec2, Vec3};
use planar_ui::{Aabb, ElementId, MaterialId, MeshId, QuadSpec, SceneBackend};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    config::InteractionConfig,
    frame::TextFrame,
    hit_test::boundary_offset,
    metrics::CharacterMetrics,
    registry::{InteractionRegistry, TextInteractionEntry},
    selection::{SelectionRange, TextSelectionState},
    viewport::VisibleWindow,
};

/// One highlight rectangle, in mesh-local units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightSegment {
    /// Center X.
    pub center_x: f32,
    /// Center Y.
    pub center_y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl HighlightSegment {
    /// Center as a vector.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }

    /// Size as a vector.
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Computes highlight rectangles for `range` on `entry`'s mesh.
///
/// `bounds` and `text_rotation` describe the mesh as the scene reports it.
/// Local units per CSS pixel are derived from the box width on every call,
/// so a mesh rebuilt at a new size is handled without caching. Lines the
/// range does not touch, and spans scrolled out of a clipped input's window,
/// produce no segment.
pub fn compute_segments(
    entry: &TextInteractionEntry,
    range: SelectionRange,
    bounds: Aabb,
    text_rotation: Quat,
    config: &InteractionConfig,
) -> Vec<HighlightSegment> {
    let (Some(metrics), Some(window)) = (entry.css_metrics(), VisibleWindow::for_entry(entry))
    else {
        return Vec::new();
    };
    if range.is_empty() || window.width <= 0.0 || bounds.is_degenerate() {
        return Vec::new();
    }

    let ratio = bounds.width() / window.width;
    let frame = TextFrame::new(bounds, text_rotation);
    let align = entry.text_align();
    let total_width = metrics.effective_width();
    let min_top = metrics.min_line_top();

    let mut by_line: Vec<SmallVec<[&CharacterMetrics; 32]>> =
        vec![SmallVec::new(); metrics.lines.len()];
    for character in metrics.characters.iter().filter(|c| !c.is_line_break) {
        if let Some(line) = by_line.get_mut(character.line_index) {
            line.push(character);
        }
    }

    let mut segments = Vec::new();
    for (line, characters) in metrics.lines.iter().zip(&by_line) {
        let start = line.start_index.max(range.start);
        let end = line.end_index.min(range.end);
        if start >= end {
            continue;
        }

        let from = boundary_offset(characters.iter().copied(), line, start);
        let to = boundary_offset(characters.iter().copied(), line, end);
        let width_css = (to - from).abs();
        if width_css <= 0.0 {
            continue;
        }

        let left = from.min(to) + align.line_offset(total_width, line.width);
        let Some((left, right)) = window.clip_span(left, left + width_css) else {
            continue;
        };

        let center_u = (left + right) * 0.5 / window.width;
        let center_css_y = (line.top + line.bottom) * 0.5 - min_top;
        let center_v = center_css_y * ratio / bounds.height();
        segments.push(HighlightSegment {
            center_x: frame.local_x(center_u),
            center_y: frame.local_y(center_v),
            width: ((right - left) * ratio).max(config.min_segment_width),
            height: (line.height() * ratio).max(config.min_segment_height),
        });
    }
    segments
}

/// Keeps highlight quads for the current selection.
///
/// Quads are reused by index across updates, surplus quads are disposed and
/// missing ones are created as non-pickable children of the text mesh. All
/// quads share one material.
#[derive(Debug, Default)]
pub struct HighlightFactory {
    owner: Option<(ElementId, MeshId)>,
    quads: Vec<MeshId>,
    material: Option<MaterialId>,
    segments: Vec<HighlightSegment>,
}

impl HighlightFactory {
    /// Creates an empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments rendered by the last [`Self::sync`].
    pub fn segments(&self) -> &[HighlightSegment] {
        &self.segments
    }

    /// Live highlight quads.
    pub fn quads(&self) -> &[MeshId] {
        &self.quads
    }

    /// Brings the quads in line with `state`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn sync<S: SceneBackend + ?Sized>(
        &mut self,
        scene: &mut S,
        registry: &InteractionRegistry,
        state: &TextSelectionState,
        config: &InteractionConfig,
    ) -> &[HighlightSegment] {
        let target = match (&state.element_id, state.range) {
            (Some(element_id), Some(range)) if state.has_selection => registry
                .get_by_element_id(element_id)
                .filter(|entry| scene.contains(entry.mesh))
                .map(|entry| (entry, range)),
            _ => None,
        };
        let Some((entry, range)) = target else {
            self.release_quads(scene);
            return &self.segments;
        };

        let owner = (entry.element_id.clone(), entry.mesh);
        if self.owner.as_ref() != Some(&owner) {
            self.release_quads(scene);
            self.owner = Some(owner);
        }

        let Some(bounds) = scene.bounding_box(entry.mesh) else {
            self.release_quads(scene);
            return &self.segments;
        };
        let rotation = scene.text_rotation(entry.mesh);
        self.segments = compute_segments(entry, range, bounds, rotation, config);

        // quads of a mesh the scene disposed are gone with it
        if self.quads.iter().any(|quad| !scene.contains(*quad)) {
            self.quads.clear();
        }

        let z = bounds.center().z - config.overlay_depth_offset;
        for (index, segment) in self.segments.iter().enumerate() {
            let center = Vec3::new(segment.center_x, segment.center_y, z);
            if let Some(quad) = self.quads.get(index) {
                scene.update_quad(*quad, center, segment.size());
                continue;
            }
            let material = *self
                .material
                .get_or_insert_with(|| scene.create_material(config.selection_color));
            let quad = scene.create_quad(QuadSpec {
                parent: entry.mesh,
                center,
                size: segment.size(),
                material,
                pickable: false,
            });
            self.quads.push(quad);
        }
        for surplus in self.quads.drain(self.segments.len()..) {
            scene.dispose(surplus);
        }
        trace!(
            "{} highlight segments on {}",
            self.segments.len(),
            entry.element_id
        );
        &self.segments
    }

    /// Disposes every quad and the shared material.
    pub fn teardown<S: SceneBackend + ?Sized>(&mut self, scene: &mut S) {
        self.release_quads(scene);
        if let Some(material) = self.material.take() {
            scene.dispose_material(material);
        }
    }

    fn release_quads<S: SceneBackend + ?Sized>(&mut self, scene: &mut S) {
        if !self.quads.is_empty() {
            debug!("disposing {} highlight quads", self.quads.len());
        }
        for quad in self.quads.drain(..) {
            scene.dispose(quad);
        }
        self.segments.clear();
        self.owner = None;
    }
}
