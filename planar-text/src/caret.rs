//! Blinking caret for the focused text element.
//!
//! The caret is a thin overlay quad parented to the focused element's text
//! mesh. It sits at the selection focus when the selection belongs to that
//! element, and at the end of the text otherwise. It blinks with
//! `caret_blink_interval` half-periods, restarting visible whenever it
//! moves, and hides while a non-empty range is selected or when it is
//! scrolled out of a clipped input's window.
use std::time::Instant;

use glam::Vec2;
use planar_ui::{ElementId, FocusState, MaterialId, MeshId, QuadSpec, SceneBackend};
use tracing::trace;

use crate::{
    config::InteractionConfig,
    frame::TextFrame,
    hit_test,
    registry::{InteractionRegistry, TextInteractionEntry},
    selection::TextSelectionState,
    viewport::VisibleWindow,
};

/// Where the caret was placed by the last sync.
#[derive(Debug, Clone, PartialEq)]
pub struct CaretPlacement {
    /// Element holding the caret.
    pub element_id: ElementId,
    /// Caret index.
    pub index: usize,
    /// Quad center in mesh-local units.
    pub center: Vec2,
    /// Quad size in mesh-local units.
    pub size: Vec2,
    /// Whether the caret is drawn this frame.
    pub visible: bool,
}

#[derive(Debug, Clone, Copy)]
struct CaretQuad {
    owner: MeshId,
    mesh: MeshId,
}

/// Maintains the single caret quad of a context.
#[derive(Debug, Default)]
pub struct CaretRenderer {
    quad: Option<CaretQuad>,
    material: Option<MaterialId>,
    position: Option<(ElementId, usize)>,
    blink_origin: Option<Instant>,
}

impl CaretRenderer {
    /// Creates a renderer without a caret.
    pub fn new() -> Self {
        Self::default()
    }

    /// The live caret quad.
    pub fn quad(&self) -> Option<MeshId> {
        self.quad.map(|quad| quad.mesh)
    }

    /// Places, shows or hides the caret for the focused element.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn sync<S: SceneBackend + ?Sized>(
        &mut self,
        scene: &mut S,
        registry: &InteractionRegistry,
        focus: &FocusState,
        state: &TextSelectionState,
        config: &InteractionConfig,
        now: Instant,
    ) -> Option<CaretPlacement> {
        let placement = focus
            .focused()
            .and_then(|element_id| registry.get_by_element_id(element_id))
            .filter(|entry| entry.editable && scene.contains(entry.mesh))
            .and_then(|entry| {
                self.place(&*scene, entry, state, config, now)
                    .map(|placement| (entry.mesh, placement))
            });
        let Some((owner, placement)) = placement else {
            self.release(scene);
            return None;
        };

        let center = placement.center.extend(self.depth(scene, owner, config));
        let quad = match self.quad {
            Some(quad) if quad.owner == owner && scene.contains(quad.mesh) => {
                scene.update_quad(quad.mesh, center, placement.size);
                quad.mesh
            }
            _ => {
                self.dispose_quad(scene);
                let material = *self
                    .material
                    .get_or_insert_with(|| scene.create_material(config.caret_color));
                let mesh = scene.create_quad(QuadSpec {
                    parent: owner,
                    center,
                    size: placement.size,
                    material,
                    pickable: false,
                });
                trace!("created caret quad for {}", placement.element_id);
                self.quad = Some(CaretQuad { owner, mesh });
                mesh
            }
        };
        scene.set_visible(quad, placement.visible);
        Some(placement)
    }

    fn place<S: SceneBackend + ?Sized>(
        &mut self,
        scene: &S,
        entry: &TextInteractionEntry,
        state: &TextSelectionState,
        config: &InteractionConfig,
        now: Instant,
    ) -> Option<CaretPlacement> {
        let metrics = entry.css_metrics()?;
        let window = VisibleWindow::for_entry(entry)?;
        let bounds = scene.bounding_box(entry.mesh)?;
        if window.width <= 0.0 || bounds.is_degenerate() {
            return None;
        }

        let owns_selection = state.element_id.as_ref() == Some(&entry.element_id);
        let index = owns_selection
            .then_some(state.focus_index)
            .flatten()
            .unwrap_or_else(|| entry.max_caret_index());
        let caret = hit_test::caret_position(metrics, entry.text_align(), index)?;

        let ratio = bounds.width() / window.width;
        let frame = TextFrame::new(bounds, scene.text_rotation(entry.mesh));
        let window_x = caret.x - window.offset;
        let center_css_y = (caret.top + caret.bottom) * 0.5 - metrics.min_line_top();
        let center = Vec2::new(
            frame.local_x(window_x / window.width),
            frame.local_y(center_css_y * ratio / bounds.height()),
        );
        let size = Vec2::new(
            config.caret_width_css * ratio,
            (caret.bottom - caret.top) * ratio,
        );

        let position = (entry.element_id.clone(), index);
        if self.position.as_ref() != Some(&position) {
            self.position = Some(position);
            self.blink_origin = Some(now);
        }
        let origin = self.blink_origin.unwrap_or(now);
        let half_period = config.caret_blink_interval.as_millis().max(1);
        let blink_on = (now.saturating_duration_since(origin).as_millis() / half_period) % 2 == 0;
        let in_view = (0.0..=window.width).contains(&window_x);

        Some(CaretPlacement {
            element_id: entry.element_id.clone(),
            index,
            center,
            size,
            visible: blink_on && in_view && !(owns_selection && state.has_selection),
        })
    }

    fn depth<S: SceneBackend + ?Sized>(
        &self,
        scene: &S,
        owner: MeshId,
        config: &InteractionConfig,
    ) -> f32 {
        scene
            .bounding_box(owner)
            .map_or(0.0, |bounds| bounds.center().z)
            - config.overlay_depth_offset
    }

    /// Disposes the caret quad and its material.
    pub fn teardown<S: SceneBackend + ?Sized>(&mut self, scene: &mut S) {
        self.release(scene);
        if let Some(material) = self.material.take() {
            scene.dispose_material(material);
        }
    }

    fn release<S: SceneBackend + ?Sized>(&mut self, scene: &mut S) {
        self.dispose_quad(scene);
        self.position = None;
        self.blink_origin = None;
    }

    fn dispose_quad<S: SceneBackend + ?Sized>(&mut self, scene: &mut S) {
        if let Some(quad) = self.quad.take() {
            scene.dispose(quad.mesh);
        }
    }
}
