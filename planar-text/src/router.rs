//! Routes scene pointer events into the selection controller.
//!
//! Pointer positions arrive as scene picks: meshes under the pointer, front
//! to back, each with an optional world-space hit point. The router resolves
//! the first pick that is an interactive text mesh (directly, or through an
//! input container rendering one), converts the hit into a CSS point on that
//! text and drives the controller. Drags keep tracking through a ray/plane
//! intersection when picking misses the text.
use std::time::Instant;

use glam::{Vec2, Vec3};
use planar_ui::{ElementId, PointerButton, PointerEvent, Ray, SceneBackend};
use tracing::{debug, trace};

use crate::{
    config::InteractionConfig,
    controller::SelectionController,
    frame::TextFrame,
    registry::{InteractionRegistry, TextInteractionEntry},
    viewport::VisibleWindow,
};

/// Cursor to show for what is under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverCursor {
    /// Nothing interactive.
    #[default]
    Default,
    /// A clickable control.
    Pointer,
    /// Selectable text.
    Text,
}

impl HoverCursor {
    /// CSS `cursor` keyword.
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Text => "text",
        }
    }
}

/// Types of mouse clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickType {
    /// A single click; starts a drag selection.
    Single,
    /// A second click in quick succession; selects a word.
    Double,
    /// A third click in quick succession; selects a line.
    Triple,
}

/// What a primary press did.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerDownOutcome {
    /// Not a primary press.
    Ignored,
    /// The press missed all text; the selection was cleared.
    Cleared,
    /// The press landed on text.
    Pressed {
        /// Entry that was pressed.
        entry: TextInteractionEntry,
        /// Click multiplicity.
        click: ClickType,
    },
}

#[derive(Debug, Default)]
struct ClickTracker {
    last_time: Option<Instant>,
    last_position: Option<Vec2>,
    last_element: Option<ElementId>,
    count: u32,
}

impl ClickTracker {
    fn register(
        &mut self,
        element_id: &ElementId,
        position: Vec2,
        timestamp: Instant,
        config: &InteractionConfig,
    ) -> ClickType {
        let chained = match (self.last_time, self.last_position) {
            (Some(last_time), Some(last_position)) => {
                let elapsed = timestamp.saturating_duration_since(last_time);
                let distance = (position - last_position).abs().element_sum();
                elapsed <= config.multi_click_interval
                    && distance <= config.multi_click_distance
                    && self.last_element.as_ref() == Some(element_id)
            }
            _ => false,
        };

        let click = if chained {
            self.count += 1;
            match self.count {
                2 => ClickType::Double,
                3 => {
                    self.count = 0;
                    ClickType::Triple
                }
                _ => ClickType::Single,
            }
        } else {
            self.count = 1;
            ClickType::Single
        };

        self.last_time = Some(timestamp);
        self.last_position = Some(position);
        self.last_element = Some(element_id.clone());
        click
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

struct TextHit {
    entry: TextInteractionEntry,
    point: Option<Vec3>,
}

/// Stateful pointer dispatcher.
#[derive(Debug, Default)]
pub struct PointerRouter {
    hover: HoverCursor,
    clicks: ClickTracker,
}

impl PointerRouter {
    /// Creates a router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor decided by the last move.
    pub fn hover_cursor(&self) -> HoverCursor {
        self.hover
    }

    /// Handles a press: begins a selection (or selects a word or line on
    /// multi-clicks) on the text under the pointer, or clears the selection
    /// when the press missed all text.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn handle_pointer_down<S: SceneBackend + ?Sized>(
        &mut self,
        event: &PointerEvent,
        scene: &S,
        registry: &InteractionRegistry,
        controller: &mut SelectionController,
        config: &InteractionConfig,
    ) -> PointerDownOutcome {
        if event.button != PointerButton::Primary {
            return PointerDownOutcome::Ignored;
        }

        let Some(TextHit { entry, point }) = resolve_text_hit(event, scene, registry) else {
            self.clicks.reset();
            if !controller.state().is_idle() {
                debug!("press outside text, clearing selection");
            }
            controller.clear_selection();
            return PointerDownOutcome::Cleared;
        };

        let click = self.clicks.register(
            &entry.element_id,
            event.client_position,
            event.timestamp,
            config,
        );
        let Some(css) = pointer_to_css(scene, &entry, point, event.pick_ray) else {
            trace!("press on {} could not be mapped to text", entry.element_id);
            return PointerDownOutcome::Pressed { entry, click };
        };

        match click {
            ClickType::Single => {
                controller.begin_selection(&entry, css);
            }
            ClickType::Double => {
                let caret = controller.caret_index_for_point(&entry, css);
                controller.select_word_at(&entry, caret);
            }
            ClickType::Triple => {
                let caret = controller.caret_index_for_point(&entry, css);
                controller.select_line_at(&entry, caret);
            }
        }
        PointerDownOutcome::Pressed { entry, click }
    }

    /// Handles a move: updates the hover cursor and extends a drag in
    /// progress. Returns the cursor to show.
    pub fn handle_pointer_move<S: SceneBackend + ?Sized>(
        &mut self,
        event: &PointerEvent,
        scene: &S,
        registry: &InteractionRegistry,
        controller: &mut SelectionController,
    ) -> HoverCursor {
        self.hover = classify(event, scene, registry);
        if controller.is_dragging() {
            drag_to(event, scene, registry, controller);
        }
        self.hover
    }

    /// Handles a release: applies the final position and settles the drag.
    pub fn handle_pointer_up<S: SceneBackend + ?Sized>(
        &mut self,
        event: &PointerEvent,
        scene: &S,
        registry: &InteractionRegistry,
        controller: &mut SelectionController,
    ) -> bool {
        if event.button != PointerButton::Primary || !controller.is_dragging() {
            return false;
        }
        drag_to(event, scene, registry, controller);
        controller.finalize_selection()
    }

    /// Handles the pointer leaving the canvas: abandons a drag.
    pub fn handle_pointer_out(&mut self, controller: &mut SelectionController) -> bool {
        self.hover = HoverCursor::Default;
        controller.cancel_selection()
    }
}

fn drag_to<S: SceneBackend + ?Sized>(
    event: &PointerEvent,
    scene: &S,
    registry: &InteractionRegistry,
    controller: &mut SelectionController,
) -> bool {
    let (entry, point) = match resolve_text_hit(event, scene, registry) {
        Some(TextHit { entry, point }) => (entry, point),
        None => {
            let Some(entry) = controller
                .gesture_element()
                .and_then(|element_id| registry.get_by_element_id(element_id))
                .cloned()
            else {
                return false;
            };
            (entry, None)
        }
    };
    match pointer_to_css(scene, &entry, point, event.pick_ray) {
        Some(css) => controller.update_selection(&entry, css),
        None => false,
    }
}

fn resolve_text_hit<S: SceneBackend + ?Sized>(
    event: &PointerEvent,
    scene: &S,
    registry: &InteractionRegistry,
) -> Option<TextHit> {
    event.picks.iter().find_map(|pick| {
        let entry = registry.get_by_mesh(pick.mesh).or_else(|| {
            scene
                .linked_text_mesh(pick.mesh)
                .and_then(|text| registry.get_by_mesh(text))
        })?;
        Some(TextHit {
            entry: entry.clone(),
            point: pick.point,
        })
    })
}

fn classify<S: SceneBackend + ?Sized>(
    event: &PointerEvent,
    scene: &S,
    registry: &InteractionRegistry,
) -> HoverCursor {
    let Some(pick) = event.picks.first() else {
        return HoverCursor::Default;
    };
    let is_text = registry.is_interactive(pick.mesh)
        || scene
            .linked_text_mesh(pick.mesh)
            .is_some_and(|text| registry.is_interactive(text));
    if is_text {
        HoverCursor::Text
    } else if scene.is_clickable(pick.mesh) {
        HoverCursor::Pointer
    } else {
        HoverCursor::Default
    }
}

/// Converts a world-space hit on `entry`'s mesh into a CSS point in its text
/// content.
///
/// Without a hit point, `pick_ray` is intersected with the mesh plane
/// instead. `None` when the mesh is gone, has a degenerate box or a
/// singular transform, or the entry has no metrics.
pub fn pointer_to_css<S: SceneBackend + ?Sized>(
    scene: &S,
    entry: &TextInteractionEntry,
    pick_point: Option<Vec3>,
    pick_ray: Option<Ray>,
) -> Option<Vec2> {
    let world = scene.world_matrix(entry.mesh)?;
    let determinant = world.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        return None;
    }
    let inverse = world.inverse();
    let bounds = scene.bounding_box(entry.mesh)?;

    let local = match pick_point {
        Some(point) => inverse.transform_point3(point),
        None => pick_ray?
            .transformed(&inverse)
            .intersect_plane_z(bounds.center().z)?,
    };
    let uv = TextFrame::new(bounds, scene.text_rotation(entry.mesh)).normalize(local.truncate())?;

    let metrics = entry.css_metrics()?;
    let window = VisibleWindow::for_entry(entry)?;
    Some(Vec2::new(
        window.to_content_x(uv.x * window.width),
        uv.y * metrics.total_height + metrics.min_line_top(),
    ))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use glam::Mat4;
    use planar_ui::{Aabb, HeadlessScene, MeshId, PickInfo};

    use super::*;
    use crate::{
        highlight::compute_segments,
        metrics::{LayoutMetricsProvider, StoredTextLayoutMetrics},
        monospace::MonospaceLayout,
        selection::SelectionRange,
        style::TextStyle,
    };

    const SCALE: f32 = 0.01;

    struct Fixture {
        scene: HeadlessScene,
        registry: InteractionRegistry,
        controller: SelectionController,
        router: PointerRouter,
        config: InteractionConfig,
        mesh: MeshId,
        start: Instant,
    }

    fn fixture(text: &str, style: TextStyle) -> Fixture {
        let metrics = MonospaceLayout::fixed(10.0, 20.0).measure(text, &style, SCALE, None);
        let mut scene = HeadlessScene::new();
        let mesh = scene.add_text_plane(
            "text",
            metrics.world.total_width,
            metrics.world.total_height,
            Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0)),
        );
        let mut registry = InteractionRegistry::new();
        registry.register(
            TextInteractionEntry::new("element-1", mesh)
                .with_style(style)
                .with_text(text)
                .with_metrics(Arc::new(metrics)),
        );
        Fixture {
            scene,
            registry,
            controller: SelectionController::new(),
            router: PointerRouter::new(),
            config: InteractionConfig::default(),
            mesh,
            start: Instant::now(),
        }
    }

    impl Fixture {
        fn world_point(&self, css: Vec2) -> Vec3 {
            let entry = self
                .registry
                .get_by_mesh(self.mesh)
                .expect("entry is registered");
            let metrics = entry.css_metrics().expect("entry has metrics");
            let window = VisibleWindow::for_entry(entry).expect("entry has metrics");
            let bounds = self.scene.bounding_box(self.mesh).expect("mesh exists");
            let frame = TextFrame::new(bounds, self.scene.text_rotation(self.mesh));
            let uv = Vec2::new(
                (css.x - window.offset) / window.width,
                (css.y - metrics.min_line_top()) / metrics.total_height,
            );
            self.scene
                .local_to_world(self.mesh, frame.local_point(uv).extend(0.0))
                .expect("mesh exists")
        }

        fn event_at(&self, css: Vec2, after_ms: u64) -> PointerEvent {
            PointerEvent::new(css, self.start + Duration::from_millis(after_ms))
                .with_pick(PickInfo::at(self.mesh, self.world_point(css)))
        }

        fn down(&mut self, event: &PointerEvent) -> PointerDownOutcome {
            self.router.handle_pointer_down(
                event,
                &self.scene,
                &self.registry,
                &mut self.controller,
                &self.config,
            )
        }

        fn drag(&mut self, event: &PointerEvent) -> HoverCursor {
            self.router
                .handle_pointer_move(event, &self.scene, &self.registry, &mut self.controller)
        }

        fn up(&mut self, event: &PointerEvent) -> bool {
            self.router
                .handle_pointer_up(event, &self.scene, &self.registry, &mut self.controller)
        }
    }

    #[test]
    fn pick_points_map_back_to_css() {
        let fixture = fixture("hello", TextStyle::default());
        let entry = fixture
            .registry
            .get_by_mesh(fixture.mesh)
            .expect("entry is registered");
        let css = Vec2::new(17.0, 5.0);
        let mapped = pointer_to_css(&fixture.scene, entry, Some(fixture.world_point(css)), None)
            .expect("point maps");
        assert!((mapped - css).length() < 1e-3);
    }

    #[test]
    fn ray_fallback_matches_the_pick_point() {
        let fixture = fixture("hello", TextStyle::default());
        let entry = fixture
            .registry
            .get_by_mesh(fixture.mesh)
            .expect("entry is registered");
        let target = fixture.world_point(Vec2::new(32.0, 12.0));
        let ray = Ray::new(target - Vec3::Z * 5.0, Vec3::Z);
        let mapped = pointer_to_css(&fixture.scene, entry, None, Some(ray)).expect("ray hits");
        assert!((mapped - Vec2::new(32.0, 12.0)).length() < 1e-3);
    }

    #[test]
    fn pointer_and_highlights_share_the_first_line_top() {
        let style = TextStyle::default();
        let mut css = MonospaceLayout::fixed(10.0, 20.0)
            .measure("ab\ncd", &style, SCALE, None)
            .css;
        for line in &mut css.lines {
            line.top += 8.0;
            line.bottom += 8.0;
            line.baseline += 8.0;
        }
        let metrics = StoredTextLayoutMetrics::new(css, SCALE);
        let mut scene = HeadlessScene::new();
        let mesh = scene.add_text_plane(
            "shifted",
            metrics.world.total_width,
            metrics.world.total_height,
            Mat4::IDENTITY,
        );
        let entry = TextInteractionEntry::new("shifted", mesh)
            .with_style(style)
            .with_text("ab\ncd")
            .with_metrics(Arc::new(metrics));

        let bounds = scene.bounding_box(mesh).expect("mesh exists");
        let rotation = scene.text_rotation(mesh);
        let top = TextFrame::new(bounds, rotation).local_point(Vec2::new(0.5, 0.0));
        let css_top = pointer_to_css(&scene, &entry, Some(top.extend(0.0)), None)
            .expect("point maps");
        assert!((css_top.y - 8.0).abs() < 1e-3);

        let segments = compute_segments(
            &entry,
            SelectionRange::new(3, 5),
            bounds,
            rotation,
            &InteractionConfig::default(),
        );
        let center = segments[0].center().extend(0.0);
        let css_center = pointer_to_css(&scene, &entry, Some(center), None).expect("point maps");
        // second line spans 28..48
        assert!((css_center.y - 38.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_meshes_do_not_map() {
        let mut fixture = fixture("hello", TextStyle::default());
        fixture.scene.set_bounds(fixture.mesh, Aabb::centered(0.0, 0.0));
        let entry = fixture
            .registry
            .get_by_mesh(fixture.mesh)
            .expect("entry is registered");
        assert_eq!(
            pointer_to_css(&fixture.scene, entry, Some(Vec3::ZERO), None),
            None
        );
    }

    #[test]
    fn drag_selects_and_release_settles() {
        let mut fixture = fixture("hello", TextStyle::default());
        let down = fixture.event_at(Vec2::new(15.0, 5.0), 0);
        assert!(matches!(
            fixture.down(&down),
            PointerDownOutcome::Pressed {
                click: ClickType::Single,
                ..
            }
        ));
        assert_eq!(fixture.controller.state().anchor_index, Some(1));

        let moved = fixture.event_at(Vec2::new(47.0, 5.0), 16);
        assert_eq!(fixture.drag(&moved), HoverCursor::Text);
        assert_eq!(
            fixture.controller.state().range,
            Some(SelectionRange::new(1, 5))
        );

        assert!(fixture.up(&moved));
        assert!(fixture.controller.state().has_selection);
        assert!(!fixture.controller.state().is_pointer_down);
    }

    #[test]
    fn drag_off_the_text_keeps_tracking_through_the_ray() {
        let mut fixture = fixture("hello", TextStyle::default());
        let down = fixture.event_at(Vec2::new(0.0, 5.0), 0);
        fixture.down(&down);

        let target = fixture.world_point(Vec2::new(30.0, 5.0));
        let missed = PointerEvent::new(Vec2::new(30.0, 5.0), fixture.start)
            .with_ray(Ray::new(target - Vec3::Z * 3.0, Vec3::Z));
        assert_eq!(fixture.drag(&missed), HoverCursor::Default);
        assert_eq!(
            fixture.controller.state().range,
            Some(SelectionRange::new(0, 3))
        );
    }

    #[test]
    fn press_outside_text_clears_the_selection() {
        let mut fixture = fixture("hello", TextStyle::default());
        let down = fixture.event_at(Vec2::new(15.0, 5.0), 0);
        fixture.down(&down);
        fixture.up(&down);

        let miss = PointerEvent::new(Vec2::new(500.0, 500.0), fixture.start);
        assert_eq!(fixture.down(&miss), PointerDownOutcome::Cleared);
        assert!(fixture.controller.state().is_idle());
    }

    #[test]
    fn secondary_presses_are_ignored() {
        let mut fixture = fixture("hello", TextStyle::default());
        let down = fixture
            .event_at(Vec2::new(15.0, 5.0), 0)
            .with_button(PointerButton::Secondary);
        assert_eq!(fixture.down(&down), PointerDownOutcome::Ignored);
        assert!(fixture.controller.state().is_idle());
    }

    #[test]
    fn pointer_out_cancels_the_drag() {
        let mut fixture = fixture("hello", TextStyle::default());
        let down = fixture.event_at(Vec2::new(15.0, 5.0), 0);
        fixture.down(&down);
        assert!(fixture.router.handle_pointer_out(&mut fixture.controller));
        assert!(!fixture.controller.is_dragging());
        assert!(!fixture.controller.state().is_pointer_down);
    }

    #[test]
    fn double_and_triple_clicks_select_word_and_line() {
        let mut fixture = fixture("hello brave\nworld", TextStyle::default());
        let press = |fixture: &mut Fixture, after_ms| {
            let event = fixture.event_at(Vec2::new(72.0, 5.0), after_ms);
            let outcome = fixture.down(&event);
            fixture.up(&event);
            outcome
        };

        press(&mut fixture, 0);
        assert!(matches!(
            press(&mut fixture, 200),
            PointerDownOutcome::Pressed {
                click: ClickType::Double,
                ..
            }
        ));
        assert_eq!(
            fixture.controller.state().range,
            Some(SelectionRange::new(6, 11))
        );
        assert!(!fixture.controller.is_dragging());

        press(&mut fixture, 400);
        assert_eq!(
            fixture.controller.state().range,
            Some(SelectionRange::new(0, 11))
        );

        // too late to chain
        press(&mut fixture, 2000);
        assert!(!fixture.controller.state().has_selection);
    }

    #[test]
    fn clipped_inputs_offset_by_their_scroll() {
        let style = TextStyle::default().with_clip_width(30.0);
        let text = "abcdefghij";
        let metrics = MonospaceLayout::fixed(10.0, 20.0).measure(text, &style, SCALE, None);
        let mut scene = HeadlessScene::new();
        // the mesh shows only the 30px window
        let mesh = scene.add_text_plane("field", 30.0 * SCALE, 20.0 * SCALE, Mat4::IDENTITY);
        let entry = TextInteractionEntry::new("field", mesh)
            .with_style(style)
            .with_text(text)
            .with_metrics(Arc::new(metrics))
            .with_scroll_offset(40.0);

        let bounds = scene.bounding_box(mesh).expect("mesh exists");
        let frame = TextFrame::new(bounds, scene.text_rotation(mesh));
        let local = frame.local_point(Vec2::new(0.5, 0.5)).extend(0.0);
        let css = pointer_to_css(&scene, &entry, Some(local), None).expect("point maps");
        assert!((css - Vec2::new(55.0, 10.0)).length() < 1e-3);
    }

    #[test]
    fn hover_reports_text_controls_and_background() {
        let mut fixture = fixture("hello", TextStyle::default());
        let button = fixture
            .scene
            .add_surface("button", Aabb::centered(1.0, 1.0), Mat4::IDENTITY);
        fixture.scene.set_clickable(button, true);
        let container = fixture
            .scene
            .add_surface("input", Aabb::centered(1.0, 1.0), Mat4::IDENTITY);
        fixture.scene.link_text_mesh(container, fixture.mesh);

        let over = |fixture: &mut Fixture, mesh| {
            let event =
                PointerEvent::new(Vec2::ZERO, fixture.start).with_pick(PickInfo::mesh_only(mesh));
            fixture.drag(&event)
        };
        assert_eq!(over(&mut fixture, button), HoverCursor::Pointer);
        assert_eq!(over(&mut fixture, container), HoverCursor::Text);
        let text = fixture.mesh;
        assert_eq!(over(&mut fixture, text), HoverCursor::Text);
        assert_eq!(HoverCursor::Text.css_name(), "text");
    }
}
