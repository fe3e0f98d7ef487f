//! A scripted walkthrough of text selection on a headless scene.
//!
//! Run with `RUST_LOG=planar_text=trace` to follow every state change.
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use glam::{Mat4, Vec2, Vec3};
use parking_lot::Mutex;
use planar_platform::Clipboard;
use planar_text::{
    ConfigError, InteractionConfig, InteractionContext, LayoutMetricsProvider, MonospaceLayout,
    TextAlign, TextFrame, TextInteractionEntry, TextStyle, VisibleWindow,
};
use planar_ui::{
    HeadlessScene, KeyPress, MeshId, PickInfo, PointerEvent, SceneBackend,
    keyboard::{ModifiersState, NamedKey},
};
use thiserror::Error;
use tracing::info;

const WORLD_PER_CSS: f32 = 0.01;

/// Why the walkthrough stopped.
#[derive(Debug, Error)]
pub enum WalkthroughError {
    /// The interaction configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A scripted pointer position could not be placed on its mesh.
    #[error("could not place a pointer on `{0}`")]
    Unplaceable(&'static str),
}

/// Installs a tracing subscriber, honoring `RUST_LOG` when set.
pub fn init_tracing() {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => match tracing_subscriber::EnvFilter::try_new("error,planar_text=info,example=info") {
            Ok(filter) => filter,
            Err(_) => tracing_subscriber::EnvFilter::new("error"),
        },
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

struct Stage {
    scene: HeadlessScene,
    context: InteractionContext,
    layout: MonospaceLayout,
    start: Instant,
}

impl Stage {
    fn add_text(
        &mut self,
        id: &'static str,
        text: &str,
        style: TextStyle,
        max_width: Option<f32>,
        editable: bool,
        translation: Vec3,
    ) -> MeshId {
        let metrics = self.layout.measure(text, &style, WORLD_PER_CSS, max_width);
        let window = VisibleWindow::new(metrics.css.effective_width(), style.clip_width, 0.0);
        let mesh = self.scene.add_text_plane(
            id,
            window.width * WORLD_PER_CSS,
            metrics.world.total_height,
            Mat4::from_translation(translation),
        );
        self.context.register(
            TextInteractionEntry::new(id, mesh)
                .with_style(style)
                .with_text(text)
                .with_metrics(Arc::new(metrics))
                .editable(editable),
        );
        mesh
    }

    /// Builds the event a picker would report for a CSS point on `id`.
    fn pointer(&self, id: &'static str, css: Vec2, after: Duration) -> Result<PointerEvent, WalkthroughError> {
        let entry = self
            .context
            .registry()
            .with(|registry| registry.get_by_element_id(id).cloned())
            .ok_or(WalkthroughError::Unplaceable(id))?;
        let world = self
            .world_point(&entry, css)
            .ok_or(WalkthroughError::Unplaceable(id))?;
        Ok(PointerEvent::new(css, self.start + after).with_pick(PickInfo::at(entry.mesh, world)))
    }

    fn world_point(&self, entry: &TextInteractionEntry, css: Vec2) -> Option<Vec3> {
        let metrics = entry.css_metrics()?;
        let window = VisibleWindow::for_entry(entry)?;
        let bounds = self.scene.bounding_box(entry.mesh)?;
        let frame = TextFrame::new(bounds, self.scene.text_rotation(entry.mesh));
        let uv = Vec2::new(
            (css.x - window.offset) / window.width,
            (css.y - metrics.min_line_top()) / metrics.total_height,
        );
        self.scene
            .local_to_world(entry.mesh, frame.local_point(uv).extend(0.0))
    }

    fn drag(&mut self, id: &'static str, from: Vec2, to: Vec2, at: Duration) -> Result<(), WalkthroughError> {
        let down = self.pointer(id, from, at)?;
        let moved = self.pointer(id, to, at + Duration::from_millis(16))?;
        self.context.pointer_down(&self.scene, &down);
        self.context.pointer_move(&self.scene, &moved);
        self.context.pointer_up(&self.scene, &moved);
        Ok(())
    }

    fn click(&mut self, id: &'static str, css: Vec2, at: Duration) -> Result<(), WalkthroughError> {
        let event = self.pointer(id, css, at)?;
        self.context.pointer_down(&self.scene, &event);
        self.context.pointer_up(&self.scene, &event);
        Ok(())
    }

    fn report(&mut self, step: &str, at: Duration) {
        let output = self.context.render_pass(&mut self.scene, self.start + at);
        let store = self.context.store();
        info!(
            "{step}: element={:?} range={:?} text={:?} highlights={} caret={:?}",
            store.element_id().map(|id| id.to_string()),
            store.range(),
            store.selected_text(),
            output.highlights.len(),
            output.caret.map(|caret| (caret.index, caret.visible)),
        );
    }
}

/// Runs the walkthrough: drag across a wrapped paragraph, double-click a
/// word, copy it, then move the caret through a clipped input.
pub fn run() -> Result<(), WalkthroughError> {
    let config = InteractionConfig::default();
    let clipboard = Arc::new(Mutex::new(Clipboard::new()));
    let mut stage = Stage {
        scene: HeadlessScene::new(),
        context: InteractionContext::with_config(config, clipboard)?,
        layout: MonospaceLayout::fixed(10.0, 20.0),
        start: Instant::now(),
    };

    stage.add_text(
        "paragraph",
        "The quick brown fox jumps over the lazy dog",
        TextStyle::default().with_align(TextAlign::Center),
        Some(160.0),
        false,
        Vec3::new(0.0, 1.0, -2.0),
    );
    stage.add_text(
        "search",
        "selection on flat meshes",
        TextStyle::default().with_clip_width(80.0),
        None,
        true,
        Vec3::new(0.0, -1.0, -2.0),
    );

    let mut at = Duration::ZERO;
    stage.drag("paragraph", Vec2::new(40.0, 10.0), Vec2::new(90.0, 30.0), at)?;
    stage.report("drag across lines", at);

    at += Duration::from_secs(2);
    stage.click("paragraph", Vec2::new(72.0, 10.0), at)?;
    stage.click("paragraph", Vec2::new(72.0, 10.0), at + Duration::from_millis(120))?;
    stage.report("double click", at);

    let copy = KeyPress::character("c").with_modifiers(ModifiersState::CONTROL);
    if stage.context.key_down(&copy).is_handled() {
        info!("copied {:?}", stage.context.store().selected_text());
    }

    at += Duration::from_secs(2);
    stage.click("search", Vec2::new(12.0, 10.0), at)?;
    for _ in 0..10 {
        stage.context.key_down(&KeyPress::named(NamedKey::ArrowRight));
    }
    let scroll = stage.context.registry().with(|registry| {
        registry
            .get_by_element_id("search")
            .and_then(|entry| entry.scroll_offset)
    });
    info!("search input scrolled to {scroll:?}");
    stage.report("caret in input", at);

    let extend = KeyPress::named(NamedKey::ArrowLeft).with_modifiers(ModifiersState::SHIFT);
    for _ in 0..4 {
        stage.context.key_down(&extend);
    }
    stage.report("shift+left in input", at);

    stage.context.key_down(&KeyPress::named(NamedKey::Escape));
    stage.report("escape", at);

    stage.context.teardown(&mut stage.scene);
    info!("meshes left after teardown: {}", stage.scene.mesh_count());
    Ok(())
}
