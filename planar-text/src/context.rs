//! One scene's worth of text interaction.
//!
//! ## Usage
//!
//! Create one [`InteractionContext`] per rendered scene. The rendering layer
//! registers text elements through it, the host forwards pointer and key
//! events to it, and once per frame [`InteractionContext::render_pass`]
//! updates highlight and caret quads.
use std::{borrow::Borrow, hash::Hash, sync::Arc, time::Instant};

use planar_platform::SharedClipboard;
use planar_ui::{ElementId, FocusState, KeyPress, MeshId, PointerEvent, SceneBackend, Shared};
use tracing::{debug, trace};

use crate::{
    caret::{CaretPlacement, CaretRenderer},
    config::{ConfigError, InteractionConfig},
    controller::SelectionController,
    highlight::{HighlightFactory, HighlightSegment},
    hit_test,
    metrics::StoredTextLayoutMetrics,
    registry::{InteractionRegistry, TextInteractionEntry},
    router::{HoverCursor, PointerDownOutcome, PointerRouter},
    shortcuts::{KeyHandling, ShortcutService},
    store::SelectionStore,
    style::TextStyle,
    viewport::VisibleWindow,
};

/// What a render pass produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderOutput {
    /// Highlight rectangles now shown.
    pub highlights: Vec<HighlightSegment>,
    /// Caret placement, when an editable element has focus.
    pub caret: Option<CaretPlacement>,
}

/// Registry, selection, input routing and overlays for one scene.
pub struct InteractionContext {
    config: InteractionConfig,
    registry: Shared<InteractionRegistry>,
    controller: Shared<SelectionController>,
    store: SelectionStore,
    router: PointerRouter,
    highlights: HighlightFactory,
    caret: CaretRenderer,
    shortcuts: ShortcutService,
    focus: FocusState,
}

impl InteractionContext {
    /// Creates a context with the default configuration.
    pub fn new(clipboard: SharedClipboard) -> Self {
        Self::build(InteractionConfig::default(), clipboard)
    }

    /// Creates a context after validating `config`.
    pub fn with_config(
        config: InteractionConfig,
        clipboard: SharedClipboard,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, clipboard))
    }

    fn build(config: InteractionConfig, clipboard: SharedClipboard) -> Self {
        let registry = Shared::new(InteractionRegistry::new());
        let controller = Shared::new(SelectionController::new());
        let store = SelectionStore::attach(&registry, &controller);
        Self {
            config,
            registry,
            controller,
            store,
            router: PointerRouter::new(),
            highlights: HighlightFactory::new(),
            caret: CaretRenderer::new(),
            shortcuts: ShortcutService::new(clipboard),
            focus: FocusState::default(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Shared registry handle.
    pub fn registry(&self) -> &Shared<InteractionRegistry> {
        &self.registry
    }

    /// Shared controller handle.
    pub fn controller(&self) -> &Shared<SelectionController> {
        &self.controller
    }

    /// The selection store.
    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// Keyboard focus.
    pub fn focus(&self) -> &FocusState {
        &self.focus
    }

    /// Cursor for what the pointer last moved over.
    pub fn hover_cursor(&self) -> HoverCursor {
        self.router.hover_cursor()
    }

    /// Registers or replaces a text element.
    pub fn register(&self, entry: TextInteractionEntry) -> TextInteractionEntry {
        self.registry.with_mut(|registry| registry.register(entry))
    }

    /// Replaces an element's metrics.
    pub fn update_metrics<Q>(&self, element_id: &Q, metrics: Arc<StoredTextLayoutMetrics>) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry
            .with_mut(|registry| registry.update_metrics(element_id, metrics))
    }

    /// Replaces an element's style.
    pub fn update_style<Q>(&self, element_id: &Q, style: TextStyle) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry
            .with_mut(|registry| registry.update_style(element_id, style))
    }

    /// Replaces an element's text.
    pub fn update_text<Q>(&self, element_id: &Q, text: impl Into<String>) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry
            .with_mut(|registry| registry.update_text(element_id, text))
    }

    /// Replaces an element's scroll offset.
    pub fn update_scroll_offset<Q>(&self, element_id: &Q, offset: f32) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.registry
            .with_mut(|registry| registry.update_scroll_offset(element_id, offset))
    }

    /// Unregisters the element rendered on `mesh`.
    pub fn unregister(&mut self, mesh: MeshId) -> Option<TextInteractionEntry> {
        let entry = self.registry.with_mut(|registry| registry.unregister(mesh))?;
        self.focus.unfocus(&entry.element_id);
        Some(entry)
    }

    /// Unregisters an element by id.
    pub fn unregister_by_element_id<Q>(&mut self, element_id: &Q) -> Option<TextInteractionEntry>
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self
            .registry
            .with_mut(|registry| registry.unregister_by_element_id(element_id))?;
        self.focus.unfocus(&entry.element_id);
        Some(entry)
    }

    /// Unregisters everything.
    pub fn clear(&mut self) {
        self.registry.with_mut(|registry| registry.clear());
        self.focus.blur();
    }

    /// Selects all text of an element.
    pub fn select_all<Q>(&self, element_id: &Q) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(entry) = self
            .registry
            .with(|registry| registry.get_by_element_id(element_id).cloned())
        else {
            return false;
        };
        self.controller
            .with_mut(|controller| controller.select_all(&entry))
    }

    /// Forwards a pointer press and moves focus to the pressed input.
    pub fn pointer_down<S: SceneBackend + ?Sized>(
        &mut self,
        scene: &S,
        event: &PointerEvent,
    ) -> PointerDownOutcome {
        let outcome = self.registry.with(|registry| {
            self.controller.with_mut(|controller| {
                self.router
                    .handle_pointer_down(event, scene, registry, controller, &self.config)
            })
        });

        match &outcome {
            PointerDownOutcome::Pressed { entry, .. } if entry.editable => {
                if self.focus.request_focus(entry.element_id.clone()) {
                    debug!("focus moved to {}", entry.element_id);
                }
            }
            PointerDownOutcome::Pressed { .. } | PointerDownOutcome::Cleared => self.focus.blur(),
            PointerDownOutcome::Ignored => {}
        }
        outcome
    }

    /// Forwards a pointer move.
    pub fn pointer_move<S: SceneBackend + ?Sized>(
        &mut self,
        scene: &S,
        event: &PointerEvent,
    ) -> HoverCursor {
        self.registry.with(|registry| {
            self.controller.with_mut(|controller| {
                self.router
                    .handle_pointer_move(event, scene, registry, controller)
            })
        })
    }

    /// Forwards a pointer release.
    pub fn pointer_up<S: SceneBackend + ?Sized>(&mut self, scene: &S, event: &PointerEvent) -> bool {
        self.registry.with(|registry| {
            self.controller.with_mut(|controller| {
                self.router
                    .handle_pointer_up(event, scene, registry, controller)
            })
        })
    }

    /// Forwards the pointer leaving the canvas.
    pub fn pointer_out(&mut self) -> bool {
        self.controller
            .with_mut(|controller| self.router.handle_pointer_out(controller))
    }

    /// Forwards a key-down. Keyboard moves inside a clipped input scroll it
    /// to keep the caret visible.
    pub fn key_down(&mut self, press: &KeyPress) -> KeyHandling {
        let handling = self
            .shortcuts
            .handle_key_down(press, &self.store, &self.controller);
        if handling.is_handled() {
            self.reveal_caret();
        }
        handling
    }

    /// Copies the selected text.
    pub fn copy_selected_text(&self) -> bool {
        self.shortcuts.copy_selected_text(&self.store)
    }

    fn reveal_caret(&self) {
        let (Some(entry), Some(focus_index)) = (self.store.active_entry(), self.store.focus_index())
        else {
            return;
        };
        let Some(window) = VisibleWindow::for_entry(&entry).filter(VisibleWindow::is_clipped) else {
            return;
        };
        let Some(caret) = entry
            .css_metrics()
            .and_then(|metrics| hit_test::caret_position(metrics, entry.text_align(), focus_index))
        else {
            return;
        };

        let offset = window.reveal(caret.x);
        if (offset - window.offset).abs() > f32::EPSILON {
            trace!("scrolling {} to {offset}", entry.element_id);
            self.update_scroll_offset(&entry.element_id, offset);
        }
    }

    /// Syncs highlight and caret quads with the current state.
    pub fn render_pass<S: SceneBackend + ?Sized>(&mut self, scene: &mut S, now: Instant) -> RenderOutput {
        let state = self.store.state();
        self.registry.with(|registry| {
            let highlights = self
                .highlights
                .sync(scene, registry, &state, &self.config)
                .to_vec();
            let caret = self
                .caret
                .sync(scene, registry, &self.focus, &state, &self.config, now);
            RenderOutput { highlights, caret }
        })
    }

    /// Disposes every overlay quad and material and clears the selection.
    pub fn teardown<S: SceneBackend + ?Sized>(&mut self, scene: &mut S) {
        self.highlights.teardown(scene);
        self.caret.teardown(scene);
        self.controller
            .with_mut(|controller| controller.clear_selection());
    }
}
