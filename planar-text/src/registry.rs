//! Registry of interactive text elements.
//!
//! The rendering layer registers every text mesh that supports selection
//! together with its style, layout metrics, raw text and horizontal scroll
//! offset. Entries are keyed by element id, and a side index resolves scene
//! meshes back to their entries. Every mutation emits a [`RegistryEvent`]
//! carrying a snapshot of the affected entry, so subscribers never need to
//! read the registry back while it is being mutated.
use std::{borrow::Borrow, hash::Hash, sync::Arc};

use planar_ui::{ElementId, EventBus, MeshId, SubscriptionId};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::{
    metrics::{StoredTextLayoutMetrics, TextLayoutMetrics},
    style::{TextAlign, TextStyle},
};

/// Everything the interaction layer knows about one text element.
#[derive(Debug, Clone, PartialEq)]
pub struct TextInteractionEntry {
    /// Element id, stable across re-renders.
    pub element_id: ElementId,
    /// Scene mesh the text is rendered on.
    pub mesh: MeshId,
    /// Resolved style.
    pub style: Option<TextStyle>,
    /// Layout metrics of `text` under `style`.
    pub metrics: Option<Arc<StoredTextLayoutMetrics>>,
    /// Raw text.
    pub text: Option<String>,
    /// Horizontal scroll of clipped inputs, in CSS pixels.
    pub scroll_offset: Option<f32>,
    /// Whether the element takes keyboard focus and shows a caret.
    pub editable: bool,
}

impl TextInteractionEntry {
    /// Creates an entry with nothing but its identity.
    pub fn new(element_id: impl Into<ElementId>, mesh: MeshId) -> Self {
        Self {
            element_id: element_id.into(),
            mesh,
            style: None,
            metrics: None,
            text: None,
            scroll_offset: None,
            editable: false,
        }
    }

    /// Sets the style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Sets the metrics.
    pub fn with_metrics(mut self, metrics: Arc<StoredTextLayoutMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the raw text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the scroll offset.
    pub fn with_scroll_offset(mut self, offset: f32) -> Self {
        self.scroll_offset = Some(offset);
        self
    }

    /// Marks the element as an editable input.
    pub fn editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// CSS-pixel metrics, if any.
    pub fn css_metrics(&self) -> Option<&TextLayoutMetrics> {
        self.metrics.as_deref().map(|stored| &stored.css)
    }

    /// Line alignment, defaulting to left.
    pub fn text_align(&self) -> TextAlign {
        self.style
            .as_ref()
            .map_or(TextAlign::default(), |style| style.text_align)
    }

    /// Largest valid caret index: the last line's end, falling back to the
    /// text length, then to zero.
    pub fn max_caret_index(&self) -> usize {
        self.css_metrics()
            .and_then(TextLayoutMetrics::max_caret_index)
            .or_else(|| self.text.as_ref().map(|text| text.chars().count()))
            .unwrap_or(0)
    }
}

/// A change to the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    /// An entry was added or replaced.
    Register(TextInteractionEntry),
    /// An entry's metrics changed.
    Metrics(TextInteractionEntry),
    /// An entry's style changed.
    Style(TextInteractionEntry),
    /// An entry's text changed.
    Text(TextInteractionEntry),
    /// An entry's scroll offset changed.
    Scroll(TextInteractionEntry),
    /// An entry was removed.
    Unregister {
        /// Id of the removed entry.
        element_id: ElementId,
        /// Its mesh.
        mesh: MeshId,
    },
    /// All entries were removed.
    Clear,
}

impl RegistryEvent {
    /// Element the event is about. `None` for [`RegistryEvent::Clear`].
    pub fn element_id(&self) -> Option<&ElementId> {
        match self {
            Self::Register(entry)
            | Self::Metrics(entry)
            | Self::Style(entry)
            | Self::Text(entry)
            | Self::Scroll(entry) => Some(&entry.element_id),
            Self::Unregister { element_id, .. } => Some(element_id),
            Self::Clear => None,
        }
    }

    /// Snapshot of the entry after the change, when it still exists.
    pub fn entry(&self) -> Option<&TextInteractionEntry> {
        match self {
            Self::Register(entry)
            | Self::Metrics(entry)
            | Self::Style(entry)
            | Self::Text(entry)
            | Self::Scroll(entry) => Some(entry),
            Self::Unregister { .. } | Self::Clear => None,
        }
    }
}

/// Interactive text entries keyed by element id and by mesh.
#[derive(Debug, Default)]
pub struct InteractionRegistry {
    entries: FxHashMap<ElementId, TextInteractionEntry>,
    mesh_index: FxHashMap<MeshId, ElementId>,
    events: EventBus<RegistryEvent>,
}

impl InteractionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    ///
    /// Re-registering an element under a new mesh drops the old mesh from
    /// the index. A mesh registered under a new element id evicts the entry
    /// that previously owned it.
    #[tracing::instrument(level = "trace", skip(self, entry), fields(element = %entry.element_id))]
    pub fn register(&mut self, entry: TextInteractionEntry) -> TextInteractionEntry {
        if let Some(owner) = self.mesh_index.get(&entry.mesh).cloned()
            && owner != entry.element_id
        {
            debug!("mesh {:?} moved from {owner} to {}", entry.mesh, entry.element_id);
            self.unregister_by_element_id(&owner);
        }

        if let Some(previous) = self.entries.get(&entry.element_id)
            && previous.mesh != entry.mesh
        {
            trace!("{} re-rendered onto {:?}", entry.element_id, entry.mesh);
            self.mesh_index.remove(&previous.mesh);
        }

        self.mesh_index
            .insert(entry.mesh, entry.element_id.clone());
        self.entries
            .insert(entry.element_id.clone(), entry.clone());
        self.events.emit(&RegistryEvent::Register(entry.clone()));
        entry
    }

    /// Replaces an entry's metrics. Returns `false` for unknown ids.
    pub fn update_metrics<Q>(&mut self, element_id: &Q, metrics: Arc<StoredTextLayoutMetrics>) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.update(element_id, RegistryEvent::Metrics, |entry| {
            entry.metrics = Some(metrics);
        })
    }

    /// Replaces an entry's style. Returns `false` for unknown ids.
    pub fn update_style<Q>(&mut self, element_id: &Q, style: TextStyle) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.update(element_id, RegistryEvent::Style, |entry| {
            entry.style = Some(style);
        })
    }

    /// Replaces an entry's text. Returns `false` for unknown ids.
    pub fn update_text<Q>(&mut self, element_id: &Q, text: impl Into<String>) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let text = text.into();
        self.update(element_id, RegistryEvent::Text, |entry| {
            entry.text = Some(text);
        })
    }

    /// Replaces an entry's scroll offset. Returns `false` for unknown ids.
    pub fn update_scroll_offset<Q>(&mut self, element_id: &Q, offset: f32) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.update(element_id, RegistryEvent::Scroll, |entry| {
            entry.scroll_offset = Some(offset);
        })
    }

    fn update<Q>(
        &mut self,
        element_id: &Q,
        event: fn(TextInteractionEntry) -> RegistryEvent,
        apply: impl FnOnce(&mut TextInteractionEntry),
    ) -> bool
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(entry) = self.entries.get_mut(element_id) else {
            return false;
        };
        apply(entry);
        let snapshot = entry.clone();
        self.events.emit(&event(snapshot));
        true
    }

    /// Removes the entry registered for `mesh`.
    pub fn unregister(&mut self, mesh: MeshId) -> Option<TextInteractionEntry> {
        let element_id = self.mesh_index.get(&mesh)?.clone();
        self.unregister_by_element_id(&element_id)
    }

    /// Removes the entry registered under `element_id`.
    pub fn unregister_by_element_id<Q>(&mut self, element_id: &Q) -> Option<TextInteractionEntry>
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(element_id)?;
        self.mesh_index.remove(&entry.mesh);
        debug!("unregistered text element {}", entry.element_id);
        self.events.emit(&RegistryEvent::Unregister {
            element_id: entry.element_id.clone(),
            mesh: entry.mesh,
        });
        Some(entry)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.mesh_index.clear();
        self.events.emit(&RegistryEvent::Clear);
    }

    /// Entry rendered on `mesh`.
    pub fn get_by_mesh(&self, mesh: MeshId) -> Option<&TextInteractionEntry> {
        self.mesh_index
            .get(&mesh)
            .and_then(|element_id| self.entries.get(element_id))
    }

    /// Entry registered under `element_id`.
    pub fn get_by_element_id<Q>(&self, element_id: &Q) -> Option<&TextInteractionEntry>
    where
        ElementId: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(element_id)
    }

    /// Whether `mesh` is an interactive text mesh.
    pub fn is_interactive(&self, mesh: MeshId) -> bool {
        self.mesh_index.contains_key(&mesh)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribes to registry changes.
    ///
    /// Listeners run while the registry is borrowed for the mutation and
    /// must not access it again.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&RegistryEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(listener)
    }

    /// Removes a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}
