//! Read-side view of the selection, kept consistent with the registry.
//!
//! The store mirrors every state the controller publishes and answers
//! queries against the mirrored snapshot. It also watches the registry: when
//! the selected element disappears, or its text changes so that the range no
//! longer fits, the selection is cleared through the controller.
use std::sync::Arc;

use parking_lot::RwLock;
use planar_ui::{ElementId, EventBus, Shared, SubscriptionId};
use tracing::debug;

use crate::{
    controller::SelectionController,
    registry::{InteractionRegistry, RegistryEvent, TextInteractionEntry},
    selection::{SelectionRange, TextSelectionState},
};

#[derive(Debug, Default)]
struct Snapshot {
    state: TextSelectionState,
    revision: u64,
}

/// Observable selection state bound to a registry and a controller.
pub struct SelectionStore {
    snapshot: Arc<RwLock<Snapshot>>,
    listeners: Arc<RwLock<EventBus<TextSelectionState>>>,
    registry: Shared<InteractionRegistry>,
    controller: Shared<SelectionController>,
    registry_subscription: SubscriptionId,
    controller_subscription: SubscriptionId,
}

impl SelectionStore {
    /// Starts mirroring `controller` and reconciling against `registry`.
    pub fn attach(
        registry: &Shared<InteractionRegistry>,
        controller: &Shared<SelectionController>,
    ) -> Self {
        let snapshot = Arc::new(RwLock::new(Snapshot {
            state: controller.with(|controller| controller.state().clone()),
            revision: 0,
        }));
        let listeners = Arc::new(RwLock::new(EventBus::new()));

        let controller_subscription = {
            let snapshot = snapshot.clone();
            let listeners = listeners.clone();
            controller.with_mut(|controller| {
                controller.subscribe(move |state| {
                    {
                        let mut snapshot = snapshot.write();
                        snapshot.state = state.clone();
                        snapshot.revision += 1;
                    }
                    listeners.read().emit(state);
                })
            })
        };

        let registry_subscription = {
            let snapshot = snapshot.clone();
            let controller = controller.clone();
            registry.with_mut(|registry| {
                registry.subscribe(move |event| reconcile(&snapshot, &controller, event))
            })
        };

        Self {
            snapshot,
            listeners,
            registry: registry.clone(),
            controller: controller.clone(),
            registry_subscription,
            controller_subscription,
        }
    }

    /// Copy of the current state.
    pub fn state(&self) -> TextSelectionState {
        self.snapshot.read().state.clone()
    }

    /// Number of states mirrored so far.
    pub fn revision(&self) -> u64 {
        self.snapshot.read().revision
    }

    /// Element holding the selection.
    pub fn element_id(&self) -> Option<ElementId> {
        self.snapshot.read().state.element_id.clone()
    }

    /// Normalized selection range.
    pub fn range(&self) -> Option<SelectionRange> {
        self.snapshot.read().state.range
    }

    /// Whether a non-empty range is selected.
    pub fn has_selection(&self) -> bool {
        self.snapshot.read().state.has_selection
    }

    /// Anchor index.
    pub fn anchor_index(&self) -> Option<usize> {
        self.snapshot.read().state.anchor_index
    }

    /// Focus index.
    pub fn focus_index(&self) -> Option<usize> {
        self.snapshot.read().state.focus_index
    }

    /// Number of selected chars.
    pub fn range_length(&self) -> usize {
        self.snapshot.read().state.range_length()
    }

    /// Registry entry of the selected element, looked up now.
    pub fn active_entry(&self) -> Option<TextInteractionEntry> {
        let element_id = self.element_id()?;
        self.registry
            .with(|registry| registry.get_by_element_id(&element_id).cloned())
    }

    /// The selected substring, empty without a selection or text.
    pub fn selected_text(&self) -> String {
        let state = self.state();
        let (Some(element_id), Some(range)) = (state.element_id, state.range) else {
            return String::new();
        };
        self.registry.with(|registry| {
            registry
                .get_by_element_id(&element_id)
                .and_then(|entry| entry.text.as_deref())
                .map(|text| slice_chars(text, range))
                .unwrap_or_default()
        })
    }

    /// Clears the selection through the controller.
    pub fn clear_selection(&self) {
        self.controller
            .with_mut(|controller| controller.clear_selection());
    }

    /// Subscribes to mirrored states.
    ///
    /// Listeners can fire while the registry is locked for writing: they may
    /// read the snapshot accessors, but must not call
    /// [`Self::active_entry`] or [`Self::selected_text`], and must not
    /// subscribe or unsubscribe from inside the callback.
    pub fn subscribe(
        &self,
        listener: impl Fn(&TextSelectionState) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.listeners.write().subscribe(listener)
    }

    /// Removes a subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.write().unsubscribe(id)
    }
}

impl Drop for SelectionStore {
    fn drop(&mut self) {
        let registry_subscription = self.registry_subscription;
        self.registry
            .with_mut(|registry| registry.unsubscribe(registry_subscription));
        let controller_subscription = self.controller_subscription;
        self.controller
            .with_mut(|controller| controller.unsubscribe(controller_subscription));
    }
}

fn reconcile(
    snapshot: &RwLock<Snapshot>,
    controller: &Shared<SelectionController>,
    event: &RegistryEvent,
) {
    let (selected, range) = {
        let snapshot = snapshot.read();
        (snapshot.state.element_id.clone(), snapshot.state.range)
    };
    let Some(selected) = selected else {
        return;
    };

    if let RegistryEvent::Clear = event {
        debug!("registry cleared, dropping selection on {selected}");
        controller.with_mut(|controller| controller.clear_selection());
        return;
    }
    if event.element_id() != Some(&selected) {
        return;
    }

    match event {
        RegistryEvent::Unregister { .. } => {
            debug!("{selected} unregistered, dropping its selection");
            controller.with_mut(|controller| controller.clear_selection());
        }
        RegistryEvent::Register(entry)
        | RegistryEvent::Metrics(entry)
        | RegistryEvent::Style(entry)
        | RegistryEvent::Text(entry) => {
            let max = entry.max_caret_index();
            if range.is_some_and(|range| range.start > max || range.end > max) {
                debug!("selection on {selected} no longer fits {max} chars, clearing");
                controller.with_mut(|controller| controller.clear_selection());
            } else {
                controller.with(|controller| controller.republish());
            }
        }
        RegistryEvent::Scroll(_) => {
            controller.with(|controller| controller.republish());
        }
        RegistryEvent::Clear => {}
    }
}

/// Chars `[range.start, range.end)` of `text`, with both ends clamped to its
/// length.
pub fn slice_chars(text: &str, range: SelectionRange) -> String {
    let len = text.chars().count();
    let start = range.start.min(len);
    let end = range.end.min(len).max(start);
    text.chars().skip(start).take(end - start).collect()
}
