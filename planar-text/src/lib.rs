//! Text selection for planar.
//!
//! Text in a planar scene is rasterized onto flat meshes, so the browser-style
//! selection a reader expects has to be rebuilt on top of layout metrics. This
//! crate does that:
//!
//! - [`InteractionRegistry`] knows which meshes carry selectable text and
//!   their measured layout.
//! - [`SelectionController`] is the selection state machine, and
//!   [`SelectionStore`] the read side that follows it and the registry.
//! - [`PointerRouter`] turns scene picks into caret indices and selection
//!   gestures, [`ShortcutService`] handles copy and caret keys.
//! - [`HighlightFactory`] and [`CaretRenderer`] keep overlay quads in sync with
//!   the selection.
//!
//! [`InteractionContext`] wires all of it together for one scene.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod caret;
pub mod config;
pub mod context;
pub mod controller;
pub mod frame;
pub mod highlight;
pub mod hit_test;
pub mod metrics;
pub mod monospace;
pub mod registry;
pub mod router;
pub mod selection;
pub mod shortcuts;
pub mod store;
pub mod style;
pub mod viewport;

pub use caret::{CaretPlacement, CaretRenderer};
pub use config::{ConfigError, InteractionConfig};
pub use context::{InteractionContext, RenderOutput};
pub use controller::SelectionController;
pub use frame::TextFrame;
pub use highlight::{HighlightFactory, HighlightSegment};
pub use metrics::{
    CharacterMetrics, LayoutMetricsProvider, LineMetrics, StoredTextLayoutMetrics,
    TextLayoutMetrics,
};
pub use monospace::MonospaceLayout;
pub use registry::{InteractionRegistry, RegistryEvent, TextInteractionEntry};
pub use router::{ClickType, HoverCursor, PointerDownOutcome, PointerRouter};
pub use selection::{Direction, SelectionRange, TextSelectionState};
pub use shortcuts::{KeyHandling, ShortcutService};
pub use store::SelectionStore;
pub use style::{TextAlign, TextStyle};
pub use viewport::VisibleWindow;
