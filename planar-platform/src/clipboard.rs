//! Clipboard access with a fallback chain.
//!
//! ## Usage
//!
//! Enable copy in text selections. Writes go to the primary backend (the
//! system clipboard via `arboard` on desktop) and, if that is unavailable or
//! fails, to the fallback backend. A write only reports failure when every
//! backend failed.
//!
//! ```
//! use planar_platform::{Clipboard, MemoryClipboard};
//!
//! let memory = MemoryClipboard::new();
//! let mut clipboard = Clipboard::with_backends(None, Box::new(memory.clone()));
//!
//! assert!(clipboard.write_text("hello"));
//! assert_eq!(memory.contents().as_deref(), Some("hello"));
//! ```
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors reported by clipboard backends.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The backend could not be reached (no display server, no permission).
    #[error("clipboard is unavailable: {0}")]
    Unavailable(String),
    /// The backend refused the write.
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
    /// The backend holds no text.
    #[error("clipboard holds no text")]
    Empty,
}

/// A place text can be copied to.
pub trait ClipboardBackend: Send {
    /// Name for logging.
    fn name(&self) -> &'static str;

    /// Replaces the clipboard text.
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;

    /// Reads the clipboard text.
    fn get_text(&mut self) -> Result<String, ClipboardError>;
}

/// The operating system clipboard.
#[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
pub struct SystemClipboard {
    manager: arboard::Clipboard,
}

#[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
impl SystemClipboard {
    /// Connects to the system clipboard.
    pub fn new() -> Result<Self, ClipboardError> {
        arboard::Clipboard::new()
            .map(|manager| Self { manager })
            .map_err(|err| ClipboardError::Unavailable(err.to_string()))
    }
}

#[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
impl ClipboardBackend for SystemClipboard {
    fn name(&self) -> &'static str {
        "system"
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.manager
            .set_text(text.to_string())
            .map_err(|err| ClipboardError::WriteFailed(err.to_string()))
    }

    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.manager.get_text().map_err(|err| match err {
            arboard::Error::ContentNotAvailable => ClipboardError::Empty,
            other => ClipboardError::Unavailable(other.to_string()),
        })
    }
}

/// An in-process clipboard buffer.
///
/// Clones share the same buffer, so a test or host can keep a handle and
/// inspect what was copied.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the buffered text.
    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        *self.contents.lock() = Some(text.to_string());
        Ok(())
    }

    fn get_text(&mut self) -> Result<String, ClipboardError> {
        self.contents.lock().clone().ok_or(ClipboardError::Empty)
    }
}

/// Clipboard front-end with a primary backend and a fallback.
pub struct Clipboard {
    primary: Option<Box<dyn ClipboardBackend>>,
    fallback: Box<dyn ClipboardBackend>,
}

impl Clipboard {
    /// Uses the system clipboard when it can be reached, with an in-process
    /// buffer as fallback.
    pub fn new() -> Self {
        Self::with_backends(system_backend(), Box::new(MemoryClipboard::new()))
    }

    /// Builds a clipboard from explicit backends.
    pub fn with_backends(
        primary: Option<Box<dyn ClipboardBackend>>,
        fallback: Box<dyn ClipboardBackend>,
    ) -> Self {
        Self { primary, fallback }
    }

    /// Writes `text`, trying the primary backend first.
    ///
    /// Returns `false` only if every backend failed.
    pub fn write_text(&mut self, text: &str) -> bool {
        if let Some(primary) = self.primary.as_mut() {
            match primary.set_text(text) {
                Ok(()) => return true,
                Err(err) => warn!(
                    "{} clipboard rejected write, using {} fallback: {err}",
                    primary.name(),
                    self.fallback.name()
                ),
            }
        } else {
            debug!(
                "no primary clipboard, writing to {} fallback",
                self.fallback.name()
            );
        }

        match self.fallback.set_text(text) {
            Ok(()) => true,
            Err(err) => {
                warn!("{} clipboard fallback failed: {err}", self.fallback.name());
                false
            }
        }
    }

    /// Reads text, preferring the primary backend.
    pub fn read_text(&mut self) -> Option<String> {
        if let Some(primary) = self.primary.as_mut() {
            match primary.get_text() {
                Ok(text) => return Some(text),
                Err(err) => debug!("{} clipboard read failed: {err}", primary.name()),
            }
        }
        self.fallback.get_text().ok()
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

/// A clipboard that several owners can write through.
pub type SharedClipboard = Arc<Mutex<Clipboard>>;

#[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
fn system_backend() -> Option<Box<dyn ClipboardBackend>> {
    match SystemClipboard::new() {
        Ok(clipboard) => Some(Box::new(clipboard)),
        Err(err) => {
            warn!("Failed to initialize clipboard: {err}");
            None
        }
    }
}

#[cfg(any(target_os = "android", target_family = "wasm"))]
fn system_backend() -> Option<Box<dyn ClipboardBackend>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectingClipboard;

    impl ClipboardBackend for RejectingClipboard {
        fn name(&self) -> &'static str {
            "rejecting"
        }

        fn set_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
            Err(ClipboardError::WriteFailed("denied".into()))
        }

        fn get_text(&mut self) -> Result<String, ClipboardError> {
            Err(ClipboardError::Unavailable("denied".into()))
        }
    }

    #[test]
    fn primary_failure_routes_to_fallback() {
        let memory = MemoryClipboard::new();
        let mut clipboard =
            Clipboard::with_backends(Some(Box::new(RejectingClipboard)), Box::new(memory.clone()));

        assert!(clipboard.write_text("copied"));
        assert_eq!(memory.contents().as_deref(), Some("copied"));
        assert_eq!(clipboard.read_text().as_deref(), Some("copied"));
    }

    #[test]
    fn total_failure_reports_false() {
        let mut clipboard = Clipboard::with_backends(
            Some(Box::new(RejectingClipboard)),
            Box::new(RejectingClipboard),
        );
        assert!(!clipboard.write_text("lost"));
        assert_eq!(clipboard.read_text(), None);
    }

    #[test]
    fn primary_success_skips_fallback() {
        let primary = MemoryClipboard::new();
        let fallback = MemoryClipboard::new();
        let mut clipboard =
            Clipboard::with_backends(Some(Box::new(primary.clone())), Box::new(fallback.clone()));

        assert!(clipboard.write_text("x"));
        assert_eq!(primary.contents().as_deref(), Some("x"));
        assert_eq!(fallback.contents(), None);
    }
}
