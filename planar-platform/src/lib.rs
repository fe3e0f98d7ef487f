//! Platform services for planar applications.
//!
//! ## Usage
//!
//! Build a [`Clipboard`] at startup and hand it to the components that copy
//! text. It prefers the system clipboard and falls back to an in-process
//! buffer when the system one is missing or rejects a write.
#![deny(missing_docs, clippy::unwrap_used)]

pub mod clipboard;

pub use clipboard::{
    Clipboard, ClipboardBackend, ClipboardError, MemoryClipboard, SharedClipboard,
};

#[cfg(all(not(target_os = "android"), not(target_family = "wasm")))]
pub use clipboard::SystemClipboard;
