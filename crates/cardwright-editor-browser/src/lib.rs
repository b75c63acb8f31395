//! Browser DOM layer for the cardwright card editor.
//!
//! Implements the `cardwright-editor-core` platform traits over `web-sys`.
//! It assumes a `wasm32-unknown-unknown` target environment.
//!
//! - `dom`: `<img>` elements and the preview root
//! - `export`: `html-to-image` raster snapshots and anchor downloads
//! - `prefetch`: image cache warming
//!
//! This crate re-exports `cardwright-editor-core` for convenience, so
//! consumers only need to depend on `cardwright-editor-browser`.

pub use cardwright_editor_core;
pub use cardwright_editor_core::*;

pub mod dom;
pub mod export;
pub mod prefetch;

pub use cardwright_common::MediaClient;
pub use dom::{DomImage, DomRoot};
pub use export::{AnchorDownload, HtmlToImage};
pub use prefetch::ImagePrefetch;

/// Exporter wired to the browser implementations.
pub type BrowserExporter = CardExporter<MediaClient, HtmlToImage, AnchorDownload>;

/// Editor that prefetches through `Image()`.
pub type BrowserEditor = CardEditor<ImagePrefetch>;
