//! WASM bindings for the cardwright card editor.
//!
//! Exposes the markdown renderer, the card editor and the template browser
//! to JS/TS apps via wasm-bindgen.

mod editor;
mod templates;
mod types;

pub use editor::*;
pub use templates::*;
pub use types::*;

use cardwright_common::Config;
use cardwright_editor_browser::{CARD_TYPE_LIST, build_safe_file_name};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Render the markdown subset used on cards to HTML.
#[wasm_bindgen(js_name = renderMarkdown)]
pub fn render_markdown(markdown: &str) -> String {
    cardwright_renderer::render_markdown(markdown)
}

/// Render a single line of inline markdown (no block wrapper).
#[wasm_bindgen(js_name = renderInline)]
pub fn render_inline(text: &str) -> String {
    cardwright_renderer::render_inline(text)
}

/// Replace `[label](url)` links with their label.
#[wasm_bindgen(js_name = stripMarkdownLinks)]
pub fn strip_markdown_links(text: &str) -> String {
    cardwright_renderer::strip_markdown_links(text).into_owned()
}

/// File-name-safe form of a card title.
#[wasm_bindgen(js_name = buildSafeFileName)]
pub fn safe_file_name(title: &str) -> String {
    build_safe_file_name(title)
}

/// The card type registry, in display order.
#[wasm_bindgen(js_name = cardTypes)]
pub fn card_types() -> Result<JsValue, JsError> {
    serde_wasm_bindgen::to_value(&CARD_TYPE_LIST)
        .map_err(|e| JsError::new(&format!("Failed to serialize card types: {}", e)))
}

/// Parse an optional JS config object, defaulting missing keys.
pub(crate) fn parse_config(config: Option<JsValue>) -> Result<Config, JsError> {
    match config {
        Some(value) if !value.is_undefined() && !value.is_null() => {
            serde_wasm_bindgen::from_value(value)
                .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))
        }
        _ => Ok(Config::default()),
    }
}
