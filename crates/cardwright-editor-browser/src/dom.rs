//! `<img>` elements and preview roots backed by the live DOM.

use cardwright_editor_core::{ImageElement, ImageRoot, PlatformError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, HtmlImageElement};

/// Convert a thrown JS value into a [`PlatformError`].
pub(crate) fn js_error(context: &str, value: JsValue) -> PlatformError {
    let detail = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    PlatformError(format!("{context}: {detail}"))
}

pub(crate) fn document() -> Result<web_sys::Document, PlatformError> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| PlatformError::from("no document available"))
}

/// A DOM `<img>`.
#[derive(Debug, Clone)]
pub struct DomImage(pub HtmlImageElement);

impl ImageElement for DomImage {
    fn current_src(&self) -> Option<String> {
        Some(self.0.current_src()).filter(|src| !src.is_empty())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), PlatformError> {
        self.0
            .set_attribute(name, value)
            .map_err(|e| js_error("setAttribute", e))
    }

    fn remove_attribute(&self, name: &str) -> Result<(), PlatformError> {
        self.0
            .remove_attribute(name)
            .map_err(|e| js_error("removeAttribute", e))
    }

    fn is_connected(&self) -> bool {
        self.0.is_connected()
    }
}

/// The card preview subtree.
#[derive(Debug, Clone)]
pub struct DomRoot(pub Element);

impl DomRoot {
    /// Find the preview root by CSS selector.
    pub fn query(selector: &str) -> Result<Self, PlatformError> {
        document()?
            .query_selector(selector)
            .map_err(|e| js_error("querySelector", e))?
            .map(DomRoot)
            .ok_or_else(|| PlatformError(format!("no element matches {selector}")))
    }

    pub fn element(&self) -> &Element {
        &self.0
    }
}

impl ImageRoot for DomRoot {
    type Image = DomImage;

    fn images(&self) -> Result<Vec<DomImage>, PlatformError> {
        if !self.0.is_connected() {
            return Err("preview root is not attached to the document".into());
        }

        let nodes = self
            .0
            .query_selector_all("img")
            .map_err(|e| js_error("querySelectorAll", e))?;

        Ok((0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<HtmlImageElement>().ok())
            .map(DomImage)
            .collect())
    }
}
