//! Image cache warming through detached `Image()` objects.

use cardwright_editor_core::AssetPrefetch;
use web_sys::HtmlImageElement;

/// Starts a browser image load for each URL and forgets about it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePrefetch;

impl AssetPrefetch for ImagePrefetch {
    fn prefetch(&self, url: &str) {
        match HtmlImageElement::new() {
            Ok(img) => img.set_src(url),
            Err(e) => tracing::debug!(url, error = ?e, "could not create Image for prefetch"),
        }
    }
}
