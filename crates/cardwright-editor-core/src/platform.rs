//! Platform abstraction traits for preview export and asset loading.
//!
//! These traits define the interface between the editor logic and the
//! environment that owns the live preview. The browser implementation works
//! on DOM nodes; tests use in-memory fakes.

use std::future::Future;
use std::time::Duration;

use cardwright_common::MediaClient;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

impl From<cardwright_common::MediaError> for PlatformError {
    fn from(e: cardwright_common::MediaError) -> Self {
        PlatformError(e.to_string())
    }
}

/// One `<img>` in the preview.
///
/// Element handles are shared references into a live tree, so mutation goes
/// through `&self`.
pub trait ImageElement {
    /// The source the element actually resolved (`currentSrc`), if any.
    fn current_src(&self) -> Option<String>;

    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), PlatformError>;

    fn remove_attribute(&self, name: &str) -> Result<(), PlatformError>;

    /// Whether the element is still attached to a document.
    fn is_connected(&self) -> bool;
}

/// A subtree whose images can be enumerated.
pub trait ImageRoot {
    type Image: ImageElement;

    /// Every image in the subtree, in document order.
    ///
    /// Fails only if the root itself is unusable.
    fn images(&self) -> Result<Vec<Self::Image>, PlatformError>;
}

/// Fetches an image and returns it as a `data:` URL.
pub trait ImageFetcher {
    fn fetch_data_url(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, PlatformError>>;
}

impl ImageFetcher for MediaClient {
    async fn fetch_data_url(&self, url: &str, timeout: Duration) -> Result<String, PlatformError> {
        Ok(MediaClient::fetch_data_url(self, url, timeout).await?)
    }
}

impl<T: ImageFetcher> ImageFetcher for &T {
    fn fetch_data_url(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<String, PlatformError>> {
        (*self).fetch_data_url(url, timeout)
    }
}

/// Options passed to the raster snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub pixel_ratio: f64,
    /// CSS color painted behind the subtree.
    pub background_color: String,
    /// Skip embedding web fonts into the snapshot.
    pub skip_fonts: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: 2.0,
            background_color: "transparent".to_string(),
            skip_fonts: false,
        }
    }
}

/// Renders a subtree to an encoded PNG, returned as a URL usable as a
/// download href.
pub trait RasterSnapshot<R: ?Sized> {
    fn to_png(
        &self,
        root: &R,
        options: &RasterOptions,
    ) -> impl Future<Output = Result<String, PlatformError>>;
}

/// Saves a file from an href.
pub trait DownloadSink {
    fn download(&self, file_name: &str, href: &str) -> Result<(), PlatformError>;
}

/// Warms the platform's image cache for a URL. Fire and forget.
pub trait AssetPrefetch {
    fn prefetch(&self, url: &str);
}

impl AssetPrefetch for () {
    fn prefetch(&self, _url: &str) {}
}

impl<T: AssetPrefetch> AssetPrefetch for &T {
    fn prefetch(&self, url: &str) {
        (*self).prefetch(url)
    }
}

impl<T: AssetPrefetch> AssetPrefetch for Option<T> {
    fn prefetch(&self, url: &str) {
        if let Some(inner) = self {
            inner.prefetch(url)
        }
    }
}
