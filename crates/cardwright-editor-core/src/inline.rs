//! Embedding external preview images before a raster snapshot.
//!
//! [`inline_external_images`] rewrites every externally hosted `<img>` under
//! a root to a `data:` URL (or a placeholder when the fetch fails) and hands
//! back an [`InlinedImages`] guard. Dropping the guard, or calling
//! [`InlinedImages::restore`], puts every touched element back the way it
//! was. Restoration happens exactly once.

use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use cardwright_common::media::is_embedded_url;
use miette::Diagnostic;
use thiserror::Error;

use crate::platform::{ImageElement, ImageFetcher, ImageRoot, PlatformError};

const PLACEHOLDER_SVG: &str = concat!(
    r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="600">"##,
    r##"<rect width="100%" height="100%" fill="#1f2937"/>"##,
    r##"<text x="50%" y="50%" fill="#9ca3af" font-size="18" font-family="sans-serif" "##,
    r##"dominant-baseline="middle" text-anchor="middle">Изображение недоступно при экспорте</text>"##,
    "</svg>",
);

/// Stand-in for images that could not be fetched.
pub static EXPORT_PLACEHOLDER_IMAGE: LazyLock<String> = LazyLock::new(|| {
    format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(PLACEHOLDER_SVG)
    )
});

pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_millis(8000);

#[derive(Debug, Clone, PartialEq)]
pub struct InlineOptions {
    /// Per-image fetch timeout.
    pub timeout: Duration,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_IMAGE_TIMEOUT,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum InlineError {
    #[error("cannot inline images: preview root is unavailable")]
    #[diagnostic(code(inline::root))]
    Root(#[source] PlatformError),
}

/// Attribute values captured before an element was mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SavedAttributes {
    src: Option<String>,
    srcset: Option<String>,
    crossorigin: Option<String>,
}

impl SavedAttributes {
    fn capture(img: &impl ImageElement) -> Self {
        Self {
            src: img.attribute("src"),
            srcset: img.attribute("srcset"),
            crossorigin: img.attribute("crossorigin"),
        }
    }

    fn restore(&self, img: &impl ImageElement) -> Result<(), PlatformError> {
        restore_optional(img, "src", self.src.as_deref())?;
        restore_optional(img, "srcset", self.srcset.as_deref())?;
        restore_optional(img, "crossorigin", self.crossorigin.as_deref())
    }
}

fn restore_optional(
    img: &impl ImageElement,
    name: &str,
    value: Option<&str>,
) -> Result<(), PlatformError> {
    match value {
        Some(value) => img.set_attribute(name, value),
        None => img.remove_attribute(name),
    }
}

/// Restore guard for a batch of inlined images.
#[must_use = "dropping the guard restores the images immediately"]
pub struct InlinedImages<E: ImageElement> {
    touched: Vec<(E, SavedAttributes)>,
}

impl<E: ImageElement> InlinedImages<E> {
    /// Number of elements that will be restored.
    pub fn len(&self) -> usize {
        self.touched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    /// Restore every touched element now.
    pub fn restore(mut self) {
        self.restore_all();
    }

    fn restore_all(&mut self) {
        for (img, saved) in self.touched.drain(..) {
            if !img.is_connected() {
                tracing::debug!(src = ?saved.src, "image detached before restore, skipping");
                continue;
            }
            if let Err(e) = saved.restore(&img) {
                tracing::warn!(error = %e, src = ?saved.src, "failed to restore image attributes");
            }
        }
    }
}

impl<E: ImageElement> Drop for InlinedImages<E> {
    fn drop(&mut self) {
        self.restore_all();
    }
}

impl<E: ImageElement> std::fmt::Debug for InlinedImages<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlinedImages")
            .field("touched", &self.touched.len())
            .finish()
    }
}

/// The source an element will actually load: `currentSrc`, else the `src`
/// attribute.
fn effective_src(img: &impl ImageElement) -> Option<String> {
    img.current_src()
        .filter(|src| !src.is_empty())
        .or_else(|| img.attribute("src"))
        .filter(|src| !src.is_empty())
}

fn apply_data_url(
    img: &impl ImageElement,
    saved: &SavedAttributes,
    data_url: &str,
) -> Result<(), PlatformError> {
    img.set_attribute("crossorigin", "anonymous")?;
    if saved.srcset.is_some() {
        img.remove_attribute("srcset")?;
    }
    img.set_attribute("src", data_url)
}

fn apply_placeholder(img: &impl ImageElement, saved: &SavedAttributes) -> Result<(), PlatformError> {
    if saved.srcset.is_some() {
        img.remove_attribute("srcset")?;
    }
    img.set_attribute("src", &EXPORT_PLACEHOLDER_IMAGE)
}

/// Inline one element. Returns the element with its saved attributes if it
/// was touched.
async fn inline_image<E, F>(img: E, fetcher: &F, timeout: Duration) -> Option<(E, SavedAttributes)>
where
    E: ImageElement,
    F: ImageFetcher,
{
    let src = effective_src(&img)?;
    if is_embedded_url(&src) {
        return None;
    }

    let saved = SavedAttributes::capture(&img);

    let applied = match fetcher.fetch_data_url(&src, timeout).await {
        Ok(data_url) => apply_data_url(&img, &saved, &data_url),
        Err(e) => {
            tracing::warn!(error = %e, src = %src, "failed to inline image, using placeholder");
            apply_placeholder(&img, &saved)
        }
    };
    if let Err(e) = applied {
        tracing::warn!(error = %e, src = %src, "failed to update image attributes");
    }

    Some((img, saved))
}

/// Inline every external image under `root`.
///
/// All images are fetched concurrently and every fetch settles before this
/// returns. A failed image gets the placeholder and never affects the
/// others; the only error is an unusable root.
pub async fn inline_external_images<R, F>(
    root: &R,
    fetcher: &F,
    options: &InlineOptions,
) -> Result<InlinedImages<R::Image>, InlineError>
where
    R: ImageRoot,
    F: ImageFetcher,
{
    let images = root.images().map_err(InlineError::Root)?;
    let total = images.len();

    let touched: Vec<_> = n0_future::join_all(
        images
            .into_iter()
            .map(|img| inline_image(img, fetcher, options.timeout)),
    )
    .await
    .into_iter()
    .flatten()
    .collect();

    tracing::debug!(total, inlined = touched.len(), "inlined preview images");
    Ok(InlinedImages { touched })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, HashSet};
    use std::rc::Rc;

    /// In-memory `<img>`: attributes behind a shared cell, like a DOM handle.
    #[derive(Debug, Clone, Default)]
    pub struct FakeImage {
        pub attrs: Rc<RefCell<HashMap<String, String>>>,
        pub current_src: Option<String>,
        pub connected: Rc<RefCell<bool>>,
    }

    impl FakeImage {
        pub fn with_src(src: &str) -> Self {
            let img = FakeImage {
                connected: Rc::new(RefCell::new(true)),
                ..Default::default()
            };
            img.attrs.borrow_mut().insert("src".into(), src.into());
            img
        }

        pub fn with_attr(self, name: &str, value: &str) -> Self {
            self.attrs.borrow_mut().insert(name.into(), value.into());
            self
        }

        pub fn get(&self, name: &str) -> Option<String> {
            self.attrs.borrow().get(name).cloned()
        }

        pub fn detach(&self) {
            *self.connected.borrow_mut() = false;
        }
    }

    impl ImageElement for FakeImage {
        fn current_src(&self) -> Option<String> {
            self.current_src.clone()
        }

        fn attribute(&self, name: &str) -> Option<String> {
            self.get(name)
        }

        fn set_attribute(&self, name: &str, value: &str) -> Result<(), PlatformError> {
            self.attrs.borrow_mut().insert(name.into(), value.into());
            Ok(())
        }

        fn remove_attribute(&self, name: &str) -> Result<(), PlatformError> {
            self.attrs.borrow_mut().remove(name);
            Ok(())
        }

        fn is_connected(&self) -> bool {
            *self.connected.borrow()
        }
    }

    #[derive(Debug, Clone, Default)]
    pub struct FakeRoot {
        pub images: Vec<FakeImage>,
        pub missing: bool,
    }

    impl ImageRoot for FakeRoot {
        type Image = FakeImage;

        fn images(&self) -> Result<Vec<FakeImage>, PlatformError> {
            if self.missing {
                return Err("root element not found".into());
            }
            Ok(self.images.clone())
        }
    }

    /// Serves `data:image/png;base64,{url}` for every url not in `failing`.
    #[derive(Debug, Default)]
    pub struct FakeFetcher {
        pub failing: HashSet<String>,
        pub requested: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn failing(urls: &[&str]) -> Self {
            Self {
                failing: urls.iter().map(|u| u.to_string()).collect(),
                ..Default::default()
            }
        }
    }

    impl ImageFetcher for FakeFetcher {
        async fn fetch_data_url(&self, url: &str, _timeout: Duration) -> Result<String, PlatformError> {
            self.requested.borrow_mut().push(url.to_string());
            if self.failing.contains(url) {
                return Err(format!("failed to load {url} (404)").into());
            }
            Ok(format!("data:image/png;base64,{url}"))
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_gets_placeholder_and_restores_exactly() {
        let original = "https://daggerheart.su/image/wip.avif?v=1&x=é";
        let img = FakeImage::with_src(original);
        let root = FakeRoot {
            images: vec![img.clone()],
            ..Default::default()
        };
        let fetcher = FakeFetcher::failing(&[original]);

        let guard = inline_external_images(&root, &fetcher, &InlineOptions::default())
            .await
            .unwrap();
        assert_eq!(img.get("src").as_deref(), Some(EXPORT_PLACEHOLDER_IMAGE.as_str()));
        assert!(img.get("crossorigin").is_none());

        guard.restore();
        assert_eq!(img.get("src").as_deref(), Some(original));
    }

    #[tokio::test]
    async fn test_successful_fetch_rewrites_and_restores_attributes() {
        let img = FakeImage::with_src("/image/a.avif")
            .with_attr("srcset", "/image/a.avif 1x, /image/a@2x.avif 2x");
        let plain = FakeImage::with_src("/image/b.avif").with_attr("crossorigin", "use-credentials");
        let root = FakeRoot {
            images: vec![img.clone(), plain.clone()],
            ..Default::default()
        };
        let fetcher = FakeFetcher::default();

        let guard = inline_external_images(&root, &fetcher, &InlineOptions::default())
            .await
            .unwrap();
        assert_eq!(guard.len(), 2);
        assert_eq!(img.get("src").as_deref(), Some("data:image/png;base64,/image/a.avif"));
        assert_eq!(img.get("crossorigin").as_deref(), Some("anonymous"));
        assert!(img.get("srcset").is_none());
        assert_eq!(plain.get("crossorigin").as_deref(), Some("anonymous"));

        drop(guard);
        assert_eq!(img.get("src").as_deref(), Some("/image/a.avif"));
        assert_eq!(
            img.get("srcset").as_deref(),
            Some("/image/a.avif 1x, /image/a@2x.avif 2x")
        );
        assert!(img.get("crossorigin").is_none());
        assert_eq!(plain.get("crossorigin").as_deref(), Some("use-credentials"));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_others() {
        let bad = FakeImage::with_src("https://a/bad.png");
        let good = FakeImage::with_src("https://a/good.png");
        let root = FakeRoot {
            images: vec![bad.clone(), good.clone()],
            ..Default::default()
        };
        let fetcher = FakeFetcher::failing(&["https://a/bad.png"]);

        let _guard = inline_external_images(&root, &fetcher, &InlineOptions::default())
            .await
            .unwrap();
        assert_eq!(bad.get("src").as_deref(), Some(EXPORT_PLACEHOLDER_IMAGE.as_str()));
        assert_eq!(good.get("src").as_deref(), Some("data:image/png;base64,https://a/good.png"));
    }

    #[tokio::test]
    async fn test_embedded_and_missing_sources_are_skipped() {
        let data = FakeImage::with_src("data:image/png;base64,AAAA");
        let blob = FakeImage::with_src("blob:https://a/1");
        let empty = FakeImage::with_src("");
        let root = FakeRoot {
            images: vec![data, blob, empty],
            ..Default::default()
        };
        let fetcher = FakeFetcher::default();

        let guard = inline_external_images(&root, &fetcher, &InlineOptions::default())
            .await
            .unwrap();
        assert!(guard.is_empty());
        assert!(fetcher.requested.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_current_src_preferred_over_attribute() {
        let mut img = FakeImage::with_src("/image/a.avif");
        img.current_src = Some("https://daggerheart.su/image/a@2x.avif".to_string());
        let root = FakeRoot {
            images: vec![img.clone()],
            ..Default::default()
        };
        let fetcher = FakeFetcher::default();

        let guard = inline_external_images(&root, &fetcher, &InlineOptions::default())
            .await
            .unwrap();
        assert_eq!(
            *fetcher.requested.borrow(),
            vec!["https://daggerheart.su/image/a@2x.avif".to_string()]
        );
        guard.restore();
        assert_eq!(img.get("src").as_deref(), Some("/image/a.avif"));
    }

    #[tokio::test]
    async fn test_srcset_only_image_gets_no_src_back() {
        let mut img = FakeImage::with_src("").with_attr("srcset", "https://a/x.png 1x");
        img.attrs.borrow_mut().remove("src");
        img.current_src = Some("https://a/x.png".to_string());
        let root = FakeRoot {
            images: vec![img.clone()],
            ..Default::default()
        };
        let fetcher = FakeFetcher::failing(&["https://a/x.png"]);

        let guard = inline_external_images(&root, &fetcher, &InlineOptions::default())
            .await
            .unwrap();
        assert_eq!(img.get("src").as_deref(), Some(EXPORT_PLACEHOLDER_IMAGE.as_str()));
        assert!(img.get("srcset").is_none());

        guard.restore();
        assert_eq!(img.get("src"), None);
        assert_eq!(img.get("srcset").as_deref(), Some("https://a/x.png 1x"));
        assert_eq!(img.get("crossorigin"), None);
    }

    #[tokio::test]
    async fn test_detached_element_is_left_alone() {
        let img = FakeImage::with_src("https://a/x.png");
        let root = FakeRoot {
            images: vec![img.clone()],
            ..Default::default()
        };
        let guard = inline_external_images(&root, &FakeFetcher::default(), &InlineOptions::default())
            .await
            .unwrap();

        img.detach();
        guard.restore();
        assert_eq!(img.get("src").as_deref(), Some("data:image/png;base64,https://a/x.png"));
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let root = FakeRoot {
            missing: true,
            ..Default::default()
        };
        let err = inline_external_images(&root, &FakeFetcher::default(), &InlineOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InlineError::Root(_)));
    }

    #[test]
    fn test_placeholder_is_base64_svg() {
        let encoded = EXPORT_PLACEHOLDER_IMAGE
            .strip_prefix("data:image/svg+xml;base64,")
            .unwrap();
        let decoded = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert!(decoded.contains(r#"width="400" height="600""#));
        assert!(decoded.contains("Изображение недоступно при экспорте"));
    }
}
