//! Raster snapshot and file download for the browser.

use cardwright_editor_core::{DownloadSink, PlatformError, RasterOptions, RasterSnapshot};
use js_sys::{Object, Reflect};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::dom::{DomRoot, document, js_error};

#[wasm_bindgen(module = "html-to-image")]
extern "C" {
    #[wasm_bindgen(js_name = toPng, catch)]
    async fn to_png(node: &HtmlElement, options: &JsValue) -> Result<JsValue, JsValue>;
}

fn raster_options(options: &RasterOptions) -> Result<JsValue, PlatformError> {
    let object = Object::new();
    let set = |key: &str, value: JsValue| {
        Reflect::set(&object, &JsValue::from_str(key), &value)
            .map(|_| ())
            .map_err(|e| js_error("building toPng options", e))
    };
    set("pixelRatio", JsValue::from_f64(options.pixel_ratio))?;
    set("backgroundColor", JsValue::from_str(&options.background_color))?;
    set("skipFonts", JsValue::from_bool(options.skip_fonts))?;
    Ok(object.into())
}

/// Snapshots through the `html-to-image` package's `toPng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlToImage;

impl RasterSnapshot<DomRoot> for HtmlToImage {
    async fn to_png(&self, root: &DomRoot, options: &RasterOptions) -> Result<String, PlatformError> {
        let node: &HtmlElement = root
            .element()
            .dyn_ref()
            .ok_or_else(|| PlatformError::from("preview root is not an HTML element"))?;
        let options = raster_options(options)?;

        let data_url = to_png(node, &options)
            .await
            .map_err(|e| js_error("toPng", e))?;
        data_url
            .as_string()
            .ok_or_else(|| PlatformError::from("toPng did not return a data URL"))
    }
}

/// Saves files by clicking a temporary `<a download>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorDownload;

impl DownloadSink for AnchorDownload {
    fn download(&self, file_name: &str, href: &str) -> Result<(), PlatformError> {
        let link: web_sys::HtmlAnchorElement = document()?
            .create_element("a")
            .map_err(|e| js_error("createElement", e))?
            .dyn_into()
            .map_err(|_| PlatformError::from("created element is not an anchor"))?;
        link.set_download(file_name);
        link.set_href(href);
        link.click();
        tracing::debug!(file_name, "triggered download");
        Ok(())
    }
}
