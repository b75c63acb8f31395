//! JsTemplateBrowser - the template sidebar for JavaScript.

use std::rc::Rc;

use cardwright_common::{CatalogClient, Store, TemplateCategory};
use cardwright_editor_browser::{AssetPrefetcher, ImagePrefetch, TemplateBrowser, TemplatesState};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::parse_config;
use crate::types::{JsTemplateGroup, TemplatesStatus};

/// Catalog loading, search and group expansion.
#[wasm_bindgen]
pub struct JsTemplateBrowser {
    browser: Rc<TemplateBrowser<CatalogClient>>,
    prefetcher: AssetPrefetcher<ImagePrefetch>,
}

#[wasm_bindgen]
impl JsTemplateBrowser {
    /// Create a browser against the catalog named by `config.api_base`.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<JsValue>) -> Result<JsTemplateBrowser, JsError> {
        let config = parse_config(config)?;
        let browser = TemplateBrowser::new(
            CatalogClient::from_config(&config),
            Store::new(TemplatesState::default()),
        );
        Ok(Self {
            browser: Rc::new(browser),
            prefetcher: AssetPrefetcher::new(ImagePrefetch),
        })
    }

    /// Load the catalog once. Resolves when the first load settles.
    #[wasm_bindgen(js_name = ensureLoaded)]
    pub fn ensure_loaded(&self) -> js_sys::Promise {
        let browser = Rc::clone(&self.browser);
        wasm_bindgen_futures::future_to_promise(async move {
            browser.ensure_loaded().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Fetch the catalog again.
    #[wasm_bindgen]
    pub fn reload(&self) -> js_sys::Promise {
        let browser = Rc::clone(&self.browser);
        wasm_bindgen_futures::future_to_promise(async move {
            browser.reload().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Register a callback fired after every state change.
    #[wasm_bindgen(js_name = onChange)]
    pub fn on_change(&self, callback: js_sys::Function) -> u64 {
        let id = self.browser.store().subscribe(move |_| {
            let _ = callback.call0(&JsValue::null());
        });
        id.into()
    }

    /// Remove a callback registered with `onChange`.
    #[wasm_bindgen(js_name = offChange)]
    pub fn off_change(&self, id: u64) -> bool {
        self.browser.store().unsubscribe(id.into())
    }

    #[wasm_bindgen(js_name = setSearchTerm)]
    pub fn set_search_term(&self, value: String) {
        self.browser.set_search_term(value);
    }

    #[wasm_bindgen(js_name = toggleGroup)]
    pub fn toggle_group(&self, id: &str) -> Result<(), JsError> {
        let id: TemplateCategory = id.parse().map_err(|e: String| JsError::new(&e))?;
        self.browser.toggle_group(id);
        Ok(())
    }

    /// Groups with the items matching the current search.
    #[wasm_bindgen]
    pub fn groups(&self) -> Result<JsValue, JsError> {
        let groups: Vec<JsTemplateGroup> = self
            .browser
            .group_views()
            .into_iter()
            .map(JsTemplateGroup::from)
            .collect();
        // Plain objects rather than `Map`s, so items can go straight back
        // into `JsCardEditor.selectCard`.
        groups
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| JsError::new(&format!("Failed to serialize groups: {}", e)))
    }

    #[wasm_bindgen]
    pub fn status(&self) -> TemplatesStatus {
        self.browser.store().with_state(|s| TemplatesStatus {
            is_loading: s.is_loading,
            error: s.error.clone(),
            search_term: s.search_term.clone(),
            last_fetched_at: s.last_fetched_at.clone(),
        })
    }

    /// Warm the browser cache with every template image. Returns how many
    /// new requests were started.
    #[wasm_bindgen(js_name = prefetchImages)]
    pub fn prefetch_images(&self) -> usize {
        self.browser.store().with_state(|s| {
            self.prefetcher.prefetch_all(
                s.template_groups
                    .iter()
                    .flat_map(|g| &g.items)
                    .map(|card| card.image.as_deref()),
            )
        })
    }
}
