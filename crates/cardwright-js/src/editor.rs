//! JsCardEditor - the card editor wrapper for JavaScript.

use std::rc::Rc;

use bytes::Bytes;
use cardwright_common::{MediaClient, Store, SubscriptionId, TemplateCard};
use cardwright_editor_browser::{
    AnchorDownload, BrowserEditor, BrowserExporter, CardField, CardTypeId, DomRoot,
    EXPORT_ERROR_MESSAGE, EditorState, ExportOptions, ExportState, HtmlToImage, ImagePrefetch,
};
use wasm_bindgen::prelude::*;

use crate::parse_config;
use crate::types::EditorSnapshot;

fn parse_field(name: &str) -> Result<CardField, JsError> {
    name.parse().map_err(|e: String| JsError::new(&e))
}

/// The card editor exposed to JavaScript.
///
/// Owns the editor and export state; the host renders from
/// [`JsCardEditor::snapshot`] whenever `onChange` fires.
#[wasm_bindgen]
pub struct JsCardEditor {
    editor: Rc<BrowserEditor>,
    exporter: Rc<BrowserExporter>,
    on_change: Option<(SubscriptionId, SubscriptionId)>,
}

#[wasm_bindgen]
impl JsCardEditor {
    /// Create an editor. `config` takes the same keys as the config file
    /// (`image_timeout_ms`, `pixel_ratio`, ...); missing keys use defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<JsValue>) -> Result<JsCardEditor, JsError> {
        let config = parse_config(config)?;
        let editor = BrowserEditor::new(
            Store::new(EditorState::default()),
            Store::new(ExportState::default()),
            ImagePrefetch,
        );
        let exporter = BrowserExporter::new(
            MediaClient::new(),
            HtmlToImage,
            AnchorDownload,
            editor.store().clone(),
            editor.export_store().clone(),
        )
        .with_options(ExportOptions::from_config(&config));

        Ok(Self {
            editor: Rc::new(editor),
            exporter: Rc::new(exporter),
            on_change: None,
        })
    }

    /// Register a callback fired after every editor or export state change.
    /// Replaces any previous callback; `null` removes it.
    #[wasm_bindgen(js_name = setOnChange)]
    pub fn set_on_change(&mut self, callback: Option<js_sys::Function>) {
        if let Some((editor_id, export_id)) = self.on_change.take() {
            self.editor.store().unsubscribe(editor_id);
            self.editor.export_store().unsubscribe(export_id);
        }
        let Some(callback) = callback else {
            return;
        };

        let notify = move || {
            let _ = callback.call0(&JsValue::null());
        };
        let editor_notify = notify.clone();
        let editor_id = self.editor.store().subscribe(move |_| editor_notify());
        let export_id = self.editor.export_store().subscribe(move |_| notify());
        self.on_change = Some((editor_id, export_id));
    }

    /// Current editor and export state.
    #[wasm_bindgen]
    pub fn snapshot(&self) -> EditorSnapshot {
        let export = self.editor.export_store().get_state();
        self.editor
            .store()
            .with_state(|editor| EditorSnapshot::new(editor, &export))
    }

    /// Open a catalog card (as returned by `JsTemplateBrowser.groups()`).
    #[wasm_bindgen(js_name = selectCard)]
    pub fn select_card(&self, card: JsValue) -> Result<(), JsError> {
        let card: TemplateCard = serde_wasm_bindgen::from_value(card)
            .map_err(|e| JsError::new(&format!("Invalid card: {}", e)))?;
        self.editor.select_card(card);
        Ok(())
    }

    #[wasm_bindgen(js_name = closeEditor)]
    pub fn close_editor(&self) {
        self.editor.close_editor();
    }

    /// Switch the layout (`ancestry`, `community`, `subclass`, `domain-card`).
    #[wasm_bindgen(js_name = setCardType)]
    pub fn set_card_type(&self, type_id: &str) -> Result<(), JsError> {
        let type_id: CardTypeId = type_id.parse().map_err(|e: String| JsError::new(&e))?;
        self.editor.set_card_type(type_id);
        Ok(())
    }

    #[wasm_bindgen(js_name = getField)]
    pub fn get_field(&self, name: &str) -> Result<String, JsError> {
        let field = parse_field(name)?;
        Ok(self
            .editor
            .store()
            .with_state(|s| s.card_fields.get(field).to_string()))
    }

    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&self, name: &str, value: String) -> Result<(), JsError> {
        let field = parse_field(name)?;
        self.editor.set_field(field, value);
        Ok(())
    }

    /// Pick which feature of a subclass card is shown.
    #[wasm_bindgen(js_name = setSubclassFeature)]
    pub fn set_subclass_feature(&self, index: usize) {
        self.editor.set_subclass_feature(index);
    }

    /// Set or clear the custom card art (`data:` URL).
    #[wasm_bindgen(js_name = setCustomImage)]
    pub fn set_custom_image(&self, data_url: Option<String>) {
        self.editor.set_custom_image(data_url);
    }

    /// Use uploaded file bytes as the card art. Returns the `data:` URL.
    #[wasm_bindgen(js_name = loadCustomImage)]
    pub fn load_custom_image(&self, bytes: Vec<u8>) -> String {
        self.editor.load_custom_image(Bytes::from(bytes))
    }

    /// Export the preview matching `selector` as a PNG download.
    ///
    /// The promise always resolves; failures show up as `exportError` in
    /// the next snapshot.
    #[wasm_bindgen(js_name = exportPng)]
    pub fn export_png(&self, selector: String) -> js_sys::Promise {
        let exporter = Rc::clone(&self.exporter);
        wasm_bindgen_futures::future_to_promise(async move {
            match DomRoot::query(&selector) {
                Ok(root) => exporter.export_current_card(&root).await,
                Err(e) => {
                    tracing::error!(error = %e, selector = %selector, "export root not found");
                    exporter
                        .export_store()
                        .update(|s| s.export_error = Some(EXPORT_ERROR_MESSAGE.to_string()));
                }
            }
            Ok(JsValue::UNDEFINED)
        })
    }
}

impl Drop for JsCardEditor {
    fn drop(&mut self) {
        self.set_on_change(None);
    }
}
