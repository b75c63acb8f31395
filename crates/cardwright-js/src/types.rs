//! Types exposed to JavaScript via wasm-bindgen.

use cardwright_common::TemplateCard;
use cardwright_editor_browser::{CardFields, EditorState, ExportState, TemplateGroupView};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;
use wasm_bindgen::prelude::*;

/// What the preview and the properties form render from.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    /// Slug of the open template, if any.
    pub selected_slug: Option<String>,
    pub selected_type_id: String,
    #[tsify(type = "Record<string, string>")]
    pub card_fields: CardFields,
    pub custom_image: Option<String>,
    /// Custom upload, else the template art.
    pub card_image: Option<String>,
    pub selected_feature_index: usize,
    /// Feature names of the open subclass card, for the tier selector.
    pub feature_names: Vec<String>,
    pub is_exporting: bool,
    pub export_error: Option<String>,
}

impl EditorSnapshot {
    pub fn new(editor: &EditorState, export: &ExportState) -> Self {
        let card = editor.selected_card.as_ref();
        Self {
            selected_slug: card.map(|c| c.slug.clone()),
            selected_type_id: editor.selected_type_id.as_str().to_string(),
            card_fields: editor.card_fields.clone(),
            custom_image: editor.custom_image.clone(),
            card_image: editor.card_image().map(str::to_string),
            selected_feature_index: editor.selected_feature_index,
            feature_names: card
                .map(|c| c.features.iter().map(|f| f.name.clone()).collect())
                .unwrap_or_default(),
            is_exporting: export.is_exporting,
            export_error: export.export_error.clone(),
        }
    }
}

/// A sidebar group after search filtering.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct JsTemplateGroup {
    pub id: String,
    pub title: String,
    #[tsify(type = "unknown[]")]
    pub items: Vec<TemplateCard>,
    pub expanded: bool,
}

impl From<TemplateGroupView> for JsTemplateGroup {
    fn from(view: TemplateGroupView) -> Self {
        Self {
            id: view.id.as_str().to_string(),
            title: view.title,
            items: view.filtered_items,
            expanded: view.expanded,
        }
    }
}

/// Loading status of the template catalog.
#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesStatus {
    pub is_loading: bool,
    pub error: Option<String>,
    pub search_term: String,
    pub last_fetched_at: Option<String>,
}
