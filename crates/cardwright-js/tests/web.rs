//! WASM browser tests for the JS bindings.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use cardwright_js::{JsCardEditor, render_markdown, strip_markdown_links};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn subclass_card() -> JsValue {
    js_sys::JSON::parse(
        r#"{
            "id": "wizard-school",
            "slug": "wizard-school",
            "name": "Школа знаний",
            "description": "См. [правила](https://example.com/rules)",
            "features": [
                {"id": 1, "name": "Основа", "text": "Первый уровень", "group": "Основа"},
                {"id": 2, "name": "Специализация", "text": "Второй уровень", "group": "Специализация"}
            ],
            "category": "subclass",
            "classSlug": "wizard",
            "className": "Волшебник",
            "spellcastTrait": "knowledge"
        }"#,
    )
    .unwrap()
}

#[wasm_bindgen_test]
fn test_render_markdown_binding() {
    assert_eq!(render_markdown("**a**"), "<p><strong>a</strong></p>");
    assert_eq!(strip_markdown_links("[a](https://x.y) b"), "a b");
}

#[wasm_bindgen_test]
fn test_select_card_and_edit_fields() {
    let editor = JsCardEditor::new(None).unwrap();
    editor.select_card(subclass_card()).unwrap();

    assert_eq!(editor.get_field("title").unwrap(), "Школа знаний");
    assert_eq!(editor.get_field("prelude").unwrap(), "См. правила");
    assert_eq!(editor.get_field("description").unwrap(), "Первый уровень");

    editor.set_field("title", "Новое имя".to_string()).unwrap();
    editor.set_subclass_feature(1);
    let snapshot = editor.snapshot();
    assert_eq!(snapshot.card_fields.title, "Новое имя");
    assert_eq!(snapshot.card_fields.description, "Второй уровень");
    assert_eq!(snapshot.selected_type_id, "subclass");
    assert_eq!(snapshot.feature_names, ["Основа", "Специализация"]);
    assert_eq!(snapshot.selected_slug.as_deref(), Some("wizard-school"));
}

#[wasm_bindgen_test]
fn test_unknown_names_are_rejected() {
    let editor = JsCardEditor::new(None).unwrap();
    assert!(editor.get_field("nope").is_err());
    assert!(editor.set_card_type("dragon").is_err());
    assert!(editor.select_card(JsValue::from_str("not a card")).is_err());
}

#[wasm_bindgen_test]
fn test_close_editor_resets_state() {
    let editor = JsCardEditor::new(None).unwrap();
    editor.select_card(subclass_card()).unwrap();
    editor.close_editor();

    let snapshot = editor.snapshot();
    assert_eq!(snapshot.selected_slug, None);
    assert_eq!(snapshot.card_fields.title, "");
    assert!(!snapshot.is_exporting);
}
