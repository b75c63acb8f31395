//! Editor state and the transitions the properties form drives.

use std::cell::RefCell;
use std::collections::HashSet;

use bytes::Bytes;
use cardwright_common::media::{encode_data_url, is_embedded_url};
use cardwright_common::{Store, TemplateCard, TemplateCategory};

use crate::builder::{DerivedFields, derive_fields, feature_description};
use crate::card_types::{CardField, CardFields, CardTypeId, DEFAULT_CARD_TYPE_ID, card_type_config};
use crate::platform::AssetPrefetch;

#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    pub selected_card: Option<TemplateCard>,
    pub selected_type_id: CardTypeId,
    pub card_fields: CardFields,
    /// User-supplied card art as a `data:` URL, replacing the template image.
    pub custom_image: Option<String>,
    /// Index into the selected card's features; subclass cards only.
    pub selected_feature_index: usize,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            selected_card: None,
            selected_type_id: DEFAULT_CARD_TYPE_ID,
            card_fields: CardFields::default(),
            custom_image: None,
            selected_feature_index: 0,
        }
    }
}

impl EditorState {
    /// Image shown on the card: the custom upload, else the template art.
    pub fn card_image(&self) -> Option<&str> {
        self.custom_image
            .as_deref()
            .or_else(|| self.selected_card.as_ref()?.image.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportState {
    pub is_exporting: bool,
    pub export_error: Option<String>,
}

/// Prefetches each image URL at most once per session.
pub struct AssetPrefetcher<P> {
    platform: P,
    requested: RefCell<HashSet<String>>,
}

impl<P: AssetPrefetch> AssetPrefetcher<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            requested: RefCell::new(HashSet::new()),
        }
    }

    /// Prefetch every usable URL not seen before. Empty, `data:` and
    /// `blob:` URLs are skipped. Returns how many requests were issued.
    pub fn prefetch_all<'a>(&self, urls: impl IntoIterator<Item = Option<&'a str>>) -> usize {
        let mut issued = 0;
        for url in urls.into_iter().flatten() {
            if url.is_empty() || is_embedded_url(url) {
                continue;
            }
            if !self.requested.borrow_mut().insert(url.to_string()) {
                continue;
            }
            self.platform.prefetch(url);
            issued += 1;
        }
        if issued > 0 {
            tracing::debug!(issued, "prefetching card assets");
        }
        issued
    }
}

/// Drives [`EditorState`] and resets [`ExportState`] when the card changes.
pub struct CardEditor<P> {
    store: Store<EditorState>,
    export: Store<ExportState>,
    prefetcher: AssetPrefetcher<P>,
}

impl<P: AssetPrefetch> CardEditor<P> {
    pub fn new(store: Store<EditorState>, export: Store<ExportState>, prefetch: P) -> Self {
        Self {
            store,
            export,
            prefetcher: AssetPrefetcher::new(prefetch),
        }
    }

    pub fn store(&self) -> &Store<EditorState> {
        &self.store
    }

    pub fn export_store(&self) -> &Store<ExportState> {
        &self.export
    }

    pub fn select_card(&self, card: TemplateCard) {
        let DerivedFields {
            card_fields,
            type_id,
            selected_feature_index,
        } = derive_fields(&card);

        self.prefetcher.prefetch_all([
            Some(card_fields.divider_image.as_str()),
            Some(card_fields.banner_image.as_str()),
            Some(card_fields.stress_image.as_str()),
            card.image.as_deref(),
        ]);

        tracing::debug!(slug = %card.slug, "selected card");
        self.store.set(EditorState {
            selected_card: Some(card),
            selected_type_id: type_id,
            card_fields,
            custom_image: None,
            selected_feature_index,
        });
        self.export.set(ExportState::default());
    }

    pub fn close_editor(&self) {
        self.store.set(EditorState::default());
        self.export.set(ExportState::default());
    }

    /// Switch the card type. Only backfills `label` and `dividerImage` when
    /// they are empty; nothing else is re-derived.
    pub fn set_card_type(&self, next: CardTypeId) {
        let config = card_type_config(next);
        self.store.update(|state| {
            state.selected_type_id = next;
            let fields = &mut state.card_fields;
            if fields.label.is_empty() {
                fields.label = config.card_label.to_string();
            }
            if fields.divider_image.is_empty() {
                fields.divider_image = config.default_divider.unwrap_or_default().to_string();
            }
        });
    }

    pub fn set_field(&self, field: CardField, value: impl Into<String>) {
        let value = value.into();
        self.store.update(|state| state.card_fields.set(field, value));
    }

    /// Like [`CardEditor::set_field`], passing the value through `transform`
    /// first.
    pub fn set_field_with(&self, field: CardField, value: &str, transform: impl FnOnce(&str) -> String) {
        self.set_field(field, transform(value));
    }

    /// Show another subclass tier. Re-derives `description` and
    /// `subclassTier` from the chosen feature and leaves the rest alone.
    ///
    /// Ignored for non-subclass cards and out-of-range indices.
    pub fn set_subclass_feature(&self, index: usize) {
        self.store.update(|state| {
            let Some(card) = &state.selected_card else {
                tracing::warn!(index, "no card selected, ignoring feature change");
                return;
            };
            if card.category() != TemplateCategory::Subclass {
                tracing::warn!(index, slug = %card.slug, "feature tiers only apply to subclass cards");
                return;
            }
            let Some(feature) = card.features.get(index) else {
                tracing::warn!(
                    index,
                    features = card.features.len(),
                    "feature index out of range, ignoring"
                );
                return;
            };

            state.card_fields.description = feature_description(Some(feature));
            if let Some(group) = &feature.group {
                state.card_fields.subclass_tier = group.clone();
            }
            state.selected_feature_index = index;
        });
    }

    pub fn set_custom_image(&self, data_url: Option<String>) {
        self.store.update(|state| state.custom_image = data_url);
    }

    /// Use raw image bytes (e.g. an uploaded file) as the card art.
    /// Returns the stored `data:` URL.
    pub fn load_custom_image(&self, bytes: Bytes) -> String {
        let data_url = encode_data_url(&bytes, None);
        tracing::debug!(bytes = bytes.len(), "loaded custom image");
        self.set_custom_image(Some(data_url.clone()));
        data_url
    }
}
