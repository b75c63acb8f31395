//! Derivation of an editable [`CardFields`] set from a catalog card.

use cardwright_common::{CardKind, TemplateCard, TemplateFeature};
use cardwright_renderer::strip_markdown_links;

use crate::card_types::{CardFields, CardTypeConfig, CardTypeId, card_type_config};
use crate::constants::{
    ASSET_BASE_PATH, DOMAIN_STRESS_IMAGE, FALLBACK_FEATURE_NAME, SPELLCAST_LABEL,
    domain_card_type_label, spellcast_trait_label,
};

/// Result of [`derive_fields`].
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFields {
    pub card_fields: CardFields,
    pub type_id: CardTypeId,
    pub selected_feature_index: usize,
}

/// Fields whose derivation depends on the card's category.
#[derive(Default)]
struct KindFields {
    label: String,
    description: String,
    divider_image: String,
    banner_image: String,
    spellcast: String,
    banner_text: String,
    stress_image: String,
    stress_text: String,
}

/// Prefix site-relative paths with [`ASSET_BASE_PATH`]; absolute urls pass through.
pub fn build_asset(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{ASSET_BASE_PATH}{path}")
    } else {
        format!("{ASSET_BASE_PATH}/{path}")
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn trim_playtest_prefix(slug: &str) -> &str {
    slug.strip_prefix("playtest-").unwrap_or(slug)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// `/image/{folder}/{kind}/{slug}.avif`, or empty without a slug.
fn themed_asset(folder: &str, kind: &str, slug: Option<&str>) -> String {
    match slug {
        Some(slug) => build_asset(&format!(
            "/image/{folder}/{kind}/{}.avif",
            trim_playtest_prefix(slug)
        )),
        None => String::new(),
    }
}

/// Text of one feature for the merged description: its text, else its name,
/// else [`FALLBACK_FEATURE_NAME`].
fn feature_content(feature: &TemplateFeature) -> &str {
    let text = feature.text.trim();
    if !text.is_empty() {
        return text;
    }
    let name = feature.name.trim();
    if name.is_empty() {
        FALLBACK_FEATURE_NAME
    } else {
        name
    }
}

/// All features merged into one block, separated by blank lines, links
/// stripped.
pub fn build_aggregated_content(features: &[TemplateFeature]) -> String {
    let merged = features
        .iter()
        .map(feature_content)
        .filter(|content| !content.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");
    strip_markdown_links(&merged).into_owned()
}

/// Description for one subclass tier.
pub fn feature_description(feature: Option<&TemplateFeature>) -> String {
    feature
        .map(|f| strip_markdown_links(&f.text).into_owned())
        .unwrap_or_default()
}

/// Lookups use the trimmed, lowercased value; the fallback capitalizes the
/// raw value as stored.
fn spellcast_line(raw: &str) -> String {
    let normalized = raw.trim().to_lowercase();
    let translated = spellcast_trait_label(&normalized)
        .map(str::to_string)
        .unwrap_or_else(|| capitalize(raw));
    format!("***{SPELLCAST_LABEL}:*** {translated}")
}

fn domain_label(card_type: Option<&str>, config: &CardTypeConfig) -> String {
    match card_type.filter(|raw| !raw.trim().is_empty()) {
        Some(raw) => domain_card_type_label(&raw.trim().to_lowercase())
            .map(str::to_string)
            .unwrap_or_else(|| capitalize(raw)),
        None => config.card_label.to_string(),
    }
}

fn kind_fields(card: &TemplateCard, config: &CardTypeConfig) -> KindFields {
    let default_divider = config.default_divider.unwrap_or_default().to_string();

    match &card.kind {
        CardKind::Ancestry | CardKind::Community => KindFields {
            label: config.card_label.to_string(),
            description: build_aggregated_content(&card.features),
            divider_image: default_divider,
            ..Default::default()
        },
        CardKind::Subclass {
            class_slug,
            class_name,
            spellcast_trait,
        } => {
            let class_slug = non_blank(class_slug);
            KindFields {
                label: non_blank(class_name)
                    .unwrap_or(config.card_label)
                    .to_string(),
                description: feature_description(card.features.first()),
                divider_image: match class_slug {
                    Some(_) => themed_asset("class", "divider", class_slug),
                    None => default_divider,
                },
                banner_image: themed_asset("class", "banner", class_slug),
                spellcast: spellcast_trait
                    .as_deref()
                    .filter(|raw| !raw.trim().is_empty())
                    .map(spellcast_line)
                    .unwrap_or_default(),
                ..Default::default()
            }
        }
        CardKind::DomainCard {
            domain_slug,
            card_type,
            stress_cost,
            level,
            ..
        } => {
            let domain_slug = non_blank(domain_slug);
            KindFields {
                label: domain_label(card_type.as_deref(), config),
                description: build_aggregated_content(&card.features),
                divider_image: match domain_slug {
                    Some(_) => themed_asset("domain", "divider", domain_slug),
                    None => default_divider,
                },
                banner_image: themed_asset("domain", "banner", domain_slug),
                banner_text: level.map(|l| l.to_string()).unwrap_or_default(),
                stress_image: DOMAIN_STRESS_IMAGE.to_string(),
                stress_text: stress_cost.map(|c| c.to_string()).unwrap_or_default(),
                ..Default::default()
            }
        }
    }
}

/// Project a catalog card onto its editable field set.
pub fn derive_fields(card: &TemplateCard) -> DerivedFields {
    let type_id = card.category();
    let config = card_type_config(type_id);
    let kind = kind_fields(card, config);

    let custom_classes = [
        Some(card.slug.as_str()),
        card.class_slug(),
        card.domain_slug(),
        card.card_type(),
    ]
    .into_iter()
    .flatten()
    .filter(|class| !class.is_empty())
    .collect::<Vec<_>>()
    .join(" ");

    let subclass_tier = if config.supports_tier {
        card.features
            .first()
            .and_then(|f| f.group.clone())
            .unwrap_or_default()
    } else {
        String::new()
    };

    let card_fields = CardFields {
        slug: card.slug.clone(),
        custom_classes,
        data_source: card.source_name.clone().unwrap_or_default(),
        data_class: card.class_slug().unwrap_or_default().to_string(),
        data_domain: card.domain_slug().unwrap_or_default().to_string(),
        title: card.name.clone(),
        prelude: card
            .description
            .as_deref()
            .map(|d| strip_markdown_links(d).into_owned())
            .unwrap_or_default(),
        description: kind.description,
        attribution: card.art_attribution.clone().unwrap_or_default(),
        source: card.source_name.clone().unwrap_or_default(),
        label: kind.label,
        subclass_tier,
        spellcast: kind.spellcast,
        banner_image: kind.banner_image,
        banner_text: kind.banner_text,
        stress_image: kind.stress_image,
        stress_text: kind.stress_text,
        divider_image: kind.divider_image,
        button_href: format!("/{}/{}", config.path_segment, card.slug),
    };

    tracing::debug!(slug = %card.slug, type_id = %type_id, "derived card fields");

    DerivedFields {
        card_fields,
        type_id,
        selected_feature_index: 0,
    }
}
