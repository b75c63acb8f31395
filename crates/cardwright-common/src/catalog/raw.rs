//! Raw catalog API shape and its mapping onto [`TemplateCard`].

use std::sync::LazyLock;

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
use regex::Regex;
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
use regex_lite::Regex;
use serde::Deserialize;

use crate::types::{CardKind, FeatureId, TemplateCard, TemplateCategory, TemplateFeature};

/// Image used when the catalog has no art for a card.
pub const WIP_IMAGE: &str = "/image/wip.avif";

static DOMAIN_CARD_IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/image/domain/card/([^/.]+)(\.[a-zA-Z0-9]+)?$").unwrap()
});

static GENERIC_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/image/(.+?)/([^/.]+)\.(jpe?g|png|webp)$").unwrap());

/// Response envelope. `data` is kept loose so a non-array payload can be
/// reported as an invalid response instead of a decode failure.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub result: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFeature {
    /// Missing ids fall back to the feature's position in the list.
    #[serde(default)]
    pub id: Option<FeatureId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub main_body: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTemplateItem {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub main_body: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub art_attribution: Option<String>,
    #[serde(default)]
    pub class_slug: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub spellcast_trait: Option<String>,
    #[serde(default)]
    pub domain_slug: Option<String>,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub card_type: Option<String>,
    #[serde(default)]
    pub stress_cost: Option<i64>,
    #[serde(default)]
    pub level: Option<i64>,
    #[serde(default)]
    pub features: Option<Vec<RawFeature>>,
    #[serde(default)]
    pub foundation_features: Option<Vec<RawFeature>>,
    #[serde(default)]
    pub specialization_features: Option<Vec<RawFeature>>,
    #[serde(default)]
    pub mastery_features: Option<Vec<RawFeature>>,
}

/// Subclass tiers in display order: (list key, group label).
const SUBCLASS_TIERS: [(&str, &str); 3] = [
    ("foundation_features", "Основа"),
    ("specialization_features", "Специализация"),
    ("mastery_features", "Мастерство"),
];

impl RawTemplateItem {
    fn tier(&self, key: &str) -> Option<&[RawFeature]> {
        match key {
            "foundation_features" => self.foundation_features.as_deref(),
            "specialization_features" => self.specialization_features.as_deref(),
            "mastery_features" => self.mastery_features.as_deref(),
            _ => None,
        }
    }
}

/// Rewrite a local asset path to its small AVIF rendition.
pub fn optimize_asset_path(path: &str) -> String {
    if let Some(caps) = DOMAIN_CARD_IMAGE_RE.captures(path) {
        return format!("/image/domain/card/small/{}.avif", &caps[1]);
    }
    if let Some(caps) = GENERIC_IMAGE_RE.captures(path) {
        return format!("/image/{}/small/{}.avif", &caps[1], &caps[2]);
    }
    path.to_string()
}

pub fn resolve_image(image_url: Option<&str>) -> String {
    let image_url = match image_url {
        Some(url) if !url.is_empty() => url,
        _ => WIP_IMAGE,
    };

    if image_url.starts_with("http://") || image_url.starts_with("https://") {
        return image_url.to_string();
    }

    if image_url.starts_with('/') {
        return optimize_asset_path(image_url);
    }

    optimize_asset_path(&format!("/{}", image_url.trim_start_matches('/')))
}

/// `***Name:*** body`, `***Name***`, or just the body.
pub fn format_feature_text(feature: &RawFeature) -> String {
    let title = feature.name.as_deref().map(str::trim).unwrap_or_default();
    let body = feature.main_body.as_deref().map(str::trim).unwrap_or_default();

    match (title.is_empty(), body.is_empty()) {
        (false, false) => format!("***{title}:*** {body}"),
        (false, true) => format!("***{title}***"),
        _ => body.to_string(),
    }
}

fn extract_features(category: TemplateCategory, item: &RawTemplateItem) -> Vec<TemplateFeature> {
    if category == TemplateCategory::Subclass {
        return SUBCLASS_TIERS
            .iter()
            .filter_map(|(key, label)| {
                let lines: Vec<String> = item
                    .tier(key)?
                    .iter()
                    .map(format_feature_text)
                    .filter(|line| !line.is_empty())
                    .collect();
                if lines.is_empty() {
                    return None;
                }
                Some(TemplateFeature {
                    id: FeatureId::Text((*key).into()),
                    name: (*label).to_string(),
                    text: lines.join("\n\n"),
                    group: Some((*label).to_string()),
                })
            })
            .collect();
    }

    item.features
        .as_deref()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, feature)| TemplateFeature {
            id: feature
                .id
                .clone()
                .unwrap_or(FeatureId::Number(index as i64)),
            name: feature.name.clone().unwrap_or_default(),
            text: format_feature_text(feature),
            group: None,
        })
        .collect()
}

fn first_non_blank(candidates: &[Option<&String>]) -> Option<String> {
    candidates
        .iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn map_template_item(category: TemplateCategory, item: RawTemplateItem) -> TemplateCard {
    let features = extract_features(category, &item);
    let description = first_non_blank(&[
        item.short_description.as_ref(),
        item.description.as_ref(),
        item.main_body.as_ref(),
    ]);
    let image = Some(resolve_image(item.image_url.as_deref()));

    let kind = match category {
        TemplateCategory::Ancestry => CardKind::Ancestry,
        TemplateCategory::Community => CardKind::Community,
        TemplateCategory::Subclass => CardKind::Subclass {
            class_slug: item.class_slug,
            class_name: item.class_name,
            spellcast_trait: item.spellcast_trait,
        },
        TemplateCategory::DomainCard => CardKind::DomainCard {
            domain_slug: item.domain_slug,
            domain_name: item.domain_name,
            card_type: item.card_type,
            stress_cost: item.stress_cost,
            level: item.level,
        },
    };

    TemplateCard {
        id: item.slug.clone(),
        slug: item.slug,
        name: item.name,
        image,
        description,
        source_name: item.source_name,
        features,
        art_attribution: item.art_attribution,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_feature(name: &str, body: &str) -> RawFeature {
        RawFeature {
            id: Some(FeatureId::Number(1)),
            name: Some(name.to_string()),
            main_body: Some(body.to_string()),
        }
    }

    #[test]
    fn test_optimize_domain_card_path() {
        assert_eq!(
            optimize_asset_path("/image/domain/card/fireball.png"),
            "/image/domain/card/small/fireball.avif"
        );
        assert_eq!(
            optimize_asset_path("/image/domain/card/fireball"),
            "/image/domain/card/small/fireball.avif"
        );
    }

    #[test]
    fn test_optimize_generic_path() {
        assert_eq!(
            optimize_asset_path("/image/ancestry/elf.webp"),
            "/image/ancestry/small/elf.avif"
        );
        // Already optimized or unknown extensions pass through.
        assert_eq!(
            optimize_asset_path("/image/ancestry/small/elf.avif"),
            "/image/ancestry/small/elf.avif"
        );
    }

    #[test]
    fn test_resolve_image() {
        assert_eq!(resolve_image(None), WIP_IMAGE);
        assert_eq!(resolve_image(Some("")), WIP_IMAGE);
        assert_eq!(
            resolve_image(Some("https://cdn.example.com/a.png")),
            "https://cdn.example.com/a.png"
        );
        assert_eq!(
            resolve_image(Some("image/community/loreborne.jpg")),
            "/image/community/small/loreborne.avif"
        );
    }

    #[test]
    fn test_format_feature_text() {
        assert_eq!(format_feature_text(&raw_feature("Flight", "You fly.")), "***Flight:*** You fly.");
        assert_eq!(format_feature_text(&raw_feature(" Flight ", "")), "***Flight***");
        assert_eq!(format_feature_text(&raw_feature("", "Only body")), "Only body");
    }

    #[test]
    fn test_subclass_features_grouped_by_tier() {
        let item = RawTemplateItem {
            slug: "school-of-war".to_string(),
            name: "School of War".to_string(),
            class_slug: Some("playtest-wizard".to_string()),
            foundation_features: Some(vec![raw_feature("A", "one"), raw_feature("B", "two")]),
            specialization_features: Some(vec![]),
            mastery_features: Some(vec![raw_feature("C", "three")]),
            ..Default::default()
        };

        let card = map_template_item(TemplateCategory::Subclass, item);
        assert_eq!(card.features.len(), 2);
        assert_eq!(card.features[0].text, "***A:*** one\n\n***B:*** two");
        assert_eq!(card.features[0].group.as_deref(), Some("Основа"));
        assert_eq!(card.features[1].name, "Мастерство");
        assert_eq!(card.class_slug(), Some("playtest-wizard"));
    }

    #[test]
    fn test_description_falls_back_through_fields() {
        let item = RawTemplateItem {
            slug: "elf".to_string(),
            name: "Elf".to_string(),
            short_description: Some("   ".to_string()),
            main_body: Some(" Tall folk ".to_string()),
            features: Some(vec![raw_feature("Keen Senses", "See far.")]),
            ..Default::default()
        };

        let card = map_template_item(TemplateCategory::Ancestry, item);
        assert_eq!(card.description.as_deref(), Some("Tall folk"));
        assert_eq!(card.features[0].text, "***Keen Senses:*** See far.");
        assert_eq!(card.image.as_deref(), Some(WIP_IMAGE));
    }
}
